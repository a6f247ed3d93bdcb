//! RFM (Recency, Frequency, Monetary) customer scoring over an
//! e-commerce dataset, plus the descriptive summaries shown next to it.
//!
//! Entry point: [`engine::compute_rfm`].

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod loader;
pub mod quantile;
pub mod rfm;
pub mod rng;
pub mod segment;
pub mod summary;
pub mod synthetic;
pub mod types;

pub use engine::{compute_rfm, RfmEngine, ScoredCustomer};
pub use error::{RfmError, RfmResult};
