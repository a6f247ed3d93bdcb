//! Shared primitive types used across the scoring pipeline.

/// Identifier of a single order. Unique within the Orders table.
pub type OrderId = String;

/// Identifier of a customer. One customer may own many orders.
pub type CustomerId = String;

/// Purchase instants are naive: the source data carries no zone.
pub type Timestamp = chrono::NaiveDateTime;

/// An ordinal quantile score. Always in [1, 5] for R/F/M.
pub type Score = u8;
