//! Deterministic random number generation for synthetic datasets.
//!
//! RULE: the generator never touches a platform RNG. Every table draws
//! from its own stream, seeded from (seed XOR stream index), so adding a
//! new table never changes the rows of an existing one.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one table.
pub struct DatasetRng {
    inner: Pcg64Mcg,
}

impl DatasetRng {
    pub fn new(seed: u64, stream: TableStream) -> Self {
        let derived_seed = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        log::trace!("rng: stream '{}' seeded from {seed}", stream.name());
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n). Returns 0 when n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Pick an index with probability proportional to `weights`.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (idx, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if roll < cumulative {
                return idx;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// A 32-hex-digit identifier, the shape the order/customer ids take.
    pub fn hex_id(&mut self) -> String {
        let bits = (u128::from(self.next_u64()) << 64) | u128::from(self.next_u64());
        uuid::Uuid::from_u128(bits).simple().to_string()
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum TableStream {
    Customers = 0,
    Orders = 1,
    Payments = 2,
    Reviews = 3,
    Geolocation = 4,
}

impl TableStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Payments => "payments",
            Self::Reviews => "reviews",
            Self::Geolocation => "geolocation",
        }
    }
}
