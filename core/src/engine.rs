//! The scoring engine: orders + payments in, scored customers out.
//!
//! PIPELINE (fixed order):
//!   1. Validate inputs           (fail fast, nothing is skipped)
//!   2. Resolve snapshot instant  (latest order + 1 day by default)
//!   3. Aggregate per customer    (left join orders ⋈ payments)
//!   4. Quantile-score R, F, M    (Q = 5, Recency reversed)
//!   5. Sum and classify segment  (first matching rule wins)
//!
//! RULES:
//!   - The engine holds no state between calls. Same input, same output.
//!   - Either every customer is scored or an error is returned. There is
//!     no partial table.

use crate::{
    config::{RfmConfig, SnapshotPolicy},
    dataset::{Order, Payment},
    error::{RfmError, RfmResult},
    quantile::{qcut_safe, SCORE_BINS},
    rfm::{aggregate_customers, duplicate_order_ids, snapshot_instant, CustomerAggregate},
    segment::{classify, RfmScores, Segment},
    types::{CustomerId, Score},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCustomer {
    pub customer_id: CustomerId,
    pub recency:     i64,
    pub frequency:   u32,
    pub monetary:    f64,
    pub r_score:     Score,
    pub f_score:     Score,
    pub m_score:     Score,
    pub rfm_score:   u8,
    pub segment:     Segment,
}

/// Score with the default snapshot rule (latest order + 1 day).
pub fn compute_rfm(orders: &[Order], payments: &[Payment]) -> RfmResult<Vec<ScoredCustomer>> {
    RfmEngine::default().score(orders, payments)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RfmEngine {
    snapshot: SnapshotPolicy,
}

impl RfmEngine {
    pub fn new(snapshot: SnapshotPolicy) -> Self {
        Self { snapshot }
    }

    pub fn from_config(config: &RfmConfig) -> Self {
        Self::new(config.snapshot)
    }

    pub fn score(&self, orders: &[Order], payments: &[Payment]) -> RfmResult<Vec<ScoredCustomer>> {
        validate_orders(orders)?;
        validate_payments(payments)?;

        let snapshot = snapshot_instant(orders, self.snapshot)?;
        let aggregates = aggregate_customers(orders, payments, snapshot);

        let recency: Vec<i64> = aggregates.iter().map(|a| a.recency).collect();
        let frequency: Vec<u32> = aggregates.iter().map(|a| a.frequency).collect();
        let monetary: Vec<f64> = aggregates.iter().map(|a| a.monetary).collect();

        let r_scores = qcut_safe(&recency, SCORE_BINS, true);
        let f_scores = qcut_safe(&frequency, SCORE_BINS, false);
        let m_scores = qcut_safe(&monetary, SCORE_BINS, false);

        let scored: Vec<ScoredCustomer> = aggregates
            .into_iter()
            .zip(r_scores.into_iter().zip(f_scores).zip(m_scores))
            .map(|(agg, ((r, f), m))| score_customer(agg, RfmScores { r, f, m }))
            .collect();

        log::info!(
            "rfm: scored {} customers from {} orders / {} payments (snapshot={snapshot})",
            scored.len(),
            orders.len(),
            payments.len(),
        );

        Ok(scored)
    }
}

fn score_customer(agg: CustomerAggregate, scores: RfmScores) -> ScoredCustomer {
    ScoredCustomer {
        customer_id: agg.customer_id,
        recency:     agg.recency,
        frequency:   agg.frequency,
        monetary:    agg.monetary,
        r_score:     scores.r,
        f_score:     scores.f,
        m_score:     scores.m,
        rfm_score:   u8::try_from(scores.total()).unwrap_or(u8::MAX),
        segment:     classify(&scores),
    }
}

// ── Input validation ─────────────────────────────────────────────────────────

fn validate_orders(orders: &[Order]) -> RfmResult<()> {
    if orders.is_empty() {
        return Err(RfmError::EmptyInput { table: "orders" });
    }
    for (idx, order) in orders.iter().enumerate() {
        let row = idx + 1;
        if order.order_id.trim().is_empty() {
            return Err(RfmError::malformed("orders", row, "order_id", "is missing"));
        }
        if order.customer_id.trim().is_empty() {
            return Err(RfmError::malformed("orders", row, "customer_id", "is missing"));
        }
    }
    if let Some(order_id) = duplicate_order_ids(orders).into_iter().next() {
        return Err(RfmError::DuplicateOrder { order_id });
    }
    Ok(())
}

fn validate_payments(payments: &[Payment]) -> RfmResult<()> {
    for (idx, payment) in payments.iter().enumerate() {
        let row = idx + 1;
        if payment.order_id.trim().is_empty() {
            return Err(RfmError::malformed("payments", row, "order_id", "is missing"));
        }
        if let Some(value) = payment.payment_value {
            if !value.is_finite() || value < 0.0 {
                return Err(RfmError::malformed(
                    "payments",
                    row,
                    "payment_value",
                    format!("must be a non-negative amount, got {value}"),
                ));
            }
        }
    }
    Ok(())
}
