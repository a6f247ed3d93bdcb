//! In-memory tables handed to the engine by the loader.
//!
//! Rows are plain values. Nothing here is cached between calls; a
//! `Dataset` lives exactly as long as its owner keeps it.

use crate::types::{CustomerId, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id:           OrderId,
    pub customer_id:        CustomerId,
    pub purchase_timestamp: Timestamp,
}

impl Order {
    pub fn new(
        order_id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        purchase_timestamp: Timestamp,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            purchase_timestamp,
        }
    }
}

/// One payment row. An order may carry several (vouchers, split cards).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub order_id:      OrderId,
    pub payment_value: Option<f64>,
    pub payment_type:  Option<String>,
}

impl Payment {
    pub fn new(order_id: impl Into<OrderId>, payment_value: f64) -> Self {
        Self {
            order_id: order_id.into(),
            payment_value: Some(payment_value),
            payment_type: None,
        }
    }

    /// A payment row whose value is null. Counts as 0 towards Monetary.
    pub fn unvalued(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            payment_value: None,
            payment_type: None,
        }
    }

    pub fn with_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub order_id:     OrderId,
    pub review_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub city:  String,
    pub state: Option<String>,
    pub lat:   f64,
    pub lng:   f64,
}

/// All four tables of one dataset snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub orders:      Vec<Order>,
    pub payments:    Vec<Payment>,
    pub reviews:     Vec<Review>,
    pub geolocation: Vec<GeoLocation>,
}
