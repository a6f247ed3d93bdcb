//! Order/payment join and per-customer Recency, Frequency, Monetary.
//!
//! The join is a left join on order_id: every order contributes to its
//! customer even when no payment row matches it. Payments that match no
//! order are dropped.

use crate::{
    config::SnapshotPolicy,
    dataset::{Order, Payment},
    error::{RfmError, RfmResult},
    types::{CustomerId, OrderId, Timestamp},
};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub customer_id: CustomerId,
    /// Whole days between the snapshot and the latest order.
    pub recency:     i64,
    /// Distinct orders placed.
    pub frequency:   u32,
    /// Sum of attached payment values. Null payments count as 0.
    pub monetary:    f64,
}

/// Resolve the snapshot instant Recency is measured against.
pub fn snapshot_instant(orders: &[Order], policy: SnapshotPolicy) -> RfmResult<Timestamp> {
    let last_order = orders
        .iter()
        .map(|o| o.purchase_timestamp)
        .max()
        .ok_or(RfmError::EmptyInput { table: "orders" })?;

    match policy {
        SnapshotPolicy::LastOrderPlusDays { days } => {
            let snapshot = TimeDelta::try_days(days)
                .and_then(|offset| last_order.checked_add_signed(offset))
                .ok_or(RfmError::SnapshotOutOfRange { last_order, days })?;
            if snapshot < last_order {
                return Err(RfmError::SnapshotBeforeLastOrder { snapshot, last_order });
            }
            Ok(snapshot)
        }
        SnapshotPolicy::Fixed { at } if at < last_order => {
            Err(RfmError::SnapshotBeforeLastOrder { snapshot: at, last_order })
        }
        SnapshotPolicy::Fixed { at } => Ok(at),
    }
}

#[derive(Default)]
struct CustomerAccumulator<'a> {
    latest:   Option<Timestamp>,
    orders:   HashSet<&'a str>,
    monetary: f64,
}

/// Group the joined rows by customer. Output is sorted by customer_id.
pub fn aggregate_customers(
    orders: &[Order],
    payments: &[Payment],
    snapshot: Timestamp,
) -> Vec<CustomerAggregate> {
    let mut paid_by_order: HashMap<&str, f64> = HashMap::new();
    for payment in payments {
        *paid_by_order.entry(payment.order_id.as_str()).or_insert(0.0) +=
            payment.payment_value.unwrap_or(0.0);
    }

    let known_orders: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
    let orphaned = payments
        .iter()
        .filter(|p| !known_orders.contains(p.order_id.as_str()))
        .count();
    if orphaned > 0 {
        log::debug!("rfm: {orphaned} payment rows reference no known order, dropped by join");
    }

    let mut groups: BTreeMap<&str, CustomerAccumulator<'_>> = BTreeMap::new();
    for order in orders {
        let acc = groups.entry(order.customer_id.as_str()).or_default();
        acc.latest = acc.latest.max(Some(order.purchase_timestamp));
        if acc.orders.insert(order.order_id.as_str()) {
            acc.monetary += paid_by_order
                .get(order.order_id.as_str())
                .copied()
                .unwrap_or(0.0);
        }
    }

    groups
        .into_iter()
        .map(|(customer_id, acc)| {
            let recency = acc
                .latest
                .map_or(0, |latest| (snapshot - latest).num_days());
            CustomerAggregate {
                customer_id: customer_id.to_string(),
                recency,
                frequency: u32::try_from(acc.orders.len()).unwrap_or(u32::MAX),
                monetary: acc.monetary,
            }
        })
        .collect()
}

/// Order ids that occur more than once, in first-seen order.
pub(crate) fn duplicate_order_ids(orders: &[Order]) -> Vec<OrderId> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut dupes = Vec::new();
    for order in orders {
        if !seen.insert(order.order_id.as_str()) {
            dupes.push(order.order_id.clone());
        }
    }
    dupes
}
