//! Seeded synthetic e-commerce dataset.
//!
//! Produces all four tables with the rough shape of a marketplace export:
//! heavy-tailed order counts and payment values, a few unpaid orders, some
//! orders split across two payments, mostly positive reviews. Same seed,
//! same dataset, byte for byte.

use crate::{
    dataset::{Dataset, GeoLocation, Order, Payment, Review},
    rng::{DatasetRng, TableStream},
    types::Timestamp,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Purchase timestamps fall in [EPOCH, EPOCH + PURCHASE_WINDOW_DAYS).
const PURCHASE_WINDOW_DAYS: u64 = 600;
const MAX_ORDERS_PER_CUSTOMER: u64 = 8;

const UNPAID_ORDER_RATE: f64 = 0.05;
const SPLIT_PAYMENT_RATE: f64 = 0.10;
const NULL_VALUE_RATE: f64 = 0.02;
const REVIEW_RATE: f64 = 0.90;

const PAYMENT_TYPES: [(&str, f64); 4] = [
    ("credit_card", 0.74),
    ("boleto",      0.19),
    ("voucher",     0.05),
    ("debit_card",  0.02),
];

/// Weights for review scores 1..=5.
const REVIEW_WEIGHTS: [f64; 5] = [0.11, 0.03, 0.08, 0.19, 0.59];

const CITIES: [(&str, &str, f64, f64); 6] = [
    ("sao paulo",      "SP", -23.55, -46.63),
    ("rio de janeiro", "RJ", -22.91, -43.17),
    ("belo horizonte", "MG", -19.92, -43.94),
    ("brasilia",       "DF", -15.79, -47.88),
    ("curitiba",       "PR", -25.43, -49.27),
    ("porto alegre",   "RS", -30.03, -51.23),
];
const CITY_WEIGHTS: [f64; 6] = [0.40, 0.20, 0.12, 0.10, 0.10, 0.08];

fn epoch() -> Timestamp {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Generate a dataset with `customers` distinct customers, each owning at
/// least one order.
pub fn generate_dataset(seed: u64, customers: usize) -> Dataset {
    let orders = generate_orders(seed, customers);
    let payments = generate_payments(seed, &orders);
    let reviews = generate_reviews(seed, &orders);
    let geolocation = generate_geolocation(seed, customers * 2);

    log::info!(
        "synthetic dataset seed={seed}: customers={customers} orders={} payments={} reviews={}",
        orders.len(),
        payments.len(),
        reviews.len(),
    );

    Dataset { orders, payments, reviews, geolocation }
}

fn generate_orders(seed: u64, customers: usize) -> Vec<Order> {
    let mut id_rng = DatasetRng::new(seed, TableStream::Customers);
    let mut rng = DatasetRng::new(seed, TableStream::Orders);
    let window_secs = PURCHASE_WINDOW_DAYS * 86_400;
    let start = epoch();

    let mut orders = Vec::new();
    for _ in 0..customers {
        let customer_id = id_rng.hex_id();
        let count = (rng.pareto(1.0, 2.5) as u64).clamp(1, MAX_ORDERS_PER_CUSTOMER);
        for _ in 0..count {
            let offset = rng.next_u64_below(window_secs);
            let purchase_timestamp = start + Duration::seconds(offset as i64);
            orders.push(Order {
                order_id: rng.hex_id(),
                customer_id: customer_id.clone(),
                purchase_timestamp,
            });
        }
    }
    orders
}

fn payment_value(rng: &mut DatasetRng) -> Option<f64> {
    if rng.chance(NULL_VALUE_RATE) {
        return None;
    }
    let raw = rng.pareto(15.0, 1.6).min(5_000.0);
    Some((raw * 100.0).round() / 100.0)
}

fn generate_payments(seed: u64, orders: &[Order]) -> Vec<Payment> {
    let mut rng = DatasetRng::new(seed, TableStream::Payments);
    let type_weights: Vec<f64> = PAYMENT_TYPES.iter().map(|(_, w)| *w).collect();

    let mut payments = Vec::with_capacity(orders.len());
    for order in orders {
        if rng.chance(UNPAID_ORDER_RATE) {
            continue;
        }
        if rng.chance(SPLIT_PAYMENT_RATE) {
            payments.push(Payment {
                order_id: order.order_id.clone(),
                payment_value: payment_value(&mut rng),
                payment_type: Some("credit_card".into()),
            });
            payments.push(Payment {
                order_id: order.order_id.clone(),
                payment_value: payment_value(&mut rng),
                payment_type: Some("voucher".into()),
            });
            continue;
        }
        let kind = PAYMENT_TYPES[rng.weighted_index(&type_weights)].0;
        payments.push(Payment {
            order_id: order.order_id.clone(),
            payment_value: payment_value(&mut rng),
            payment_type: Some(kind.into()),
        });
    }
    payments
}

fn generate_reviews(seed: u64, orders: &[Order]) -> Vec<Review> {
    let mut rng = DatasetRng::new(seed, TableStream::Reviews);
    orders
        .iter()
        .filter_map(|order| {
            if !rng.chance(REVIEW_RATE) {
                return None;
            }
            let score = rng.weighted_index(&REVIEW_WEIGHTS) + 1;
            Some(Review {
                order_id: order.order_id.clone(),
                review_score: u8::try_from(score).unwrap_or(5),
            })
        })
        .collect()
}

fn generate_geolocation(seed: u64, rows: usize) -> Vec<GeoLocation> {
    let mut rng = DatasetRng::new(seed, TableStream::Geolocation);
    (0..rows)
        .map(|_| {
            let (city, state, lat, lng) = CITIES[rng.weighted_index(&CITY_WEIGHTS)];
            GeoLocation {
                city: city.into(),
                state: Some(state.into()),
                lat: lat + (rng.next_f64() - 0.5) * 0.1,
                lng: lng + (rng.next_f64() - 0.5) * 0.1,
            }
        })
        .collect()
}
