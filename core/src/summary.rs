//! Descriptive statistics shown alongside the segmentation view.
//!
//! These are plain aggregations over the raw tables plus the segment
//! distribution of a scored customer table. `DashboardReport` bundles them
//! so a presentation layer can render everything from one value.
//!
//! RULE: if scoring fails the report is not built at all. A dashboard
//! never shows a half-computed segmentation.

use crate::{
    config::RfmConfig,
    dataset::{Dataset, GeoLocation, Order, Payment, Review},
    engine::{RfmEngine, ScoredCustomer},
    error::RfmResult,
    segment::Segment,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_orders:    usize,
    pub total_customers: usize,
    pub total_payment:   f64,
}

/// count / mean / std / min / quartiles / max of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean:  f64,
    /// Sample standard deviation. NaN for a single value.
    pub std:   f64,
    pub min:   f64,
    pub p25:   f64,
    pub p50:   f64,
    pub p75:   f64,
    pub max:   f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month:  String,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMean {
    pub month:        String,
    pub mean_score:   f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: Segment,
    pub count:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    pub city:    String,
    pub lat:     f64,
    pub lng:     f64,
    pub entries: usize,
}

// ── Overview ─────────────────────────────────────────────────────────────────

pub fn overview(orders: &[Order], payments: &[Payment]) -> DatasetOverview {
    let order_ids: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
    let customer_ids: HashSet<&str> = orders.iter().map(|o| o.customer_id.as_str()).collect();
    let total_payment = payments.iter().filter_map(|p| p.payment_value).sum();
    DatasetOverview {
        total_orders: order_ids.len(),
        total_customers: customer_ids.len(),
        total_payment,
    }
}

impl NumericSummary {
    /// Non-finite values are ignored. `None` when nothing is left.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

// ── Time series ──────────────────────────────────────────────────────────────

fn purchase_month(ts: &Timestamp) -> String {
    ts.format("%Y-%m").to_string()
}

/// Orders per purchase month, oldest month first.
pub fn orders_per_month(orders: &[Order]) -> Vec<MonthlyCount> {
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for order in orders {
        *by_month.entry(purchase_month(&order.purchase_timestamp)).or_insert(0) += 1;
    }
    by_month
        .into_iter()
        .map(|(month, orders)| MonthlyCount { month, orders })
        .collect()
}

/// Mean review score per purchase month. Reviews join orders on order_id
/// (inner join: reviews of unknown orders and unreviewed orders are out).
pub fn mean_review_per_month(orders: &[Order], reviews: &[Review]) -> Vec<MonthlyMean> {
    let month_of: HashMap<&str, String> = orders
        .iter()
        .map(|o| (o.order_id.as_str(), purchase_month(&o.purchase_timestamp)))
        .collect();

    let mut by_month: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for review in reviews {
        if let Some(month) = month_of.get(review.order_id.as_str()) {
            let entry = by_month.entry(month.as_str()).or_insert((0, 0));
            entry.0 += u64::from(review.review_score);
            entry.1 += 1;
        }
    }

    by_month
        .into_iter()
        .map(|(month, (total, count))| MonthlyMean {
            month: month.to_string(),
            mean_score: total as f64 / count as f64,
            review_count: count,
        })
        .collect()
}

// ── Distributions ────────────────────────────────────────────────────────────

/// Reviews per score, lowest score first. Scores with no reviews are absent.
pub fn review_score_distribution(reviews: &[Review]) -> Vec<ScoreCount> {
    let mut by_score: BTreeMap<u8, usize> = BTreeMap::new();
    for review in reviews {
        *by_score.entry(review.review_score).or_insert(0) += 1;
    }
    by_score
        .into_iter()
        .map(|(score, count)| ScoreCount { score, count })
        .collect()
}

/// Payment rows per payment type, most common first. Rows without a type
/// are not counted.
pub fn payment_type_counts(payments: &[Payment]) -> Vec<LabelCount> {
    let labels = payments.iter().filter_map(|p| p.payment_type.as_deref());
    descending_counts(labels)
}

/// Customers per segment, largest segment first.
pub fn segment_counts(scored: &[ScoredCustomer]) -> Vec<SegmentCount> {
    let mut by_segment: BTreeMap<Segment, usize> = BTreeMap::new();
    for customer in scored {
        *by_segment.entry(customer.segment).or_insert(0) += 1;
    }
    let mut counts: Vec<SegmentCount> = by_segment
        .into_iter()
        .map(|(segment, count)| SegmentCount { segment, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.segment.cmp(&b.segment)));
    counts
}

fn descending_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut by_label: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *by_label.entry(label).or_insert(0) += 1;
    }
    let mut counts: Vec<LabelCount> = by_label
        .into_iter()
        .map(|(label, count)| LabelCount { label: label.to_string(), count })
        .collect();
    // Stable sort keeps ties alphabetical.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

// ── Geography ────────────────────────────────────────────────────────────────

/// Mean coordinates per city, sorted by city name.
pub fn city_locations(geo: &[GeoLocation]) -> Vec<CityLocation> {
    let mut by_city: BTreeMap<&str, (f64, f64, usize)> = BTreeMap::new();
    for row in geo {
        let entry = by_city.entry(row.city.as_str()).or_insert((0.0, 0.0, 0));
        entry.0 += row.lat;
        entry.1 += row.lng;
        entry.2 += 1;
    }
    by_city
        .into_iter()
        .map(|(city, (lat, lng, entries))| CityLocation {
            city: city.to_string(),
            lat: lat / entries as f64,
            lng: lng / entries as f64,
            entries,
        })
        .collect()
}

/// The `n` cities with the most geolocation entries.
pub fn top_cities(geo: &[GeoLocation], n: usize) -> Vec<LabelCount> {
    let mut counts = descending_counts(geo.iter().map(|g| g.city.as_str()));
    counts.truncate(n);
    counts
}

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub overview:              DatasetOverview,
    pub payment_value_summary: Option<NumericSummary>,
    pub review_score_summary:  Option<NumericSummary>,
    pub orders_per_month:      Vec<MonthlyCount>,
    pub review_distribution:   Vec<ScoreCount>,
    pub mean_review_per_month: Vec<MonthlyMean>,
    pub payment_types:         Vec<LabelCount>,
    pub segments:              Vec<SegmentCount>,
    pub top_cities:            Vec<LabelCount>,
    pub city_locations:        Vec<CityLocation>,
    pub customers:             Vec<ScoredCustomer>,
}

impl DashboardReport {
    pub fn build(dataset: &Dataset, config: &RfmConfig) -> RfmResult<Self> {
        let customers = RfmEngine::from_config(config).score(&dataset.orders, &dataset.payments)?;

        Ok(Self {
            overview: overview(&dataset.orders, &dataset.payments),
            payment_value_summary: NumericSummary::of(
                dataset.payments.iter().filter_map(|p| p.payment_value),
            ),
            review_score_summary: NumericSummary::of(
                dataset.reviews.iter().map(|r| f64::from(r.review_score)),
            ),
            orders_per_month: orders_per_month(&dataset.orders),
            review_distribution: review_score_distribution(&dataset.reviews),
            mean_review_per_month: mean_review_per_month(&dataset.orders, &dataset.reviews),
            payment_types: payment_type_counts(&dataset.payments),
            segments: segment_counts(&customers),
            top_cities: top_cities(&dataset.geolocation, config.top_cities),
            city_locations: city_locations(&dataset.geolocation),
            customers,
        })
    }
}
