//! CSV data loader.
//!
//! Parses the four dataset tables into typed rows. Expected columns (extra
//! columns are ignored):
//!   orders:      order_id, customer_id, order_purchase_timestamp
//!   payments:    order_id, payment_type, payment_value
//!   reviews:     order_id, review_score
//!   geolocation: geolocation_lat, geolocation_lng, geolocation_city,
//!                geolocation_state
//!
//! RULE: a missing required field fails the whole load with the CSV line
//! number. Rows are never skipped silently.

use crate::{
    config::RfmConfig,
    dataset::{Dataset, GeoLocation, Order, Payment, Review},
    error::{RfmError, RfmResult},
    types::Timestamp,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Raw CSV records ──────────────────────────────────────────────────────────
// Every field is read as an optional string so that blanks and bad numbers
// surface as MalformedInput with a line number instead of a serde message.

#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id:                 Option<String>,
    customer_id:              Option<String>,
    order_purchase_timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentRecord {
    order_id:      Option<String>,
    #[serde(default)]
    payment_type:  Option<String>,
    #[serde(default)]
    payment_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    order_id:     Option<String>,
    review_score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoRecord {
    geolocation_lat:   Option<String>,
    geolocation_lng:   Option<String>,
    geolocation_city:  Option<String>,
    #[serde(default)]
    geolocation_state: Option<String>,
}

// ── Public loaders ───────────────────────────────────────────────────────────

pub fn load_orders<R: Read>(reader: R) -> RfmResult<Vec<Order>> {
    const TABLE: &str = "orders";
    read_records(reader, |line, rec: OrderRecord| {
        let order_id = required(rec.order_id, TABLE, line, "order_id")?;
        let customer_id = required(rec.customer_id, TABLE, line, "customer_id")?;
        let raw_ts = required(
            rec.order_purchase_timestamp,
            TABLE,
            line,
            "order_purchase_timestamp",
        )?;
        let purchase_timestamp = parse_timestamp(&raw_ts).ok_or_else(|| {
            RfmError::malformed(
                TABLE,
                line,
                "order_purchase_timestamp",
                format!("is not a timestamp: '{raw_ts}'"),
            )
        })?;
        Ok(Order { order_id, customer_id, purchase_timestamp })
    })
}

pub fn load_payments<R: Read>(reader: R) -> RfmResult<Vec<Payment>> {
    const TABLE: &str = "payments";
    read_records(reader, |line, rec: PaymentRecord| {
        let order_id = required(rec.order_id, TABLE, line, "order_id")?;
        let payment_value = match optional(rec.payment_value) {
            None => None,
            Some(raw) => {
                let value: f64 = raw.parse().map_err(|_| {
                    RfmError::malformed(
                        TABLE,
                        line,
                        "payment_value",
                        format!("is not a number: '{raw}'"),
                    )
                })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(RfmError::malformed(
                        TABLE,
                        line,
                        "payment_value",
                        format!("must be a non-negative amount, got {value}"),
                    ));
                }
                Some(value)
            }
        };
        Ok(Payment {
            order_id,
            payment_value,
            payment_type: optional(rec.payment_type),
        })
    })
}

pub fn load_reviews<R: Read>(reader: R) -> RfmResult<Vec<Review>> {
    const TABLE: &str = "reviews";
    read_records(reader, |line, rec: ReviewRecord| {
        let order_id = required(rec.order_id, TABLE, line, "order_id")?;
        let raw = required(rec.review_score, TABLE, line, "review_score")?;
        let review_score = raw
            .parse::<u8>()
            .ok()
            .filter(|s| (1..=5).contains(s))
            .ok_or_else(|| {
                RfmError::malformed(
                    TABLE,
                    line,
                    "review_score",
                    format!("must be an integer in 1..=5, got '{raw}'"),
                )
            })?;
        Ok(Review { order_id, review_score })
    })
}

pub fn load_geolocation<R: Read>(reader: R) -> RfmResult<Vec<GeoLocation>> {
    const TABLE: &str = "geolocation";
    read_records(reader, |line, rec: GeoRecord| {
        let city = required(rec.geolocation_city, TABLE, line, "geolocation_city")?;
        let lat = required_f64(rec.geolocation_lat, TABLE, line, "geolocation_lat")?;
        let lng = required_f64(rec.geolocation_lng, TABLE, line, "geolocation_lng")?;
        Ok(GeoLocation {
            city,
            state: optional(rec.geolocation_state),
            lat,
            lng,
        })
    })
}

pub fn load_orders_file(path: impl AsRef<Path>) -> RfmResult<Vec<Order>> {
    load_orders(open(path.as_ref())?)
}

pub fn load_payments_file(path: impl AsRef<Path>) -> RfmResult<Vec<Payment>> {
    load_payments(open(path.as_ref())?)
}

impl Dataset {
    /// Load all tables from `data_dir` using the file names in `config`.
    ///
    /// Orders and payments are required. Reviews and geolocation only feed
    /// the descriptive summaries, so a missing file yields an empty table.
    pub fn load(data_dir: impl AsRef<Path>, config: &RfmConfig) -> RfmResult<Self> {
        let dir = data_dir.as_ref();
        let files = &config.files;

        let orders = load_orders_file(files.orders_path(dir))?;
        let payments = load_payments_file(files.payments_path(dir))?;

        let reviews_path = files.reviews_path(dir);
        let reviews = if reviews_path.exists() {
            load_reviews(open(&reviews_path)?)?
        } else {
            log::warn!("reviews file {} not found, continuing without reviews", reviews_path.display());
            Vec::new()
        };

        let geo_path = files.geolocation_path(dir);
        let geolocation = if geo_path.exists() {
            load_geolocation(open(&geo_path)?)?
        } else {
            log::warn!("geolocation file {} not found, continuing without it", geo_path.display());
            Vec::new()
        };

        log::info!(
            "loaded dataset from {}: orders={} payments={} reviews={} geolocation={}",
            dir.display(),
            orders.len(),
            payments.len(),
            reviews.len(),
            geolocation.len(),
        );

        Ok(Self { orders, payments, reviews, geolocation })
    }
}

/// Parse a purchase timestamp. Date-only values mean midnight.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn open(path: &Path) -> RfmResult<File> {
    File::open(path).map_err(|e| {
        RfmError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {e}", path.display()),
        ))
    })
}

fn read_records<R, D, T, F>(reader: R, mut convert: F) -> RfmResult<Vec<T>>
where
    R: Read,
    D: serde::de::DeserializeOwned,
    F: FnMut(usize, D) -> RfmResult<T>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();
    while csv_reader.read_record(&mut record)? {
        // The line the record starts on, counting quoted line breaks.
        let line = record
            .position()
            .map_or(0, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX));
        let raw: D = record.deserialize(Some(&headers))?;
        rows.push(convert(line, raw)?);
    }
    Ok(rows)
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    value: Option<String>,
    table: &'static str,
    line: usize,
    field: &'static str,
) -> RfmResult<String> {
    optional(value).ok_or_else(|| RfmError::malformed(table, line, field, "is missing"))
}

fn required_f64(
    value: Option<String>,
    table: &'static str,
    line: usize,
    field: &'static str,
) -> RfmResult<f64> {
    let raw = required(value, table, line, field)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RfmError::malformed(table, line, field, format!("is not a number: '{raw}'")))
}
