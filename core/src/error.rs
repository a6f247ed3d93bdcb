use crate::types::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfmError {
    #[error("Malformed input in {table} row {row}: field '{field}' {reason}")]
    MalformedInput {
        table:  &'static str,
        row:    usize,
        field:  &'static str,
        reason: String,
    },

    #[error("Duplicate order_id '{order_id}' in orders")]
    DuplicateOrder { order_id: String },

    #[error("Empty input: no rows in {table}")]
    EmptyInput { table: &'static str },

    #[error("Snapshot {snapshot} precedes the latest order at {last_order}")]
    SnapshotBeforeLastOrder {
        snapshot:   Timestamp,
        last_order: Timestamp,
    },

    #[error("Snapshot offset of {days} days from {last_order} is out of range")]
    SnapshotOutOfRange {
        last_order: Timestamp,
        days:       i64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RfmError {
    pub(crate) fn malformed(
        table: &'static str,
        row: usize,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput { table, row, field, reason: reason.into() }
    }
}

pub type RfmResult<T> = Result<T, RfmError>;
