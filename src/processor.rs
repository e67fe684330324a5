//! Per-record transform stage.

use crate::error::{BatchError, Result};
use crate::record::TransactionRecord;
use chrono::NaiveDateTime;

/// Input layout of the transaction date column: `dd/MM/yyyy-HH:mm`.
pub const TRANSACTION_DATE_FORMAT: &str = "%d/%m/%Y-%H:%M";

/// Transforms one record. An error fails the whole job.
///
/// Implemented for any `FnMut(TransactionRecord) -> Result<TransactionRecord>`
/// so a closure can stand in for a dedicated type.
pub trait ItemProcessor {
    fn process(&mut self, record: TransactionRecord) -> Result<TransactionRecord>;
}

impl<F> ItemProcessor for F
where
    F: FnMut(TransactionRecord) -> Result<TransactionRecord>,
{
    fn process(&mut self, record: TransactionRecord) -> Result<TransactionRecord> {
        self(record)
    }
}

/// Parses `raw_transaction_date` into `transaction_date`.
#[derive(Debug, Clone)]
pub struct DateTransformer {
    format: String,
}

impl DateTransformer {
    pub fn new(format: impl Into<String>) -> Self {
        DateTransformer {
            format: format.into(),
        }
    }

    /// Parses a raw date with this transformer's format.
    pub fn parse(&self, raw: &str, row: u64) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw.trim(), &self.format).map_err(|_| {
            BatchError::DateParse {
                row,
                value: raw.to_string(),
            }
        })
    }
}

impl Default for DateTransformer {
    fn default() -> Self {
        Self::new(TRANSACTION_DATE_FORMAT)
    }
}

impl ItemProcessor for DateTransformer {
    fn process(&mut self, mut record: TransactionRecord) -> Result<TransactionRecord> {
        let raw = record
            .raw_transaction_date
            .as_deref()
            .ok_or(BatchError::MissingField {
                row: record.line,
                field: "strTransactionDate",
            })?;

        record.transaction_date = Some(self.parse(raw, record.line)?);
        Ok(record)
    }
}
