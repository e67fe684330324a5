//! The bank transaction row, from mapped input to persisted entity.

use crate::amount::Amount;
use chrono::NaiveDateTime;

/// One bank transaction.
///
/// Built by the [`RecordMapper`](crate::mapper::RecordMapper) with
/// `transaction_date` unset, completed once by the transform stage, then
/// handed by value to the chunk writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    /// Primary key in the sink. Supplied by the input, never generated.
    pub id: i64,

    /// Owning account. Not checked against anything.
    pub account_id: i64,

    /// Date column exactly as read. Transient: never persisted.
    pub raw_transaction_date: Option<String>,

    /// Parsed form of `raw_transaction_date`, set by the transform stage.
    pub transaction_date: Option<NaiveDateTime>,

    /// Free-form category label such as `DEPOSIT`.
    pub transaction_type: Option<String>,

    pub amount: Amount,

    /// Physical line number in the input file, for diagnostics.
    pub line: u64,
}

impl TransactionRecord {
    /// Returns `true` once the transform stage has populated the date.
    pub fn is_transformed(&self) -> bool {
        self.transaction_date.is_some()
    }
}
