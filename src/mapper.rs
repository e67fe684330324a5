//! Converts tokenized fields into a [`TransactionRecord`].

use crate::amount::Amount;
use crate::error::{BatchError, Result};
use crate::record::TransactionRecord;
use crate::tokenizer::FieldSet;
use std::str::FromStr;

/// Maps the bank transaction columns onto [`TransactionRecord`] attributes.
///
/// Absent numeric columns keep their zero default and absent text columns
/// stay `None`. A column that is present but not a valid number fails with
/// [`BatchError::FieldConversion`].
#[derive(Debug, Clone, Default)]
pub struct RecordMapper;

impl RecordMapper {
    pub fn new() -> Self {
        RecordMapper
    }

    pub fn map(&self, fields: &FieldSet) -> Result<TransactionRecord> {
        let row = fields.line();

        Ok(TransactionRecord {
            id: parse_field(fields, "id", row)?.unwrap_or_default(),
            account_id: parse_field(fields, "accountID", row)?.unwrap_or_default(),
            raw_transaction_date: fields.get("strTransactionDate").map(str::to_string),
            transaction_date: None,
            transaction_type: fields.get("transactionType").map(str::to_string),
            amount: parse_field::<Amount>(fields, "amount", row)?.unwrap_or(Amount::ZERO),
            line: row,
        })
    }
}

/// Parses an optional numeric column, trimming surrounding whitespace.
fn parse_field<T: FromStr>(
    fields: &FieldSet,
    name: &'static str,
    row: u64,
) -> Result<Option<T>> {
    let Some(raw) = fields.get(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| BatchError::FieldConversion {
            row,
            field: name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::LineTokenizer;

    fn map_line(line: &str) -> Result<TransactionRecord> {
        let fields = LineTokenizer::bank_transactions().tokenize(line, 2)?;
        RecordMapper::new().map(&fields)
    }

    #[test]
    fn test_maps_well_formed_line() {
        let record = map_line("1,100,25/12/2023-14:30,DEPOSIT,250.75").unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.account_id, 100);
        assert_eq!(
            record.raw_transaction_date.as_deref(),
            Some("25/12/2023-14:30")
        );
        assert_eq!(record.transaction_type.as_deref(), Some("DEPOSIT"));
        assert_eq!(record.amount, Amount::from_str("250.75").unwrap());
        assert!(record.transaction_date.is_none());
        assert_eq!(record.line, 2);
    }

    #[test]
    fn test_trims_numeric_fields() {
        let record = map_line(" 5 , 9 ,01/02/2024-08:15,WITHDRAWAL, 12.5 ").unwrap();
        assert_eq!(record.id, 5);
        assert_eq!(record.account_id, 9);
        assert_eq!(record.amount.to_string(), "12.5");
    }

    #[test]
    fn test_short_line_uses_defaults() {
        let record = map_line("3,42").unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.account_id, 42);
        assert!(record.raw_transaction_date.is_none());
        assert!(record.transaction_type.is_none());
        assert!(record.amount.is_zero());
    }

    #[test]
    fn test_bad_id_names_field_and_value() {
        let err = map_line("abc,100,25/12/2023-14:30,DEPOSIT,1").unwrap_err();
        match err {
            BatchError::FieldConversion { row, field, value } => {
                assert_eq!(row, 2);
                assert_eq!(field, "id");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected FieldConversion, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let err = map_line("1,100,25/12/2023-14:30,DEPOSIT,12.5x").unwrap_err();
        assert!(matches!(
            err,
            BatchError::FieldConversion { field: "amount", .. }
        ));
    }

    #[test]
    fn test_empty_numeric_field_is_rejected() {
        let err = map_line("1,,25/12/2023-14:30,DEPOSIT,1").unwrap_err();
        assert!(matches!(
            err,
            BatchError::FieldConversion {
                field: "accountID",
                ..
            }
        ));
    }
}
