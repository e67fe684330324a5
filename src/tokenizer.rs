//! Splits delimited lines into named fields.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord};

/// Column names of the bank transaction file, in file order.
pub const TRANSACTION_FIELDS: [&str; 5] = [
    "id",
    "accountID",
    "strTransactionDate",
    "transactionType",
    "amount",
];

/// Ordered field name to raw value mapping for one line.
///
/// Only the fields present on the line are held; a short line simply has
/// fewer entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<(String, String)>,
    line: u64,
}

impl FieldSet {
    /// Returns the raw value of a field, or `None` if the line did not reach it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Physical line number the fields were read from (1-based).
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Non-strict delimited tokenizer.
///
/// A line with fewer columns than names yields only the columns present;
/// columns beyond the last name are dropped. Neither case is an error.
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    delimiter: u8,
    names: Vec<String>,
}

impl LineTokenizer {
    pub fn new<I, S>(delimiter: u8, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LineTokenizer {
            delimiter,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Comma-delimited tokenizer over [`TRANSACTION_FIELDS`].
    pub fn bank_transactions() -> Self {
        Self::new(b',', TRANSACTION_FIELDS)
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Tokenizes a single raw line.
    pub fn tokenize(&self, line: &str, line_number: u64) -> Result<FieldSet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(line.as_bytes());

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Ok(FieldSet {
                fields: Vec::new(),
                line: line_number,
            });
        }
        Ok(self.tokenize_record(&record, line_number))
    }

    /// Names the columns of an already split record.
    pub fn tokenize_record(&self, record: &StringRecord, line_number: u64) -> FieldSet {
        let fields = self
            .names
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        FieldSet {
            fields,
            line: line_number,
        }
    }
}

impl Default for LineTokenizer {
    fn default() -> Self {
        Self::bank_transactions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_full_line() {
        let tokenizer = LineTokenizer::bank_transactions();
        let fields = tokenizer
            .tokenize("1,100,25/12/2023-14:30,DEPOSIT,250.75", 2)
            .unwrap();

        assert_eq!(fields.len(), 5);
        assert_eq!(fields.get("id"), Some("1"));
        assert_eq!(fields.get("accountID"), Some("100"));
        assert_eq!(fields.get("strTransactionDate"), Some("25/12/2023-14:30"));
        assert_eq!(fields.get("transactionType"), Some("DEPOSIT"));
        assert_eq!(fields.get("amount"), Some("250.75"));
        assert_eq!(fields.line(), 2);
    }

    #[test]
    fn test_short_line_leaves_missing_fields_absent() {
        let tokenizer = LineTokenizer::bank_transactions();
        let fields = tokenizer.tokenize("7,300", 4).unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("accountID"), Some("300"));
        assert_eq!(fields.get("strTransactionDate"), None);
        assert_eq!(fields.get("amount"), None);
    }

    #[test]
    fn test_extra_columns_are_dropped() {
        let tokenizer = LineTokenizer::bank_transactions();
        let fields = tokenizer
            .tokenize("1,2,01/01/2024-00:00,FEE,3.00,extra,more", 2)
            .unwrap();

        assert_eq!(fields.len(), 5);
        assert_eq!(fields.get("amount"), Some("3.00"));
    }

    #[test]
    fn test_preserves_column_order() {
        let tokenizer = LineTokenizer::bank_transactions();
        let fields = tokenizer.tokenize("1,2,d,T,5", 2).unwrap();
        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, TRANSACTION_FIELDS.to_vec());
    }

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let tokenizer = LineTokenizer::bank_transactions();
        let fields = tokenizer
            .tokenize("1,2,01/01/2024-00:00,\"WIRE, INTL\",9", 2)
            .unwrap();
        assert_eq!(fields.get("transactionType"), Some("WIRE, INTL"));
    }

    #[test]
    fn test_custom_delimiter() {
        let tokenizer = LineTokenizer::new(b';', ["a", "b"]);
        let fields = tokenizer.tokenize("x;y", 1).unwrap();
        assert_eq!(fields.get("b"), Some("y"));
    }

    #[test]
    fn test_empty_line_has_no_fields() {
        let tokenizer = LineTokenizer::bank_transactions();
        assert!(tokenizer.tokenize("", 9).unwrap().is_empty());
    }
}
