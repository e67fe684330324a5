//! Exact decimal representation of a monetary amount.
//!
//! Amounts are parsed from their textual column value into a `rust_decimal`
//! and stored back as the same text, so no binary floating point rounding
//! happens between the input file and the sink.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A monetary amount with the scale it was written with.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use bank_batch_loader::Amount;
///
/// let amount = Amount::from_str("250.75").unwrap();
/// assert_eq!(amount.to_string(), "250.75");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero value, used when the amount column is absent.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Amount(value)
    }

    /// Returns the underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Accept exponent notation such as "1.5E2", which Decimal::from_str rejects.
        let decimal = match Decimal::from_str(trimmed) {
            Ok(d) => d,
            Err(e) if trimmed.contains(['e', 'E']) => {
                Decimal::from_scientific(trimmed).map_err(|_| e)?
            }
            Err(e) => return Err(e),
        };
        Ok(Amount(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Amount::from_str(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_keeps_written_scale() {
        let a = Amount::from_str("250.75").unwrap();
        assert_eq!(a.to_string(), "250.75");

        let a = Amount::from_str("  10.500 ").unwrap();
        assert_eq!(a.to_string(), "10.500");
    }

    #[test]
    fn test_no_float_rounding() {
        let a = Amount::from_str("0.1").unwrap();
        let b = Amount::from_str("0.2").unwrap();
        assert_eq!(
            Amount::new(a.as_decimal() + b.as_decimal()),
            Amount::from_str("0.3").unwrap()
        );
    }

    #[test]
    fn test_negative_and_scientific() {
        assert_eq!(Amount::from_str("-42.10").unwrap().to_string(), "-42.10");
        assert_eq!(
            Amount::from_str("1.5E2").unwrap().as_decimal(),
            Decimal::from(150)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_zero_constant() {
        assert!(Amount::ZERO.is_zero());
    }
}
