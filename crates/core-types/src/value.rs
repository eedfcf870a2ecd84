use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dates::parse_date;

/// A single cell of a schema-less subscription record.
///
/// Records arrive as arbitrary JSON objects, so every field is kept in one of a
/// small closed set of kinds and converted on demand by the `to_*` coercions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Arrays and objects. Never numeric, never a date.
    Nested(serde_json::Value),
}

impl FieldValue {
    /// Numeric view of the value, or `None` when it cannot be read as a number.
    ///
    /// Text is trimmed and accepted in plain (`"12.50"`) or scientific (`"1e3"`)
    /// notation. Booleans count as 1 and 0. Values outside the exact decimal
    /// range are treated as non-numeric.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => parse_decimal(&n.to_string()),
            FieldValue::Text(s) => parse_decimal(s.trim()),
            FieldValue::Bool(true) => Some(Decimal::ONE),
            FieldValue::Bool(false) => Some(Decimal::ZERO),
            FieldValue::Null | FieldValue::Nested(_) => None,
        }
    }

    /// Numeric view with the coercion default applied: anything non-numeric is 0.
    pub fn to_decimal_or_zero(&self) -> Decimal {
        self.to_decimal().unwrap_or(Decimal::ZERO)
    }

    /// Calendar date view. Only text values are ever dates.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// True for text that is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => FieldValue::Number(n),
            serde_json::Value::String(s) => FieldValue::Text(s),
            nested => FieldValue::Nested(nested),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Nested(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn text_numbers_are_trimmed_and_parsed() {
        assert_eq!(FieldValue::from(" 100 ").to_decimal(), Some(dec!(100)));
        assert_eq!(FieldValue::from("12.50").to_decimal(), Some(dec!(12.50)));
        assert_eq!(FieldValue::from("-3").to_decimal(), Some(dec!(-3)));
        assert_eq!(FieldValue::from("1e3").to_decimal(), Some(dec!(1000)));
    }

    #[test]
    fn junk_coerces_to_zero() {
        for value in ["abc", "", "   ", "nan", "inf", "1,000"] {
            assert_eq!(FieldValue::from(value).to_decimal_or_zero(), Decimal::ZERO, "{value:?}");
        }
        assert_eq!(FieldValue::Null.to_decimal_or_zero(), Decimal::ZERO);
        assert_eq!(FieldValue::from(json!([1, 2])).to_decimal_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn json_numbers_and_bools_are_numeric() {
        assert_eq!(FieldValue::from(json!(42)).to_decimal(), Some(dec!(42)));
        assert_eq!(FieldValue::from(json!(99.5)).to_decimal(), Some(dec!(99.5)));
        assert_eq!(FieldValue::from(json!(true)).to_decimal(), Some(Decimal::ONE));
        assert_eq!(FieldValue::from(json!(false)).to_decimal(), Some(Decimal::ZERO));
    }

    #[test]
    fn only_whitespace_text_is_blank() {
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::from(" \t ").is_blank());
        assert!(!FieldValue::from("0").is_blank());
        assert!(!FieldValue::Null.is_blank());
        assert!(!FieldValue::from(json!(0)).is_blank());
    }

    #[test]
    fn dates_come_only_from_text() {
        assert_eq!(
            FieldValue::from("2024-03-09").to_date(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(FieldValue::from(json!(20240309)).to_date(), None);
        assert_eq!(FieldValue::from("not a date").to_date(), None);
    }

    #[test]
    fn deserializes_every_json_kind() {
        let values: Vec<FieldValue> =
            serde_json::from_value(json!([null, true, 7, "x", {"a": 1}])).unwrap();
        assert_eq!(values[0], FieldValue::Null);
        assert_eq!(values[1], FieldValue::Bool(true));
        assert_eq!(values[2], FieldValue::from(7i64));
        assert_eq!(values[3], FieldValue::from("x"));
        assert!(matches!(values[4], FieldValue::Nested(_)));
    }
}
