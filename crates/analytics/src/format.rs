//! Number formatting for insight text.
//!
//! Kept apart from the aggregation code so the rendering rules can be tested
//! (and localised) on their own:
//!
//! - currency amounts are truncated toward zero, never rounded;
//! - digits are grouped in threes with `,`, the sign stays in front;
//! - percentages are rounded half-to-even and always carry two decimals.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::report::round2;

/// Drops the fractional part, rounding toward zero.
pub fn truncate_to_int(amount: Decimal) -> i128 {
    // Every Decimal integer fits comfortably in an i128.
    amount.trunc().to_i128().unwrap_or_default()
}

/// `1234567` → `"1,234,567"`, `-1234` → `"-1,234"`.
pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Currency symbol followed by the truncated, grouped amount: `₹12,345`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    format!("{}{}", symbol, group_thousands(truncate_to_int(amount)))
}

/// Two-decimal rendering of a percentage value, without the `%` sign.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}
