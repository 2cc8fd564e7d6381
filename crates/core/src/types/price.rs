//! Price display helpers using decimal arithmetic.
//!
//! All storefront prices are Norwegian kroner; amounts are carried as
//! [`rust_decimal::Decimal`] and formatted in the `no-NO` style the shop UI
//! uses (space-grouped thousands, comma decimals): `1 450 kr`, `890,50 kr`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Format a kroner amount for display, e.g. `1 450 kr`.
///
/// Whole amounts render without decimals; fractional amounts render with two
/// (øre), rounded to the nearest øre.
#[must_use]
pub fn format_nok(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let whole = group_thousands(&rounded.trunc().abs().to_string());
    let frac = rounded.fract().abs();

    if frac.is_zero() {
        format!("{sign}{whole} kr")
    } else {
        let oere = (frac * Decimal::from(100)).round().to_u32().unwrap_or(0);
        format!("{sign}{whole},{oere:02} kr")
    }
}

/// Insert a space every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let mut remaining = digits.len();
    for ch in digits.chars() {
        grouped.push(ch);
        remaining -= 1;
        if remaining > 0 && remaining.is_multiple_of(3) {
            grouped.push(' ');
        }
    }
    grouped
}
