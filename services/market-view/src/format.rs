//! Currency formatting for feedback overlays
//!
//! Pure display helpers, no side effects. Amounts are grouped with `.`
//! thousands separators and `,` decimals (the game's locale); decimals are
//! shown only when the amount is fractional. Compact notation keeps the
//! plain `.` decimal of its source formatter.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const THOUSAND: u128 = 1_000;
const MILLION: u128 = 1_000_000;
const BILLION: u128 = 1_000_000_000;

/// Format an amount as display currency, e.g. `12.345` or `12.345,67`.
pub fn format_currency(amount: Decimal) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let abs = amount.abs();
    let show_decimals = abs.fract() != Decimal::ZERO;

    let rounded = abs.round_dp(2);
    let int_part = rounded.trunc();
    let grouped = group_thousands(&int_part.normalize().to_string());

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);

    if show_decimals {
        let cents = (rounded.fract() * Decimal::from(100))
            .round()
            .to_u32()
            .unwrap_or(0);
        out.push(',');
        out.push_str(&format!("{:02}", cents));
    }

    out
}

/// Format large amounts compactly: `1.5K`, `2.3M`, `4B`.
///
/// Amounts below one thousand fall back to [`format_currency`].
pub fn format_compact(amount: Decimal) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let abs = amount.abs();

    let suffix_scale = [
        (Decimal::from(BILLION), "B"),
        (Decimal::from(MILLION), "M"),
        (Decimal::from(THOUSAND), "K"),
    ]
    .into_iter()
    .find(|(threshold, _)| abs >= *threshold);

    let Some((divisor, suffix)) = suffix_scale else {
        return format_currency(amount);
    };

    let scaled = (abs / divisor).round_dp(1).normalize();
    let sign = if negative { "-" } else { "" };
    format!("{sign}{scaled}{suffix}")
}

/// Insert `.` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(*ch);
    }
    out
}
