//! Number and timestamp formatting for the rendered table.
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Timestamp layout used in the "Last Updated" line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Decimals kept for prices of at least one dollar.
const PRICE_DP: u32 = 2;
/// Decimals kept for sub-dollar prices before trimming trailing zeros.
const SMALL_PRICE_DP: u32 = 6;

/// Formats a USD price as `$65,000.40`.
///
/// Prices below one dollar keep up to six decimals so small caps stay readable.
pub fn format_usd(price: Decimal) -> String {
    let magnitude = price.abs();
    let text = if magnitude >= Decimal::ONE {
        fixed(magnitude, PRICE_DP)
    } else {
        let mut text = fixed(magnitude, SMALL_PRICE_DP);
        while text.ends_with('0') && decimals(&text) > PRICE_DP as usize {
            text.pop();
        }
        text
    };
    let sign = if price.is_sign_negative() && !price.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(&text))
}

/// Formats a percentage change as `+3.20%` / `-1.05%`.
pub fn format_change(change: Decimal) -> String {
    let text = fixed(change.abs(), PRICE_DP);
    if change.is_sign_negative() && text != "0.00" {
        format!("-{text}%")
    } else {
        format!("+{text}%")
    }
}

/// Formats the run timestamp for the document.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Rounds half away from zero and pads to exactly `dp` decimals.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

fn decimals(text: &str) -> usize {
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

/// Inserts comma separators into the integer part of an unsigned number.
fn group_thousands(text: &str) -> String {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text, None),
    };
    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
