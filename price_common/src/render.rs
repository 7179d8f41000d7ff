//! Markdown rendering of the price table block.
use chrono::{DateTime, Utc};

use crate::format::{format_change, format_timestamp, format_usd};
use crate::normalizer::DisplayRecord;

/// Cell text for rows the source had no data for.
pub const UNAVAILABLE: &str = "unavailable";
/// Cell text for values that are unknown on an otherwise available row.
pub const NOT_AVAILABLE: &str = "n/a";

const HEADER: &str = "| Coin | Price (USD) | 24h Change | Trend |";
const SEPARATOR: &str = "| ---- | ----------: | ---------: | ----- |";

/// Renders one table row.
pub fn render_row(record: &DisplayRecord) -> String {
    let price = record
        .price
        .map(format_usd)
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let change = record
        .change_24h
        .map(format_change)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let trend = record
        .trend
        .map(|t| format!("{} {}", t.symbol(), t))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!("| {} | {} | {} | {} |", record.name, price, change, trend)
}

/// Renders the block placed between the document markers.
///
/// The block has no leading or trailing newline; the patcher adds those.
pub fn render_table(records: &[DisplayRecord], updated_at: &DateTime<Utc>) -> String {
    let mut lines = Vec::with_capacity(records.len() + 4);
    lines.push(HEADER.to_string());
    lines.push(SEPARATOR.to_string());
    lines.extend(records.iter().map(render_row));
    lines.push(String::new());
    lines.push(format!("**Last Updated:** {}", format_timestamp(updated_at)));
    lines.join("\n")
}

/// One-line console summary, e.g. `Bitcoin=$65,000.40, Litecoin=unavailable`.
pub fn render_summary(records: &[DisplayRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let price = r
                .price
                .map(format_usd)
                .unwrap_or_else(|| UNAVAILABLE.to_string());
            format!("{}={}", r.name, price)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
