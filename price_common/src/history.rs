//! Rolling per-coin price history persisted as a small JSON file.
//!
//! The whole file is loaded into memory, updated and rewritten in full; each
//! coin keeps at most `limit` entries, oldest first.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coins::CoinId;
use crate::error::PriceError;
use crate::normalizer::DisplayRecord;

/// Default number of entries kept per coin.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One observed price for a coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the price was fetched.
    pub timestamp: DateTime<Utc>,
    /// Spot price in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// 24 hour percentage change at fetch time.
    #[serde(with = "rust_decimal::serde::float")]
    pub change_24h: Decimal,
}

/// Mapping from coin id to its entries, oldest to newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistory {
    coins: BTreeMap<CoinId, Vec<HistoryEntry>>,
}

impl PriceHistory {
    /// Loads the history file; a missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self, PriceError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(PriceError::file(path, e)),
        }
    }

    /// Parses a history document. Blank text is an empty history.
    pub fn from_json(text: &str) -> Result<Self, PriceError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
            .map_err(|e| PriceError::Parse(format!("malformed history file: {e}")))
    }

    /// Serializes the full history, pretty printed with a trailing newline.
    pub fn to_json(&self) -> Result<String, PriceError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Appends `entry` for `coin`, first dropping the oldest entries so that at
    /// most `limit` remain afterwards.
    pub fn record(&mut self, coin: &CoinId, entry: HistoryEntry, limit: usize) {
        let entries = self.coins.entry(coin.clone()).or_default();
        let keep = limit.saturating_sub(1);
        if entries.len() > keep {
            let excess = entries.len() - keep;
            entries.drain(..excess);
        }
        if limit > 0 {
            entries.push(entry);
        }
    }

    /// Records every available record that has both a price and a change.
    ///
    /// Returns how many entries were appended.
    pub fn record_all(
        &mut self,
        records: &[DisplayRecord],
        at: DateTime<Utc>,
        limit: usize,
    ) -> usize {
        let mut recorded = 0;
        for record in records {
            let (Some(price), Some(change_24h)) = (record.price, record.change_24h) else {
                debug!("Skipping history for {}: incomplete quote", record.coin_id);
                continue;
            };
            self.record(
                &record.coin_id,
                HistoryEntry {
                    timestamp: at,
                    price,
                    change_24h,
                },
                limit,
            );
            recorded += 1;
        }
        recorded
    }

    /// Entries for `coin`, oldest first.
    pub fn entries(&self, coin: &CoinId) -> &[HistoryEntry] {
        self.coins.get(coin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of coins with at least one entry slot.
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Whether no coin has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}
