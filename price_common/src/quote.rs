//! Quote payloads returned by the price source.
//!
//! The price endpoint answers with a JSON object keyed by coin id:
//! `{"bitcoin": {"usd": 65000.4, "usd_24h_change": 3.2}}`. Both fields are
//! decoded as optional decimals since the source omits or nulls them for coins
//! it has no data for.
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coins::CoinId;
use crate::error::PriceError;

/// Price data for one coin as sent by the price source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Spot price in USD.
    #[serde(default)]
    pub usd: Option<Decimal>,
    /// Percentage change over the last 24 hours.
    #[serde(default)]
    pub usd_24h_change: Option<Decimal>,
}

/// Response body of the price endpoint, keyed by coin id.
pub type QuoteMap = HashMap<String, RawQuote>;

/// Decodes a price endpoint body.
pub fn parse_quote_map(body: &[u8]) -> Result<QuoteMap, PriceError> {
    serde_json::from_slice(body)
        .map_err(|e| PriceError::Parse(format!("malformed price response: {e}")))
}

/// A single coin's quote at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Coin the quote belongs to.
    pub coin_id: CoinId,
    /// Spot price in USD, if the source knew it.
    pub price_usd: Option<Decimal>,
    /// 24 hour percentage change, if the source knew it.
    pub change_24h_pct: Option<Decimal>,
}

impl Quote {
    /// Looks `coin_id` up in `quotes`; a missing entry yields an empty quote.
    pub fn lookup(coin_id: &CoinId, quotes: &QuoteMap) -> Self {
        let raw = quotes.get(coin_id.as_str());
        Quote {
            coin_id: coin_id.clone(),
            price_usd: raw.and_then(|r| r.usd),
            change_24h_pct: raw.and_then(|r| r.usd_24h_change),
        }
    }
}
