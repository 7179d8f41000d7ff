//! Price normalizer: raw quote map in, display records out.
//!
//! Every requested coin produces exactly one record, in request order. Coins the
//! source did not return become "unavailable" rows rather than errors.
use rust_decimal::Decimal;

use crate::coins::CoinId;
use crate::quote::{Quote, QuoteMap};
use crate::trend::TrendBucket;

/// Display-ready view of a single coin.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRecord {
    /// Coin the record describes.
    pub coin_id: CoinId,
    /// Name shown in the table.
    pub name: String,
    /// Spot price in USD; `None` renders as "unavailable".
    pub price: Option<Decimal>,
    /// 24 hour percentage change.
    pub change_24h: Option<Decimal>,
    /// Bucket of `change_24h`; only set when both price and change are known.
    pub trend: Option<TrendBucket>,
}

impl DisplayRecord {
    /// Builds the record for one quote.
    pub fn from_quote(quote: Quote) -> Self {
        let name = quote.coin_id.display_name();
        match quote.price_usd {
            Some(price) => DisplayRecord {
                coin_id: quote.coin_id,
                name,
                price: Some(price),
                change_24h: quote.change_24h_pct,
                trend: quote.change_24h_pct.map(TrendBucket::classify),
            },
            None => Self::unavailable(quote.coin_id),
        }
    }

    /// Sentinel record for a coin without price data.
    pub fn unavailable(coin_id: CoinId) -> Self {
        DisplayRecord {
            name: coin_id.display_name(),
            coin_id,
            price: None,
            change_24h: None,
            trend: None,
        }
    }

    /// Whether the source returned a price for this coin.
    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Turns the quote map into one record per requested coin, preserving order.
pub fn normalize(coins: &[CoinId], quotes: &QuoteMap) -> Vec<DisplayRecord> {
    coins
        .iter()
        .map(|coin| DisplayRecord::from_quote(Quote::lookup(coin, quotes)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::quote::RawQuote;

    fn coins(ids: &[&str]) -> Vec<CoinId> {
        ids.iter().map(|id| id.parse().unwrap()).collect()
    }

    fn quote(usd: Option<Decimal>, change: Option<Decimal>) -> RawQuote {
        RawQuote {
            usd,
            usd_24h_change: change,
        }
    }

    #[test]
    fn output_matches_requested_order_and_length() {
        let mut quotes = QuoteMap::new();
        quotes.insert("bitcoin".into(), quote(Some(dec!(65000.4)), Some(dec!(3.2))));
        quotes.insert("ethereum".into(), quote(Some(dec!(3100)), Some(dec!(-6))));
        quotes.insert("solana".into(), quote(Some(dec!(150)), Some(dec!(1))));

        let requested = coins(&["ethereum", "dogecoin", "bitcoin"]);
        let records = normalize(&requested, &quotes);

        assert_eq!(records.len(), requested.len());
        let order: Vec<&CoinId> = records.iter().map(|r| &r.coin_id).collect();
        assert_eq!(order, requested.iter().collect::<Vec<_>>());
    }

    #[test]
    fn missing_coin_is_unavailable() {
        let records = normalize(&coins(&["litecoin"]), &QuoteMap::new());
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_available());
        assert_eq!(records[0].name, "Litecoin");
        assert_eq!(records[0].trend, None);
    }

    #[test]
    fn entry_without_price_is_unavailable_even_with_change() {
        let mut quotes = QuoteMap::new();
        quotes.insert("bitcoin".into(), quote(None, Some(dec!(2))));
        let record = &normalize(&coins(&["bitcoin"]), &quotes)[0];
        assert!(!record.is_available());
        assert_eq!(record.change_24h, None);
    }

    #[test]
    fn price_without_change_has_no_trend() {
        let mut quotes = QuoteMap::new();
        quotes.insert("bitcoin".into(), quote(Some(dec!(1)), None));
        let record = &normalize(&coins(&["bitcoin"]), &quotes)[0];
        assert!(record.is_available());
        assert_eq!(record.trend, None);
    }

    #[test]
    fn trend_is_classified_from_change() {
        let mut quotes = QuoteMap::new();
        quotes.insert("bitcoin".into(), quote(Some(dec!(65000.4)), Some(dec!(3.2))));
        quotes.insert("ethereum".into(), quote(Some(dec!(3000)), Some(dec!(-5))));
        let records = normalize(&coins(&["bitcoin", "ethereum"]), &quotes);
        assert_eq!(records[0].trend, Some(TrendBucket::Up));
        assert_eq!(records[1].trend, Some(TrendBucket::Down));
    }

    #[test]
    fn empty_request_gives_empty_output() {
        let mut quotes = QuoteMap::new();
        quotes.insert("bitcoin".into(), quote(Some(dec!(1)), None));
        assert!(normalize(&[], &quotes).is_empty());
    }
}
