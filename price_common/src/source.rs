//! Seam between the updater pipeline and whatever serves prices.
use crate::coins::CoinId;
use crate::quote::QuoteMap;
use crate::result::Result;

/// Something that can fetch current quotes for a set of coins.
///
/// Implementations map transport failures to `PriceError::Network` and
/// undecodable bodies to `PriceError::Parse`. Coins the source does not know
/// are simply absent from the returned map.
pub trait PriceSource {
    /// Fetches USD price and 24 hour change for `coins`.
    fn fetch_quotes(&self, coins: &[CoinId]) -> Result<QuoteMap>;
}
