//! CoinGecko `simple/price` client.
//!
//! Implements `PriceSource` with a blocking `reqwest` client. One request per
//! run, bounded by the configured timeout and never retried.
use std::time::{Duration, Instant};

use log::{debug, error, info};
use price_common::coins::CoinId;
use price_common::quote::{parse_quote_map, QuoteMap};
use price_common::{PriceError, PriceSource, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

/// Quote currency requested from the endpoint.
const VS_CURRENCY: &str = "usd";

/// Blocking client for the CoinGecko price endpoint.
pub struct CoinGeckoSource {
    client: Client,
    url: String,
}

impl CoinGeckoSource {
    /// Builds a client for `url` whose requests give up after `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("price_updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PriceError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(CoinGeckoSource {
            client,
            url: url.to_string(),
        })
    }
}

/// Query parameters selecting `coins`, USD prices and the 24h change.
pub fn query_params(coins: &[CoinId]) -> Vec<(&'static str, String)> {
    let ids: Vec<&str> = coins.iter().map(CoinId::as_str).collect();
    vec![
        ("ids", ids.join(",")),
        ("vs_currencies", VS_CURRENCY.to_string()),
        ("include_24hr_change", "true".to_string()),
    ]
}

impl PriceSource for CoinGeckoSource {
    fn fetch_quotes(&self, coins: &[CoinId]) -> Result<QuoteMap> {
        let visit_log = format!("GET:{}", self.url);
        let start = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .query(&query_params(coins))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| {
                error!("{} failed because {:?}", visit_log, e);
                PriceError::Network(format!("request to {} failed: {}", self.url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Network(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let body = response.bytes().map_err(|e| {
            PriceError::Network(format!("reading response from {} failed: {}", self.url, e))
        })?;
        info!("{} {} ms", visit_log, start.elapsed().as_millis());
        debug!("Response body: {}", String::from_utf8_lossy(&body));

        parse_quote_map(&body)
    }
}
