//! Coin identifiers and coin-list parsing.
//!
//! Coins are addressed by their price-source id (`bitcoin`, `usd-coin`, ...). A
//! handful of well-known ids carry a proper display name; any other id is shown
//! title-cased.
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::PriceError;

/// Validated, lowercase price-source coin id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoinId(String);

impl CoinId {
    /// Returns the raw id as sent to the price source.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable name used in the rendered table.
    pub fn display_name(&self) -> String {
        match KnownCoin::from_str(&self.0) {
            Ok(known) => known.to_string(),
            Err(_) => title_case(&self.0),
        }
    }
}

impl FromStr for CoinId {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let id = raw.trim().to_ascii_lowercase();
        if id.is_empty() {
            return Err(PriceError::ParseCoinsFile("empty coin id".to_string()));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(PriceError::ParseCoinsFile(format!("invalid coin id: {raw}")));
        }
        Ok(CoinId(id))
    }
}

impl TryFrom<String> for CoinId {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CoinId> for String {
    fn from(value: CoinId) -> Self {
        value.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coins with a display name that title-casing would get wrong or ugly.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum KnownCoin {
    #[strum(serialize = "bitcoin", to_string = "Bitcoin")]
    Bitcoin,
    #[strum(serialize = "ethereum", to_string = "Ethereum")]
    Ethereum,
    #[strum(serialize = "litecoin", to_string = "Litecoin")]
    Litecoin,
    #[strum(serialize = "solana", to_string = "Solana")]
    Solana,
    #[strum(serialize = "dogecoin", to_string = "Dogecoin")]
    Dogecoin,
    #[strum(serialize = "ripple", to_string = "XRP")]
    Ripple,
    #[strum(serialize = "cardano", to_string = "Cardano")]
    Cardano,
    #[strum(serialize = "binancecoin", to_string = "BNB")]
    BinanceCoin,
    #[strum(serialize = "tether", to_string = "Tether")]
    Tether,
    #[strum(serialize = "usd-coin", to_string = "USD Coin")]
    UsdCoin,
    #[strum(serialize = "polkadot", to_string = "Polkadot")]
    Polkadot,
    #[strum(serialize = "tron", to_string = "TRON")]
    Tron,
}

fn title_case(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trait providing coin-list parsing from text sources.
pub trait CoinParser {
    /// Parses coin ids from a buffered reader.
    ///
    /// Ids may be separated by commas, whitespace or new lines. Blank lines and
    /// everything after a `#` are ignored. Duplicates are dropped, keeping the
    /// first occurrence.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<CoinId>, PriceError>;

    /// Parses a comma separated list such as `bitcoin,ethereum`.
    fn parse_list(text: &str) -> Result<Vec<CoinId>, PriceError>;
}

impl CoinParser for CoinId {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, PriceError> {
        let mut coins = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(PriceError::Io)?;
            let content = match line.split_once('#') {
                Some((before, _)) => before,
                None => line.as_str(),
            };
            for token in content.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                push_unique(&mut coins, token.parse()?);
            }
        }
        Ok(coins)
    }

    fn parse_list(text: &str) -> Result<Vec<Self>, PriceError> {
        let mut coins = Vec::new();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            push_unique(&mut coins, token.parse()?);
        }
        Ok(coins)
    }
}

/// Appends `coin` unless it is already present, preserving first-seen order.
pub fn push_unique(coins: &mut Vec<CoinId>, coin: CoinId) {
    if !coins.contains(&coin) {
        coins.push(coin);
    }
}
