//! Run configuration.
//!
//! `Settings` is built once at startup and passed by reference into every
//! operation. Values are layered: built-in defaults, then an optional JSON
//! config file, then `PRICE_UPDATER_*` environment variables, then CLI flags
//! (applied by the binary).
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as config_config, File as config_file, FileFormat};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::alert::AlertRule;
use crate::coins::{push_unique, CoinId, CoinParser};
use crate::error::PriceError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::patcher::{DocumentMarkers, MissingMarkerPolicy};

/// Config file picked up from the working directory when present.
pub const CONFIG_PATH: &str = "price_updater.json";

/// Default price endpoint.
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

const PRICE_UPDATER_COINS: &str = "PRICE_UPDATER_COINS";
const PRICE_UPDATER_DOCUMENT: &str = "PRICE_UPDATER_DOCUMENT";
const PRICE_UPDATER_HISTORY: &str = "PRICE_UPDATER_HISTORY";
const PRICE_UPDATER_API_URL: &str = "PRICE_UPDATER_API_URL";
const PRICE_UPDATER_TIMEOUT_SECS: &str = "PRICE_UPDATER_TIMEOUT_SECS";

/// Everything a run needs to know.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Coins to fetch and render, in table order.
    pub coins: Vec<CoinId>,
    /// Price endpoint URL.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Markdown document to patch.
    pub document_path: PathBuf,
    /// History file; `None` disables history.
    pub history_path: Option<PathBuf>,
    /// Entries kept per coin in the history file.
    pub history_limit: usize,
    /// Markers delimiting the owned region of the document.
    pub markers: DocumentMarkers,
    /// Heading written above an appended section.
    pub section_heading: String,
    /// What to do when the document has no markers.
    pub missing_markers: MissingMarkerPolicy,
    /// Alert thresholds by coin.
    pub alerts: HashMap<CoinId, AlertRule>,
}

impl Default for Settings {
    fn default() -> Self {
        let coins = ["bitcoin", "ethereum", "litecoin"]
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect();
        Settings {
            coins,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            document_path: PathBuf::from("README.md"),
            history_path: Some(PathBuf::from("price_history.json")),
            history_limit: DEFAULT_HISTORY_LIMIT,
            markers: DocumentMarkers::default(),
            section_heading: "## Crypto Prices".to_string(),
            missing_markers: MissingMarkerPolicy::default(),
            alerts: HashMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from `price_updater.json` when it exists,
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, PriceError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No {} found, using built-in defaults", CONFIG_PATH);
                    Self::default()
                }
            }
        };
        settings.override_with(|key| std::env::var(key).ok())
    }

    /// Reads a JSON config file; fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, PriceError> {
        let settings: Settings = config_config::builder()
            .add_source(config_file::from(path).format(FileFormat::Json))
            .build()?
            .try_deserialize()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Applies `PRICE_UPDATER_*` overrides looked up through `lookup`.
    pub fn override_with<F>(mut self, lookup: F) -> Result<Self, PriceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(coins) = lookup(PRICE_UPDATER_COINS) {
            self.coins = CoinId::parse_list(&coins)?;
        }

        if let Some(document) = lookup(PRICE_UPDATER_DOCUMENT) {
            self.document_path = PathBuf::from(document);
        }

        if let Some(history) = lookup(PRICE_UPDATER_HISTORY) {
            self.history_path = if history.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(history))
            };
        }

        if let Some(url) = lookup(PRICE_UPDATER_API_URL) {
            self.api_url = url;
        }

        if let Some(timeout) = lookup(PRICE_UPDATER_TIMEOUT_SECS) {
            self.timeout_secs = timeout.trim().parse().map_err(|e| {
                PriceError::Config(format!("{PRICE_UPDATER_TIMEOUT_SECS}={timeout}: {e}"))
            })?;
        }

        Ok(self)
    }

    /// De-duplicates the coin list and checks the settings are usable.
    pub fn validated(mut self) -> Result<Self, PriceError> {
        let mut coins = Vec::with_capacity(self.coins.len());
        for coin in self.coins.drain(..) {
            push_unique(&mut coins, coin);
        }
        self.coins = coins;

        if self.coins.is_empty() {
            return Err(PriceError::Config("coin list is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(PriceError::Config("timeout_secs must be positive".to_string()));
        }
        if self.history_limit == 0 {
            return Err(PriceError::Config("history_limit must be positive".to_string()));
        }

        let DocumentMarkers { start, end } = &self.markers;
        if start.trim().is_empty() || end.trim().is_empty() {
            return Err(PriceError::Config("document markers must not be empty".to_string()));
        }
        if start.contains('\n') || end.contains('\n') {
            return Err(PriceError::Config(
                "document markers must be single lines".to_string(),
            ));
        }
        if start.contains(end.as_str()) || end.contains(start.as_str()) {
            return Err(PriceError::Config(
                "document markers must be distinct and not contain each other".to_string(),
            ));
        }
        Ok(self)
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
