//!
//! Core of the crypto price updater, shared with the `price_updater` binary.
//!
//! This crate aggregates:
//! - `error` — unified error type `PriceError` used across the workspace.
//! - `result` — handy `Result<T, PriceError>` alias.
//! - `coins` — coin ids, display names and coin-list parsing.
//! - `quote` — price endpoint payloads.
//! - `trend` — 24h change buckets.
//! - `normalizer` — quote map to ordered display records.
//! - `format` / `render` — number formatting and the Markdown table.
//! - `patcher` — marker-delimited document patching.
//! - `history` — rolling per-coin price history file.
//! - `alert` — per-coin thresholds.
//! - `settings` — run configuration.
//! - `source` — the `PriceSource` seam implemented by the binary.
//! - `update` — the end-to-end run.
#![warn(missing_docs)]
pub mod alert;
pub mod coins;
pub mod error;
pub mod format;
pub mod history;
pub mod normalizer;
pub mod patcher;
pub mod quote;
pub mod render;
pub mod result;
pub mod settings;
pub mod source;
pub mod trend;
pub mod update;

pub use error::PriceError;
pub use result::Result;
pub use settings::Settings;
pub use source::PriceSource;
