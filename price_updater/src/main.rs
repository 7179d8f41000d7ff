//! Price Updater — fetches cryptocurrency prices and rewrites the price section
//! of a Markdown document, keeping a small rolling price history on the side.
//!
//! Usage example (CLI):
//! ```bash
//! price_updater --document README.md --coins bitcoin,ethereum,litecoin
//! ```
//!
//! The document must contain the configured start and end markers (by default
//! `<!-- CRYPTO-PRICES:START -->` / `<!-- CRYPTO-PRICES:END -->`); everything
//! between them is owned by the updater. With the default `append` policy a
//! document without markers gets a new section at its end. See
//! `price_common::settings` for the config file and environment variables.
#![warn(missing_docs)]
mod args;
mod fetcher;

use std::fs::File;
use std::io::BufReader;
use std::process;

use chrono::Utc;
use clap::Parser;
use log::{error, info, warn};
use price_common::coins::{CoinId, CoinParser};
use price_common::render::render_summary;
use price_common::update::{plan_update, run_update};
use price_common::{PriceError, Result, Settings};

use crate::args::Args;
use crate::fetcher::CoinGeckoSource;

fn main() {
    init_logger();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("Error updating prices: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let settings = apply_args(Settings::load(args.config.as_deref())?, args)?.validated()?;
    info!(
        "Updating {} for {} coins",
        settings.document_path.display(),
        settings.coins.len()
    );

    let source = CoinGeckoSource::new(&settings.api_url, settings.timeout())?;

    if args.dry_run {
        let plan = plan_update(&settings, &source, Utc::now())?;
        info!("Dry run: {} left untouched", settings.document_path.display());
        print!("{}", plan.document.contents);
        return Ok(());
    }

    let plan = run_update(&settings, &source, Utc::now())?;
    if !plan.document_changed {
        info!("Document already up to date");
    }
    if plan.unavailable_count() > 0 {
        warn!("{} coin(s) had no price data", plan.unavailable_count());
    }
    info!("Updated prices: {}", render_summary(&plan.records));
    for alert in &plan.alerts {
        println!("ALERT {}", alert);
    }
    Ok(())
}

/// Layers command-line flags over the loaded settings.
fn apply_args(mut settings: Settings, args: &Args) -> Result<Settings> {
    if let Some(document) = &args.document {
        settings.document_path = document.clone();
    }

    if args.no_history {
        settings.history_path = None;
    } else if let Some(history) = &args.history {
        settings.history_path = Some(history.clone());
    }

    if let Some(coins) = &args.coins {
        settings.coins = CoinId::parse_list(coins)?;
    } else if let Some(path) = &args.coins_file {
        let file = File::open(path).map_err(|e| PriceError::file(path, e))?;
        settings.coins = CoinId::parse_from_file(BufReader::new(file))?;
        info!("Coins from {}: {:?}", path.display(), settings.coins);
    }

    Ok(settings)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
