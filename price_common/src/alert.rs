//! Per-coin price and change alerts.
//!
//! Every coin shares one threshold schema. Alerts are informational: they are
//! logged and reported in the run summary but never fail a run.
use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::coins::CoinId;
use crate::format::{format_change, format_usd};
use crate::normalizer::DisplayRecord;

/// Thresholds for a single coin. Unset thresholds never fire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertRule {
    /// Fires when the price is strictly above this value.
    pub price_above: Option<Decimal>,
    /// Fires when the price is strictly below this value.
    pub price_below: Option<Decimal>,
    /// Fires when the 24h change is strictly above this percentage.
    pub change_24h_above: Option<Decimal>,
    /// Fires when the 24h change is strictly below this percentage.
    pub change_24h_below: Option<Decimal>,
}

/// Which threshold fired.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
    PriceAbove,
    PriceBelow,
    #[strum(serialize = "change_24h_above")]
    Change24hAbove,
    #[strum(serialize = "change_24h_below")]
    Change24hBelow,
}

impl AlertKind {
    fn is_price(&self) -> bool {
        matches!(self, AlertKind::PriceAbove | AlertKind::PriceBelow)
    }
}

/// A threshold crossed by a fetched quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Coin that crossed the threshold.
    pub coin_id: CoinId,
    /// Name shown to the user.
    pub name: String,
    /// Threshold that fired.
    pub kind: AlertKind,
    /// Configured threshold value.
    pub threshold: Decimal,
    /// Observed price or change.
    pub observed: Decimal,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (observed, threshold) = if self.kind.is_price() {
            (format_usd(self.observed), format_usd(self.threshold))
        } else {
            (format_change(self.observed), format_change(self.threshold))
        };
        write!(
            f,
            "{} {}: {} (threshold {})",
            self.name, self.kind, observed, threshold
        )
    }
}

impl AlertRule {
    /// Checks one record against this rule.
    pub fn evaluate(&self, record: &DisplayRecord) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut check = |kind: AlertKind, observed: Option<Decimal>, threshold: Option<Decimal>| {
            let (Some(observed), Some(threshold)) = (observed, threshold) else {
                return;
            };
            let fired = match kind {
                AlertKind::PriceAbove | AlertKind::Change24hAbove => observed > threshold,
                AlertKind::PriceBelow | AlertKind::Change24hBelow => observed < threshold,
            };
            if fired {
                alerts.push(Alert {
                    coin_id: record.coin_id.clone(),
                    name: record.name.clone(),
                    kind,
                    threshold,
                    observed,
                });
            }
        };

        check(AlertKind::PriceAbove, record.price, self.price_above);
        check(AlertKind::PriceBelow, record.price, self.price_below);
        check(AlertKind::Change24hAbove, record.change_24h, self.change_24h_above);
        check(AlertKind::Change24hBelow, record.change_24h, self.change_24h_below);
        alerts
    }
}

/// Evaluates every available record that has a rule, in record order.
pub fn evaluate_alerts(
    records: &[DisplayRecord],
    rules: &HashMap<CoinId, AlertRule>,
) -> Vec<Alert> {
    records
        .iter()
        .filter(|r| r.is_available())
        .filter_map(|r| rules.get(&r.coin_id).map(|rule| rule.evaluate(r)))
        .flatten()
        .collect()
}
