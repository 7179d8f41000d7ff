//! Qualitative classification of the 24 hour price change.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Percentage beyond which a move counts as strong in either direction.
const STRONG_MOVE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// One of four buckets for the 24 hour percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TrendBucket {
    /// Change above +5%.
    StronglyUp,
    /// Change from 0% up to and including +5%.
    Up,
    /// Change from -5% inclusive up to 0% exclusive.
    Down,
    /// Change below -5%.
    StronglyDown,
}

impl TrendBucket {
    /// Buckets a 24 hour percentage change.
    ///
    /// Zero counts as `Up`; exactly +5 is `Up` and exactly -5 is `Down`.
    pub fn classify(change_pct: Decimal) -> Self {
        if change_pct > STRONG_MOVE_PCT {
            TrendBucket::StronglyUp
        } else if change_pct >= Decimal::ZERO {
            TrendBucket::Up
        } else if change_pct >= -STRONG_MOVE_PCT {
            TrendBucket::Down
        } else {
            TrendBucket::StronglyDown
        }
    }

    /// Glyph shown next to the bucket name in the table.
    pub fn symbol(&self) -> &'static str {
        match self {
            TrendBucket::StronglyUp => "🚀",
            TrendBucket::Up => "📈",
            TrendBucket::Down => "📉",
            TrendBucket::StronglyDown => "🔻",
        }
    }
}
