//! Signal generation — scores several indicators at one date into a
//! BUY/SELL/NEUTRAL recommendation with a human-readable rationale.
//!
//! The scoring is a mean-reversion heuristic: price stretched above its
//! average, rising, or pressing the top of its range tilts toward SELL, and
//! the mirror image tilts toward BUY. The confidence figure is a linear
//! function of the score, not a calibrated probability.

pub mod config;
pub mod generator;

pub use config::SignalConfig;
pub use generator::SignalGenerator;

use crate::currency::PriceConversion;
use crate::indicators::VolumeClass;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDateFormat { input: String },

    #[error("date {requested} is out of range; closest available trading day is {closest}")]
    DateOutOfRange {
        requested: NaiveDate,
        closest: NaiveDate,
    },

    #[error("insufficient history at {date}: need {required} prior bars, found {available}")]
    InsufficientHistory {
        date: NaiveDate,
        required: usize,
        available: usize,
    },

    #[error("no price data for '{symbol}'")]
    NoData { symbol: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Neutral,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY SIGNAL",
            Recommendation::Sell => "SELL SIGNAL",
            Recommendation::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the recommendation agreed with the realized move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Correct,
    Wrong,
}

/// Realized return `lookahead_days` bars after the signal date.
///
/// `outcome` is only judged when the move exceeds the configured minimum;
/// smaller moves are noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HindsightCheck {
    pub lookahead_days: usize,
    pub future_date: NaiveDate,
    pub future_price: f64,
    pub future_return_pct: f64,
    pub outcome: Option<CallOutcome>,
}

/// Everything the generator concluded for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub requested_date: NaiveDate,
    pub target_date: NaiveDate,
    pub price: f64,
    pub sma: f64,
    pub sma_deviation_pct: f64,
    pub trend_slope: f64,
    pub support: f64,
    pub resistance: f64,
    pub range_position: f64,
    pub volume_class: Option<VolumeClass>,
    /// Rationale lines in evaluation order.
    pub signals: Vec<String>,
    pub score: i32,
    pub recommendation: Recommendation,
    pub confidence_pct: u32,
    pub conversion: PriceConversion,
    pub hindsight: Option<HindsightCheck>,
}

impl SignalResult {
    /// True when the requested date was not a trading day and was snapped.
    pub fn was_snapped(&self) -> bool {
        self.requested_date != self.target_date
    }

    /// Coarse confidence bucket: High / Medium for actionable calls, Low otherwise.
    pub fn confidence_label(&self) -> &'static str {
        match self.recommendation {
            Recommendation::Neutral => "Low",
            _ if self.score.unsigned_abs() >= 3 => "High",
            _ => "Medium",
        }
    }
}
