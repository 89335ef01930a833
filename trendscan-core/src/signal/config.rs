//! Signal generator parameters: windows, thresholds and score weights.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Tunable knobs for [`SignalGenerator`](super::SignalGenerator).
///
/// Every field has a default, so a TOML `[signal]` table only needs the
/// values being overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// SMA window in bars.
    pub sma_window: usize,
    /// Bars behind the target date used for the trend fit (fit uses lookback + 1 closes).
    pub lookback_days: usize,
    /// Bars ahead of the target date for the hindsight check.
    pub lookahead_days: usize,
    /// Bars behind the target date spanning the support/resistance range.
    pub support_resistance_window: usize,
    /// Bars (including the target date) in the volume average.
    pub volume_window: usize,
    /// Maximum calendar distance when snapping a non-trading date.
    pub max_snap_days: i64,

    /// Percent distance from the SMA that counts as stretched.
    pub sma_deviation_pct: f64,
    pub resistance_position: f64,
    pub support_position: f64,
    pub high_volume_ratio: f64,
    pub low_volume_ratio: f64,

    pub sma_weight: i32,
    pub trend_weight: i32,
    pub range_weight: i32,
    pub buy_threshold: i32,
    pub sell_threshold: i32,
    pub confidence_step_pct: u32,

    /// Minimum absolute future move (percent) before a call is judged.
    pub hindsight_min_move_pct: f64,
    pub native_currency: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sma_window: 20,
            lookback_days: 5,
            lookahead_days: 10,
            support_resistance_window: 30,
            volume_window: 20,
            max_snap_days: 7,
            sma_deviation_pct: 2.0,
            resistance_position: 0.8,
            support_position: 0.2,
            high_volume_ratio: 1.5,
            low_volume_ratio: 0.5,
            sma_weight: 2,
            trend_weight: 1,
            range_weight: 1,
            buy_threshold: 2,
            sell_threshold: -2,
            confidence_step_pct: 25,
            hindsight_min_move_pct: 2.0,
            native_currency: "USD".to_string(),
        }
    }
}

impl SignalConfig {
    /// Bars required before the target date.
    pub fn min_history(&self) -> usize {
        self.sma_window.max(self.lookback_days)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sma_window == 0 {
            return Err(ConfigError::Invalid("signal.sma_window must be >= 1".into()));
        }
        if self.volume_window == 0 {
            return Err(ConfigError::Invalid("signal.volume_window must be >= 1".into()));
        }
        if self.max_snap_days < 0 {
            return Err(ConfigError::Invalid("signal.max_snap_days must be >= 0".into()));
        }
        if self.buy_threshold <= self.sell_threshold {
            return Err(ConfigError::Invalid(format!(
                "signal.buy_threshold ({}) must be greater than signal.sell_threshold ({})",
                self.buy_threshold, self.sell_threshold
            )));
        }
        if self.support_position >= self.resistance_position {
            return Err(ConfigError::Invalid(format!(
                "signal.support_position ({}) must be below signal.resistance_position ({})",
                self.support_position, self.resistance_position
            )));
        }
        if self.native_currency.trim().is_empty() {
            return Err(ConfigError::Invalid("signal.native_currency must not be empty".into()));
        }
        Ok(())
    }
}
