//! Indicator library — pure, stateless functions over price arrays.
//!
//! Series-valued indicators return a `Vec<f64>` aligned with the input, with
//! `f64::NAN` where the value is undefined (warmup). Scalar helpers
//! (`trend_slope`, `range_position`, `volume_ratio_class`) operate on a
//! caller-chosen window.

pub mod range;
pub mod returns;
pub mod sma;
pub mod trend;
pub mod volume;

pub use range::range_position;
pub use returns::daily_returns;
pub use sma::{sma, sma_at, Sma, SmaPolicy};
pub use trend::trend_slope;
pub use volume::{classify_volume_with, volume_ratio_class, VolumeClass};

use crate::domain::Bar;

/// Trait for bar-series indicators.
///
/// Implementations produce an output series of the same length as `bars`.
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of bars before the first defined value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: Some(1000),
            }
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
