//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! Strict policy: first defined value at index window-1.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::Bar;

/// Treatment of indices with fewer than `window` points behind them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmaPolicy {
    /// Undefined (`NaN`) until a full window is available.
    #[default]
    Strict,
    /// Mean of however many points are available (at least one).
    Permissive,
}

/// Rolling SMA over `closes`.
///
/// # Panics
/// If `window` is zero.
pub fn sma(closes: &[f64], window: usize, policy: SmaPolicy) -> Vec<f64> {
    assert!(window >= 1, "SMA window must be >= 1");
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    let mut sum = 0.0;

    for i in 0..n {
        sum += closes[i];
        if i >= window {
            sum -= closes[i - window];
        }
        let count = (i + 1).min(window);
        if count == window || policy == SmaPolicy::Permissive {
            result[i] = sum / count as f64;
        }
    }

    result
}

/// Strict SMA at a single index; `None` when the window does not fit.
pub fn sma_at(closes: &[f64], window: usize, index: usize) -> Option<f64> {
    if window == 0 || index >= closes.len() || index + 1 < window {
        return None;
    }
    let slice = &closes[index + 1 - window..=index];
    Some(slice.iter().sum::<f64>() / window as f64)
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    policy: SmaPolicy,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self::with_policy(period, SmaPolicy::Strict)
    }

    pub fn with_policy(period: usize, policy: SmaPolicy) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            policy,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.policy {
            SmaPolicy::Strict => self.period.saturating_sub(1),
            SmaPolicy::Permissive => 0,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma(&closes, self.period, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_3_on_one_to_five() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, SmaPolicy::Strict);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn permissive_fills_warmup_with_partial_means() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, SmaPolicy::Permissive);
        assert_approx(result[0], 1.0, DEFAULT_EPSILON);
        assert_approx(result[1], 1.5, DEFAULT_EPSILON);
        assert_approx(result[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_5_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5).compute(&bars);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().enumerate().take(4) {
            assert!(value.is_nan(), "expected NaN at index {i}");
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let result = sma(&[100.0, 200.0, 300.0], 1, SmaPolicy::Strict);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_at_matches_series() {
        let closes = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let series = sma(&closes, 4, SmaPolicy::Strict);
        for i in 3..closes.len() {
            assert_approx(sma_at(&closes, 4, i).unwrap(), series[i], 1e-9);
        }
        assert_eq!(sma_at(&closes, 4, 2), None);
        assert_eq!(sma_at(&closes, 4, 8), None);
        assert_eq!(sma_at(&closes, 0, 5), None);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
        assert_eq!(Sma::with_policy(20, SmaPolicy::Permissive).lookback(), 0);
        assert_eq!(Sma::new(20).name(), "sma_20");
    }

    #[test]
    fn sma_too_few_bars() {
        let result = sma(&[10.0, 11.0], 5, SmaPolicy::Strict);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
