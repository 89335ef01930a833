//! Combined view of one series: streak statistics, an optional signal at a
//! target date, and the hindsight profit report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ConfigError};
use crate::currency::CurrencyRequest;
use crate::domain::PriceSeries;
use crate::profit::ProfitReport;
use crate::signal::{SignalError, SignalGenerator, SignalResult};
use crate::streaks::{detect_streaks, DatedStreak, Direction, FlatPolicy, StreakSummary};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub trading_days: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub flat_policy: FlatPolicy,
    pub streaks: StreakSummary,
    pub longest_up: Vec<DatedStreak>,
    pub longest_down: Vec<DatedStreak>,
    /// Present when a target date was given.
    pub signal: Option<SignalResult>,
    pub profit: ProfitReport,
}

/// Run every analysis over `series`.
///
/// Without a `target_date` the signal step is skipped. With one, signal
/// errors (bad date, too little history) fail the whole call.
pub fn analyze(
    series: &PriceSeries,
    config: &AnalysisConfig,
    target_date: Option<&str>,
    currency: Option<CurrencyRequest<'_>>,
) -> Result<AnalysisReport, AnalysisError> {
    let policy = config.streaks.flat_policy;
    let report = detect_streaks(&series.closes(), policy);
    let top = |direction| {
        report
            .top(direction, config.streaks.top)
            .into_iter()
            .map(|s| DatedStreak::attach(s.clone(), series))
            .collect::<Vec<_>>()
    };

    let signal = match target_date {
        Some(date) => {
            let generator = SignalGenerator::new(config.signal.clone())?;
            Some(generator.generate(date, series, currency)?)
        }
        None => None,
    };

    tracing::debug!(symbol = series.symbol(), bars = series.len(), "analysis complete");

    Ok(AnalysisReport {
        symbol: series.symbol().to_string(),
        trading_days: series.len(),
        start_date: series.first_date(),
        end_date: series.last_date(),
        flat_policy: policy,
        streaks: report.summary(),
        longest_up: top(Direction::Up),
        longest_down: top(Direction::Down),
        signal,
        profit: ProfitReport::from_series(series),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use crate::signal::Recommendation;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(closes)).unwrap()
    }

    #[test]
    fn without_date_skips_signal() {
        let s = series(&[7.0, 1.0, 5.0, 3.0, 6.0, 4.0]);
        let report = analyze(&s, &AnalysisConfig::default(), None, None).unwrap();
        assert!(report.signal.is_none());
        assert_eq!(report.profit.total_profit, 7.0);
        assert_eq!(report.trading_days, 6);
        assert_eq!(report.streaks.up.count, 2);
        assert_eq!(report.streaks.down.count, 3);
    }

    #[test]
    fn longest_streaks_are_dated_and_ranked() {
        let s = series(&[1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0]);
        let report = analyze(&s, &AnalysisConfig::default(), None, None).unwrap();
        assert_eq!(report.longest_up[0].streak.length, 3);
        assert_eq!(report.longest_up[0].start_date, s.bars()[2].date);
        assert_eq!(report.longest_up[0].end_date, s.bars()[5].date);
        assert_eq!(report.longest_up.len(), 2);
    }

    #[test]
    fn with_date_includes_signal() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let s = series(&closes);
        let date = s.bars()[30].date.format("%Y-%m-%d").to_string();
        let report = analyze(&s, &AnalysisConfig::default(), Some(&date), None).unwrap();
        let signal = report.signal.unwrap();
        assert_eq!(signal.recommendation, Recommendation::Sell);
    }

    #[test]
    fn signal_errors_propagate() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let s = series(&closes);
        let err = analyze(&s, &AnalysisConfig::default(), Some("not-a-date"), None).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Signal(SignalError::InvalidDateFormat { .. })
        ));
    }
}
