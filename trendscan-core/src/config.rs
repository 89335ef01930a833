//! Analysis configuration, loadable from TOML.
//!
//! ```toml
//! symbols = ["SPY", "QQQ"]
//! start_date = "2023-01-01"
//! target_currency = "EUR"
//!
//! [streaks]
//! flat_policy = "break"
//!
//! [signal]
//! sma_window = 50
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::signal::SignalConfig;
use crate::streaks::FlatPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakConfig {
    pub flat_policy: FlatPolicy,
    /// Longest streaks listed per direction in reports.
    pub top: usize,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            flat_policy: FlatPolicy::Skip,
            top: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Used when the command line names no symbol.
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    /// `None` means today.
    pub end_date: Option<NaiveDate>,
    pub target_currency: Option<String>,
    pub streaks: StreakConfig,
    pub signal: SignalConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["SPY".to_string()],
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: None,
            target_currency: None,
            streaks: StreakConfig::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ConfigError::Invalid(format!(
                    "end_date {end} is before start_date {}",
                    self.start_date
                )));
            }
        }
        self.signal.validate()
    }

    /// Inclusive date range, with an open end resolved to `today`.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date.unwrap_or(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.symbols, vec!["SPY"]);
        assert_eq!(config.streaks.flat_policy, FlatPolicy::Skip);
    }

    #[test]
    fn nested_tables_override() {
        let config = AnalysisConfig::from_toml(
            r#"
symbols = ["AAPL", "MSFT"]
start_date = "2024-01-01"
end_date = "2024-06-30"
target_currency = "EUR"

[streaks]
flat_policy = "break"

[signal]
sma_window = 50
"#,
        )
        .unwrap();
        assert_eq!(config.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(config.streaks.flat_policy, FlatPolicy::Break);
        assert_eq!(config.streaks.top, 5);
        assert_eq!(config.signal.sma_window, 50);
        assert_eq!(config.signal.lookback_days, 5);
        assert_eq!(config.target_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn inverted_range_rejected() {
        let toml = "start_date = \"2024-06-01\"\nend_date = \"2024-01-01\"\n";
        let err = AnalysisConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn invalid_signal_section_rejected() {
        let err = AnalysisConfig::from_toml("[signal]\nsma_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_policy_is_parse_error() {
        let err = AnalysisConfig::from_toml("[streaks]\nflat_policy = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn open_end_resolves_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let (start, end) = AnalysisConfig::default().date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/trendscan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
