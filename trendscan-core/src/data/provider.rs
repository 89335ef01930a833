//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, CSV
//! files) so the CLI can swap them and tests can run offline.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider is refusing requests (circuit breaker open, {remaining_secs}s left)")]
    CircuitBreakerTripped { remaining_secs: u64 },

    #[error("no price data for '{symbol}' in the requested range")]
    NoData { symbol: String },

    #[error("malformed CSV for '{symbol}': {reason}")]
    Csv { symbol: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
}

/// A source of daily price bars.
///
/// Implementations return bars sorted by date, one per trading day, filtered
/// to `[start, end]`. An empty result is [`DataError::NoData`].
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;

    /// False while the provider is known to refuse requests.
    fn is_available(&self) -> bool {
        true
    }
}

/// Normalize a user-supplied ticker.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_trimmed_and_uppercased() {
        assert_eq!(normalize_symbol("  aapl "), "AAPL");
        assert_eq!(normalize_symbol("brk-b"), "BRK-B");
    }

    #[test]
    fn errors_render_for_humans() {
        let e = DataError::NoData { symbol: "XYZ".into() };
        assert_eq!(e.to_string(), "no price data for 'XYZ' in the requested range");
        let e = DataError::CircuitBreakerTripped { remaining_secs: 90 };
        assert!(e.to_string().contains("90s"));
    }
}
