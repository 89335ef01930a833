//! trendscan core — streak detection, indicators, signal generation and
//! hindsight profit analysis over daily price series.
//!
//! Everything here is synchronous and stateless across calls:
//! - Domain types (bars, validated price series)
//! - Streak detection with an explicit flat-step policy
//! - Indicator library (SMA, trend slope, range position, volume class, returns)
//! - Multi-indicator BUY/SELL/NEUTRAL signal generator
//! - Max-profit calculation and transaction extraction
//! - Data providers (Yahoo Finance, CSV) and an optional currency converter

pub mod analysis;
pub mod config;
pub mod currency;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod profit;
pub mod signal;
pub mod streaks;

pub use analysis::{analyze, AnalysisError, AnalysisReport};
pub use config::{AnalysisConfig, ConfigError, StreakConfig};
pub use domain::{Bar, PriceSeries};
pub use profit::{extract_transactions, max_profit, ProfitReport, Transaction};
pub use signal::{Recommendation, SignalConfig, SignalError, SignalGenerator, SignalResult};
pub use streaks::{detect_streaks, Direction, FlatPolicy, Streak, StreakReport, StreakSummary};
