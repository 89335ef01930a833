//! Streak detection — maximal runs of consecutive same-direction price moves.
//!
//! A streak's `length` counts price-to-price steps, not days: a streak of
//! length `n` spans `n + 1` bars when no flat step falls inside it.
//! Results are recomputed on every call; nothing is cached.

pub mod detector;
pub mod summary;

pub use detector::detect_streaks;
pub use summary::{DirectionSummary, StreakSummary};

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// How an unchanged close (flat step) interacts with a running streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatPolicy {
    /// Flat steps are ignored: they neither extend nor end a streak.
    #[default]
    Skip,
    /// A flat step ends the running streak without starting a new one.
    Break,
}

impl std::str::FromStr for FlatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(FlatPolicy::Skip),
            "break" => Ok(FlatPolicy::Break),
            other => Err(format!("unknown flat policy '{other}' (expected skip or break)")),
        }
    }
}

/// A maximal run of same-direction steps over a close-price array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    pub direction: Direction,
    /// Number of directional steps.
    pub length: usize,
    pub start_price: f64,
    pub end_price: f64,
}

impl Streak {
    /// Percentage move from the first to the last price of the streak.
    pub fn return_pct(&self) -> f64 {
        if self.start_price == 0.0 {
            return 0.0;
        }
        (self.end_price - self.start_price) / self.start_price * 100.0
    }
}

/// A streak annotated with the calendar dates of its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedStreak {
    #[serde(flatten)]
    pub streak: Streak,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DatedStreak {
    /// Attach dates from the series the streak was detected on.
    pub fn attach(streak: Streak, series: &PriceSeries) -> Self {
        let bars = series.bars();
        Self {
            start_date: bars[streak.start_index].date,
            end_date: bars[streak.end_index].date,
            streak,
        }
    }
}

/// Up and down streaks found in one scan, each list in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakReport {
    pub up: Vec<Streak>,
    pub down: Vec<Streak>,
}

impl StreakReport {
    pub(crate) fn push(&mut self, streak: Streak) {
        match streak.direction {
            Direction::Up => self.up.push(streak),
            Direction::Down => self.down.push(streak),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    pub fn streaks(&self, direction: Direction) -> &[Streak] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    /// Total directional steps covered by all streaks.
    pub fn total_steps(&self) -> usize {
        self.up.iter().chain(&self.down).map(|s| s.length).sum()
    }

    pub fn summary(&self) -> StreakSummary {
        StreakSummary::from_report(self)
    }

    /// The `n` longest streaks in one direction; equal lengths keep chronological order.
    pub fn top(&self, direction: Direction, n: usize) -> Vec<&Streak> {
        let mut ranked: Vec<&Streak> = self.streaks(direction).iter().collect();
        ranked.sort_by(|a, b| b.length.cmp(&a.length));
        ranked.truncate(n);
        ranked
    }
}

/// Detect streaks on a series' closes and attach bar dates to each.
///
/// Returned in chronological order across both directions.
pub fn dated_streaks(series: &PriceSeries, policy: FlatPolicy) -> Vec<DatedStreak> {
    let report = detect_streaks(&series.closes(), policy);
    let mut dated: Vec<DatedStreak> = report
        .up
        .into_iter()
        .chain(report.down)
        .map(|streak| DatedStreak::attach(streak, series))
        .collect();
    dated.sort_by_key(|d| d.streak.start_index);
    dated
}
