//! Aggregate statistics over a streak report.

use serde::{Deserialize, Serialize};

use super::{Direction, Streak, StreakReport};

/// Count, longest and mean streak length for one direction.
///
/// `longest` and `average` are `None` when no streak occurred; a zero would
/// read as "a streak of length zero happened".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub direction: Direction,
    pub count: usize,
    pub longest: Option<usize>,
    pub average: Option<f64>,
}

impl DirectionSummary {
    fn from_streaks(direction: Direction, streaks: &[Streak]) -> Self {
        let count = streaks.len();
        let longest = streaks.iter().map(|s| s.length).max();
        let average = if count == 0 {
            None
        } else {
            let total: usize = streaks.iter().map(|s| s.length).sum();
            Some(total as f64 / count as f64)
        };
        Self {
            direction,
            count,
            longest,
            average,
        }
    }

    pub fn has_streaks(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub up: DirectionSummary,
    pub down: DirectionSummary,
    pub total_steps: usize,
}

impl StreakSummary {
    pub fn from_report(report: &StreakReport) -> Self {
        Self {
            up: DirectionSummary::from_streaks(Direction::Up, &report.up),
            down: DirectionSummary::from_streaks(Direction::Down, &report.down),
            total_steps: report.total_steps(),
        }
    }
}
