//! Streak detection over a close-price sequence.

use super::{Direction, FlatPolicy, Streak, StreakReport};

/// Classification of a single price-to-price step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Move(Direction),
    Flat,
}

fn classify(prev: f64, curr: f64) -> Step {
    if curr > prev {
        Step::Move(Direction::Up)
    } else if curr < prev {
        Step::Move(Direction::Down)
    } else {
        Step::Flat
    }
}

/// A streak still accumulating steps.
#[derive(Debug, Clone, Copy)]
struct OpenStreak {
    direction: Direction,
    start_index: usize,
    /// Index of the last bar reached by a directional step.
    last_index: usize,
    steps: usize,
}

impl OpenStreak {
    fn close(self, closes: &[f64]) -> Streak {
        Streak {
            start_index: self.start_index,
            end_index: self.last_index,
            direction: self.direction,
            length: self.steps,
            start_price: closes[self.start_index],
            end_price: closes[self.last_index],
        }
    }
}

/// Scan `closes` for maximal runs of same-direction price steps.
///
/// Fewer than two prices yield an empty report. Flat steps are handled per
/// `policy`. The final in-progress streak is always flushed.
///
/// Prices must be finite; NaN comparisons classify as flat.
pub fn detect_streaks(closes: &[f64], policy: FlatPolicy) -> StreakReport {
    let mut report = StreakReport::default();
    if closes.len() < 2 {
        return report;
    }

    let mut open: Option<OpenStreak> = None;

    for i in 1..closes.len() {
        let direction = match classify(closes[i - 1], closes[i]) {
            Step::Move(direction) => direction,
            Step::Flat => {
                if policy == FlatPolicy::Break {
                    if let Some(streak) = open.take() {
                        report.push(streak.close(closes));
                    }
                }
                continue;
            }
        };

        match open.as_mut() {
            Some(streak) if streak.direction == direction => {
                streak.steps += 1;
                streak.last_index = i;
            }
            _ => {
                if let Some(streak) = open.take() {
                    report.push(streak.close(closes));
                }
                open = Some(OpenStreak {
                    direction,
                    start_index: i - 1,
                    last_index: i,
                    steps: 1,
                });
            }
        }
    }

    if let Some(streak) = open {
        report.push(streak.close(closes));
    }

    tracing::debug!(
        bars = closes.len(),
        up = report.up.len(),
        down = report.down.len(),
        ?policy,
        "streak scan complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(streaks: &[Streak]) -> Vec<(usize, usize, usize)> {
        streaks
            .iter()
            .map(|s| (s.start_index, s.end_index, s.length))
            .collect()
    }

    #[test]
    fn fewer_than_two_prices_is_empty() {
        assert!(detect_streaks(&[], FlatPolicy::Skip).is_empty());
        assert!(detect_streaks(&[42.0], FlatPolicy::Skip).is_empty());
    }

    #[test]
    fn two_rising_prices_make_one_up_streak() {
        let report = detect_streaks(&[1.0, 2.0], FlatPolicy::Skip);
        assert_eq!(spans(&report.up), vec![(0, 1, 1)]);
        assert!(report.down.is_empty());
    }

    #[test]
    fn all_flat_yields_nothing() {
        for policy in [FlatPolicy::Skip, FlatPolicy::Break] {
            assert!(detect_streaks(&[5.0, 5.0, 5.0, 5.0], policy).is_empty());
        }
    }

    #[test]
    fn direction_change_closes_streak() {
        let report = detect_streaks(&[1.0, 2.0, 3.0, 2.0, 1.0, 0.5, 0.9], FlatPolicy::Skip);
        assert_eq!(spans(&report.up), vec![(0, 2, 2), (5, 6, 1)]);
        assert_eq!(spans(&report.down), vec![(2, 5, 3)]);
    }

    #[test]
    fn mixed_example_under_skip() {
        let closes = [1.0, 2.0, 3.0, 2.0, 2.0, 5.0];
        let report = detect_streaks(&closes, FlatPolicy::Skip);
        assert_eq!(spans(&report.up), vec![(0, 2, 2), (4, 5, 1)]);
        assert_eq!(spans(&report.down), vec![(2, 3, 1)]);
    }

    #[test]
    fn mixed_example_under_break() {
        let closes = [1.0, 2.0, 3.0, 2.0, 2.0, 5.0];
        let report = detect_streaks(&closes, FlatPolicy::Break);
        assert_eq!(spans(&report.up), vec![(0, 2, 2), (4, 5, 1)]);
        assert_eq!(spans(&report.down), vec![(2, 3, 1)]);
    }

    #[test]
    fn interior_flat_is_absorbed_under_skip() {
        let report = detect_streaks(&[1.0, 2.0, 2.0, 3.0], FlatPolicy::Skip);
        assert_eq!(spans(&report.up), vec![(0, 3, 2)]);
        assert_eq!(report.up[0].start_price, 1.0);
        assert_eq!(report.up[0].end_price, 3.0);
    }

    #[test]
    fn interior_flat_splits_under_break() {
        let report = detect_streaks(&[1.0, 2.0, 2.0, 3.0], FlatPolicy::Break);
        assert_eq!(spans(&report.up), vec![(0, 1, 1), (2, 3, 1)]);
    }

    #[test]
    fn trailing_flat_does_not_extend_end_index() {
        let report = detect_streaks(&[1.0, 2.0, 3.0, 3.0, 3.0], FlatPolicy::Skip);
        assert_eq!(spans(&report.up), vec![(0, 2, 2)]);
    }

    #[test]
    fn final_streak_is_flushed() {
        let report = detect_streaks(&[3.0, 2.0, 1.0], FlatPolicy::Skip);
        assert_eq!(spans(&report.down), vec![(0, 2, 2)]);
        assert_eq!(report.down[0].direction, Direction::Down);
    }
}
