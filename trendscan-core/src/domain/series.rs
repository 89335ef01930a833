//! PriceSeries — ordered daily bars for one symbol.
//!
//! Dates are strictly increasing and unique. Gaps (weekends, holidays) are
//! expected and carry no meaning. Every derived series (SMA, returns, streaks)
//! is a separate output aligned by index; a `PriceSeries` is never mutated
//! after construction.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} ({date}) is not after the previous bar")]
    UnorderedDates { index: usize, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars that are already in strictly increasing date order.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedDates {
                    index: i + 1,
                    date: pair[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Sort bars by date and drop duplicate dates (first occurrence wins).
    pub fn canonicalize(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by(|later, earlier| later.date == earlier.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volume column, present only when every bar carries a volume.
    pub fn volumes(&self) -> Option<Vec<u64>> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Index of an exact trading day.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |b| b.date).ok()
    }

    /// Chronologically nearest trading day to `date`.
    ///
    /// Ties (one day equidistant on either side) resolve to the earlier date.
    pub fn nearest(&self, date: NaiveDate) -> Option<(usize, NaiveDate)> {
        match self.bars.binary_search_by_key(&date, |b| b.date) {
            Ok(i) => Some((i, date)),
            Err(insert_at) => {
                let before = insert_at.checked_sub(1).map(|i| (i, self.bars[i].date));
                let after = self.bars.get(insert_at).map(|b| (insert_at, b.date));
                match (before, after) {
                    (Some(b), Some(a)) => {
                        let to_before = (date - b.1).num_days();
                        let to_after = (a.1 - date).num_days();
                        if to_after < to_before {
                            Some(a)
                        } else {
                            Some(b)
                        }
                    }
                    (Some(b), None) => Some(b),
                    (None, Some(a)) => Some(a),
                    (None, None) => None,
                }
            }
        }
    }

    /// Latest trading day on or before `date`.
    pub fn on_or_before(&self, date: NaiveDate) -> Option<(usize, NaiveDate)> {
        let end = self.bars.partition_point(|b| b.date <= date);
        end.checked_sub(1).map(|i| (i, self.bars[i].date))
    }

    /// Inclusive sub-range copy `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        PriceSeries {
            symbol: self.symbol.clone(),
            bars,
        }
    }
}
