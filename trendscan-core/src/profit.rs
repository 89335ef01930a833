//! Profit maximization — best achievable gain with unlimited round trips.
//!
//! Any monotonic rise contributes exactly the sum of its daily gains, so the
//! optimum over non-overlapping buy/sell pairs (no costs, immediate re-entry)
//! is the sum of all positive day-over-day deltas. `extract_transactions`
//! recovers the valley/peak pairs that realize it.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hypothetical buy at a local minimum and sell at the following local maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub buy_index: usize,
    pub sell_index: usize,
    pub buy_price: f64,
    pub sell_price: f64,
    pub gain: f64,
}

/// Sum of all positive consecutive deltas.
pub fn max_profit(closes: &[f64]) -> f64 {
    closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).max(0.0))
        .sum()
}

/// Valley-to-peak pairs whose gains add up to [`max_profit`].
///
/// Flat steps count as non-increasing when searching for a buy and as
/// non-decreasing when searching for a sell, so a plateau never produces a
/// zero-gain transaction.
pub fn extract_transactions(closes: &[f64]) -> Vec<Transaction> {
    let n = closes.len();
    let mut transactions = Vec::new();
    let mut i = 0;

    while i + 1 < n {
        while i + 1 < n && closes[i + 1] <= closes[i] {
            i += 1;
        }
        let buy = i;
        while i + 1 < n && closes[i + 1] >= closes[i] {
            i += 1;
        }
        let sell = i;
        if sell > buy {
            transactions.push(Transaction {
                buy_index: buy,
                sell_index: sell,
                buy_price: closes[buy],
                sell_price: closes[sell],
                gain: closes[sell] - closes[buy],
            });
        }
        i += 1;
    }

    transactions
}

/// A transaction with the trading days it spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
}

/// Max-profit result for a whole series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub symbol: String,
    pub total_profit: f64,
    pub trading_days: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Last close minus first close; zero with fewer than two bars.
    pub buy_and_hold: f64,
    pub transactions: Vec<DatedTransaction>,
}

impl ProfitReport {
    pub fn from_series(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let bars = series.bars();
        let total_profit = max_profit(&closes);
        let buy_and_hold = match (closes.first(), closes.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        let transactions: Vec<DatedTransaction> = extract_transactions(&closes)
            .into_iter()
            .map(|t| DatedTransaction {
                buy_date: bars[t.buy_index].date,
                sell_date: bars[t.sell_index].date,
                transaction: t,
            })
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            total_profit,
            transactions = transactions.len(),
            "profit extraction complete"
        );

        Self {
            symbol: series.symbol().to_string(),
            total_profit,
            trading_days: series.len(),
            start_date: series.first_date(),
            end_date: series.last_date(),
            buy_and_hold,
            transactions,
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
