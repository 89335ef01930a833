use chrono::NaiveDate;

use super::{CallOutcome, HindsightCheck, Recommendation, SignalConfig, SignalError, SignalResult};
use crate::config::ConfigError;
use crate::currency::{CurrencyRequest, PriceConversion};
use crate::domain::PriceSeries;
use crate::indicators::{classify_volume_with, range_position, sma_at, trend_slope, VolumeClass};

/// Where a value falls relative to an upper and lower band (both exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Above,
    Below,
    Within,
}

fn band(value: f64, upper: f64, lower: f64) -> Band {
    if value > upper {
        Band::Above
    } else if value < lower {
        Band::Below
    } else {
        Band::Within
    }
}

/// Multi-indicator signal generator.
#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Evaluate the series at `target_date` (`YYYY-MM-DD`).
    pub fn generate(
        &self,
        target_date: &str,
        series: &PriceSeries,
        currency: Option<CurrencyRequest<'_>>,
    ) -> Result<SignalResult, SignalError> {
        let requested = NaiveDate::parse_from_str(target_date.trim(), "%Y-%m-%d").map_err(|_| {
            SignalError::InvalidDateFormat {
                input: target_date.to_string(),
            }
        })?;
        self.generate_at(requested, series, currency)
    }

    /// Evaluate the series at an already-parsed date.
    pub fn generate_at(
        &self,
        requested: NaiveDate,
        series: &PriceSeries,
        currency: Option<CurrencyRequest<'_>>,
    ) -> Result<SignalResult, SignalError> {
        let cfg = &self.config;
        let (idx, target) = self.resolve_date(requested, series)?;

        let required = cfg.min_history();
        if idx < required {
            return Err(SignalError::InsufficientHistory {
                date: target,
                required,
                available: idx,
            });
        }

        let bars = series.bars();
        let closes = series.closes();
        let price = closes[idx];
        let mut signals = Vec::with_capacity(4);
        let mut score = 0i32;

        // SMA deviation
        let sma = sma_at(&closes, cfg.sma_window, idx).ok_or(SignalError::InsufficientHistory {
            date: target,
            required: cfg.sma_window,
            available: idx,
        })?;
        let diff = price - sma;
        let deviation_pct = diff / sma * 100.0;
        let w = cfg.sma_window;
        match band(deviation_pct, cfg.sma_deviation_pct, -cfg.sma_deviation_pct) {
            Band::Above => {
                signals.push(format!(
                    "Price is {diff:+.2} ({deviation_pct:+.2}%) above {w}-day SMA \
                     ({sma:.2}) - overbought"
                ));
                score -= cfg.sma_weight;
            }
            Band::Below => {
                signals.push(format!(
                    "Price is {diff:+.2} ({deviation_pct:+.2}%) below {w}-day SMA \
                     ({sma:.2}) - oversold"
                ));
                score += cfg.sma_weight;
            }
            Band::Within => {
                signals.push(format!(
                    "Price is {diff:+.2} ({deviation_pct:+.2}%) near {w}-day SMA ({sma:.2})"
                ));
            }
        }

        // Trend
        let slope = trend_slope(&closes[idx - cfg.lookback_days..=idx]);
        if slope > 0.0 {
            signals.push(format!("Upward trend ({slope:+.2}/day)"));
            score -= cfg.trend_weight;
        } else {
            signals.push(format!("Downward trend ({slope:+.2}/day)"));
            score += cfg.trend_weight;
        }

        // Support / resistance
        let window = &bars[idx.saturating_sub(cfg.support_resistance_window)..=idx];
        let support = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let resistance = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let position = range_position(price, support, resistance);
        let n = cfg.support_resistance_window;
        match band(position, cfg.resistance_position, cfg.support_position) {
            Band::Above => {
                let gap = resistance - price;
                let gap_pct = gap / resistance * 100.0;
                signals.push(format!(
                    "Price is {gap:.2} ({gap_pct:.2}%) below {n}-day resistance \
                     ({resistance:.2}) - near resistance"
                ));
                score -= cfg.range_weight;
            }
            Band::Below => {
                let gap = price - support;
                let gap_pct = gap / support * 100.0;
                signals.push(format!(
                    "Price is {gap:.2} ({gap_pct:.2}%) above {n}-day support \
                     ({support:.2}) - near support"
                ));
                score += cfg.range_weight;
            }
            Band::Within => {
                signals.push(format!(
                    "Price is between support ({support:.2}) and resistance ({resistance:.2})"
                ));
            }
        }

        // Volume, informational only
        let volume_class = self.volume_class(series, idx);
        match volume_class {
            Some(VolumeClass::High) => signals.push("High volume - strong conviction".to_string()),
            Some(VolumeClass::Low) => signals.push("Low volume - weak conviction".to_string()),
            _ => {}
        }

        let recommendation = if score >= cfg.buy_threshold {
            Recommendation::Buy
        } else if score <= cfg.sell_threshold {
            Recommendation::Sell
        } else {
            Recommendation::Neutral
        };
        let confidence_pct = score
            .unsigned_abs()
            .saturating_mul(cfg.confidence_step_pct)
            .min(100);

        let conversion = PriceConversion::resolve(price, &cfg.native_currency, currency);
        let hindsight = self.hindsight(series, idx, score);

        tracing::debug!(
            symbol = series.symbol(),
            date = %target,
            score,
            recommendation = recommendation.label(),
            "signal generated"
        );

        Ok(SignalResult {
            symbol: series.symbol().to_string(),
            requested_date: requested,
            target_date: target,
            price,
            sma,
            sma_deviation_pct: deviation_pct,
            trend_slope: slope,
            support,
            resistance,
            range_position: position,
            volume_class,
            signals,
            score,
            recommendation,
            confidence_pct,
            conversion,
            hindsight,
        })
    }

    fn resolve_date(
        &self,
        requested: NaiveDate,
        series: &PriceSeries,
    ) -> Result<(usize, NaiveDate), SignalError> {
        let (idx, closest) = series.nearest(requested).ok_or_else(|| SignalError::NoData {
            symbol: series.symbol().to_string(),
        })?;
        if closest == requested {
            return Ok((idx, closest));
        }
        let distance = (closest - requested).num_days().abs();
        if distance > self.config.max_snap_days {
            return Err(SignalError::DateOutOfRange { requested, closest });
        }
        tracing::info!(
            symbol = series.symbol(),
            requested = %requested,
            snapped = %closest,
            "date is not a trading day, using nearest"
        );
        Ok((idx, closest))
    }

    fn volume_class(&self, series: &PriceSeries, idx: usize) -> Option<VolumeClass> {
        let window = self.config.volume_window;
        if idx + 1 < window {
            return None;
        }
        let bars = &series.bars()[idx + 1 - window..=idx];
        let mut total = 0.0;
        for bar in bars {
            total += bar.volume? as f64;
        }
        let current = series.bars()[idx].volume? as f64;
        Some(classify_volume_with(
            current,
            total / window as f64,
            self.config.high_volume_ratio,
            self.config.low_volume_ratio,
        ))
    }

    fn hindsight(&self, series: &PriceSeries, idx: usize, score: i32) -> Option<HindsightCheck> {
        let lookahead = self.config.lookahead_days;
        let future = series.get(idx + lookahead)?;
        let price = series.bars()[idx].close;
        let future_return_pct = (future.close - price) / price * 100.0;

        let outcome = if future_return_pct.abs() > self.config.hindsight_min_move_pct {
            let agrees = (score > 0 && future_return_pct > 0.0)
                || (score < 0 && future_return_pct < 0.0);
            Some(if agrees {
                CallOutcome::Correct
            } else {
                CallOutcome::Wrong
            })
        } else {
            None
        };

        Some(HindsightCheck {
            lookahead_days: lookahead,
            future_date: future.date,
            future_price: future.close,
            future_return_pct,
            outcome,
        })
    }
}
