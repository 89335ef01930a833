//! Signal generation through the public API.

use chrono::{Datelike, NaiveDate, Weekday};
use trendscan_core::currency::{
    ConversionError, CurrencyConverter, CurrencyRequest, PriceConversion, StaticRates,
};
use trendscan_core::domain::{Bar, PriceSeries};
use trendscan_core::signal::{Recommendation, SignalConfig, SignalError, SignalGenerator};

/// Weekday bars from Monday 2024-04-01; high/low one point around the close.
fn weekday_series(closes: &[f64]) -> PriceSeries {
    let mut date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut bars = Vec::new();
    for &close in closes {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().unwrap();
        }
        bars.push(Bar {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: Some(10_000),
        });
        date = date.succ_opt().unwrap();
    }
    PriceSeries::new("SIG", bars).unwrap()
}

fn date_of(series: &PriceSeries, idx: usize) -> String {
    series.bars()[idx].date.format("%Y-%m-%d").to_string()
}

struct Unreachable;

impl CurrencyConverter for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn convert(&self, _: f64, _: &str, _: &str) -> Result<f64, ConversionError> {
        Err(ConversionError::Network("dns failure".into()))
    }
}

// ── SMA boundary ──

#[test]
fn two_percent_is_near_and_just_over_is_above() {
    // SMA over indices 1..=20 is exactly 100.
    let mut closes = vec![100.0; 21];
    closes[19] = 98.0;
    closes[20] = 102.0;
    let s = weekday_series(&closes);
    let date = date_of(&s, 20);

    let at_two = SignalGenerator::default().generate(&date, &s, None).unwrap();
    assert!(at_two.signals[0].contains("near"), "{}", at_two.signals[0]);

    // The same 2.00% deviation crosses a 1.9999% threshold.
    let tighter = SignalGenerator::new(SignalConfig {
        sma_deviation_pct: 1.9999,
        ..SignalConfig::default()
    })
    .unwrap();
    let over = tighter.generate(&date, &s, None).unwrap();
    assert!(over.signals[0].contains("above"), "{}", over.signals[0]);
    assert_eq!(over.score, at_two.score - 2);
}

// ── Date handling ──

#[test]
fn weekend_request_snaps_within_a_week() {
    let s = weekday_series(&(0..45).map(|i| 50.0 + (i % 5) as f64).collect::<Vec<_>>());
    // Saturday 2024-05-04 sits between Friday (idx 24) and Monday (idx 25).
    let result = SignalGenerator::default().generate("2024-05-04", &s, None).unwrap();
    assert_eq!(result.requested_date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
    assert_eq!(result.target_date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
}

#[test]
fn equidistant_request_snaps_to_the_earlier_day() {
    // Drop Friday 2024-05-03 so Saturday sits two days from Thursday and Monday.
    let full = weekday_series(&(0..30).map(|i| 80.0 + i as f64).collect::<Vec<_>>());
    let friday = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
    let bars = full.bars().iter().filter(|b| b.date != friday).cloned().collect();
    let s = PriceSeries::new("SIG", bars).unwrap();

    let result = SignalGenerator::default().generate("2024-05-04", &s, None).unwrap();
    assert!(result.was_snapped());
    assert_eq!(result.target_date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    assert_eq!(result.price, 103.0);
}

#[test]
fn ten_days_past_the_end_is_out_of_range() {
    let s = weekday_series(&vec![10.0; 30]);
    let last = s.last_date().unwrap();
    let requested = last + chrono::Duration::days(10);
    let err = SignalGenerator::default()
        .generate(&requested.format("%Y-%m-%d").to_string(), &s, None)
        .unwrap_err();
    assert_eq!(err, SignalError::DateOutOfRange { requested, closest: last });
    assert!(err.to_string().contains("closest available trading day"));
}

#[test]
fn index_ten_lacks_history() {
    let s = weekday_series(&vec![10.0; 30]);
    let err = SignalGenerator::default()
        .generate(&date_of(&s, 10), &s, None)
        .unwrap_err();
    assert!(matches!(
        err,
        SignalError::InsufficientHistory { required: 20, available: 10, .. }
    ));
}

// ── Currency ──

#[test]
fn unreachable_converter_keeps_recommendation() {
    let closes: Vec<f64> = (0..40).map(|i| 300.0 - 2.0 * i as f64).collect();
    let s = weekday_series(&closes);
    let date = date_of(&s, 35);
    let gen = SignalGenerator::default();

    let baseline = gen.generate(&date, &s, None).unwrap();
    assert_eq!(baseline.recommendation, Recommendation::Buy);
    assert_eq!(baseline.conversion, PriceConversion::Native);

    let conv = Unreachable;
    let result = gen
        .generate(&date, &s, Some(CurrencyRequest::new("SGD", &conv)))
        .unwrap();
    assert_eq!(result.recommendation, baseline.recommendation);
    assert_eq!(result.confidence_pct, baseline.confidence_pct);
    match result.conversion {
        PriceConversion::Unavailable { currency, reason } => {
            assert_eq!(currency, "SGD");
            assert!(reason.contains("dns failure"));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[test]
fn same_currency_needs_no_converter_call() {
    let s = weekday_series(&vec![10.0; 30]);
    let conv = Unreachable;
    let result = SignalGenerator::default()
        .generate(&date_of(&s, 25), &s, Some(CurrencyRequest::new("usd", &conv)))
        .unwrap();
    assert_eq!(result.conversion.amount(), Some(10.0));
}

// ── Serialization ──

#[test]
fn result_serializes_for_the_cli() {
    let s = weekday_series(&(0..40).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
    let rates = StaticRates::new().with_rate("USD", "EUR", 0.9);
    let result = SignalGenerator::default()
        .generate(&date_of(&s, 25), &s, Some(CurrencyRequest::new("EUR", &rates)))
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["recommendation"], "SELL");
    assert_eq!(json["conversion"]["status"], "converted");
    assert_eq!(json["conversion"]["currency"], "EUR");
    assert_eq!(json["signals"].as_array().unwrap().len(), 3);
    assert!(json["hindsight"].is_object());
}
