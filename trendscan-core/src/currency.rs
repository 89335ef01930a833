//! Currency conversion collaborator.
//!
//! Conversion is always optional and never fatal to an analysis: a failed
//! call surfaces as [`PriceConversion::Unavailable`] next to an otherwise
//! complete result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("currency service unreachable: {0}")]
    Network(String),

    #[error("unexpected currency service response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid currency code '{0}'")]
    InvalidCode(String),
}

/// Converts an amount between ISO 4217 currency codes.
pub trait CurrencyConverter: Send + Sync {
    fn name(&self) -> &str;

    fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError>;
}

/// A target currency plus the converter to reach it.
#[derive(Clone, Copy)]
pub struct CurrencyRequest<'a> {
    pub target: &'a str,
    pub converter: &'a dyn CurrencyConverter,
}

impl<'a> CurrencyRequest<'a> {
    pub fn new(target: &'a str, converter: &'a dyn CurrencyConverter) -> Self {
        Self { target, converter }
    }
}

impl std::fmt::Debug for CurrencyRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyRequest")
            .field("target", &self.target)
            .field("converter", &self.converter.name())
            .finish()
    }
}

/// Outcome of the optional conversion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceConversion {
    /// No target currency requested.
    Native,
    Converted { currency: String, amount: f64 },
    Unavailable { currency: String, reason: String },
}

impl PriceConversion {
    /// Run `request` against `price`, absorbing failures.
    pub fn resolve(price: f64, native: &str, request: Option<CurrencyRequest<'_>>) -> Self {
        let Some(request) = request else {
            return PriceConversion::Native;
        };
        let target = request.target.trim().to_ascii_uppercase();
        if target.eq_ignore_ascii_case(native) {
            return PriceConversion::Converted {
                currency: target,
                amount: price,
            };
        }
        match request.converter.convert(price, native, &target) {
            Ok(amount) => PriceConversion::Converted {
                currency: target,
                amount,
            },
            Err(e) => {
                tracing::warn!(
                    converter = request.converter.name(),
                    currency = %target,
                    error = %e,
                    "currency conversion unavailable"
                );
                PriceConversion::Unavailable {
                    currency: target,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            PriceConversion::Converted { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

fn validate_code(code: &str) -> Result<String, ConversionError> {
    let upper = code.trim().to_ascii_uppercase();
    if upper.len() == 3 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(upper)
    } else {
        Err(ConversionError::InvalidCode(code.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Frankfurter (ECB reference rates) converter.
pub struct FrankfurterConverter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl FrankfurterConverter {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.frankfurter.app";

    pub fn new() -> Result<Self, ConversionError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ConversionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConversionError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn latest_url(&self, amount: f64, from: &str, to: &str) -> String {
        format!(
            "{}/latest?amount={amount}&from={from}&to={to}",
            self.base_url.trim_end_matches('/')
        )
    }

    fn parse_response(body: &str, to: &str) -> Result<f64, ConversionError> {
        let parsed: FrankfurterResponse = serde_json::from_str(body)
            .map_err(|e| ConversionError::UnexpectedResponse(e.to_string()))?;
        parsed
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| ConversionError::UnexpectedResponse(format!("no rate for {to}")))
    }
}

impl CurrencyConverter for FrankfurterConverter {
    fn name(&self) -> &str {
        "frankfurter"
    }

    fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from = validate_code(from)?;
        let to = validate_code(to)?;
        if from == to {
            return Ok(amount);
        }

        let url = self.latest_url(amount, &from, &to);
        tracing::debug!(%url, "requesting exchange rate");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ConversionError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| ConversionError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(ConversionError::UnexpectedResponse(format!("HTTP {status}")));
        }
        Self::parse_response(&body, &to)
    }
}

/// Fixed-rate converter, useful offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    /// Units of the quote currency per one unit of the base, keyed by (base, quote).
    rates: HashMap<(String, String), f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates
            .insert((from.to_ascii_uppercase(), to.to_ascii_uppercase()), rate);
        self
    }
}

impl CurrencyConverter for StaticRates {
    fn name(&self) -> &str {
        "static"
    }

    fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from = validate_code(from)?;
        let to = validate_code(to)?;
        if from == to {
            return Ok(amount);
        }
        self.rates
            .get(&(from.clone(), to.clone()))
            .map(|rate| amount * rate)
            .ok_or_else(|| ConversionError::UnexpectedResponse(format!("no rate for {from}->{to}")))
    }
}
