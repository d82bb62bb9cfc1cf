//! Currency conversion snapshots
//!
//! A snapshot freezes one conversion of home-currency prices at an instant.
//! A later conversion replaces it; snapshots are never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::format_amount;

#[derive(Debug, Error, PartialEq)]
pub enum CurrencyError {
    #[error("Exchange rate must be a positive number, got {0}")]
    InvalidRate(f64),

    #[error("Currency code is empty")]
    EmptyCurrencyCode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencySnapshot {
    pub currency: String,
    pub exchange_rate: f64,
    pub unit_price_converted: f64,
    pub total_price_converted: f64,
    pub converted_at: DateTime<Utc>,
}

impl CurrencySnapshot {
    pub fn display_unit_price(&self) -> String {
        format!("{} {}", format_amount(self.unit_price_converted), self.currency)
    }

    pub fn display_total_price(&self) -> String {
        format!("{} {}", format_amount(self.total_price_converted), self.currency)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Convert home-currency prices with `rate` home units per foreign unit.
///
/// The rate is not checked; callers guard it (see [`try_convert`]).
pub fn convert(unit_price: f64, total_price: f64, currency_code: &str, rate: f64) -> CurrencySnapshot {
    convert_at(unit_price, total_price, currency_code, rate, Utc::now())
}

pub fn convert_at(
    unit_price: f64,
    total_price: f64,
    currency_code: &str,
    rate: f64,
    at: DateTime<Utc>,
) -> CurrencySnapshot {
    let snapshot = CurrencySnapshot {
        currency: normalize_code(currency_code),
        exchange_rate: rate,
        unit_price_converted: unit_price / rate,
        total_price_converted: total_price / rate,
        converted_at: at,
    };
    tracing::debug!(currency = %snapshot.currency, rate, "currency converted");
    snapshot
}

/// Boundary guard around [`convert`].
pub fn try_convert(
    unit_price: f64,
    total_price: f64,
    currency_code: &str,
    rate: f64,
) -> Result<CurrencySnapshot, CurrencyError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CurrencyError::InvalidRate(rate));
    }
    if currency_code.trim().is_empty() {
        return Err(CurrencyError::EmptyCurrencyCode);
    }
    Ok(convert(unit_price, total_price, currency_code, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_convert_divides_by_rate() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let snap = convert_at(120.0, 1200.0, " usd ", 40.0, at);
        assert_eq!(snap.currency, "USD");
        assert_eq!(snap.unit_price_converted, 3.0);
        assert_eq!(snap.total_price_converted, 30.0);
        assert_eq!(snap.converted_at, at);
        assert_eq!(snap.display_unit_price(), "3.00 USD");
        assert_eq!(snap.display_total_price(), "30.00 USD");
    }

    #[test]
    fn test_try_convert_guards_rate() {
        assert_eq!(try_convert(1.0, 1.0, "EUR", 0.0), Err(CurrencyError::InvalidRate(0.0)));
        assert!(matches!(try_convert(1.0, 1.0, "EUR", -2.0), Err(CurrencyError::InvalidRate(_))));
        assert!(matches!(try_convert(1.0, 1.0, "EUR", f64::NAN), Err(CurrencyError::InvalidRate(_))));
        assert_eq!(try_convert(1.0, 1.0, "  ", 2.0), Err(CurrencyError::EmptyCurrencyCode));
        assert!(try_convert(10.0, 100.0, "eur", 2.0).is_ok());
    }
}
