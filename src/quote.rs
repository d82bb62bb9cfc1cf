//! Quote - the persisted pricing record
//!
//! Pairs a pricing input with its derived result, an input fingerprint and
//! at most one active currency snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{try_convert, CurrencyError, CurrencySnapshot};
use crate::hashing::compute_quote_hash;
use crate::pricing::{calculate_pricing, PricingInput, PricingResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub input_hash: String,
    pub input: PricingInput,
    pub result: PricingResult,
    #[serde(default)]
    pub conversion: Option<CurrencySnapshot>,
}

impl Quote {
    pub fn new(input: PricingInput) -> Result<Self, serde_json::Error> {
        let input_hash = compute_quote_hash(&input)?;
        let result = calculate_pricing(&input);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            input_hash,
            input,
            result,
            conversion: None,
        })
    }

    /// True when the stored input still matches its fingerprint.
    pub fn verify_input(&self) -> Result<bool, serde_json::Error> {
        Ok(compute_quote_hash(&self.input)? == self.input_hash)
    }

    /// Convert the current prices, superseding any earlier snapshot.
    ///
    /// Returns the snapshot that was replaced.
    pub fn apply_conversion(
        &mut self,
        currency_code: &str,
        rate: f64,
    ) -> Result<Option<CurrencySnapshot>, CurrencyError> {
        let snapshot = try_convert(self.result.unit_price, self.result.total_price, currency_code, rate)?;
        Ok(self.conversion.replace(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{OtherCost, ProfitPolicy};

    fn input() -> PricingInput {
        PricingInput {
            other_costs: vec![OtherCost { name: "base".into(), amount: 100.0 }],
            quantity: 10.0,
            profit: ProfitPolicy::Percentage { value: 20.0 },
            ..PricingInput::default()
        }
    }

    #[test]
    fn test_quote_hash_is_stable() {
        let a = Quote::new(input()).unwrap();
        let b = Quote::new(input()).unwrap();
        assert_eq!(a.input_hash, b.input_hash);
        assert_ne!(a.id, b.id);
        assert_eq!(a.result.unit_price, 120.0);
    }

    #[test]
    fn test_verify_input_detects_edits() {
        let mut quote = Quote::new(input()).unwrap();
        assert!(quote.verify_input().unwrap());

        quote.input.quantity = 11.0;
        assert!(!quote.verify_input().unwrap());
    }

    #[test]
    fn test_conversion_supersedes() {
        let mut quote = Quote::new(input()).unwrap();
        assert!(quote.apply_conversion("USD", 40.0).unwrap().is_none());

        let previous = quote.apply_conversion("EUR", 48.0).unwrap().unwrap();
        assert_eq!(previous.currency, "USD");

        let current = quote.conversion.as_ref().unwrap();
        assert_eq!(current.currency, "EUR");
        assert_eq!(current.unit_price_converted, 2.5);
    }

    #[test]
    fn test_rejected_conversion_keeps_previous() {
        let mut quote = Quote::new(input()).unwrap();
        quote.apply_conversion("USD", 40.0).unwrap();
        assert!(quote.apply_conversion("EUR", 0.0).is_err());
        assert_eq!(quote.conversion.as_ref().unwrap().currency, "USD");
    }
}
