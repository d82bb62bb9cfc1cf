//! Unit conversion table
//!
//! Ingredient quantities are normalized to a kilogram, liter or piece basis
//! before their unit price is applied.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Piece,
    /// Unrecognized unit, converted like grams
    Unknown(String),
}

impl Unit {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "g" | "gr" | "gram" | "grams" | "gramme" => Self::Gram,
            "kg" | "kilo" | "kilogram" | "kilograms" => Self::Kilogram,
            "ml" | "milliliter" | "millilitre" | "milliliters" => Self::Milliliter,
            "l" | "lt" | "liter" | "litre" | "liters" | "litres" => Self::Liter,
            "piece" | "pieces" | "pc" | "pcs" | "unit" | "adet" => Self::Piece,
            "" => Self::Gram,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    /// Multiplier from this unit to its canonical basis.
    pub fn canonical_factor(&self) -> f64 {
        match self {
            Self::Gram | Self::Milliliter => 0.001,
            Self::Kilogram | Self::Liter | Self::Piece => 1.0,
            Self::Unknown(_) => 0.001,
        }
    }

    pub fn normalize(&self, quantity: f64) -> f64 {
        quantity * self.canonical_factor()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gram => "gram",
            Self::Kilogram => "kg",
            Self::Milliliter => "ml",
            Self::Liter => "liter",
            Self::Piece => "piece",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything but a string means the unit was never chosen
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Unit::parse(&s),
            _ => Unit::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Unit::parse("KG"), Unit::Kilogram);
        assert_eq!(Unit::parse(" gr "), Unit::Gram);
        assert_eq!(Unit::parse("Litre"), Unit::Liter);
        assert_eq!(Unit::parse("pcs"), Unit::Piece);
    }

    #[test]
    fn test_unknown_falls_back_to_gram_factor() {
        let unit = Unit::parse("ounce");
        assert_eq!(unit, Unit::Unknown("ounce".to_string()));
        assert_eq!(unit.canonical_factor(), Unit::Gram.canonical_factor());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Unit::Gram.normalize(1000.0), 1.0);
        assert_eq!(Unit::Milliliter.normalize(250.0), 0.25);
        assert_eq!(Unit::Piece.normalize(3.0), 3.0);
    }

    #[test]
    fn test_serde_null_defaults_to_gram() {
        let unit: Unit = serde_json::from_str("null").unwrap();
        assert_eq!(unit, Unit::Gram);
        let unit: Unit = serde_json::from_str("5").unwrap();
        assert_eq!(unit, Unit::Gram);
        let unit: Unit = serde_json::from_str(r#"{"name": "kg"}"#).unwrap();
        assert_eq!(unit, Unit::Gram);
        assert_eq!(serde_json::to_string(&Unit::Liter).unwrap(), r#""liter""#);
    }
}
