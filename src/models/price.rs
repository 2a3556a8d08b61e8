//! Observed prices and the points that make up a price history.

use chrono::NaiveDateTime;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Text the retailer shows in place of a price once an item is gone
pub const SOLD_SENTINEL: &str = "sold";

/// One observed price value.
///
/// `Unknown` means the price could not be determined. It is distinct from
/// `Sold` and from zero, and two unknown prices compare equal so an
/// unparseable page does not produce a new point on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Price {
    Amount(Decimal),
    Sold,
    #[default]
    Unknown,
}

impl Price {
    /// Parse cleaned price text (already lower-cased and stripped of `$` and `,`)
    pub fn from_clean_text(text: &str) -> Self {
        let text = text.trim();
        if text == SOLD_SENTINEL {
            return Price::Sold;
        }

        let parsed = Decimal::from_str(text)
            .ok()
            .or_else(|| Decimal::from_scientific(text).ok());

        parsed.map_or(Price::Unknown, Price::from_amount)
    }

    /// An asking price, or `Unknown` when not positive or above [`Price::max_amount`]
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO && amount <= Self::max_amount() {
            Price::Amount(amount)
        } else {
            Price::Unknown
        }
    }

    /// Largest accepted asking price.
    ///
    /// Far below `Decimal::MAX`, so summing every price in a ledger cannot
    /// overflow.
    pub fn max_amount() -> Decimal {
        Decimal::new(1_000_000_000_000_000, 0)
    }

    /// Numeric value, if this is an asking price
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Price::Amount(amount) => Some(*amount),
            _ => None,
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, Price::Sold)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Price::Unknown)
    }

    /// Storage tag used by the relational store
    pub fn kind(&self) -> &'static str {
        match self {
            Price::Amount(_) => "amount",
            Price::Sold => "sold",
            Price::Unknown => "unknown",
        }
    }

    /// Rebuild a price from its storage tag and optional amount
    pub fn from_kind(kind: &str, amount: Option<Decimal>) -> Result<Self, String> {
        match (kind, amount) {
            ("amount", Some(amount)) => match Price::from_amount(amount) {
                Price::Amount(amount) => Ok(Price::Amount(amount)),
                _ => Err(format!("price amount out of range: {}", amount)),
            },
            ("amount", None) => Err("price kind 'amount' without a value".to_string()),
            ("sold", _) => Ok(Price::Sold),
            ("unknown", _) => Ok(Price::Unknown),
            (other, _) => Err(format!("Invalid price kind: {}", other)),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{}", amount),
            Price::Sold => f.write_str(SOLD_SENTINEL),
            Price::Unknown => f.write_str("unknown"),
        }
    }
}

// Stored as a JSON number, the string "sold", or null. Amounts an f64 cannot
// carry exactly are written as decimal strings instead.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Amount(amount) => match exact_f64(*amount) {
                Some(value) => serializer.serialize_f64(value),
                None => serializer.serialize_str(&amount.normalize().to_string()),
            },
            Price::Sold => serializer.serialize_str(SOLD_SENTINEL),
            Price::Unknown => serializer.serialize_none(),
        }
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, the string \"sold\", or null")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        Ok(Decimal::from_f64(value)
            .map_or(Price::Unknown, |amount| Price::from_amount(amount.normalize())))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        Ok(Price::from_amount(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        Ok(Price::from_amount(Decimal::from(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        Ok(Price::from_clean_text(&value.to_lowercase()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Price, E> {
        Ok(Price::Unknown)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Price, E> {
        Ok(Price::Unknown)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Price, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

/// `amount` as an f64, if reading that f64 back gives the same amount
fn exact_f64(amount: Decimal) -> Option<f64> {
    let value = amount.to_f64()?;
    let back = Decimal::from_f64(value)?;
    (back == amount).then_some(value)
}

/// One timestamped observation of a price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "Date")]
    pub observed_at: NaiveDateTime,
    #[serde(rename = "Price", default)]
    pub price: Price,
}

impl PricePoint {
    pub fn new(observed_at: NaiveDateTime, price: Price) -> Self {
        Self { observed_at, price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_parsing() {
        assert_eq!(Price::from_clean_text("sold"), Price::Sold);
        assert_eq!(
            Price::from_clean_text("12500"),
            Price::Amount(Decimal::new(12500, 0))
        );
        assert_eq!(
            Price::from_clean_text(" 999.50 "),
            Price::Amount(Decimal::new(99950, 2))
        );
        assert_eq!(Price::from_clean_text("chf 12500"), Price::Unknown);
        assert_eq!(Price::from_clean_text(""), Price::Unknown);
        assert_eq!(Price::from_clean_text("0"), Price::Unknown);
        assert_eq!(Price::from_clean_text("-5"), Price::Unknown);
    }

    #[test]
    fn test_numeric_equality_ignores_scale() {
        let a = Price::Amount(Decimal::new(1000, 0));
        let b = Price::Amount(Decimal::new(100000, 2));
        assert_eq!(a, b);
        assert_ne!(a, Price::Sold);
        assert_eq!(Price::Unknown, Price::Unknown);
    }

    #[test]
    fn test_json_sentinel_survives() {
        let json = serde_json::to_string(&Price::Sold).unwrap();
        assert_eq!(json, "\"sold\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Price::Sold);

        let unknown: Price = serde_json::from_str("null").unwrap();
        assert_eq!(unknown, Price::Unknown);
        assert_eq!(serde_json::to_string(&Price::Unknown).unwrap(), "null");

        let amount: Price = serde_json::from_str("1000.0").unwrap();
        assert_eq!(amount, Price::Amount(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_price_point_uses_original_keys() {
        let point: PricePoint =
            serde_json::from_str(r#"{"Date": "2024-03-01T10:11:12.123456", "Price": "sold"}"#)
                .unwrap();
        assert!(point.price.is_sold());

        let missing_price: PricePoint =
            serde_json::from_str(r#"{"Date": "2024-03-01T10:11:12"}"#).unwrap();
        assert!(missing_price.price.is_unknown());
    }

    #[test]
    fn test_precise_amount_survives_json() {
        let precise = Price::from_clean_text("1234.5678901234567");
        let json = serde_json::to_string(&precise).unwrap();
        assert_eq!(json, "\"1234.5678901234567\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, precise);

        let plain = Price::from_clean_text("1250.55");
        assert_eq!(serde_json::to_string(&plain).unwrap(), "1250.55");
    }

    #[test]
    fn test_amount_above_limit_is_unknown() {
        assert_eq!(Price::from_clean_text("1000000000000000"), Price::Amount(Price::max_amount()));
        assert_eq!(Price::from_clean_text("1000000000000001"), Price::Unknown);
        assert_eq!(
            Price::from_clean_text("79228162514264337593543950335"),
            Price::Unknown
        );
        let huge: Price = serde_json::from_str("1e30").unwrap();
        assert_eq!(huge, Price::Unknown);
        assert!(Price::from_kind("amount", Some(Decimal::MAX)).is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        let amount = Price::Amount(Decimal::new(42, 0));
        assert_eq!(Price::from_kind(amount.kind(), amount.amount()), Ok(amount));
        assert_eq!(Price::from_kind("sold", None), Ok(Price::Sold));
        assert!(Price::from_kind("amount", None).is_err());
        assert!(Price::from_kind("available", None).is_err());
    }
}
