//! Unit price of a line item.
//!
//! The cart never interprets a price beyond multiplying it by a quantity for
//! the summary. A price holds the JSON number it was built from, digit for
//! digit (serde_json's `arbitrary_precision`), so a snapshot written and read
//! back yields the same price even when it does not fit a `Decimal`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A unit price, kept as the exact JSON number it was given as.
///
/// Equality is textual: `10` and `10.0` are different prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Number);

impl Price {
    /// Create a price from a float. Returns `None` for NaN or infinity.
    #[must_use]
    pub fn from_f64(amount: f64) -> Option<Self> {
        Number::from_f64(amount).map(Self)
    }

    /// The price as written.
    #[must_use]
    pub const fn as_number(&self) -> &Number {
        &self.0
    }

    /// The price as a decimal, or `None` if it does not fit one.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        let raw = self.0.to_string();
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .ok()
    }

    /// Price of `quantity` units, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn times(&self, quantity: i64) -> Option<Decimal> {
        self.amount()?.checked_mul(Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Number> for Price {
    fn from(amount: Number) -> Self {
        Self(amount)
    }
}

impl From<i32> for Price {
    fn from(amount: i32) -> Self {
        Self(Number::from(amount))
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Number::from(amount))
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(Number::from(amount))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = serde_json::Error;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        amount.to_string().parse()
    }
}

impl FromStr for Price {
    type Err = serde_json::Error;

    /// Parse a JSON number literal such as `19.99` or `1e30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<Number>(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_verbatim() {
        assert_eq!(Price::from(10).to_string(), "10");
        assert_eq!("19.90".parse::<Price>().unwrap().to_string(), "19.90");
        assert_eq!("1e30".parse::<Price>().unwrap().to_string(), "1e30");
    }

    #[test]
    fn test_serializes_as_given() {
        let json = serde_json::to_string(&Price::from(10)).unwrap();
        assert_eq!(json, "10");

        let precise: Price = serde_json::from_str("19.990000000000000000000001").unwrap();
        assert_eq!(
            serde_json::to_string(&precise).unwrap(),
            "19.990000000000000000000001"
        );
    }

    #[test]
    fn test_deserializes_integer_and_float() {
        let int: Price = serde_json::from_str("10").unwrap();
        assert_eq!(int, Price::from(10));

        let float: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(float, "19.99".parse().unwrap());
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert!("abc".parse::<Price>().is_err());
        assert!(serde_json::from_str::<Price>(r#""10""#).is_err());
        assert!(Price::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_from_decimal() {
        let price = Price::try_from(Decimal::new(550, 2)).unwrap();
        assert_eq!(price.to_string(), "5.50");
        assert_eq!(price.amount(), Some(Decimal::new(550, 2)));
    }

    #[test]
    fn test_amount_of_exponent_form() {
        let price: Price = "2.5e2".parse().unwrap();
        assert_eq!(price.amount(), Some(Decimal::from(250)));

        let huge: Price = "1e30".parse().unwrap();
        assert_eq!(huge.amount(), None);
        assert_eq!(huge.times(2), None);
    }

    #[test]
    fn test_times() {
        let price: Price = "2.50".parse().unwrap();
        assert_eq!(price.times(3), Some(Decimal::new(750, 2)));
        assert_eq!(price.times(-1), Some(Decimal::new(-250, 2)));
    }
}
