//! Property records and their value types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, Result};

/// Highest accepted price, in cents ($10,000,000.00).
pub const MAX_PRICE_CENTS: u64 = 1_000_000_000;

// == Price ==
/// Non-negative fixed-point amount with two decimal places, held as cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Price::from_units(100)` is `100.00`.
    pub const fn from_units(units: u64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Display form with thousands separators, e.g. `$1,500.00`.
    pub fn formatted(self) -> String {
        let units = (self.0 / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, digit) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        format!("${}.{:02}", grouped, self.0 % 100)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = AppError;

    /// Accepts `1500`, `1500.5` and `1500.50`. Signs, exponents and more than
    /// two decimal places are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AppError::InvalidRequest(format!("Invalid price '{}'", s));
        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.ends_with('.') {
            return Err(invalid());
        }

        let units: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Price)
            .ok_or_else(invalid)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PriceVisitor;

        impl<'de> de::Visitor<'de> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or a whole number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Price, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Price, E> {
                v.checked_mul(100)
                    .map(Price)
                    .ok_or_else(|| E::custom("price out of range"))
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

// == Property ==
/// A listed property as stored and as cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

// == New Property ==
/// Input of the create path.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
}

impl NewProperty {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: Price,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price,
            location: location.into(),
        }
    }

    /// Trims text fields and checks them; returns the cleaned record.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            title: required_text("title", &self.title)?,
            description: self.description.trim().to_string(),
            price: checked_price(self.price)?,
            location: required_text("location", &self.location)?,
        })
    }
}

// == Property Changes ==
/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub location: Option<String>,
}

impl PropertyChanges {
    pub fn price(price: Price) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// Applies the changes on top of `current`, validating changed fields.
    pub fn apply(self, current: &Property) -> Result<Property> {
        let mut updated = current.clone();
        if let Some(title) = self.title {
            updated.title = required_text("title", &title)?;
        }
        if let Some(description) = self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(price) = self.price {
            updated.price = checked_price(price)?;
        }
        if let Some(location) = self.location {
            updated.location = required_text("location", &location)?;
        }
        Ok(updated)
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn checked_price(price: Price) -> Result<Price> {
    if price.cents() > MAX_PRICE_CENTS {
        return Err(AppError::InvalidRequest(format!(
            "Price cannot exceed {}",
            Price::from_cents(MAX_PRICE_CENTS).formatted()
        )));
    }
    Ok(price)
}
