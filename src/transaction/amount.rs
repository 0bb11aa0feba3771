//! Monetary amounts stored as whole cents.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// The largest amount a single transaction may have.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Why a number is not a valid amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Zero, negative, infinite or NaN.
    #[error("must be a positive number")]
    NotPositive,
    /// Positive, but it rounds to zero cents.
    #[error("must be at least 0.01")]
    TooSmall,
    /// Larger than [MAX_AMOUNT].
    #[error("must be at most 1000000000000")]
    TooLarge,
}

/// A positive amount of money rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    /// Validate `value` and round it to the nearest cent, with halves rounded away from zero.
    ///
    /// The rounding is done on the shortest decimal representation of `value`
    /// so that 19.995 becomes 20.00 even though the nearest `f64` is slightly
    /// below 19.995.
    ///
    /// # Errors
    ///
    /// Returns an [AmountError] if `value` is not positive and finite, rounds
    /// to zero, or is larger than [MAX_AMOUNT].
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(AmountError::NotPositive);
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge);
        }

        // Values too small for a `Decimal` would round to zero anyway.
        let decimal = Decimal::from_str(&value.to_string()).map_err(|_| AmountError::TooSmall)?;
        let cents = (decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(AmountError::TooLarge)?;

        if cents == 0 {
            return Err(AmountError::TooSmall);
        }

        Ok(Self { cents })
    }

    /// Create an amount from a number of cents without validation.
    ///
    /// The caller should ensure that `cents` is positive.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// The amount in whole cents.
    #[cfg(test)]
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// The amount in dollars, e.g. 2000 cents is 20.0.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;

        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Amount::from_cents)
    }
}
