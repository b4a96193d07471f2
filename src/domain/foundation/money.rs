//! Money value object.
//!
//! Amounts are integer minor units (cents) tagged with an ISO 4217 currency
//! code. The gateway reports decimal amounts; conversion happens once, at the
//! boundary, through [`Money::from_decimal`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Non-negative amount of money in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount_cents: i64,
    currency: String,
}

impl Money {
    /// Creates an amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns error for negative amounts or a currency that is not three
    /// ASCII letters.
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                0,
                i64::MAX,
                amount_cents,
            ));
        }
        let currency = normalize_currency(currency.into())?;
        Ok(Self {
            amount_cents,
            currency,
        })
    }

    /// Zero in the given currency.
    pub fn zero(currency: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(0, currency)
    }

    /// Converts a decimal amount (as reported by the gateway) to minor units,
    /// rounding to the nearest cent.
    pub fn from_decimal(amount: f64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::invalid_format("amount", "not a finite number"));
        }
        Self::new((amount * 100.0).round() as i64, currency)
    }

    /// Amount in minor units.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// ISO currency code (upper case).
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Decimal representation sent to the gateway.
    pub fn as_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns error on currency mismatch or overflow.
    pub fn checked_add(&self, other: &Money) -> Result<Money, ValidationError> {
        if self.currency != other.currency {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("cannot add {} to {}", other.currency, self.currency),
            ));
        }
        let amount_cents = self
            .amount_cents
            .checked_add(other.amount_cents)
            .ok_or_else(|| ValidationError::invalid_format("amount_cents", "overflow"))?;
        Ok(Money {
            amount_cents,
            currency: self.currency.clone(),
        })
    }

    /// Sums a list of amounts, starting from zero in `currency`.
    pub fn sum<'a>(
        currency: &str,
        amounts: impl IntoIterator<Item = &'a Money>,
    ) -> Result<Money, ValidationError> {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency)?, |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{:02}",
            self.currency,
            self.amount_cents / 100,
            self.amount_cents % 100
        )
    }
}

fn normalize_currency(currency: String) -> Result<String, ValidationError> {
    let upper = currency.trim().to_ascii_uppercase();
    if upper.len() != 3 || !upper.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid_format(
            "currency",
            format!("'{}' is not an ISO 4217 code", currency),
        ));
    }
    Ok(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(-1, "BRL").is_err());
    }

    #[test]
    fn normalizes_currency_case() {
        let money = Money::new(100, "brl").unwrap();
        assert_eq!(money.currency(), "BRL");
    }

    #[test]
    fn rejects_bad_currency() {
        assert!(Money::new(100, "REAL").is_err());
        assert!(Money::new(100, "B1L").is_err());
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        assert_eq!(Money::from_decimal(199.9, "BRL").unwrap().amount_cents(), 19990);
        assert_eq!(Money::from_decimal(0.1 + 0.2, "BRL").unwrap().amount_cents(), 30);
    }

    #[test]
    fn from_decimal_rejects_nan() {
        assert!(Money::from_decimal(f64::NAN, "BRL").is_err());
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let brl = Money::new(100, "BRL").unwrap();
        let usd = Money::new(100, "USD").unwrap();
        assert!(brl.checked_add(&usd).is_err());
    }

    #[test]
    fn sum_of_empty_list_is_zero() {
        let total = Money::sum("BRL", Vec::<&Money>::new()).unwrap();
        assert_eq!(total.amount_cents(), 0);
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::new(19905, "BRL").unwrap().to_string(), "BRL 199.05");
    }

    proptest! {
        #[test]
        fn decimal_conversion_is_stable(cents in 0i64..10_000_000_000) {
            let money = Money::new(cents, "BRL").unwrap();
            let back = Money::from_decimal(money.as_decimal(), "BRL").unwrap();
            prop_assert_eq!(back.amount_cents(), cents);
        }

        #[test]
        fn sum_matches_integer_sum(values in proptest::collection::vec(0i64..1_000_000, 0..20)) {
            let amounts: Vec<Money> = values.iter().map(|v| Money::new(*v, "BRL").unwrap()).collect();
            let total = Money::sum("BRL", amounts.iter()).unwrap();
            prop_assert_eq!(total.amount_cents(), values.iter().sum::<i64>());
        }
    }
}
