//! Money type for CFA franc amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! The West African CFA franc (XOF) has no subunit, so amounts are whole
//! francs stored as `i64`. Percentage rates go through `rust_decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in whole CFA francs.
///
/// Serialized as a plain JSON integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero francs.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from whole francs.
    #[must_use]
    pub const fn from_fcfa(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the amount in whole francs.
    #[must_use]
    pub const fn fcfa(self) -> i64 {
        self.0
    }

    /// Returns the larger of `self` and zero.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Subtracts `rhs`, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Sums `amounts`, returning `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// `self - rhs` floored at zero. An overflowing difference is treated as
    /// nothing left.
    #[must_use]
    pub fn remaining_after(self, rhs: Self) -> Self {
        self.checked_sub(rhs)
            .map_or(Self::ZERO, Self::clamp_non_negative)
    }

    /// Multiplies by an integer quantity, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul_quantity(self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Applies a percentage rate (e.g. `12.5` for 12.5 %).
    ///
    /// The result is rounded half away from zero to whole francs. Returns
    /// `None` if the result does not fit in an `i64`.
    #[must_use]
    pub fn apply_percentage(self, rate: Decimal) -> Option<Self> {
        let raw = Decimal::from(self.0).checked_mul(rate)? / Decimal::ONE_HUNDRED;
        raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }

    /// Converts a decimal amount, rounding half away from zero.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} FCFA", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_fcfa(1000);
        let b = Money::from_fcfa(300);
        assert_eq!(a.checked_add(b), Some(Money::from_fcfa(1300)));
        assert_eq!(a.checked_sub(b), Some(Money::from_fcfa(700)));
        assert_eq!(b.checked_sub(a), Some(Money::from_fcfa(-700)));
    }

    #[test]
    fn test_money_overflow_is_reported() {
        let max = Money::from_fcfa(i64::MAX);
        assert_eq!(max.checked_add(Money::from_fcfa(1)), None);
        assert_eq!(Money::from_fcfa(i64::MIN).checked_sub(Money::from_fcfa(1)), None);
        assert_eq!(Money::checked_sum([max, Money::from_fcfa(1)]), None);
    }

    #[test]
    fn test_money_sum() {
        let amounts = [Money::from_fcfa(1000), Money::from_fcfa(500), Money::from_fcfa(300)];
        assert_eq!(Money::checked_sum(amounts), Some(Money::from_fcfa(1800)));
        assert_eq!(Money::checked_sum(std::iter::empty()), Some(Money::ZERO));
    }

    #[test]
    fn test_remaining_after() {
        let a = Money::from_fcfa(1000);
        assert_eq!(a.remaining_after(Money::from_fcfa(400)), Money::from_fcfa(600));
        assert_eq!(a.remaining_after(Money::from_fcfa(4000)), Money::ZERO);
        assert_eq!(a.remaining_after(Money::from_fcfa(i64::MIN)), Money::ZERO);
    }

    #[test]
    fn test_money_clamp_non_negative() {
        assert_eq!(Money::from_fcfa(-5).clamp_non_negative(), Money::ZERO);
        assert_eq!(Money::from_fcfa(5).clamp_non_negative(), Money::from_fcfa(5));
    }

    #[rstest]
    #[case(10_000, dec!(10), 1_000)]
    #[case(10_000, dec!(15), 1_500)]
    #[case(3_333, dec!(10), 333)]
    #[case(3_335, dec!(10), 334)]
    #[case(2_500, dec!(12.5), 313)]
    #[case(0, dec!(50), 0)]
    fn test_apply_percentage(#[case] amount: i64, #[case] rate: Decimal, #[case] expected: i64) {
        assert_eq!(
            Money::from_fcfa(amount).apply_percentage(rate),
            Some(Money::from_fcfa(expected))
        );
    }

    #[test]
    fn test_checked_mul_quantity_overflow() {
        assert_eq!(
            Money::from_fcfa(500).checked_mul_quantity(3),
            Some(Money::from_fcfa(1500))
        );
        assert_eq!(Money::from_fcfa(i64::MAX).checked_mul_quantity(2), None);
    }

    #[test]
    fn test_money_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_fcfa(1500)).unwrap();
        assert_eq!(json, "1500");
        let parsed: Money = serde_json::from_str("750").unwrap();
        assert_eq!(parsed, Money::from_fcfa(750));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_fcfa(1500).to_string(), "1500 FCFA");
    }
}
