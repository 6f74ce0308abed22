//! Royalty amount owed on a sale.

use folio_shared::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::royalty::error::RoyaltyError;

/// How a work's royalty rate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoyaltyBasis {
    /// Rate is a percentage of the sale amount.
    Percentage,
    /// Rate is a flat FCFA amount per copy.
    Fixed,
}

/// Royalty terms stored on a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRoyaltyTerms {
    /// Percentage or FCFA per copy, depending on `basis`.
    pub rate: Decimal,
    /// Rate interpretation.
    pub basis: RoyaltyBasis,
}

/// Computed royalty for one (order, work) line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoyaltyQuote {
    /// Amount owed.
    pub amount: Money,
    /// Rate applied.
    pub rate: Decimal,
    /// Rate interpretation.
    pub basis: RoyaltyBasis,
}

/// Computes the royalty owed on `quantity` copies sold for `sale_amount`.
///
/// The work's own positive rate wins. Otherwise `fallback_rate` (already
/// resolved through the rate hierarchy) applies as a percentage.
///
/// # Errors
///
/// Returns `RoyaltyError::Overflow` if the amount does not fit in `Money`.
pub fn compute_royalty(
    terms: Option<WorkRoyaltyTerms>,
    sale_amount: Money,
    quantity: i64,
    fallback_rate: Decimal,
) -> Result<RoyaltyQuote, RoyaltyError> {
    match terms {
        Some(t) if t.rate > Decimal::ZERO => {
            let amount = match t.basis {
                RoyaltyBasis::Percentage => sale_amount.apply_percentage(t.rate),
                RoyaltyBasis::Fixed => t
                    .rate
                    .checked_mul(Decimal::from(quantity))
                    .and_then(Money::from_decimal),
            }
            .ok_or(RoyaltyError::Overflow)?;
            Ok(RoyaltyQuote {
                amount,
                rate: t.rate,
                basis: t.basis,
            })
        }
        _ => Ok(RoyaltyQuote {
            amount: sale_amount
                .apply_percentage(fallback_rate)
                .ok_or(RoyaltyError::Overflow)?,
            rate: fallback_rate,
            basis: RoyaltyBasis::Percentage,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_terms() {
        let terms = WorkRoyaltyTerms {
            rate: dec!(12.5),
            basis: RoyaltyBasis::Percentage,
        };
        let quote = compute_royalty(Some(terms), Money::from_fcfa(10_000), 2, dec!(15)).unwrap();
        assert_eq!(quote.amount, Money::from_fcfa(1250));
        assert_eq!(quote.rate, dec!(12.5));
    }

    #[test]
    fn test_fixed_terms_scale_with_quantity() {
        let terms = WorkRoyaltyTerms {
            rate: dec!(300),
            basis: RoyaltyBasis::Fixed,
        };
        let quote = compute_royalty(Some(terms), Money::from_fcfa(10_000), 4, dec!(15)).unwrap();
        assert_eq!(quote.amount, Money::from_fcfa(1200));
        assert_eq!(quote.basis, RoyaltyBasis::Fixed);
    }

    #[test]
    fn test_zero_rate_falls_back() {
        let terms = WorkRoyaltyTerms {
            rate: Decimal::ZERO,
            basis: RoyaltyBasis::Fixed,
        };
        let quote = compute_royalty(Some(terms), Money::from_fcfa(3000), 1, dec!(15)).unwrap();
        assert_eq!(quote.amount, Money::from_fcfa(450));
        assert_eq!(quote.basis, RoyaltyBasis::Percentage);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let quote = compute_royalty(None, Money::from_fcfa(1005), 1, dec!(10)).unwrap();
        // 100.5 rounds up
        assert_eq!(quote.amount, Money::from_fcfa(101));
    }
}
