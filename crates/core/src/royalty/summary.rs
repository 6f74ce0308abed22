//! Author dashboard totals.

use folio_shared::Money;
use serde::Serialize;

use crate::royalty::error::RoyaltyError;
use crate::royalty::types::RoyaltyEntry;

/// Royalty totals of one author, folded from the full entry history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltySummary {
    /// Sum of every entry.
    pub total_royalties: Money,
    /// Sum of paid entries.
    pub paid_royalties: Money,
    /// Sum of approved, unpaid entries.
    pub approved_royalties: Money,
    /// Sum of entries awaiting approval.
    pub pending_royalties: Money,
    /// Number of paid entries.
    pub total_payments: usize,
    /// Number of entries awaiting approval.
    pub pending_payments: usize,
    /// Sum of approved or paid withdrawals.
    pub total_withdrawn: Money,
    /// `max(0, approved_royalties - total_withdrawn)`.
    pub available_balance: Money,
}

impl RoyaltySummary {
    /// Folds `entries` and the author's settled withdrawals.
    ///
    /// # Errors
    ///
    /// Returns `RoyaltyError::Overflow` if a total does not fit in an `i64`.
    pub fn compute(entries: &[RoyaltyEntry], total_withdrawn: Money) -> Result<Self, RoyaltyError> {
        let add = |total: Money, amount: Money| total.checked_add(amount).ok_or(RoyaltyError::Overflow);

        let mut summary = Self {
            total_withdrawn,
            ..Self::default()
        };
        for entry in entries {
            summary.total_royalties = add(summary.total_royalties, entry.amount)?;
            if entry.paid {
                summary.paid_royalties = add(summary.paid_royalties, entry.amount)?;
                summary.total_payments += 1;
            } else if entry.approved {
                summary.approved_royalties = add(summary.approved_royalties, entry.amount)?;
            } else {
                summary.pending_royalties = add(summary.pending_royalties, entry.amount)?;
                summary.pending_payments += 1;
            }
        }
        summary.available_balance = summary.approved_royalties.remaining_after(total_withdrawn);
        Ok(summary)
    }
}
