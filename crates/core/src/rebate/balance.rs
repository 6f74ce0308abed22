//! Rebate balance fold.

use folio_shared::Money;
use serde::Serialize;

use crate::rebate::error::RebateError;
use crate::rebate::types::{RebateEntry, RebateStatus};

/// Partner rebate totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateBalance {
    /// Sum of every entry, cancelled ones included.
    pub total_rebates: Money,
    /// Sum of validated and paid entries.
    pub total_validated: Money,
    /// Sum of paid entries.
    pub total_paid: Money,
    /// `total_validated - total_paid`.
    pub available: Money,
}

/// Folds `entries` into a balance. Recomputed on every query.
///
/// # Errors
///
/// Returns `RebateError::Overflow` if a total does not fit in an `i64`.
pub fn compute_balance<'a, I>(entries: I) -> Result<RebateBalance, RebateError>
where
    I: IntoIterator<Item = &'a RebateEntry>,
{
    let add = |total: Money, amount: Money| total.checked_add(amount).ok_or(RebateError::Overflow);

    let mut balance = RebateBalance::default();
    for entry in entries {
        balance.total_rebates = add(balance.total_rebates, entry.amount)?;
        match entry.status {
            RebateStatus::Validated => {
                balance.total_validated = add(balance.total_validated, entry.amount)?;
            }
            RebateStatus::Paid => {
                balance.total_validated = add(balance.total_validated, entry.amount)?;
                balance.total_paid = add(balance.total_paid, entry.amount)?;
            }
            RebateStatus::Accrued | RebateStatus::Cancelled => {}
        }
    }
    balance.available = balance
        .total_validated
        .checked_sub(balance.total_paid)
        .ok_or(RebateError::Overflow)?;
    Ok(balance)
}
