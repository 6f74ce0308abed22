//! Rebate status transitions.
//!
//! - Accrued → Validated (`Validate`)
//! - Validated → Paid (`MarkPaid`)
//! - Accrued | Validated → Cancelled (`Cancel`)
//!
//! Batches are all-or-nothing: one refused id leaves every entry untouched.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use folio_shared::Money;
use folio_shared::types::RebateId;

use crate::ledger::LedgerStage;
use crate::rebate::error::RebateError;
use crate::rebate::types::{RebateEntry, RebateStatus};

/// A batch action on rebate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebateTransition {
    /// Accrued → Validated.
    Validate,
    /// Validated → Paid.
    MarkPaid,
    /// Accrued | Validated → Cancelled.
    Cancel,
}

impl RebateTransition {
    /// Status written by the transition.
    #[must_use]
    pub const fn target(self) -> RebateStatus {
        match self {
            Self::Validate => RebateStatus::Validated,
            Self::MarkPaid => RebateStatus::Paid,
            Self::Cancel => RebateStatus::Cancelled,
        }
    }

    /// Statuses the transition accepts.
    #[must_use]
    pub const fn sources(self) -> &'static [RebateStatus] {
        match self {
            Self::Validate => &[RebateStatus::Accrued],
            Self::MarkPaid => &[RebateStatus::Validated],
            Self::Cancel => &[RebateStatus::Accrued, RebateStatus::Validated],
        }
    }

    /// Returns true if an entry in `status` may take this transition.
    #[must_use]
    pub fn accepts(self, status: RebateStatus) -> bool {
        self.sources().contains(&status)
            && LedgerStage::is_forward(status.stage(), self.target().stage())
    }
}

/// Result of a successful batch transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Transitioned ids, sorted.
    pub ids: Vec<RebateId>,
    /// Status written.
    pub status: RebateStatus,
    /// Sum of transitioned amounts.
    pub total: Money,
    /// Timestamp of the transition.
    pub at: DateTime<Utc>,
}

impl TransitionOutcome {
    /// Number of transitioned entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

/// Stateless service for rebate transitions.
pub struct RebateLedger;

impl RebateLedger {
    /// Applies `transition` to every entry named in `ids`.
    ///
    /// # Errors
    ///
    /// * `RebateError::EmptyBatch` if `ids` is empty
    /// * `RebateError::InvalidTransition` listing missing or refused ids
    pub fn transition(
        entries: &mut [RebateEntry],
        ids: &[RebateId],
        transition: RebateTransition,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, RebateError> {
        let wanted: BTreeSet<RebateId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Err(RebateError::EmptyBatch);
        }

        let rejected: Vec<RebateId> = wanted
            .iter()
            .filter(|id| {
                !entries
                    .iter()
                    .any(|e| e.id == **id && transition.accepts(e.status))
            })
            .copied()
            .collect();
        if !rejected.is_empty() {
            return Err(RebateError::InvalidTransition {
                rejected,
                target: transition.target(),
            });
        }

        let mut total = Money::ZERO;
        for entry in entries.iter_mut().filter(|e| wanted.contains(&e.id)) {
            entry.status = transition.target();
            match transition {
                RebateTransition::Validate => entry.validated_at = Some(now),
                RebateTransition::MarkPaid => entry.paid_at = Some(now),
                RebateTransition::Cancel => {}
            }
            total = total.checked_add(entry.amount).ok_or(RebateError::Overflow)?;
        }

        Ok(TransitionOutcome {
            ids: wanted.into_iter().collect(),
            status: transition.target(),
            total,
            at: now,
        })
    }
}
