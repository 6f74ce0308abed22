//! Royalty domain types.

use chrono::{DateTime, Utc};
use folio_shared::Money;
use folio_shared::types::{RoyaltyId, UserId, WorkId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::{LedgerStage, Staged};

/// Status derived from the `approved` / `paid` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoyaltyStatus {
    /// Created on sale, awaiting approval.
    Pending,
    /// Approved, awaiting payment.
    Approved,
    /// Paid (terminal).
    Paid,
}

impl RoyaltyStatus {
    /// Derives the status from stored flags. `paid` wins over `approved`.
    #[must_use]
    pub const fn from_flags(approved: bool, paid: bool) -> Self {
        match (approved, paid) {
            (_, true) => Self::Paid,
            (true, false) => Self::Approved,
            (false, false) => Self::Pending,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Paid => "PAID",
        }
    }

    /// Maps the status onto the shared stage machine.
    #[must_use]
    pub const fn stage(self) -> LedgerStage {
        match self {
            Self::Pending => LedgerStage::Open,
            Self::Approved => LedgerStage::Confirmed,
            Self::Paid => LedgerStage::Settled,
        }
    }
}

impl fmt::Display for RoyaltyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One royalty owed to an author for a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyEntry {
    /// Entry id.
    pub id: RoyaltyId,
    /// Author owed the royalty.
    pub author_id: UserId,
    /// Work sold.
    pub work_id: WorkId,
    /// Amount owed.
    pub amount: Money,
    /// Approval flag.
    pub approved: bool,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approving user.
    pub approved_by: Option<UserId>,
    /// Payment flag.
    pub paid: bool,
    /// Payment time.
    pub paid_at: Option<DateTime<Utc>>,
    /// Paying user.
    pub paid_by: Option<UserId>,
}

impl RoyaltyEntry {
    /// Creates a pending entry.
    #[must_use]
    pub fn pending(author_id: UserId, work_id: WorkId, amount: Money) -> Self {
        Self {
            id: RoyaltyId::new(),
            author_id,
            work_id,
            amount,
            approved: false,
            approved_at: None,
            approved_by: None,
            paid: false,
            paid_at: None,
            paid_by: None,
        }
    }

    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> RoyaltyStatus {
        RoyaltyStatus::from_flags(self.approved, self.paid)
    }

    /// Returns true while the entry awaits approval.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.approved && !self.paid
    }
}

impl Staged for RoyaltyEntry {
    fn stage(&self) -> LedgerStage {
        self.status().stage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_flags() {
        assert_eq!(RoyaltyStatus::from_flags(false, false), RoyaltyStatus::Pending);
        assert_eq!(RoyaltyStatus::from_flags(true, false), RoyaltyStatus::Approved);
        assert_eq!(RoyaltyStatus::from_flags(true, true), RoyaltyStatus::Paid);
        // paid without approval is still paid
        assert_eq!(RoyaltyStatus::from_flags(false, true), RoyaltyStatus::Paid);
    }

    #[test]
    fn test_stage_mapping() {
        let entry = RoyaltyEntry::pending(UserId::new(), WorkId::new(), Money::from_fcfa(1000));
        assert!(entry.is_pending());
        assert_eq!(entry.stage(), LedgerStage::Open);
        assert_eq!(RoyaltyStatus::Paid.stage(), LedgerStage::Settled);
        assert_eq!(RoyaltyStatus::Approved.to_string(), "APPROVED");
    }
}
