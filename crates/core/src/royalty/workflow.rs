//! Royalty state transitions.
//!
//! Approval is all-or-nothing over a batch of ids. Payment settles every
//! unpaid entry of one (author, work) pair, approved or not.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use folio_shared::Money;
use folio_shared::types::{RoyaltyId, UserId, WorkId};

use crate::ledger::{LedgerStage, Staged};
use crate::royalty::error::{RejectedRoyalty, RejectionReason, RoyaltyError};
use crate::royalty::types::RoyaltyEntry;

/// Approved total for one author within a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorTotal {
    /// Sum of approved amounts.
    pub amount: Money,
    /// Number of approved entries.
    pub entries: usize,
}

/// Result of a successful batch approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    /// Approved ids, sorted.
    pub approved_ids: Vec<RoyaltyId>,
    /// Approval timestamp written on every entry.
    pub approved_at: DateTime<Utc>,
    /// Totals keyed by author, one notification each.
    pub per_author_totals: BTreeMap<UserId, AuthorTotal>,
}

impl ApprovalOutcome {
    /// Number of approved entries.
    #[must_use]
    pub fn approved_count(&self) -> usize {
        self.approved_ids.len()
    }
}

/// Result of settling one (author, work) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Settled ids.
    pub paid_ids: Vec<RoyaltyId>,
    /// Sum of settled amounts.
    pub total: Money,
    /// Settled entries that were never approved.
    pub unapproved_count: usize,
    /// Payment timestamp written on every entry.
    pub paid_at: DateTime<Utc>,
}

impl SettlementOutcome {
    /// Number of settled entries.
    #[must_use]
    pub fn paid_count(&self) -> usize {
        self.paid_ids.len()
    }
}

/// Stateless service for royalty transitions.
pub struct RoyaltyWorkflow;

impl RoyaltyWorkflow {
    /// Approves every entry named in `ids`.
    ///
    /// `entries` holds the rows loaded for the batch; ids without a row are
    /// reported as not found. Nothing is modified unless every id is pending.
    ///
    /// # Errors
    ///
    /// * `RoyaltyError::EmptyBatch` if `ids` is empty
    /// * `RoyaltyError::NotPending` listing every refused id
    pub fn approve(
        entries: &mut [RoyaltyEntry],
        ids: &[RoyaltyId],
        approved_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, RoyaltyError> {
        let wanted: BTreeSet<RoyaltyId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Err(RoyaltyError::EmptyBatch);
        }

        let mut rejected = Vec::new();
        for id in &wanted {
            let reason = match entries.iter().find(|e| e.id == *id) {
                None => Some(RejectionReason::NotFound),
                Some(e) if e.paid => Some(RejectionReason::AlreadyPaid),
                Some(e) if e.approved => Some(RejectionReason::AlreadyApproved),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                rejected.push(RejectedRoyalty { id: *id, reason });
            }
        }
        if !rejected.is_empty() {
            return Err(RoyaltyError::NotPending { rejected });
        }

        let mut per_author_totals: BTreeMap<UserId, AuthorTotal> = BTreeMap::new();
        for entry in entries.iter_mut().filter(|e| wanted.contains(&e.id)) {
            entry.approved = true;
            entry.approved_at = Some(now);
            entry.approved_by = Some(approved_by);

            let total = per_author_totals.entry(entry.author_id).or_default();
            total.amount = total
                .amount
                .checked_add(entry.amount)
                .ok_or(RoyaltyError::Overflow)?;
            total.entries += 1;
        }

        Ok(ApprovalOutcome {
            approved_ids: wanted.into_iter().collect(),
            approved_at: now,
            per_author_totals,
        })
    }

    /// Marks every unpaid entry of exactly (`author_id`, `work_id`) as paid.
    ///
    /// Approval is not required; entries that skip it are counted in
    /// `unapproved_count`.
    ///
    /// # Errors
    ///
    /// Returns `RoyaltyError::Overflow` if the settled total does not fit in
    /// an `i64`; entries are left untouched.
    pub fn settle(
        entries: &mut [RoyaltyEntry],
        author_id: UserId,
        work_id: WorkId,
        paid_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, RoyaltyError> {
        let owed = |e: &RoyaltyEntry| e.author_id == author_id && e.work_id == work_id && !e.paid;
        let total = Money::checked_sum(entries.iter().filter(|e| owed(e)).map(|e| e.amount))
            .ok_or(RoyaltyError::Overflow)?;

        let mut outcome = SettlementOutcome {
            paid_ids: Vec::new(),
            total,
            unapproved_count: 0,
            paid_at: now,
        };

        for entry in entries.iter_mut().filter(|e| owed(e)) {
            if LedgerStage::skips_stage(entry.stage(), LedgerStage::Settled) {
                outcome.unapproved_count += 1;
            }
            entry.paid = true;
            entry.paid_at = Some(now);
            entry.paid_by = Some(paid_by);

            outcome.paid_ids.push(entry.id);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(author: UserId, work: WorkId, amount: i64) -> RoyaltyEntry {
        RoyaltyEntry::pending(author, work, Money::from_fcfa(amount))
    }

    #[test]
    fn test_approve_groups_totals_by_author() {
        let (a1, a2) = (UserId::new(), UserId::new());
        let work = WorkId::new();
        let mut entries = vec![entry(a1, work, 1000), entry(a1, work, 500), entry(a2, work, 750)];
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        let pdg = UserId::new();
        let now = Utc::now();

        let outcome = RoyaltyWorkflow::approve(&mut entries, &ids, pdg, now).unwrap();

        assert_eq!(outcome.approved_count(), 3);
        assert_eq!(outcome.per_author_totals.len(), 2);
        assert_eq!(outcome.per_author_totals[&a1].amount, Money::from_fcfa(1500));
        assert_eq!(outcome.per_author_totals[&a1].entries, 2);
        assert_eq!(outcome.per_author_totals[&a2].amount, Money::from_fcfa(750));
        assert!(entries.iter().all(|e| e.approved && e.approved_at == Some(now)));
        assert!(entries.iter().all(|e| e.approved_by == Some(pdg)));
    }

    #[test]
    fn test_approve_rejects_whole_batch() {
        let author = UserId::new();
        let work = WorkId::new();
        let mut entries = vec![entry(author, work, 100), entry(author, work, 200)];
        entries[1].approved = true;
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();

        let err = RoyaltyWorkflow::approve(&mut entries, &ids, UserId::new(), Utc::now())
            .unwrap_err();

        match err {
            RoyaltyError::NotPending { rejected } => {
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].id, ids[1]);
                assert_eq!(rejected[0].reason, RejectionReason::AlreadyApproved);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!entries[0].approved);
        assert!(entries[0].approved_at.is_none());
    }

    #[test]
    fn test_approve_unknown_id() {
        let mut entries = vec![entry(UserId::new(), WorkId::new(), 100)];
        let ids = vec![entries[0].id, RoyaltyId::new()];

        let err = RoyaltyWorkflow::approve(&mut entries, &ids, UserId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            RoyaltyError::NotPending { ref rejected } if rejected[0].reason == RejectionReason::NotFound
        ));
        assert!(!entries[0].approved);
    }

    #[test]
    fn test_approve_empty_batch() {
        let err = RoyaltyWorkflow::approve(&mut [], &[], UserId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, RoyaltyError::EmptyBatch));
    }

    #[test]
    fn test_approve_paid_entry_rejected() {
        let mut entries = vec![entry(UserId::new(), WorkId::new(), 100)];
        entries[0].paid = true;
        let ids = vec![entries[0].id];

        let err = RoyaltyWorkflow::approve(&mut entries, &ids, UserId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            RoyaltyError::NotPending { ref rejected } if rejected[0].reason == RejectionReason::AlreadyPaid
        ));
    }

    #[test]
    fn test_duplicate_ids_counted_once() {
        let mut entries = vec![entry(UserId::new(), WorkId::new(), 100)];
        let ids = vec![entries[0].id, entries[0].id];

        let outcome =
            RoyaltyWorkflow::approve(&mut entries, &ids, UserId::new(), Utc::now()).unwrap();
        assert_eq!(outcome.approved_count(), 1);
    }

    #[test]
    fn test_settle_only_matching_pair() {
        let (author, other_author) = (UserId::new(), UserId::new());
        let (work, other_work) = (WorkId::new(), WorkId::new());
        let mut entries = vec![
            entry(author, work, 1000),
            entry(author, work, 400),
            entry(author, other_work, 300),
            entry(other_author, work, 200),
        ];
        entries[0].approved = true;

        let outcome =
            RoyaltyWorkflow::settle(&mut entries, author, work, UserId::new(), Utc::now()).unwrap();

        assert_eq!(outcome.paid_count(), 2);
        assert_eq!(outcome.total, Money::from_fcfa(1400));
        assert_eq!(outcome.unapproved_count, 1);
        assert!(entries[0].paid && entries[1].paid);
        assert!(!entries[2].paid && !entries[3].paid);
    }

    #[test]
    fn test_settle_overflow_leaves_entries_unpaid() {
        let author = UserId::new();
        let work = WorkId::new();
        let mut entries = vec![entry(author, work, i64::MAX), entry(author, work, 1)];

        let err = RoyaltyWorkflow::settle(&mut entries, author, work, UserId::new(), Utc::now())
            .unwrap_err();

        assert!(matches!(err, RoyaltyError::Overflow));
        assert!(entries.iter().all(|e| !e.paid));
    }

    #[test]
    fn test_settle_skips_already_paid() {
        let author = UserId::new();
        let work = WorkId::new();
        let earlier = Utc::now() - chrono::Duration::days(3);
        let mut entries = vec![entry(author, work, 1000)];
        entries[0].paid = true;
        entries[0].paid_at = Some(earlier);

        let outcome =
            RoyaltyWorkflow::settle(&mut entries, author, work, UserId::new(), Utc::now()).unwrap();

        assert_eq!(outcome.paid_count(), 0);
        assert_eq!(entries[0].paid_at, Some(earlier));
    }
}
