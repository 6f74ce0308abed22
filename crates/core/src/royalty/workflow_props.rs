//! Property-based tests for royalty transitions.

use chrono::Utc;
use folio_shared::Money;
use folio_shared::types::{UserId, WorkId};
use proptest::prelude::*;

use crate::royalty::error::RoyaltyError;
use crate::royalty::types::RoyaltyEntry;
use crate::royalty::workflow::RoyaltyWorkflow;

/// Entries spread over a few authors and works, with random flags.
fn arb_entries() -> impl Strategy<Value = Vec<RoyaltyEntry>> {
    let authors: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();
    let works: Vec<WorkId> = (0..3).map(|_| WorkId::new()).collect();
    prop::collection::vec(
        (0usize..3, 0usize..3, 0i64..100_000, any::<bool>(), any::<bool>()),
        1..20,
    )
    .prop_map(move |rows| {
        rows.into_iter()
            .map(|(a, w, amount, approved, paid)| {
                let mut e = RoyaltyEntry::pending(authors[a], works[w], Money::from_fcfa(amount));
                e.approved = approved;
                e.paid = paid;
                e
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// approval succeeds iff every selected entry is pending, and a refused
    /// batch leaves every entry unchanged
    #[test]
    fn prop_approval_all_or_nothing(
        entries in arb_entries(),
        mask in prop::collection::vec(any::<bool>(), 20),
    ) {
        let ids: Vec<_> = entries
            .iter()
            .zip(&mask)
            .filter(|(_, pick)| **pick)
            .map(|(e, _)| e.id)
            .collect();
        prop_assume!(!ids.is_empty());

        let all_pending = entries.iter().filter(|e| ids.contains(&e.id)).all(RoyaltyEntry::is_pending);
        let before = entries.clone();
        let mut after = entries;

        match RoyaltyWorkflow::approve(&mut after, &ids, UserId::new(), Utc::now()) {
            Ok(outcome) => {
                prop_assert!(all_pending);
                prop_assert_eq!(outcome.approved_count(), ids.len());
                let notified = Money::checked_sum(outcome.per_author_totals.values().map(|t| t.amount));
                let selected = Money::checked_sum(before.iter().filter(|e| ids.contains(&e.id)).map(|e| e.amount));
                prop_assert_eq!(notified, selected);
            }
            Err(RoyaltyError::NotPending { rejected }) => {
                prop_assert!(!all_pending);
                prop_assert!(!rejected.is_empty());
                prop_assert_eq!(before, after);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// settlement flips exactly the unpaid entries of the target pair
    #[test]
    fn prop_settle_touches_only_target(entries in arb_entries(), pick in 0usize..20) {
        let target = &entries[pick % entries.len()];
        let (author, work) = (target.author_id, target.work_id);
        let before = entries.clone();
        let mut after = entries;

        let outcome = RoyaltyWorkflow::settle(&mut after, author, work, UserId::new(), Utc::now()).unwrap();

        for (old, new) in before.iter().zip(&after) {
            let targeted = old.author_id == author && old.work_id == work && !old.paid;
            if targeted {
                prop_assert!(new.paid);
                prop_assert!(outcome.paid_ids.contains(&old.id));
            } else {
                prop_assert_eq!(old, new);
            }
        }
    }
}
