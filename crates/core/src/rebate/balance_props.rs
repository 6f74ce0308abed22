//! Property-based tests for the rebate balance fold.

use folio_shared::Money;
use folio_shared::types::PartnerId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::rebate::balance::compute_balance;
use crate::rebate::types::{RebateEntry, RebateStatus};

fn arb_status() -> impl Strategy<Value = RebateStatus> {
    prop_oneof![
        Just(RebateStatus::Accrued),
        Just(RebateStatus::Validated),
        Just(RebateStatus::Paid),
        Just(RebateStatus::Cancelled),
    ]
}

fn arb_entries() -> impl Strategy<Value = Vec<RebateEntry>> {
    prop::collection::vec((0i64..1_000_000, arb_status()), 0..50).prop_map(|rows| {
        let partner = PartnerId::new();
        rows.into_iter()
            .map(|(amount, status)| {
                RebateEntry::accrued(partner, Money::from_fcfa(amount), Decimal::TEN)
                    .with_status(status)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// available equals the sum of validated, unpaid entries
    #[test]
    fn prop_available_is_validated_unpaid(entries in arb_entries()) {
        let balance = compute_balance(&entries).unwrap();
        let validated = Money::checked_sum(
            entries
                .iter()
                .filter(|e| e.status == RebateStatus::Validated)
                .map(|e| e.amount),
        )
        .unwrap();
        prop_assert_eq!(balance.available, validated);
        prop_assert!(balance.available >= Money::ZERO);
    }

    /// the fold ignores entry order
    #[test]
    fn prop_order_independent(entries in arb_entries()) {
        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert_eq!(compute_balance(&entries).unwrap(), compute_balance(&reversed).unwrap());
    }

    /// totals are nested: paid <= validated <= all
    #[test]
    fn prop_totals_nested(entries in arb_entries()) {
        let b = compute_balance(&entries).unwrap();
        prop_assert!(b.total_paid <= b.total_validated);
        prop_assert!(b.total_validated <= b.total_rebates);
    }
}
