//! Property-based tests for stock positions.

use folio_shared::types::{PartnerId, WorkId};
use proptest::prelude::*;

use crate::stock::error::StockError;
use crate::stock::position::{
    StockMovement, StockPosition, compute_available, has_sufficient_stock,
};

/// Strategy for consistent positions: allocated >= sold >= returned >= 0.
fn arb_position() -> impl Strategy<Value = StockPosition> {
    (0i64..100_000)
        .prop_flat_map(|allocated| (Just(allocated), 0..=allocated))
        .prop_flat_map(|(allocated, sold)| (Just(allocated), Just(sold), 0..=sold))
        .prop_map(|(allocated, sold, returned)| StockPosition {
            allocated_quantity: allocated,
            sold_quantity: sold,
            returned_quantity: returned,
            ..StockPosition::empty(PartnerId::new(), WorkId::new())
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// available is exactly allocated - sold + returned
    #[test]
    fn prop_available_is_exact(
        allocated in 0i64..1_000_000,
        sold_ratio in 0u32..=100,
        returned in 0i64..1_000_000,
    ) {
        let sold = allocated * i64::from(sold_ratio) / 100;
        prop_assert_eq!(compute_available(allocated, sold, returned), allocated - sold + returned);
    }

    /// sufficiency holds iff requested <= available, boundary included
    #[test]
    fn prop_sufficiency_boundary(position in arb_position()) {
        let available = position.available();
        prop_assert!(has_sufficient_stock(&position, available));
        prop_assert!(!has_sufficient_stock(&position, available + 1));
    }

    #[test]
    fn prop_sufficiency_matches_available(position in arb_position(), n in 0i64..200_000) {
        prop_assert_eq!(has_sufficient_stock(&position, n), n <= position.available());
    }

    /// a sale never drives available below zero
    #[test]
    fn prop_sale_keeps_available_non_negative(position in arb_position(), n in 1i64..200_000) {
        match position.apply(StockMovement::Sale(n)) {
            Ok(next) => {
                prop_assert!(next.available() >= 0);
                prop_assert_eq!(next.available(), position.available() - n);
            }
            Err(StockError::InsufficientStock { available, requested }) => {
                prop_assert_eq!(available, position.available());
                prop_assert!(requested > available);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// returns never exceed the sold copies still out
    #[test]
    fn prop_returned_never_exceeds_sold(position in arb_position(), n in 1i64..200_000) {
        if let Ok(next) = position.apply(StockMovement::Return(n)) {
            prop_assert!(next.returned_quantity <= next.sold_quantity);
            prop_assert_eq!(next.available(), position.available() + n);
        } else {
            prop_assert!(n > position.returnable());
        }
    }
}
