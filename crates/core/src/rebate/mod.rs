//! Partner rebate (ristourne) ledger.
//!
//! Rebates accrue per (order, work) for partner orders, are validated and
//! then paid by the PDG. The withdrawable balance is a fold over the full
//! history and is never stored.
//!
//! # Modules
//!
//! - `types` - Rebate entry and status
//! - `error` - Rebate-specific error types
//! - `balance` - Balance fold
//! - `transition` - Batch status transitions
//! - `rate` - Applicable rate hierarchy
//! - `withdrawal` - Withdrawal requests and their review

pub mod balance;
pub mod error;
pub mod rate;
pub mod transition;
pub mod types;
pub mod withdrawal;

#[cfg(test)]
mod balance_props;

pub use balance::{RebateBalance, compute_balance};
pub use error::RebateError;
pub use rate::{
    Beneficiary, RateDraft, RateKind, RateResolver, RebateRate, ResolvedRate, check_percentage,
};
pub use transition::{RebateLedger, RebateTransition, TransitionOutcome};
pub use types::{RebateEntry, RebateStatus};
pub use withdrawal::{
    WithdrawalAction, WithdrawalMethod, WithdrawalPolicy, WithdrawalStats, WithdrawalStatus,
};
