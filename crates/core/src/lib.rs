//! Ledger logic for Folio.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Balances are always folds over the full entry history; nothing here keeps a
//! running total.
//!
//! # Modules
//!
//! - `stock` - Partner stock positions (allocated, sold, returned)
//! - `royalty` - Author royalty approval and payment workflow
//! - `rebate` - Partner rebate balance, transitions, rates and withdrawals
//! - `ledger` - Stage machine shared by royalty and rebate entries, order accrual
//! - `notification` - Notification drafts emitted by ledger operations

pub mod ledger;
pub mod notification;
pub mod rebate;
pub mod royalty;
pub mod stock;
