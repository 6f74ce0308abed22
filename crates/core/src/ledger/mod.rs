//! Ledger plumbing shared by the royalty and rebate ledgers.
//!
//! # Modules
//!
//! - `stage` - Abstract entry stage machine (open → confirmed → settled)
//! - `accrual` - Planning rebate and royalty entries for a sold order

pub mod accrual;
pub mod stage;

pub use accrual::{AccrualPlan, OrderLine, OrderSnapshot, PlannedRebate, PlannedRoyalty};
pub use stage::{LedgerStage, Staged};
