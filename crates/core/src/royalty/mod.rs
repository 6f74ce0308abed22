//! Author royalty ledger.
//!
//! Royalty entries are created when a sale of a work occurs, approved in
//! batches by the PDG, then paid per (author, work).
//!
//! # Modules
//!
//! - `types` - Royalty entry and derived status
//! - `error` - Royalty-specific error types
//! - `workflow` - Batch approval and payment transitions
//! - `summary` - Author dashboard totals
//! - `calculation` - Royalty amount owed on a sale

pub mod calculation;
pub mod error;
pub mod summary;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod workflow_props;

pub use calculation::{RoyaltyBasis, RoyaltyQuote, WorkRoyaltyTerms, compute_royalty};
pub use error::{RejectedRoyalty, RejectionReason, RoyaltyError};
pub use summary::RoyaltySummary;
pub use types::{RoyaltyEntry, RoyaltyStatus};
pub use workflow::{ApprovalOutcome, AuthorTotal, RoyaltyWorkflow, SettlementOutcome};
