//! Repository layer for data access.
//!
//! Every write path runs inside one transaction: the ledger change, its log
//! rows and its notifications commit together or not at all.

pub mod notification;
pub mod partner;
pub mod rate;
pub mod rebate;
pub mod royalty;
pub mod stock;
pub mod withdrawal;

pub use partner::PartnerRepository;
pub use rate::{RateFilter, RateRepository, RateUpdate};
pub use rebate::{AccrualResult, PartnerRebates, RebateRepository};
pub use royalty::{AuthorRoyalties, RoyaltyRepository};
pub use stock::{PartnerMovementInput, PartnerStockLine, StockRepository};
pub use withdrawal::{WithdrawalListing, WithdrawalRepository, WithdrawalReview};
