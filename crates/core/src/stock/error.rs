//! Stock error types.

use folio_shared::AppError;
use folio_shared::types::{PartnerId, WorkId};
use thiserror::Error;

/// Errors that can occur while moving partner stock.
#[derive(Debug, Error)]
pub enum StockError {
    /// Quantity must be a positive integer.
    #[error("Invalid quantity {0}: must be greater than zero")]
    InvalidQuantity(i64),

    /// Not enough available stock for a sale.
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        /// Currently available quantity.
        available: i64,
        /// Requested quantity.
        requested: i64,
    },

    /// A return exceeds the copies sold and not yet returned.
    #[error("Return exceeds sold copies: returnable {returnable}, requested {requested}")]
    ExcessReturn {
        /// Copies that can still be returned.
        returnable: i64,
        /// Requested quantity.
        requested: i64,
    },

    /// Central warehouse stock cannot cover an allocation.
    #[error("Insufficient central stock: available {available}, requested {requested}")]
    CentralStockInsufficient {
        /// Central stock of the work.
        available: i64,
        /// Requested quantity.
        requested: i64,
    },

    /// The work was never allocated to the partner.
    #[error("Work {work_id} is not allocated to partner {partner_id}")]
    NotAllocated {
        /// Partner.
        partner_id: PartnerId,
        /// Work.
        work_id: WorkId,
    },

    /// Stored counters yield a negative available quantity.
    #[error("Stock integrity violation: available quantity is {available}")]
    IntegrityViolation {
        /// The negative available quantity.
        available: i64,
    },

    /// Counter arithmetic overflowed.
    #[error("Stock counter overflow")]
    Overflow,

    /// No partner record for the acting user or the given id.
    #[error("Partner not found")]
    PartnerNotFound,

    /// Work not found or not published.
    #[error("Work {0} not found")]
    WorkNotFound(WorkId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ExcessReturn { .. } => "EXCESS_RETURN",
            Self::CentralStockInsufficient { .. } => "CENTRAL_STOCK_INSUFFICIENT",
            Self::NotAllocated { .. } => "NOT_ALLOCATED",
            Self::IntegrityViolation { .. } => "STOCK_INTEGRITY_VIOLATION",
            Self::Overflow => "STOCK_OVERFLOW",
            Self::PartnerNotFound => "PARTNER_NOT_FOUND",
            Self::WorkNotFound(_) => "WORK_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InvalidQuantity(_) => {
                Self::Validation("La quantité doit être supérieure à zéro".to_string())
            }
            StockError::InsufficientStock {
                available,
                requested,
            } => Self::Validation(format!(
                "Stock insuffisant. Disponible: {available}, Demandé: {requested}"
            )),
            StockError::ExcessReturn {
                returnable,
                requested,
            } => Self::Validation(format!(
                "Quantité de retour invalide. Retournable: {returnable}, Retour: {requested}"
            )),
            StockError::CentralStockInsufficient {
                available,
                requested,
            } => Self::Validation(format!(
                "Stock central insuffisant. Disponible: {available}, Demandé: {requested}"
            )),
            StockError::NotAllocated { .. } => {
                Self::Validation("Cette œuvre n'est pas allouée à votre stock".to_string())
            }
            StockError::PartnerNotFound => Self::NotFound("Partenaire non trouvé".to_string()),
            StockError::WorkNotFound(_) => {
                Self::NotFound("Œuvre non trouvée ou non publiée".to_string())
            }
            StockError::IntegrityViolation { .. } | StockError::Overflow => {
                Self::Internal(err.to_string())
            }
            StockError::Database(msg) => Self::Database(msg),
        }
    }
}
