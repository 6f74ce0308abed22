//! Royalty error types.

use folio_shared::AppError;
use folio_shared::types::RoyaltyId;
use thiserror::Error;

/// Why one id of an approval batch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No entry with this id.
    NotFound,
    /// Entry is already approved.
    AlreadyApproved,
    /// Entry is already paid.
    AlreadyPaid,
}

impl RejectionReason {
    /// Returns the string representation of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyApproved => "already_approved",
            Self::AlreadyPaid => "already_paid",
        }
    }
}

/// One refused id of an approval batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedRoyalty {
    /// Entry id.
    pub id: RoyaltyId,
    /// Refusal reason.
    pub reason: RejectionReason,
}

/// Errors that can occur during royalty operations.
#[derive(Debug, Error)]
pub enum RoyaltyError {
    /// The approval batch is empty.
    #[error("Approval batch is empty")]
    EmptyBatch,

    /// At least one entry of the batch is missing or not pending.
    #[error("{} royalty entries are not pending", rejected.len())]
    NotPending {
        /// Refused ids.
        rejected: Vec<RejectedRoyalty>,
    },

    /// A concurrent writer changed the batch between lock and update.
    #[error("Concurrent modification: expected {expected} rows, updated {updated}")]
    ConcurrentModification {
        /// Batch size.
        expected: u64,
        /// Rows actually updated.
        updated: u64,
    },

    /// The royalty rate cannot be applied to the sale.
    #[error("Royalty amount overflow")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RoyaltyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::NotPending { .. } => "ROYALTY_NOT_PENDING",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Overflow => "ROYALTY_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<RoyaltyError> for AppError {
    fn from(err: RoyaltyError) -> Self {
        match err {
            RoyaltyError::EmptyBatch => {
                Self::Validation("Liste des IDs de royalties requise".to_string())
            }
            RoyaltyError::NotPending { .. } => Self::Validation(
                "Certaines royalties sont introuvables ou déjà approuvées".to_string(),
            ),
            RoyaltyError::ConcurrentModification { .. } => Self::Conflict(
                "Les royalties ont été modifiées par une autre opération".to_string(),
            ),
            RoyaltyError::Overflow => Self::Internal(err.to_string()),
            RoyaltyError::Database(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_pending_is_validation() {
        let err = RoyaltyError::NotPending {
            rejected: vec![RejectedRoyalty {
                id: RoyaltyId::new(),
                reason: RejectionReason::AlreadyApproved,
            }],
        };
        assert_eq!(err.error_code(), "ROYALTY_NOT_PENDING");
        assert_eq!(err.to_string(), "1 royalty entries are not pending");

        let err: AppError = err.into();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_concurrent_modification_is_conflict() {
        let err: AppError = RoyaltyError::ConcurrentModification {
            expected: 3,
            updated: 2,
        }
        .into();
        assert_eq!(err.status_code(), 409);
    }
}
