//! Rebate error types.

use folio_shared::{AppError, Money};
use folio_shared::types::{OrderId, RebateId, RebateRateId, WithdrawalId};
use thiserror::Error;

use crate::rebate::rate::RateKind;
use crate::rebate::types::RebateStatus;
use crate::rebate::withdrawal::{WithdrawalAction, WithdrawalStatus};

/// Errors that can occur during rebate and withdrawal operations.
#[derive(Debug, Error)]
pub enum RebateError {
    /// The batch is empty.
    #[error("Rebate batch is empty")]
    EmptyBatch,

    /// Stored rebate status literal is not a known status.
    #[error("Unknown rebate status: {0}")]
    UnknownStatus(String),

    /// Submitted withdrawal status filter is not a known status.
    #[error("Unknown withdrawal status: {0}")]
    UnknownWithdrawalStatus(String),

    /// Submitted rate type is not a known kind.
    #[error("Unknown rate kind: {0}")]
    UnknownRateKind(String),

    /// A scoped rate names no target.
    #[error("{0} rate requires a target")]
    MissingRateTarget(RateKind),

    /// Rate percentage outside 0..=100.
    #[error("Invalid rate: {0}")]
    InvalidRate(rust_decimal::Decimal),

    /// Rate does not exist.
    #[error("Rebate rate {0} not found")]
    RateNotFound(RebateRateId),

    /// Some ids are missing or not in a status the transition accepts.
    #[error("{} rebates cannot move to {target}", rejected.len())]
    InvalidTransition {
        /// Refused ids.
        rejected: Vec<RebateId>,
        /// Requested status.
        target: RebateStatus,
    },

    /// Withdrawal amount must be positive.
    #[error("Invalid withdrawal amount: {0}")]
    InvalidAmount(Money),

    /// Withdrawal amount is below the configured minimum.
    #[error("Withdrawal below minimum: minimum {minimum}, requested {requested}")]
    BelowMinimum {
        /// Configured minimum.
        minimum: Money,
        /// Requested amount.
        requested: Money,
    },

    /// Withdrawal amount exceeds the withdrawable balance.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Withdrawable balance.
        available: Money,
        /// Requested amount.
        requested: Money,
    },

    /// No partner record for the acting user.
    #[error("Partner not found")]
    PartnerNotFound,

    /// No user row for the acting author.
    #[error("Author not found")]
    AuthorNotFound,

    /// The author already has a request awaiting review.
    #[error("A withdrawal is already pending")]
    WithdrawalAlreadyPending,

    /// Withdrawal does not exist.
    #[error("Withdrawal {0} not found")]
    WithdrawalNotFound(WithdrawalId),

    /// Review action not allowed from the current status.
    #[error("Cannot {action} a {status} withdrawal")]
    WithdrawalNotReviewable {
        /// Requested action.
        action: WithdrawalAction,
        /// Current status.
        status: WithdrawalStatus,
    },

    /// Rejection without a reason.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Order does not exist.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Order status does not allow accrual.
    #[error("Order status {0} does not allow rebate calculation")]
    OrderNotEligible(String),

    /// A concurrent writer changed the batch between lock and update.
    #[error("Concurrent modification: expected {expected} rows, updated {updated}")]
    ConcurrentModification {
        /// Batch size.
        expected: u64,
        /// Rows actually updated.
        updated: u64,
    },

    /// Amount arithmetic overflowed.
    #[error("Rebate amount overflow")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RebateError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::UnknownStatus(_) => "UNKNOWN_REBATE_STATUS",
            Self::UnknownWithdrawalStatus(_) => "UNKNOWN_WITHDRAWAL_STATUS",
            Self::UnknownRateKind(_) => "UNKNOWN_RATE_KIND",
            Self::MissingRateTarget(_) => "MISSING_RATE_TARGET",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::RateNotFound(_) => "RATE_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_REBATE_TRANSITION",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BelowMinimum { .. } => "BELOW_MINIMUM_WITHDRAWAL",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::PartnerNotFound => "PARTNER_NOT_FOUND",
            Self::AuthorNotFound => "AUTHOR_NOT_FOUND",
            Self::WithdrawalAlreadyPending => "WITHDRAWAL_ALREADY_PENDING",
            Self::WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            Self::WithdrawalNotReviewable { .. } => "WITHDRAWAL_NOT_REVIEWABLE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::OrderNotEligible(_) => "ORDER_NOT_ELIGIBLE",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Overflow => "REBATE_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<RebateError> for AppError {
    fn from(err: RebateError) -> Self {
        match err {
            RebateError::EmptyBatch => {
                Self::Validation("Liste des IDs de ristournes requise".to_string())
            }
            RebateError::UnknownStatus(_) => Self::Internal(err.to_string()),
            RebateError::UnknownWithdrawalStatus(s) => {
                Self::Validation(format!("Statut de retrait inconnu: {s}"))
            }
            RebateError::UnknownRateKind(_) => {
                Self::Validation("Type de taux invalide".to_string())
            }
            RebateError::MissingRateTarget(kind) => Self::Validation(
                match kind {
                    RateKind::Partner => "partnerId est requis pour un taux partenaire",
                    RateKind::Author => "userId est requis pour un taux auteur",
                    RateKind::Work | RateKind::Global => "workId est requis pour un taux œuvre",
                }
                .to_string(),
            ),
            RebateError::InvalidRate(_) => {
                Self::Validation("Le taux doit être compris entre 0 et 100".to_string())
            }
            RebateError::RateNotFound(_) => {
                Self::NotFound("Taux de ristourne introuvable".to_string())
            }
            RebateError::InvalidTransition { target, .. } => Self::Validation(format!(
                "Certaines ristournes sont introuvables ou ne peuvent pas passer au statut {target}"
            )),
            RebateError::InvalidAmount(_) => Self::Validation("Montant invalide".to_string()),
            RebateError::BelowMinimum { minimum, .. } => Self::Validation(format!(
                "Le montant minimum est {} F CFA",
                minimum.fcfa()
            )),
            RebateError::InsufficientBalance { available, .. } => Self::Validation(format!(
                "Solde insuffisant. Disponible: {} F CFA",
                available.fcfa()
            )),
            RebateError::PartnerNotFound => Self::NotFound("Partenaire non trouvé".to_string()),
            RebateError::AuthorNotFound => Self::NotFound("Utilisateur introuvable".to_string()),
            RebateError::WithdrawalAlreadyPending => Self::Validation(
                "Vous avez déjà une demande de retrait en cours. Veuillez attendre qu'elle soit traitée."
                    .to_string(),
            ),
            RebateError::WithdrawalNotFound(_) => {
                Self::NotFound("Retrait introuvable".to_string())
            }
            RebateError::WithdrawalNotReviewable { action, .. } => Self::Validation(
                match action {
                    WithdrawalAction::Approve => {
                        "Seuls les retraits en attente peuvent être approuvés"
                    }
                    WithdrawalAction::Reject => "Seuls les retraits en attente peuvent être rejetés",
                    WithdrawalAction::MarkPaid => {
                        "Seuls les retraits approuvés peuvent être marqués comme payés"
                    }
                }
                .to_string(),
            ),
            RebateError::RejectionReasonRequired => {
                Self::Validation("La raison du rejet est requise".to_string())
            }
            RebateError::OrderNotFound(_) => Self::NotFound("Commande introuvable".to_string()),
            RebateError::OrderNotEligible(_) => Self::Validation(
                "La commande doit être validée pour calculer les ristournes".to_string(),
            ),
            RebateError::ConcurrentModification { .. } => Self::Conflict(
                "Les ristournes ont été modifiées par une autre opération".to_string(),
            ),
            RebateError::Overflow => Self::Internal(err.to_string()),
            RebateError::Database(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let err: AppError = RebateError::InsufficientBalance {
            available: Money::from_fcfa(4200),
            requested: Money::from_fcfa(6000),
        }
        .into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "Solde insuffisant. Disponible: 4200 F CFA");
    }

    #[test]
    fn test_below_minimum_message() {
        let err: AppError = RebateError::BelowMinimum {
            minimum: Money::from_fcfa(5000),
            requested: Money::from_fcfa(100),
        }
        .into();
        assert_eq!(err.public_message(), "Le montant minimum est 5000 F CFA");
    }

    #[test]
    fn test_stored_status_corruption_is_internal() {
        let err: AppError = RebateError::UnknownStatus("LOST".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Erreur interne du serveur");
    }

    #[test]
    fn test_submitted_literals_are_client_errors() {
        let err: AppError = RebateError::UnknownRateKind("REGION".to_string()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "Type de taux invalide");

        let err: AppError = RebateError::UnknownWithdrawalStatus("LOST".to_string()).into();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_review_refusal_messages() {
        let err: AppError = RebateError::WithdrawalNotReviewable {
            action: WithdrawalAction::MarkPaid,
            status: WithdrawalStatus::Pending,
        }
        .into();
        assert_eq!(
            err.public_message(),
            "Seuls les retraits approuvés peuvent être marqués comme payés"
        );

        let err: AppError = RebateError::WithdrawalNotFound(WithdrawalId::new()).into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.public_message(), "Retrait introuvable");
    }

    #[test]
    fn test_order_not_found_is_404() {
        let err = RebateError::OrderNotFound(OrderId::new());
        assert_eq!(err.error_code(), "ORDER_NOT_FOUND");
        let err: AppError = err.into();
        assert_eq!(err.status_code(), 404);
    }
}
