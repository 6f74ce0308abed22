//! Notification drafts emitted by ledger operations.
//!
//! Drafts are plain values; the repository that performs the ledger write
//! persists them inside the same transaction.

use folio_shared::Money;
use folio_shared::types::{PartnerId, RoyaltyId, UserId, WithdrawalId, WorkId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::rebate::WithdrawalAction;

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Royalties approved by the PDG.
    RoyaltyApproved,
    /// Royalties paid to the author.
    RoyaltyPayment,
    /// Sale recorded by a partner.
    PartnerSale,
    /// Return recorded by a partner.
    PartnerReturn,
    /// Stock allocated to a partner.
    StockAllocation,
    /// Withdrawal requested by a partner or an author.
    Withdrawal,
    /// Withdrawal approved, rejected or paid.
    WithdrawalUpdate,
}

impl NotificationKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RoyaltyApproved => "ROYALTY_APPROVED",
            Self::RoyaltyPayment => "ROYALTY_PAYMENT",
            Self::PartnerSale => "PARTNER_SALE",
            Self::PartnerReturn => "PARTNER_RETURN",
            Self::StockAllocation => "STOCK_ALLOCATION",
            Self::Withdrawal => "WITHDRAWAL",
            Self::WithdrawalUpdate => "WITHDRAWAL_UPDATE",
        }
    }
}

/// A notification ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    /// Recipient.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Human-readable message.
    pub message: String,
    /// Category.
    pub kind: NotificationKind,
    /// Structured payload.
    pub data: Value,
}

impl NotificationDraft {
    /// Copies the draft for every recipient in `users`.
    #[must_use]
    pub fn for_users(&self, users: &[UserId]) -> Vec<Self> {
        users
            .iter()
            .map(|user_id| Self {
                user_id: *user_id,
                ..self.clone()
            })
            .collect()
    }

    /// Royalties of one author approved in a batch.
    #[must_use]
    pub fn royalty_approved(author_id: UserId, total: Money, count: usize) -> Self {
        Self {
            user_id: author_id,
            title: "Droits d'auteur approuvés".to_string(),
            message: format!(
                "{count} droit(s) d'auteur approuvé(s) pour un montant total de {} FCFA.",
                total.fcfa()
            ),
            kind: NotificationKind::RoyaltyApproved,
            data: json!({ "amount": total, "royaltiesCount": count }),
        }
    }

    /// Royalties of one (author, work) pair paid.
    #[must_use]
    pub fn royalty_paid(
        author_id: UserId,
        work_id: WorkId,
        total: Money,
        royalty_ids: &[RoyaltyId],
    ) -> Self {
        Self {
            user_id: author_id,
            title: "Paiement de droits d'auteur reçu".to_string(),
            message: format!(
                "Vous avez reçu un paiement de {} FCFA pour vos droits d'auteur. {} royaltie(s) concernée(s).",
                total.fcfa(),
                royalty_ids.len()
            ),
            kind: NotificationKind::RoyaltyPayment,
            data: json!({
                "amount": total,
                "workId": work_id,
                "royaltiesCount": royalty_ids.len(),
                "royaltyIds": royalty_ids,
            }),
        }
    }

    /// Sale recorded by a partner. Addressed with [`Self::for_users`].
    #[must_use]
    pub fn partner_sale(
        partner_id: PartnerId,
        partner_name: &str,
        work_id: WorkId,
        work_title: &str,
        quantity: i64,
        client_name: Option<&str>,
    ) -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            title: "Vente enregistrée par partenaire".to_string(),
            message: format!(
                "Le partenaire {partner_name} a enregistré une vente de {quantity} exemplaire(s) de \"{work_title}\""
            ),
            kind: NotificationKind::PartnerSale,
            data: json!({
                "partnerId": partner_id,
                "partnerName": partner_name,
                "workId": work_id,
                "workTitle": work_title,
                "quantity": quantity,
                "clientName": client_name,
            }),
        }
    }

    /// Return recorded by a partner. Addressed with [`Self::for_users`].
    #[must_use]
    pub fn partner_return(
        partner_id: PartnerId,
        partner_name: &str,
        work_id: WorkId,
        work_title: &str,
        quantity: i64,
        reason: Option<&str>,
    ) -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            title: "Retour de stock par partenaire".to_string(),
            message: format!(
                "Le partenaire {partner_name} a retourné {quantity} exemplaire(s) de \"{work_title}\""
            ),
            kind: NotificationKind::PartnerReturn,
            data: json!({
                "partnerId": partner_id,
                "partnerName": partner_name,
                "workId": work_id,
                "workTitle": work_title,
                "quantity": quantity,
                "reason": reason,
            }),
        }
    }

    /// Stock allocated to the partner's owning user.
    #[must_use]
    pub fn stock_allocated(
        partner_user_id: UserId,
        work_id: WorkId,
        work_title: &str,
        quantity: i64,
    ) -> Self {
        Self {
            user_id: partner_user_id,
            title: "Stock alloué".to_string(),
            message: format!(
                "Le PDG vous a alloué {quantity} exemplaire(s) de \"{work_title}\""
            ),
            kind: NotificationKind::StockAllocation,
            data: json!({
                "workId": work_id,
                "workTitle": work_title,
                "quantity": quantity,
            }),
        }
    }

    /// Withdrawal requested by a partner. Addressed with [`Self::for_users`].
    #[must_use]
    pub fn withdrawal_requested(
        withdrawal_id: WithdrawalId,
        partner_name: &str,
        amount: Money,
    ) -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            title: "Nouvelle demande de retrait partenaire".to_string(),
            message: format!(
                "{partner_name} demande un retrait de {} F CFA",
                amount.fcfa()
            ),
            kind: NotificationKind::Withdrawal,
            data: json!({ "withdrawalId": withdrawal_id, "type": "partner" }),
        }
    }

    /// Withdrawal requested by an author. Addressed with [`Self::for_users`].
    #[must_use]
    pub fn author_withdrawal_requested(
        withdrawal_id: WithdrawalId,
        author_id: UserId,
        author_name: &str,
        amount: Money,
    ) -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            title: "Nouvelle demande de retrait".to_string(),
            message: format!(
                "{author_name} a demandé un retrait de {} F CFA",
                amount.fcfa()
            ),
            kind: NotificationKind::Withdrawal,
            data: json!({ "withdrawalId": withdrawal_id, "authorId": author_id }),
        }
    }

    /// Review outcome sent to the requester.
    #[must_use]
    pub fn withdrawal_reviewed(
        requester: UserId,
        withdrawal_id: WithdrawalId,
        amount: Money,
        action: WithdrawalAction,
        rejection_reason: Option<&str>,
    ) -> Self {
        let amount = amount.fcfa();
        let (title, message) = match action {
            WithdrawalAction::Approve => (
                "Retrait approuvé",
                format!("Votre demande de retrait de {amount} F CFA a été approuvée"),
            ),
            WithdrawalAction::Reject => (
                "Retrait rejeté",
                format!(
                    "Votre demande de retrait de {amount} F CFA a été rejetée. Raison: {}",
                    rejection_reason.unwrap_or_default()
                ),
            ),
            WithdrawalAction::MarkPaid => (
                "Retrait payé",
                format!("Votre retrait de {amount} F CFA a été payé"),
            ),
        };
        Self {
            user_id: requester,
            title: title.to_string(),
            message,
            kind: NotificationKind::WithdrawalUpdate,
            data: json!({ "withdrawalId": withdrawal_id, "action": action }),
        }
    }
}
