//! Withdrawal requests and their review.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::notification::NotificationDraft;
use folio_core::rebate::{
    RebateError, WithdrawalAction, WithdrawalMethod, WithdrawalPolicy, WithdrawalStats,
    WithdrawalStatus, compute_balance,
};
use folio_core::royalty::{RoyaltyEntry, RoyaltySummary};
use folio_shared::types::{UserId, WithdrawalId};
use folio_shared::{ActorContext, Money};

use crate::entities::{
    partner_rebates, partners, royalties,
    sea_orm_active_enums::{WithdrawalMethod as StoredMethod, WithdrawalStatus as StoredStatus},
    users, withdrawals,
};
use crate::repositories::notification::{insert_drafts, pdg_user_ids};
use crate::repositories::{rebate, royalty};

fn db_error(err: DbErr) -> RebateError {
    RebateError::Database(err.to_string())
}

/// Withdrawals that left the balance for good.
pub(crate) fn settled_statuses() -> Vec<StoredStatus> {
    vec![StoredStatus::Approved, StoredStatus::Paid]
}

/// Withdrawals still reserving part of a balance.
pub(crate) fn outstanding_statuses() -> Vec<StoredStatus> {
    vec![StoredStatus::Pending, StoredStatus::Approved]
}

const fn stored_method(method: WithdrawalMethod) -> StoredMethod {
    match method {
        WithdrawalMethod::Momo => StoredMethod::Momo,
        WithdrawalMethod::Bank => StoredMethod::Bank,
        WithdrawalMethod::Cash => StoredMethod::Cash,
    }
}

const fn stored_status(status: WithdrawalStatus) -> StoredStatus {
    match status {
        WithdrawalStatus::Pending => StoredStatus::Pending,
        WithdrawalStatus::Approved => StoredStatus::Approved,
        WithdrawalStatus::Paid => StoredStatus::Paid,
        WithdrawalStatus::Rejected => StoredStatus::Rejected,
    }
}

const fn domain_status(status: StoredStatus) -> WithdrawalStatus {
    match status {
        StoredStatus::Pending => WithdrawalStatus::Pending,
        StoredStatus::Approved => WithdrawalStatus::Approved,
        StoredStatus::Paid => WithdrawalStatus::Paid,
        StoredStatus::Rejected => WithdrawalStatus::Rejected,
    }
}

fn sum_amounts<'a, I>(rows: I) -> Result<Money, RebateError>
where
    I: IntoIterator<Item = &'a withdrawals::Model>,
{
    Money::checked_sum(rows.into_iter().map(|w| Money::from_fcfa(w.amount)))
        .ok_or(RebateError::Overflow)
}

fn pending_row(
    actor: ActorContext,
    partner_id: Option<Uuid>,
    amount: Money,
    method: WithdrawalMethod,
) -> withdrawals::ActiveModel {
    withdrawals::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(actor.id.into_inner()),
        partner_id: Set(partner_id),
        amount: Set(amount.fcfa()),
        method: Set(stored_method(method)),
        status: Set(StoredStatus::Pending),
        notes: Set(None),
        created_at: Set(Utc::now().into()),
        validated_by: Set(None),
        validated_at: Set(None),
        paid_at: Set(None),
        rejection_reason: Set(None),
    }
}

/// Withdrawals matching a filter with their status counts.
#[derive(Debug, Clone)]
pub struct WithdrawalListing {
    /// Requests, newest first.
    pub withdrawals: Vec<withdrawals::Model>,
    /// Counts over `withdrawals`.
    pub stats: WithdrawalStats,
}

/// A PDG decision with its free-text fields.
#[derive(Debug, Clone)]
pub struct WithdrawalReview {
    /// Decision.
    pub action: WithdrawalAction,
    /// Required when rejecting.
    pub rejection_reason: Option<String>,
    /// Replaces the stored notes.
    pub notes: Option<String>,
}

/// Withdrawal repository.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    db: Arc<DatabaseConnection>,
}

impl WithdrawalRepository {
    /// Creates a new withdrawal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Files a PENDING withdrawal against the partner's validated rebates.
    ///
    /// The partner row stays locked until commit, so two concurrent requests
    /// cannot both spend the same balance.
    ///
    /// # Errors
    ///
    /// * `RebateError::PartnerNotFound` if the partner vanished
    /// * `RebateError::InvalidAmount`, `BelowMinimum` or `InsufficientBalance`
    ///   when the policy refuses the amount
    pub async fn request_partner_withdrawal(
        &self,
        actor: ActorContext,
        partner: &partners::Model,
        amount: Money,
        method: WithdrawalMethod,
        policy: WithdrawalPolicy,
    ) -> Result<withdrawals::Model, RebateError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        partners::Entity::find_by_id(partner.id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(RebateError::PartnerNotFound)?;

        let rebates = partner_rebates::Entity::find()
            .filter(partner_rebates::Column::PartnerId.eq(partner.id))
            .all(&txn)
            .await
            .map_err(db_error)?;
        let entries = rebates.iter().map(rebate::to_entry).collect::<Result<Vec<_>, _>>()?;
        let balance = compute_balance(&entries)?;

        let reserved = withdrawals::Entity::find()
            .filter(withdrawals::Column::PartnerId.eq(partner.id))
            .filter(withdrawals::Column::Status.is_in(outstanding_statuses()))
            .all(&txn)
            .await
            .map_err(db_error)?;
        let outstanding = sum_amounts(&reserved)?;

        policy.check(amount, balance.available, outstanding)?;

        let withdrawal = pending_row(actor, Some(partner.id), amount, method)
            .insert(&txn)
            .await
            .map_err(db_error)?;

        let pdgs = pdg_user_ids(&txn).await.map_err(db_error)?;
        let drafts = NotificationDraft::withdrawal_requested(
            WithdrawalId::from_uuid(withdrawal.id),
            &partner.name,
            amount,
        )
        .for_users(&pdgs);
        insert_drafts(&txn, &drafts).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            partner_id = %partner.id,
            amount = amount.fcfa(),
            method = method.as_str(),
            "withdrawal requested"
        );
        Ok(withdrawal)
    }

    /// Files a PENDING withdrawal against the author's approved royalties.
    ///
    /// One request may await review at a time. The author's user row stays
    /// locked until commit.
    ///
    /// # Errors
    ///
    /// * `RebateError::AuthorNotFound` if the user row is missing
    /// * `RebateError::WithdrawalAlreadyPending` if a request awaits review
    /// * `RebateError::InvalidAmount`, `BelowMinimum` or `InsufficientBalance`
    ///   when the policy refuses the amount
    pub async fn request_author_withdrawal(
        &self,
        actor: ActorContext,
        amount: Money,
        method: WithdrawalMethod,
        policy: WithdrawalPolicy,
    ) -> Result<withdrawals::Model, RebateError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let author = users::Entity::find_by_id(actor.id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(RebateError::AuthorNotFound)?;

        let history = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(author.id))
            .all(&txn)
            .await
            .map_err(db_error)?;
        if history.iter().any(|w| w.status == StoredStatus::Pending) {
            return Err(RebateError::WithdrawalAlreadyPending);
        }
        let withdrawn = sum_amounts(
            history
                .iter()
                .filter(|w| settled_statuses().contains(&w.status)),
        )?;

        let entries: Vec<RoyaltyEntry> = royalties::Entity::find()
            .filter(royalties::Column::UserId.eq(author.id))
            .all(&txn)
            .await
            .map_err(db_error)?
            .iter()
            .map(royalty::to_entry)
            .collect();
        let summary =
            RoyaltySummary::compute(&entries, withdrawn).map_err(|_| RebateError::Overflow)?;

        policy.check(amount, summary.available_balance, Money::ZERO)?;

        let withdrawal = pending_row(actor, None, amount, method)
            .insert(&txn)
            .await
            .map_err(db_error)?;

        let pdgs = pdg_user_ids(&txn).await.map_err(db_error)?;
        let drafts = NotificationDraft::author_withdrawal_requested(
            WithdrawalId::from_uuid(withdrawal.id),
            actor.id,
            &author.name,
            amount,
        )
        .for_users(&pdgs);
        insert_drafts(&txn, &drafts).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            author_id = %author.id,
            amount = amount.fcfa(),
            method = method.as_str(),
            "author withdrawal requested"
        );
        Ok(withdrawal)
    }

    /// Applies a PDG decision to one locked withdrawal and notifies the requester.
    ///
    /// Approving or rejecting records the reviewer; paying records the payout
    /// time. Royalties and rebates are left untouched.
    ///
    /// # Errors
    ///
    /// * `RebateError::WithdrawalNotFound` if the id is unknown
    /// * `RebateError::WithdrawalNotReviewable` or `RejectionReasonRequired`
    ///   when the decision does not fit the current status
    /// * `RebateError::ConcurrentModification` if the guarded update misses
    pub async fn review(
        &self,
        actor: ActorContext,
        withdrawal_id: WithdrawalId,
        review: WithdrawalReview,
    ) -> Result<withdrawals::Model, RebateError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let current = withdrawals::Entity::find_by_id(withdrawal_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(RebateError::WithdrawalNotFound(withdrawal_id))?;

        let target = review
            .action
            .review(domain_status(current.status), review.rejection_reason.as_deref())?;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let mut reviewed = current.clone();
        reviewed.status = stored_status(target);
        reviewed.notes.clone_from(&review.notes);
        let mut changes = withdrawals::ActiveModel {
            status: Set(reviewed.status),
            notes: Set(reviewed.notes.clone()),
            ..Default::default()
        };
        match review.action {
            WithdrawalAction::Approve | WithdrawalAction::Reject => {
                reviewed.validated_by = Some(actor.id.into_inner());
                reviewed.validated_at = Some(now);
                changes.validated_by = Set(reviewed.validated_by);
                changes.validated_at = Set(reviewed.validated_at);
            }
            WithdrawalAction::MarkPaid => {
                reviewed.paid_at = Some(now);
                changes.paid_at = Set(reviewed.paid_at);
            }
        }
        if review.action == WithdrawalAction::Reject {
            reviewed.rejection_reason.clone_from(&review.rejection_reason);
            changes.rejection_reason = Set(reviewed.rejection_reason.clone());
        }

        let result = withdrawals::Entity::update_many()
            .set(changes)
            .filter(withdrawals::Column::Id.eq(current.id))
            .filter(withdrawals::Column::Status.eq(current.status))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        if result.rows_affected != 1 {
            txn.rollback().await.map_err(db_error)?;
            return Err(RebateError::ConcurrentModification {
                expected: 1,
                updated: result.rows_affected,
            });
        }

        let draft = NotificationDraft::withdrawal_reviewed(
            UserId::from_uuid(current.user_id),
            withdrawal_id,
            Money::from_fcfa(current.amount),
            review.action,
            review.rejection_reason.as_deref(),
        );
        insert_drafts(&txn, &[draft]).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            withdrawal_id = %withdrawal_id,
            reviewer = %actor.id,
            action = review.action.as_str(),
            status = %target,
            "withdrawal reviewed"
        );
        Ok(reviewed)
    }

    /// Lists withdrawals, optionally in one status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RebateError::Database` on database failure.
    pub async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<WithdrawalListing, RebateError> {
        let mut query = withdrawals::Entity::find().order_by_desc(withdrawals::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(withdrawals::Column::Status.eq(stored_status(status)));
        }
        let rows = query.all(self.db.as_ref()).await.map_err(db_error)?;

        let stats = WithdrawalStats::tally(rows.iter().map(|w| domain_status(w.status)));
        Ok(WithdrawalListing {
            withdrawals: rows,
            stats,
        })
    }
}
