//! Royalty repository.
//!
//! Approval and payment lock the affected rows (`SELECT ... FOR UPDATE`),
//! validate with [`RoyaltyWorkflow`], then issue a guarded `UPDATE` and roll
//! back unless every locked row changed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use folio_core::notification::NotificationDraft;
use folio_core::royalty::{
    ApprovalOutcome, RoyaltyEntry, RoyaltyError, RoyaltySummary, RoyaltyWorkflow,
    SettlementOutcome,
};
use folio_shared::types::{RoyaltyId, UserId, WorkId};
use folio_shared::{ActorContext, Money};

use crate::entities::{royalties, withdrawals, works};
use crate::repositories::notification::insert_drafts;
use crate::repositories::withdrawal::settled_statuses;

fn db_error(err: DbErr) -> RoyaltyError {
    RoyaltyError::Database(err.to_string())
}

fn utc(ts: Option<sea_orm::prelude::DateTimeWithTimeZone>) -> Option<DateTime<Utc>> {
    ts.map(|t| t.with_timezone(&Utc))
}

/// Converts a stored row into a ledger entry.
#[must_use]
pub fn to_entry(row: &royalties::Model) -> RoyaltyEntry {
    RoyaltyEntry {
        id: RoyaltyId::from_uuid(row.id),
        author_id: UserId::from_uuid(row.user_id),
        work_id: WorkId::from_uuid(row.work_id),
        amount: Money::from_fcfa(row.amount),
        approved: row.approved,
        approved_at: utc(row.approved_at),
        approved_by: row.approved_by.map(UserId::from_uuid),
        paid: row.paid,
        paid_at: utc(row.paid_at),
        paid_by: row.paid_by.map(UserId::from_uuid),
    }
}

/// Royalties of an author with their works and dashboard totals.
#[derive(Debug, Clone)]
pub struct AuthorRoyalties {
    /// Rows, newest first, each with its work when it still exists.
    pub rows: Vec<(royalties::Model, Option<works::Model>)>,
    /// Totals folded from `rows`.
    pub summary: RoyaltySummary,
}

/// Royalty repository.
#[derive(Debug, Clone)]
pub struct RoyaltyRepository {
    db: Arc<DatabaseConnection>,
}

impl RoyaltyRepository {
    /// Creates a new royalty repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Approves a batch of royalties, all or nothing.
    ///
    /// Each distinct author receives one notification with their total.
    ///
    /// # Errors
    ///
    /// * `RoyaltyError::EmptyBatch` if `ids` is empty
    /// * `RoyaltyError::NotPending` if any id is missing, approved or paid
    /// * `RoyaltyError::ConcurrentModification` if the guarded update misses rows
    pub async fn approve(
        &self,
        actor: ActorContext,
        ids: &[RoyaltyId],
    ) -> Result<ApprovalOutcome, RoyaltyError> {
        if ids.is_empty() {
            return Err(RoyaltyError::EmptyBatch);
        }
        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();

        let txn = self.db.begin().await.map_err(db_error)?;

        let rows = royalties::Entity::find()
            .filter(royalties::Column::Id.is_in(raw_ids))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_error)?;
        let mut entries: Vec<RoyaltyEntry> = rows.iter().map(to_entry).collect();

        let outcome = RoyaltyWorkflow::approve(&mut entries, ids, actor.id, Utc::now())?;

        let approved_ids: Vec<Uuid> = outcome.approved_ids.iter().map(|id| id.into_inner()).collect();
        let approved_at: sea_orm::prelude::DateTimeWithTimeZone = outcome.approved_at.into();
        let result = royalties::Entity::update_many()
            .col_expr(royalties::Column::Approved, Expr::value(true))
            .col_expr(royalties::Column::ApprovedAt, Expr::value(approved_at))
            .col_expr(royalties::Column::ApprovedBy, Expr::value(actor.id.into_inner()))
            .filter(royalties::Column::Id.is_in(approved_ids))
            .filter(royalties::Column::Approved.eq(false))
            .filter(royalties::Column::Paid.eq(false))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let expected = outcome.approved_count() as u64;
        if result.rows_affected != expected {
            txn.rollback().await.map_err(db_error)?;
            return Err(RoyaltyError::ConcurrentModification {
                expected,
                updated: result.rows_affected,
            });
        }

        let drafts: Vec<NotificationDraft> = outcome
            .per_author_totals
            .iter()
            .map(|(author, total)| {
                NotificationDraft::royalty_approved(*author, total.amount, total.entries)
            })
            .collect();
        insert_drafts(&txn, &drafts).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            approved_by = %actor.id,
            count = expected,
            authors = outcome.per_author_totals.len(),
            "royalties approved"
        );
        Ok(outcome)
    }

    /// Pays every unpaid royalty of exactly (`author_id`, `work_id`).
    ///
    /// Approval is not required. Unapproved entries are settled and logged.
    ///
    /// # Errors
    ///
    /// * `RoyaltyError::ConcurrentModification` if the guarded update misses rows
    /// * `RoyaltyError::Database` on database failure
    pub async fn pay(
        &self,
        actor: ActorContext,
        author_id: UserId,
        work_id: WorkId,
    ) -> Result<SettlementOutcome, RoyaltyError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let rows = royalties::Entity::find()
            .filter(royalties::Column::UserId.eq(author_id.into_inner()))
            .filter(royalties::Column::WorkId.eq(work_id.into_inner()))
            .filter(royalties::Column::Paid.eq(false))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_error)?;
        let mut entries: Vec<RoyaltyEntry> = rows.iter().map(to_entry).collect();

        let outcome = RoyaltyWorkflow::settle(&mut entries, author_id, work_id, actor.id, Utc::now())?;
        if outcome.paid_count() == 0 {
            txn.commit().await.map_err(db_error)?;
            return Ok(outcome);
        }

        let paid_ids: Vec<Uuid> = outcome.paid_ids.iter().map(|id| id.into_inner()).collect();
        let paid_at: sea_orm::prelude::DateTimeWithTimeZone = outcome.paid_at.into();
        let result = royalties::Entity::update_many()
            .col_expr(royalties::Column::Paid, Expr::value(true))
            .col_expr(royalties::Column::PaidAt, Expr::value(paid_at))
            .col_expr(royalties::Column::PaidBy, Expr::value(actor.id.into_inner()))
            .filter(royalties::Column::Id.is_in(paid_ids))
            .filter(royalties::Column::Paid.eq(false))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let expected = outcome.paid_count() as u64;
        if result.rows_affected != expected {
            txn.rollback().await.map_err(db_error)?;
            return Err(RoyaltyError::ConcurrentModification {
                expected,
                updated: result.rows_affected,
            });
        }

        let draft =
            NotificationDraft::royalty_paid(author_id, work_id, outcome.total, &outcome.paid_ids);
        insert_drafts(&txn, &[draft]).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        if outcome.unapproved_count > 0 {
            tracing::warn!(
                author_id = %author_id,
                work_id = %work_id,
                unapproved = outcome.unapproved_count,
                "royalties paid without prior approval"
            );
        }
        tracing::info!(
            paid_by = %actor.id,
            author_id = %author_id,
            work_id = %work_id,
            count = expected,
            total = outcome.total.fcfa(),
            "royalties paid"
        );
        Ok(outcome)
    }

    /// Lists the author's royalties with dashboard totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_author(&self, author_id: UserId) -> Result<AuthorRoyalties, RoyaltyError> {
        let rows = royalties::Entity::find()
            .filter(royalties::Column::UserId.eq(author_id.into_inner()))
            .order_by_desc(royalties::Column::CreatedAt)
            .find_also_related(works::Entity)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        let settled = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(author_id.into_inner()))
            .filter(withdrawals::Column::Status.is_in(settled_statuses()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;
        let withdrawn = Money::checked_sum(settled.iter().map(|w| Money::from_fcfa(w.amount)))
            .ok_or(RoyaltyError::Overflow)?;

        let entries: Vec<RoyaltyEntry> = rows.iter().map(|(r, _)| to_entry(r)).collect();
        let summary = RoyaltySummary::compute(&entries, withdrawn)?;

        Ok(AuthorRoyalties { rows, summary })
    }
}
