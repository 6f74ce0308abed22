//! Rebate and royalty rate configuration.
//!
//! Creating a rate retires the active rates of the same kind and target, so
//! each scope keeps a single active rate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::rebate::{RateDraft, RateKind, RebateError, RebateRate, check_percentage};
use folio_shared::types::{PartnerId, RebateRateId, UserId, WorkId};

use crate::entities::{rebate_rates, sea_orm_active_enums::RebateRateType};

fn db_error(err: DbErr) -> RebateError {
    RebateError::Database(err.to_string())
}

const fn stored_kind(kind: RateKind) -> RebateRateType {
    match kind {
        RateKind::Work => RebateRateType::Work,
        RateKind::Author => RebateRateType::Author,
        RateKind::Partner => RebateRateType::Partner,
        RateKind::Global => RebateRateType::Global,
    }
}

const fn domain_kind(kind: RebateRateType) -> RateKind {
    match kind {
        RebateRateType::Work => RateKind::Work,
        RebateRateType::Author => RateKind::Author,
        RebateRateType::Partner => RateKind::Partner,
        RebateRateType::Global => RateKind::Global,
    }
}

/// Converts a stored row into a resolver rate.
pub(crate) fn to_rate(row: &rebate_rates::Model) -> RebateRate {
    RebateRate {
        id: RebateRateId::from_uuid(row.id),
        kind: domain_kind(row.rate_type),
        work_id: row.work_id.map(WorkId::from_uuid),
        author_id: row.user_id.map(UserId::from_uuid),
        partner_id: row.partner_id.map(PartnerId::from_uuid),
        rate: row.rate,
        is_active: row.is_active,
        start_date: row.start_date.map(|t| t.with_timezone(&Utc)),
        end_date: row.end_date.map(|t| t.with_timezone(&Utc)),
        created_at: row.created_at.with_timezone(&Utc),
    }
}

/// Optional filters on active rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateFilter {
    /// Scope.
    pub kind: Option<RateKind>,
    /// Target partner.
    pub partner_id: Option<PartnerId>,
    /// Target author.
    pub author_id: Option<UserId>,
    /// Target work.
    pub work_id: Option<WorkId>,
}

/// Partial update of a rate. `None` leaves the field as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateUpdate {
    /// New percentage.
    pub rate: Option<Decimal>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New window start.
    pub start_date: Option<DateTime<Utc>>,
    /// New window end.
    pub end_date: Option<DateTime<Utc>>,
}

/// Rate repository.
#[derive(Debug, Clone)]
pub struct RateRepository {
    db: Arc<DatabaseConnection>,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists active rates matching `filter`, grouped by kind, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RebateError::Database` on database failure.
    pub async fn list_active(
        &self,
        filter: RateFilter,
    ) -> Result<Vec<rebate_rates::Model>, RebateError> {
        let mut query = rebate_rates::Entity::find().filter(rebate_rates::Column::IsActive.eq(true));
        if let Some(kind) = filter.kind {
            query = query.filter(rebate_rates::Column::RateType.eq(stored_kind(kind)));
        }
        if let Some(partner_id) = filter.partner_id {
            query = query.filter(rebate_rates::Column::PartnerId.eq(partner_id.into_inner()));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(rebate_rates::Column::UserId.eq(author_id.into_inner()));
        }
        if let Some(work_id) = filter.work_id {
            query = query.filter(rebate_rates::Column::WorkId.eq(work_id.into_inner()));
        }
        query
            .order_by_asc(rebate_rates::Column::RateType)
            .order_by_desc(rebate_rates::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Stores `draft` as the single active rate of its scope.
    ///
    /// # Errors
    ///
    /// * `RebateError::InvalidRate` or `MissingRateTarget` if the draft is invalid
    /// * `RebateError::Database` on database failure
    pub async fn create(&self, draft: &RateDraft) -> Result<rebate_rates::Model, RebateError> {
        draft.validate()?;

        let txn = self.db.begin().await.map_err(db_error)?;

        let mut retire = rebate_rates::Entity::update_many()
            .col_expr(rebate_rates::Column::IsActive, Expr::value(false))
            .filter(rebate_rates::Column::RateType.eq(stored_kind(draft.kind)))
            .filter(rebate_rates::Column::IsActive.eq(true));
        if let Some(partner_id) = draft.partner_id {
            retire = retire.filter(rebate_rates::Column::PartnerId.eq(partner_id.into_inner()));
        }
        if let Some(author_id) = draft.author_id {
            retire = retire.filter(rebate_rates::Column::UserId.eq(author_id.into_inner()));
        }
        if let Some(work_id) = draft.work_id {
            retire = retire.filter(rebate_rates::Column::WorkId.eq(work_id.into_inner()));
        }
        let retired = retire.exec(&txn).await.map_err(db_error)?.rows_affected;

        let row = rebate_rates::ActiveModel {
            id: Set(Uuid::now_v7()),
            rate_type: Set(stored_kind(draft.kind)),
            work_id: Set(draft.work_id.map(WorkId::into_inner)),
            user_id: Set(draft.author_id.map(UserId::into_inner)),
            partner_id: Set(draft.partner_id.map(PartnerId::into_inner)),
            rate: Set(draft.rate),
            is_active: Set(true),
            start_date: Set(draft.start_date.map(Into::into)),
            end_date: Set(draft.end_date.map(Into::into)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            rate_id = %row.id,
            kind = draft.kind.as_str(),
            rate = %draft.rate,
            retired,
            "rate created"
        );
        Ok(row)
    }

    /// Applies `changes` to one rate.
    ///
    /// # Errors
    ///
    /// * `RebateError::RateNotFound` if the id is unknown
    /// * `RebateError::InvalidRate` if the new rate is not a percentage
    pub async fn update(
        &self,
        id: RebateRateId,
        changes: RateUpdate,
    ) -> Result<rebate_rates::Model, RebateError> {
        if let Some(rate) = changes.rate {
            check_percentage(rate)?;
        }

        let row = rebate_rates::Entity::find_by_id(id.into_inner())
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or(RebateError::RateNotFound(id))?;

        let mut active = row.into_active_model();
        if let Some(rate) = changes.rate {
            active.rate = Set(rate);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(start) = changes.start_date {
            active.start_date = Set(Some(start.into()));
        }
        if let Some(end) = changes.end_date {
            active.end_date = Set(Some(end.into()));
        }
        let updated = active.update(self.db.as_ref()).await.map_err(db_error)?;

        tracing::info!(rate_id = %id, "rate updated");
        Ok(updated)
    }

    /// Turns a rate off. The row is kept for the accrual history.
    ///
    /// # Errors
    ///
    /// Returns `RebateError::RateNotFound` if the id is unknown.
    pub async fn deactivate(&self, id: RebateRateId) -> Result<(), RebateError> {
        let result = rebate_rates::Entity::update_many()
            .col_expr(rebate_rates::Column::IsActive, Expr::value(false))
            .filter(rebate_rates::Column::Id.eq(id.into_inner()))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        if result.rows_affected == 0 {
            return Err(RebateError::RateNotFound(id));
        }

        tracing::info!(rate_id = %id, "rate deactivated");
        Ok(())
    }
}
