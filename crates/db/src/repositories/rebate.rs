//! Partner rebate repository.
//!
//! Covers the partner's rebate listing, PDG batch transitions and accrual of
//! rebates and royalties for a sold order.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::ledger::{AccrualPlan, OrderLine, OrderSnapshot};
use folio_core::rebate::{
    RateResolver, RebateBalance, RebateEntry, RebateError, RebateLedger, RebateRate,
    RebateStatus, RebateTransition, TransitionOutcome, compute_balance,
};
use folio_core::royalty::{RoyaltyBasis, WorkRoyaltyTerms};
use folio_shared::Money;
use folio_shared::types::{OrderId, PartnerId, RebateId, UserId, WorkId};

use crate::entities::{
    order_items, orders, partner_rebates, rebate_rates, royalties,
    sea_orm_active_enums::RoyaltyType, works,
};
use crate::repositories::rate::to_rate;

fn db_error(err: DbErr) -> RebateError {
    RebateError::Database(err.to_string())
}

fn utc(ts: Option<sea_orm::prelude::DateTimeWithTimeZone>) -> Option<DateTime<Utc>> {
    ts.map(|t| t.with_timezone(&Utc))
}

/// Converts a stored row into a ledger entry.
///
/// # Errors
///
/// Returns `RebateError::UnknownStatus` if the stored status is not a known
/// literal.
pub fn to_entry(row: &partner_rebates::Model) -> Result<RebateEntry, RebateError> {
    Ok(RebateEntry {
        id: RebateId::from_uuid(row.id),
        partner_id: PartnerId::from_uuid(row.partner_id),
        order_id: row.order_id.map(OrderId::from_uuid),
        work_id: row.work_id.map(WorkId::from_uuid),
        amount: Money::from_fcfa(row.amount),
        rate: row.rate,
        status: row.status.parse()?,
        validated_at: utc(row.validated_at),
        paid_at: utc(row.paid_at),
    })
}

const fn royalty_terms(work: &works::Model) -> WorkRoyaltyTerms {
    WorkRoyaltyTerms {
        rate: work.royalty_rate,
        basis: match work.royalty_type {
            RoyaltyType::Percentage => RoyaltyBasis::Percentage,
            RoyaltyType::Fixed => RoyaltyBasis::Fixed,
        },
    }
}

/// Stored literals matching `statuses`, legacy aliases included.
fn status_literals(statuses: &[RebateStatus]) -> Vec<&'static str> {
    let mut literals: Vec<&'static str> = statuses.iter().map(RebateStatus::as_str).collect();
    if statuses.contains(&RebateStatus::Accrued) {
        literals.push("PENDING");
    }
    literals
}

/// A partner's rebates with their folded balance.
#[derive(Debug, Clone)]
pub struct PartnerRebates {
    /// Entries, newest first.
    pub entries: Vec<RebateEntry>,
    /// Balance folded from `entries`.
    pub balance: RebateBalance,
}

/// Rows created by an accrual.
#[derive(Debug, Clone, Default)]
pub struct AccrualResult {
    /// New partner rebates.
    pub rebates: Vec<partner_rebates::Model>,
    /// New author royalties.
    pub royalties: Vec<royalties::Model>,
}

/// Partner rebate repository.
#[derive(Debug, Clone)]
pub struct RebateRepository {
    db: Arc<DatabaseConnection>,
}

impl RebateRepository {
    /// Creates a new rebate repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the partner's rebates and folds the balance.
    ///
    /// # Errors
    ///
    /// * `RebateError::UnknownStatus` if a stored status is not recognized
    /// * `RebateError::Database` on database failure
    pub async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<PartnerRebates, RebateError> {
        let rows = partner_rebates::Entity::find()
            .filter(partner_rebates::Column::PartnerId.eq(partner_id.into_inner()))
            .order_by_desc(partner_rebates::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        let entries = rows.iter().map(to_entry).collect::<Result<Vec<_>, _>>()?;
        let balance = compute_balance(&entries)?;
        Ok(PartnerRebates { entries, balance })
    }

    /// Accrued → Validated, all or nothing.
    ///
    /// # Errors
    ///
    /// See [`RebateRepository::apply_transition`].
    pub async fn validate(&self, ids: &[RebateId]) -> Result<TransitionOutcome, RebateError> {
        self.apply_transition(ids, RebateTransition::Validate).await
    }

    /// Validated → Paid, all or nothing.
    ///
    /// # Errors
    ///
    /// See [`RebateRepository::apply_transition`].
    pub async fn mark_paid(&self, ids: &[RebateId]) -> Result<TransitionOutcome, RebateError> {
        self.apply_transition(ids, RebateTransition::MarkPaid).await
    }

    /// Accrued or Validated → Cancelled, all or nothing.
    ///
    /// # Errors
    ///
    /// See [`RebateRepository::apply_transition`].
    pub async fn cancel(&self, ids: &[RebateId]) -> Result<TransitionOutcome, RebateError> {
        self.apply_transition(ids, RebateTransition::Cancel).await
    }

    /// Applies `transition` to a locked batch.
    ///
    /// # Errors
    ///
    /// * `RebateError::EmptyBatch` if `ids` is empty
    /// * `RebateError::InvalidTransition` if any id is missing or refused
    /// * `RebateError::ConcurrentModification` if the guarded update misses rows
    pub async fn apply_transition(
        &self,
        ids: &[RebateId],
        transition: RebateTransition,
    ) -> Result<TransitionOutcome, RebateError> {
        if ids.is_empty() {
            return Err(RebateError::EmptyBatch);
        }
        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();

        let txn = self.db.begin().await.map_err(db_error)?;

        let rows = partner_rebates::Entity::find()
            .filter(partner_rebates::Column::Id.is_in(raw_ids))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_error)?;
        let mut entries = rows.iter().map(to_entry).collect::<Result<Vec<_>, _>>()?;

        let outcome = RebateLedger::transition(&mut entries, ids, transition, Utc::now())?;

        let at: sea_orm::prelude::DateTimeWithTimeZone = outcome.at.into();
        let mut update = partner_rebates::Entity::update_many().col_expr(
            partner_rebates::Column::Status,
            Expr::value(outcome.status.as_str()),
        );
        update = match transition {
            RebateTransition::Validate => {
                update.col_expr(partner_rebates::Column::ValidatedAt, Expr::value(at))
            }
            RebateTransition::MarkPaid => {
                update.col_expr(partner_rebates::Column::PaidAt, Expr::value(at))
            }
            RebateTransition::Cancel => update,
        };
        let result = update
            .filter(
                partner_rebates::Column::Id
                    .is_in(outcome.ids.iter().map(|id| id.into_inner()).collect::<Vec<_>>()),
            )
            .filter(partner_rebates::Column::Status.is_in(status_literals(transition.sources())))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let expected = outcome.count() as u64;
        if result.rows_affected != expected {
            txn.rollback().await.map_err(db_error)?;
            return Err(RebateError::ConcurrentModification {
                expected,
                updated: result.rows_affected,
            });
        }
        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            status = %outcome.status,
            count = expected,
            total = outcome.total.fcfa(),
            "rebates transitioned"
        );
        Ok(outcome)
    }

    /// Creates the rebates and royalties owed on an order.
    ///
    /// Pairs that already have an entry are skipped, so calling this twice
    /// creates nothing the second time.
    ///
    /// # Errors
    ///
    /// * `RebateError::OrderNotFound` if the order does not exist
    /// * `RebateError::OrderNotEligible` if the order is not validated yet
    pub async fn accrue_order(
        &self,
        order_id: OrderId,
        resolver: &RateResolver,
    ) -> Result<AccrualResult, RebateError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let order = orders::Entity::find_by_id(order_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(RebateError::OrderNotFound(order_id))?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .all(&txn)
            .await
            .map_err(db_error)?;
        let work_ids: Vec<Uuid> = items.iter().map(|i| i.work_id).collect();
        let catalog = if work_ids.is_empty() {
            Vec::new()
        } else {
            works::Entity::find()
                .filter(works::Column::Id.is_in(work_ids))
                .all(&txn)
                .await
                .map_err(db_error)?
        };

        let existing_rebates: BTreeSet<WorkId> = partner_rebates::Entity::find()
            .filter(partner_rebates::Column::OrderId.eq(order.id))
            .all(&txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .filter_map(|r| r.work_id.map(WorkId::from_uuid))
            .collect();
        let existing_royalties: BTreeSet<WorkId> = royalties::Entity::find()
            .filter(royalties::Column::OrderId.eq(order.id))
            .all(&txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|r| WorkId::from_uuid(r.work_id))
            .collect();

        let rates: Vec<RebateRate> = rebate_rates::Entity::find()
            .filter(rebate_rates::Column::IsActive.eq(true))
            .all(&txn)
            .await
            .map_err(db_error)?
            .iter()
            .map(to_rate)
            .collect();

        let snapshot = OrderSnapshot {
            order_id,
            partner_id: order.partner_id.map(PartnerId::from_uuid),
            status: order.status.clone(),
            lines: items
                .iter()
                .map(|item| {
                    let work = catalog.iter().find(|w| w.id == item.work_id);
                    OrderLine {
                        work_id: WorkId::from_uuid(item.work_id),
                        author_id: work.and_then(|w| w.author_id).map(UserId::from_uuid),
                        quantity: item.quantity,
                        unit_price: Money::from_fcfa(item.price),
                        royalty_terms: work.map(royalty_terms),
                    }
                })
                .collect(),
        };

        let now = Utc::now();
        let plan = AccrualPlan::build(
            &snapshot,
            &rates,
            resolver,
            &existing_rebates,
            &existing_royalties,
            now,
        )?;

        let mut result = AccrualResult::default();
        for rebate in &plan.rebates {
            let row = partner_rebates::ActiveModel {
                id: Set(Uuid::now_v7()),
                partner_id: Set(rebate.partner_id.into_inner()),
                order_id: Set(Some(order.id)),
                work_id: Set(Some(rebate.work_id.into_inner())),
                amount: Set(rebate.amount.fcfa()),
                rate: Set(rebate.rate),
                status: Set(RebateStatus::Accrued.as_str().to_string()),
                validated_at: Set(None),
                paid_at: Set(None),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_error)?;
            result.rebates.push(row);
        }
        for royalty in &plan.royalties {
            let row = royalties::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(royalty.author_id.into_inner()),
                work_id: Set(royalty.work_id.into_inner()),
                order_id: Set(Some(order.id)),
                amount: Set(royalty.amount.fcfa()),
                rate: Set(royalty.rate),
                approved: Set(false),
                approved_at: Set(None),
                approved_by: Set(None),
                paid: Set(false),
                paid_at: Set(None),
                paid_by: Set(None),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_error)?;
            result.royalties.push(row);
        }

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            order_id = %order_id,
            rebates = result.rebates.len(),
            royalties = result.royalties.len(),
            "order accrued"
        );
        Ok(result)
    }
}
