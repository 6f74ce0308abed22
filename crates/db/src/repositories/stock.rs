//! Partner stock repository.
//!
//! Every write runs in one database transaction: the guarded counter update,
//! the movement log row and the notifications commit together. Availability
//! checks are repeated inside the `UPDATE ... WHERE` so concurrent sales
//! cannot oversell.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait, Value,
};
use uuid::Uuid;

use folio_core::notification::NotificationDraft;
use folio_core::stock::{StockError, StockMovement, StockPosition};
use folio_shared::ActorContext;
use folio_shared::types::{PartnerId, UserId, WorkId};

use crate::entities::{
    partner_stocks, partners, sea_orm_active_enums::StockMovementType, stock_movements, works,
};
use crate::repositories::notification::{insert_drafts, pdg_user_ids};

const SALE_SQL: &str = r"
UPDATE partner_stocks
SET sold_quantity = sold_quantity + $1, updated_at = now()
WHERE partner_id = $2 AND work_id = $3
  AND allocated_quantity - sold_quantity + returned_quantity >= $1
RETURNING *";

const RETURN_SQL: &str = r"
UPDATE partner_stocks
SET returned_quantity = returned_quantity + $1, updated_at = now()
WHERE partner_id = $2 AND work_id = $3
  AND returned_quantity + $1 <= sold_quantity
RETURNING *";

const ALLOCATE_SQL: &str = r"
INSERT INTO partner_stocks (id, partner_id, work_id, allocated_quantity)
VALUES ($1, $2, $3, $4)
ON CONFLICT (partner_id, work_id) DO UPDATE
SET allocated_quantity = partner_stocks.allocated_quantity + EXCLUDED.allocated_quantity,
    updated_at = now()
RETURNING *";

/// One line of a partner's stock listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerStockLine {
    /// Counters.
    pub position: StockPosition,
    /// Title of the work.
    pub work_title: String,
}

/// A sale or return declared by a partner.
#[derive(Debug, Clone)]
pub struct PartnerMovementInput {
    /// Work concerned.
    pub work_id: WorkId,
    /// Copies.
    pub quantity: i64,
    /// Client name for sales, reason for returns.
    pub note: Option<String>,
}

fn db_error(err: DbErr) -> StockError {
    StockError::Database(err.to_string())
}

fn to_position(row: &partner_stocks::Model) -> StockPosition {
    StockPosition {
        partner_id: PartnerId::from_uuid(row.partner_id),
        work_id: WorkId::from_uuid(row.work_id),
        allocated_quantity: row.allocated_quantity,
        sold_quantity: row.sold_quantity,
        returned_quantity: row.returned_quantity,
    }
}

const fn movement_type(movement: &StockMovement) -> StockMovementType {
    match movement {
        StockMovement::Allocate(_) => StockMovementType::PartnerAllocation,
        StockMovement::Sale(_) => StockMovementType::PartnerSale,
        StockMovement::Return(_) => StockMovementType::PartnerReturn,
    }
}

/// Partner stock repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: Arc<DatabaseConnection>,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the partner's positions with work titles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<PartnerStockLine>, StockError> {
        let rows = partner_stocks::Entity::find()
            .filter(partner_stocks::Column::PartnerId.eq(partner_id.into_inner()))
            .order_by_desc(partner_stocks::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        let work_ids: Vec<Uuid> = rows.iter().map(|r| r.work_id).collect();
        let titles = if work_ids.is_empty() {
            Vec::new()
        } else {
            works::Entity::find()
                .filter(works::Column::Id.is_in(work_ids))
                .all(self.db.as_ref())
                .await
                .map_err(db_error)?
        };

        Ok(rows
            .iter()
            .map(|row| PartnerStockLine {
                position: to_position(row),
                work_title: titles
                    .iter()
                    .find(|w| w.id == row.work_id)
                    .map(|w| w.title.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// Records a sale by the acting partner.
    ///
    /// # Errors
    ///
    /// * `StockError::NotAllocated` if the work was never allocated to the partner
    /// * `StockError::InsufficientStock` if the sale exceeds available stock
    /// * `StockError::InvalidQuantity` if `quantity <= 0`
    pub async fn record_sale(
        &self,
        actor: ActorContext,
        partner: &partners::Model,
        input: PartnerMovementInput,
    ) -> Result<StockPosition, StockError> {
        let movement = StockMovement::Sale(input.quantity);
        let txn = self.db.begin().await.map_err(db_error)?;

        let current = Self::load_position(&txn, partner.id, input.work_id).await?;
        let expected = current.apply(movement)?;

        let updated = Self::guarded_update(&txn, SALE_SQL, partner.id, input.work_id, input.quantity)
            .await?
            .ok_or(StockError::InsufficientStock {
                available: current.available(),
                requested: input.quantity,
            })?;
        let position = to_position(&updated);
        position.check_integrity()?;

        let work_title = Self::work_title(&txn, input.work_id).await?;
        let reason = format!(
            "Vente partenaire - {}",
            input.note.as_deref().unwrap_or("Client")
        );
        Self::log_movement(&txn, actor.id, partner.id, input.work_id, movement, reason).await?;

        let draft = NotificationDraft::partner_sale(
            PartnerId::from_uuid(partner.id),
            &partner.name,
            input.work_id,
            &work_title,
            input.quantity,
            input.note.as_deref(),
        );
        let recipients = pdg_user_ids(&txn).await.map_err(db_error)?;
        insert_drafts(&txn, &draft.for_users(&recipients))
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        if position != expected {
            tracing::debug!(
                partner_id = %partner.id,
                work_id = %input.work_id,
                "stock position changed concurrently before sale"
            );
        }
        tracing::info!(
            partner_id = %partner.id,
            work_id = %input.work_id,
            quantity = input.quantity,
            available = position.available(),
            "partner sale recorded"
        );
        Ok(position)
    }

    /// Records a return of sold copies to the acting partner.
    ///
    /// # Errors
    ///
    /// * `StockError::NotAllocated` if the work was never allocated to the partner
    /// * `StockError::ExcessReturn` if more copies come back than were sold
    /// * `StockError::InvalidQuantity` if `quantity <= 0`
    pub async fn record_return(
        &self,
        actor: ActorContext,
        partner: &partners::Model,
        input: PartnerMovementInput,
    ) -> Result<StockPosition, StockError> {
        let movement = StockMovement::Return(input.quantity);
        let txn = self.db.begin().await.map_err(db_error)?;

        let current = Self::load_position(&txn, partner.id, input.work_id).await?;
        current.apply(movement)?;

        let updated =
            Self::guarded_update(&txn, RETURN_SQL, partner.id, input.work_id, input.quantity)
                .await?
                .ok_or(StockError::ExcessReturn {
                    returnable: current.returnable(),
                    requested: input.quantity,
                })?;
        let position = to_position(&updated);

        let work_title = Self::work_title(&txn, input.work_id).await?;
        let reason = format!(
            "Retour partenaire - {}",
            input.note.as_deref().unwrap_or("Non spécifié")
        );
        Self::log_movement(&txn, actor.id, partner.id, input.work_id, movement, reason).await?;

        let draft = NotificationDraft::partner_return(
            PartnerId::from_uuid(partner.id),
            &partner.name,
            input.work_id,
            &work_title,
            input.quantity,
            input.note.as_deref(),
        );
        let recipients = pdg_user_ids(&txn).await.map_err(db_error)?;
        insert_drafts(&txn, &draft.for_users(&recipients))
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            partner_id = %partner.id,
            work_id = %input.work_id,
            quantity = input.quantity,
            available = position.available(),
            "partner return recorded"
        );
        Ok(position)
    }

    /// Allocates copies from the central stock to a partner.
    ///
    /// The central stock debit is conditional and shares the transaction of
    /// the position upsert.
    ///
    /// # Errors
    ///
    /// * `StockError::WorkNotFound` / `StockError::PartnerNotFound`
    /// * `StockError::CentralStockInsufficient` if the work's stock cannot cover it
    /// * `StockError::InvalidQuantity` if `quantity <= 0`
    pub async fn allocate(
        &self,
        actor: ActorContext,
        partner_id: PartnerId,
        work_id: WorkId,
        quantity: i64,
    ) -> Result<StockPosition, StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }
        let txn = self.db.begin().await.map_err(db_error)?;

        let work = works::Entity::find_by_id(work_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(StockError::WorkNotFound(work_id))?;
        let partner = partners::Entity::find_by_id(partner_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(StockError::PartnerNotFound)?;

        let insufficient = StockError::CentralStockInsufficient {
            available: work.stock,
            requested: quantity,
        };
        if work.stock < quantity {
            return Err(insufficient);
        }
        let debit = works::Entity::update_many()
            .col_expr(works::Column::Stock, Expr::col(works::Column::Stock).sub(quantity))
            .filter(works::Column::Id.eq(work.id))
            .filter(works::Column::Stock.gte(quantity))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        if debit.rows_affected == 0 {
            return Err(insufficient);
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            ALLOCATE_SQL,
            [
                Value::from(Uuid::now_v7()),
                Value::from(partner.id),
                Value::from(work.id),
                Value::from(quantity),
            ],
        );
        let row = partner_stocks::Entity::find()
            .from_raw_sql(stmt)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| StockError::Database("allocation upsert returned no row".to_string()))?;
        let position = to_position(&row);
        position.check_integrity()?;

        Self::log_movement(
            &txn,
            actor.id,
            partner.id,
            work_id,
            StockMovement::Allocate(quantity),
            "Allocation partenaire".to_string(),
        )
        .await?;

        let draft = NotificationDraft::stock_allocated(
            UserId::from_uuid(partner.user_id),
            work_id,
            &work.title,
            quantity,
        );
        insert_drafts(&txn, &[draft]).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(
            partner_id = %partner.id,
            work_id = %work.id,
            quantity,
            central_stock = work.stock - quantity,
            "stock allocated to partner"
        );
        Ok(position)
    }

    async fn load_position(
        txn: &DatabaseTransaction,
        partner_id: Uuid,
        work_id: WorkId,
    ) -> Result<StockPosition, StockError> {
        partner_stocks::Entity::find()
            .filter(partner_stocks::Column::PartnerId.eq(partner_id))
            .filter(partner_stocks::Column::WorkId.eq(work_id.into_inner()))
            .one(txn)
            .await
            .map_err(db_error)?
            .map(|row| to_position(&row))
            .ok_or(StockError::NotAllocated {
                partner_id: PartnerId::from_uuid(partner_id),
                work_id,
            })
    }

    async fn guarded_update(
        txn: &DatabaseTransaction,
        sql: &str,
        partner_id: Uuid,
        work_id: WorkId,
        quantity: i64,
    ) -> Result<Option<partner_stocks::Model>, StockError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                Value::from(quantity),
                Value::from(partner_id),
                Value::from(work_id.into_inner()),
            ],
        );
        partner_stocks::Entity::find()
            .from_raw_sql(stmt)
            .one(txn)
            .await
            .map_err(db_error)
    }

    async fn work_title(txn: &DatabaseTransaction, work_id: WorkId) -> Result<String, StockError> {
        works::Entity::find_by_id(work_id.into_inner())
            .one(txn)
            .await
            .map_err(db_error)?
            .map(|w| w.title)
            .ok_or(StockError::WorkNotFound(work_id))
    }

    async fn log_movement(
        txn: &DatabaseTransaction,
        performed_by: UserId,
        partner_id: Uuid,
        work_id: WorkId,
        movement: StockMovement,
        reason: String,
    ) -> Result<(), StockError> {
        let now = Utc::now();
        let row = stock_movements::ActiveModel {
            id: Set(Uuid::now_v7()),
            work_id: Set(work_id.into_inner()),
            partner_id: Set(partner_id),
            movement_type: Set(movement_type(&movement)),
            quantity: Set(movement.signed_quantity()),
            reason: Set(Some(reason)),
            reference: Set(format!(
                "{}_{partner_id}_{}",
                movement.kind().as_str(),
                now.timestamp_millis()
            )),
            performed_by: Set(performed_by.into_inner()),
            created_at: Set(now.into()),
        };
        stock_movements::Entity::insert(row)
            .exec_without_returning(txn)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
