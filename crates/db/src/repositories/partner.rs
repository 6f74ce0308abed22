//! Partner lookups.

use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use folio_shared::types::UserId;

use crate::entities::partners;

/// Partner repository.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    db: Arc<DatabaseConnection>,
}

impl PartnerRepository {
    /// Creates a new partner repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds the partner record owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<partners::Model>, DbErr> {
        partners::Entity::find()
            .filter(partners::Column::UserId.eq(user_id.into_inner()))
            .one(self.db.as_ref())
            .await
    }
}
