//! Notification persistence.
//!
//! Ledger repositories call these helpers with their open transaction so the
//! notifications commit or roll back together with the ledger write.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use folio_core::notification::NotificationDraft;
use folio_shared::types::{NotificationId, UserId};

use crate::entities::{notifications, sea_orm_active_enums::UserRole, users};

/// Returns the ids of every PDG user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn pdg_user_ids<C: ConnectionTrait>(conn: &C) -> Result<Vec<UserId>, DbErr> {
    let pdgs = users::Entity::find()
        .filter(users::Column::Role.eq(UserRole::Pdg))
        .order_by_asc(users::Column::CreatedAt)
        .all(conn)
        .await?;
    Ok(pdgs.into_iter().map(|u| UserId::from_uuid(u.id)).collect())
}

/// Stores `drafts`. Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the database insert fails.
pub async fn insert_drafts<C: ConnectionTrait>(
    conn: &C,
    drafts: &[NotificationDraft],
) -> Result<u64, DbErr> {
    if drafts.is_empty() {
        return Ok(0);
    }
    let now = chrono::Utc::now().into();
    let rows = drafts.iter().map(|d| notifications::ActiveModel {
        id: Set(NotificationId::new().into_inner()),
        user_id: Set(d.user_id.into_inner()),
        title: Set(d.title.clone()),
        message: Set(d.message.clone()),
        kind: Set(d.kind.as_str().to_string()),
        data: Set(d.data.clone()),
        read: Set(false),
        created_at: Set(now),
    });
    notifications::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
}
