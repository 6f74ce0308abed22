//! API route definitions.

use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::DbErr;

use crate::{AppState, middleware::auth::auth_middleware};
use folio_db::{PartnerRepository, entities::partners};
use folio_shared::{ActorContext, AppError, Role};

pub mod author;
pub mod health;
pub mod partner;
pub mod pdg;

#[cfg(test)]
pub(crate) mod test_support;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(partner::routes())
        .merge(pdg::routes())
        .merge(author::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

pub(crate) fn db_failure(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Resolves the partner record of a PARTENAIRE caller.
pub(crate) async fn acting_partner(
    state: &AppState,
    actor: ActorContext,
) -> Result<partners::Model, AppError> {
    actor.require_any(&[Role::Partenaire])?;
    PartnerRepository::new(Arc::clone(&state.db))
        .find_by_user(actor.id)
        .await
        .map_err(db_failure)?
        .ok_or_else(|| AppError::NotFound("Partenaire non trouvé".to_string()))
}
