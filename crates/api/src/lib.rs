//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for partners, authors and the PDG
//! - Bearer token middleware producing an explicit `ActorContext`
//! - JSON error rendering

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::response::Response;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use folio_core::rebate::{RateResolver, WithdrawalPolicy};
use folio_shared::{AppError, JwtService, LedgerConfig, Money, RunMode};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Ledger policy settings.
    pub ledger: Arc<LedgerConfig>,
    /// Runtime environment.
    pub run_mode: RunMode,
}

impl AppState {
    /// Withdrawal rules from the ledger settings.
    #[must_use]
    pub fn withdrawal_policy(&self) -> WithdrawalPolicy {
        WithdrawalPolicy::new(Money::from_fcfa(self.ledger.min_withdrawal))
    }

    /// Rate fallbacks from the ledger settings.
    #[must_use]
    pub fn rate_resolver(&self) -> RateResolver {
        RateResolver::new(
            self.ledger.default_partner_rate,
            self.ledger.default_author_rate,
        )
    }

    /// Renders a handler result, hiding internal details outside development.
    pub fn respond(&self, result: Result<Response, AppError>) -> Response {
        result.unwrap_or_else(|err| error::render(&err, self.run_mode))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
