//! Helpers for driving the router in handler tests.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header::AUTHORIZATION},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{DatabaseConnection, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router};
use folio_db::entities::{partners, sea_orm_active_enums::UserRole, users};
use folio_shared::types::UserId;
use folio_shared::{JwtConfig, JwtService, LedgerConfig, Role, RunMode};

pub(crate) fn state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expires_minutes: 15,
        })),
        ledger: Arc::new(LedgerConfig::default()),
        run_mode: RunMode::Development,
    }
}

pub(crate) fn token(state: &AppState, user_id: UserId, role: Role) -> String {
    state
        .jwt_service
        .generate_access_token(user_id, role)
        .expect("should generate token")
}

pub(crate) async fn send(
    state: AppState,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> (u16, serde_json::Value) {
    let app: Router = create_router(state);
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response: Response<Body> = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub(crate) fn partner(user_id: UserId) -> partners::Model {
    partners::Model {
        id: Uuid::now_v7(),
        user_id: user_id.into_inner(),
        name: "Librairie Akwa".to_string(),
        created_at: Utc::now().into(),
    }
}

pub(crate) fn pdg_user() -> users::Model {
    users::Model {
        id: Uuid::now_v7(),
        name: "Direction".to_string(),
        email: "pdg@example.com".to_string(),
        role: UserRole::Pdg,
        created_at: Utc::now().into(),
    }
}

pub(crate) const fn exec(rows: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    }
}
