//! JSON error rendering.
//!
//! Every failure leaves the API as `{error, message}`. Server errors add a
//! `details` field with the internal cause in development only.

use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use folio_shared::{AppError, RunMode};

/// Renders `err` as a JSON response.
pub fn render(err: &AppError, mode: RunMode) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_server_error() {
        tracing::error!(code = err.error_code(), error = %err, "request failed");
    } else {
        tracing::debug!(code = err.error_code(), error = %err, "request rejected");
    }

    let mut body = json!({
        "error": err.error_code(),
        "message": err.public_message(),
    });
    if mode.exposes_error_details()
        && let Some(detail) = err.detail()
    {
        body["details"] = json!(detail);
    }
    (status, Json(body)).into_response()
}

/// Unwraps a JSON body, turning extractor rejections into a 400.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "invalid request body");
        AppError::Validation("Corps de requête invalide".to_string())
    })
}

/// Unwraps query parameters, turning extractor rejections into a 400.
pub fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params.map(|Query(value)| value).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "invalid query string");
        AppError::Validation("Paramètres de requête invalides".to_string())
    })
}
