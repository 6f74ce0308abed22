//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error};
use folio_shared::{ActorContext, AppError, JwtError, RunMode};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// On success the request carries the caller's [`ActorContext`] in its
/// extensions; handlers read it through [`Actor`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return error::render(
            &AppError::Unauthorized("Non authentifié".to_string()),
            state.run_mode,
        );
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims.actor());
            next.run(request).await
        }
        Err(e) => {
            let message = match e {
                JwtError::Expired => "Session expirée",
                _ => "Jeton invalide",
            };
            tracing::debug!(error = %e, "bearer token rejected");
            error::render(&AppError::Unauthorized(message.to_string()), state.run_mode)
        }
    }
}

/// Extractor for the authenticated actor.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorContext>()
            .copied()
            .map(Actor)
            .ok_or_else(|| {
                error::render(
                    &AppError::Unauthorized("Non authentifié".to_string()),
                    RunMode::Production,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
