//! Access-control gate for the protected `/api` routes.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Verified caller identity, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthenticated("authorization header required"))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("bearer token required"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AppError::Unauthenticated("bearer token required"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthenticated("bearer token required"));
    }
    Ok(token)
}

pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).map_err(|e| {
        warn!(path = %request.uri().path(), "rejected unauthenticated request");
        e
    })?;
    let claims = keys.verify(token).map_err(|e| {
        warn!(path = %request.uri().path(), "invalid or expired token");
        e
    })?;

    debug!(user_id = %claims.user_id, "request authenticated");
    request.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
    });
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated("authentication required"))
    }
}
