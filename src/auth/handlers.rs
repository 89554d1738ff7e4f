use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        gate::AuthUser,
        repo_types::UserSummary,
        services::Registration,
    },
    error::AppError,
    extract::ApiJson,
    state::AppState,
};

/// Public routes, mounted under `/api`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that sit behind the gate.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    payload.validate()?;
    let user = state
        .auth
        .register(Registration {
            email: &payload.email,
            password: &payload.password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    let (token, user) = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(state.auth.profile(user.user_id).await?))
}
