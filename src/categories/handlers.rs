use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::gate::AuthUser,
    categories::{
        dto::{CreateCategoryRequest, MessageResponse, UpdateCategoryRequest},
        repo_types::Category,
    },
    error::AppError,
    extract::ApiJson,
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.list(user.user_id).await?))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state
        .categories
        .create(user.user_id, payload.into_new()?)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn get_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.categories.get(id, user.user_id).await?))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .categories
        .update(id, user.user_id, payload.into_patch()?)
        .await?;
    Ok(Json(category))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.categories.delete(id, user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "category deleted",
    }))
}
