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
    categories::dto::MessageResponse,
    error::AppError,
    extract::{ApiJson, ApiQuery},
    state::AppState,
    transactions::{
        dto::{
            CreateTransactionRequest, ListTransactionsQuery, SummaryQuery,
            UpdateTransactionRequest,
        },
        repo_types::{Summary, TransactionDetails},
    },
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/summary", get(summary))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionDetails>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.transactions.list(user.user_id, &filter).await?))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionDetails>), AppError> {
    let details = state
        .transactions
        .create(user.user_id, payload.into_new()?)
        .await?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn get_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionDetails>, AppError> {
    Ok(Json(state.transactions.get(id, user.user_id).await?))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn update_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTransactionRequest>,
) -> Result<Json<TransactionDetails>, AppError> {
    let details = state
        .transactions
        .update(id, user.user_id, payload.into_patch()?)
        .await?;
    Ok(Json(details))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.transactions.delete(id, user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "transaction deleted",
    }))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<Summary>, AppError> {
    let range = query.into_range()?;
    Ok(Json(state.transactions.summary(user.user_id, &range).await?))
}
