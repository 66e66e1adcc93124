//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use tresora_db::entities::sea_orm_active_enums::TransactionKind;
use tresora_db::repositories::transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, TransactionRepository,
    UpdateTransactionInput,
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}", put(update_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Start date (inclusive).
    pub from: Option<NaiveDate>,
    /// End date (inclusive).
    pub to: Option<NaiveDate>,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Owning account.
    pub account_id: Uuid,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Revenue or expense.
    pub kind: TransactionKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Transaction date.
    pub transaction_date: NaiveDate,
}

/// Request body for updating a transaction.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// Move to another account.
    pub account_id: Option<Uuid>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// Flip revenue/expense.
    pub kind: Option<TransactionKind>,
    /// New positive amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New transaction date.
    pub transaction_date: Option<NaiveDate>,
}

fn error_response(err: &TransactionError) -> axum::response::Response {
    match err {
        TransactionError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Transaction not found: {id}")
            })),
        )
            .into_response(),
        TransactionError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "account_not_found",
                "message": format!("Account not found: {id}")
            })),
        )
            .into_response(),
        TransactionError::NonPositiveAmount => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Transaction amount must be positive"
            })),
        )
            .into_response(),
        TransactionError::Database(e) => {
            error!(error = %e, "Transaction operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/transactions` - List transactions with optional filters.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let filter = TransactionFilter {
        kind: query.kind,
        account_id: query.account_id,
        category_id: query.category_id,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list_transactions(filter).await {
        Ok(transactions) => {
            (StatusCode::OK, Json(json!({ "transactions": transactions }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/transactions` - Create a transaction and move the balance.
async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let input = CreateTransactionInput {
        account_id: payload.account_id,
        category_id: payload.category_id,
        kind: payload.kind,
        amount: payload.amount,
        description: payload.description,
        transaction_date: payload.transaction_date,
    };

    match repo.create_transaction(input).await {
        Ok(transaction) => {
            info!(
                transaction_id = %transaction.id,
                account_id = %transaction.account_id,
                "Transaction created"
            );
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/transactions/{id}` - Get one transaction.
async fn get_transaction(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.get_transaction(id).await {
        Ok(transaction) => (StatusCode::OK, Json(transaction)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/transactions/{id}` - Update a transaction, rebalancing accounts.
async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let input = UpdateTransactionInput {
        account_id: payload.account_id,
        category_id: payload.category_id.map(Some),
        kind: payload.kind,
        amount: payload.amount,
        description: payload.description.map(Some),
        transaction_date: payload.transaction_date,
    };

    match repo.update_transaction(id, input).await {
        Ok(transaction) => {
            info!(transaction_id = %id, "Transaction updated");
            (StatusCode::OK, Json(transaction)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/transactions/{id}` - Delete a transaction, reversing its effect.
async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.delete_transaction(id).await {
        Ok(()) => {
            info!(transaction_id = %id, "Transaction deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}
