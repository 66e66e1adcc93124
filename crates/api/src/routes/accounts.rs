//! Account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use tresora_db::entities::sea_orm_active_enums::AccountKind;
use tresora_db::repositories::account::{
    AccountError, AccountRepository, CreateAccountInput, UpdateAccountInput,
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}", put(update_account))
        .route("/accounts/{id}", delete(delete_account))
        .route("/accounts/{id}/balance", get(get_balance))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name.
    pub name: String,
    /// Account kind: bank, mobile_money, cash, other.
    pub kind: AccountKind,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Request body for updating an account. The balance is not editable.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Display name.
    pub name: Option<String>,
    /// Account kind.
    pub kind: Option<AccountKind>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
}

fn error_response(err: &AccountError) -> axum::response::Response {
    match err {
        AccountError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Account not found: {id}")
            })),
        )
            .into_response(),
        AccountError::CannotDeleteWithReferences(count) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "account_referenced",
                "message": format!("Cannot delete account: {count} records reference it")
            })),
        )
            .into_response(),
        AccountError::Database(e) => {
            error!(error = %e, "Account operation failed");
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

/// GET `/accounts` - List accounts.
async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_accounts().await {
        Ok(accounts) => (StatusCode::OK, Json(json!({ "accounts": accounts }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/accounts` - Create an account with a zero balance.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    let input = CreateAccountInput {
        name: payload.name,
        kind: payload.kind,
        currency: payload.currency,
    };

    match repo.create_account(input).await {
        Ok(account) => {
            info!(account_id = %account.id, "Account created");
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/accounts/{id}` - Get one account.
async fn get_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_account_by_id(id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => error_response(&AccountError::NotFound(id)),
        Err(e) => error_response(&e),
    }
}

/// PUT `/accounts/{id}` - Update account metadata.
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    let input = UpdateAccountInput {
        name: payload.name,
        kind: payload.kind,
        currency: payload.currency,
    };

    match repo.update_account(id, input).await {
        Ok(account) => {
            info!(account_id = %id, "Account updated");
            (StatusCode::OK, Json(account)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/accounts/{id}` - Delete an unreferenced account.
async fn delete_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.delete_account(id).await {
        Ok(()) => {
            info!(account_id = %id, "Account deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/accounts/{id}/balance` - Current balance.
async fn get_balance(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.get_balance(id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "account_id": id, "balance": balance })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
