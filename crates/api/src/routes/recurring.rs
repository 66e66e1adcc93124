//! Recurring operation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use tresora_db::entities::sea_orm_active_enums::{Frequency, TransactionKind};
use tresora_db::repositories::recurring::{
    CreateRecurringInput, RecurringError, RecurringRepository, UpdateRecurringInput,
};

/// Creates the recurring operation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recurring", get(list_recurring))
        .route("/recurring", post(create_recurring))
        .route("/recurring/{id}", get(get_recurring))
        .route("/recurring/{id}", put(update_recurring))
        .route("/recurring/{id}", delete(delete_recurring))
        .route("/recurring/{id}/execute", post(execute_recurring))
        .route("/recurring/execute-due", post(execute_due))
}

/// Request body for creating a recurring operation.
#[derive(Debug, Deserialize)]
pub struct CreateRecurringRequest {
    /// What the operation is.
    pub description: String,
    /// Revenue or expense.
    pub kind: TransactionKind,
    /// Positive amount per execution.
    pub amount: Decimal,
    /// Execution frequency.
    pub frequency: Frequency,
    /// Day of the month (1-31).
    pub due_day: i16,
    /// Account executions post to.
    pub account_id: Option<Uuid>,
    /// Category stamped on executions.
    pub category_id: Option<Uuid>,
    /// First due date.
    pub next_due_date: NaiveDate,
}

/// Request body for updating a recurring operation.
#[derive(Debug, Deserialize)]
pub struct UpdateRecurringRequest {
    /// Description.
    pub description: Option<String>,
    /// Revenue or expense.
    pub kind: Option<TransactionKind>,
    /// Positive amount per execution.
    pub amount: Option<Decimal>,
    /// Execution frequency.
    pub frequency: Option<Frequency>,
    /// Day of the month (1-31).
    pub due_day: Option<i16>,
    /// Account executions post to.
    pub account_id: Option<Uuid>,
    /// Category stamped on executions.
    pub category_id: Option<Uuid>,
    /// Pause or resume the schedule.
    pub is_active: Option<bool>,
    /// Move the next due date.
    pub next_due_date: Option<NaiveDate>,
}

/// Request body for a batch run over due operations.
#[derive(Debug, Deserialize, Default)]
pub struct ExecuteDueRequest {
    /// Run as of this date (default: today).
    pub today: Option<NaiveDate>,
}

fn error_response(err: &RecurringError) -> axum::response::Response {
    match err {
        RecurringError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Recurring operation not found: {id}")
            })),
        )
            .into_response(),
        RecurringError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "account_not_found",
                "message": format!("Account not found: {id}")
            })),
        )
            .into_response(),
        RecurringError::Inactive => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "inactive",
                "message": "Recurring operation is inactive"
            })),
        )
            .into_response(),
        RecurringError::NoAccount => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "no_account",
                "message": "Recurring operation has no account"
            })),
        )
            .into_response(),
        RecurringError::NonPositiveAmount => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Recurring amount must be positive"
            })),
        )
            .into_response(),
        RecurringError::InvalidDueDay => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_due_day",
                "message": "Due day must be between 1 and 31"
            })),
        )
            .into_response(),
        RecurringError::Database(e) => {
            error!(error = %e, "Recurring operation failed");
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

/// GET `/recurring` - List recurring operations.
async fn list_recurring(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    match repo.list_recurring().await {
        Ok(operations) => {
            (StatusCode::OK, Json(json!({ "recurring": operations }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/recurring` - Create a recurring operation.
async fn create_recurring(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecurringRequest>,
) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    let input = CreateRecurringInput {
        description: payload.description,
        kind: payload.kind,
        amount: payload.amount,
        frequency: payload.frequency,
        due_day: payload.due_day,
        account_id: payload.account_id,
        category_id: payload.category_id,
        next_due_date: payload.next_due_date,
    };

    match repo.create_recurring(input).await {
        Ok(operation) => {
            info!(operation_id = %operation.id, "Recurring operation created");
            (StatusCode::CREATED, Json(operation)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/recurring/{id}` - Get one recurring operation.
async fn get_recurring(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    match repo.get_recurring(id).await {
        Ok(operation) => (StatusCode::OK, Json(operation)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/recurring/{id}` - Update a recurring operation.
async fn update_recurring(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecurringRequest>,
) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    let input = UpdateRecurringInput {
        description: payload.description,
        kind: payload.kind,
        amount: payload.amount,
        frequency: payload.frequency,
        due_day: payload.due_day,
        account_id: payload.account_id.map(Some),
        category_id: payload.category_id.map(Some),
        is_active: payload.is_active,
        next_due_date: payload.next_due_date,
    };

    match repo.update_recurring(id, input).await {
        Ok(operation) => {
            info!(operation_id = %id, "Recurring operation updated");
            (StatusCode::OK, Json(operation)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/recurring/{id}` - Delete a recurring operation.
async fn delete_recurring(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    match repo.delete_recurring(id).await {
        Ok(()) => {
            info!(operation_id = %id, "Recurring operation deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/recurring/{id}/execute` - Execute one recurring operation now.
async fn execute_recurring(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());

    match repo.execute_recurring(id).await {
        Ok(result) => {
            info!(
                operation_id = %id,
                transaction_id = %result.transaction.id,
                next_due_date = %result.operation.next_due_date,
                "Recurring operation executed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/recurring/execute-due` - Execute all due operations, collecting
/// failures instead of stopping.
async fn execute_due(
    State(state): State<AppState>,
    payload: Option<Json<ExecuteDueRequest>>,
) -> impl IntoResponse {
    let repo = RecurringRepository::new((*state.db).clone());
    let today = payload
        .and_then(|Json(p)| p.today)
        .unwrap_or_else(|| Utc::now().date_naive());

    match repo.execute_due(today).await {
        Ok(report) => {
            info!(
                total_due = report.total_due,
                executed = report.executed_count,
                failed = report.errors.len(),
                "Recurring batch executed"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RecurringError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(RecurringError::Inactive, StatusCode::BAD_REQUEST)]
    #[case(RecurringError::NoAccount, StatusCode::BAD_REQUEST)]
    #[case(RecurringError::NonPositiveAmount, StatusCode::BAD_REQUEST)]
    #[case(RecurringError::InvalidDueDay, StatusCode::BAD_REQUEST)]
    fn test_error_status_mapping(#[case] err: RecurringError, #[case] expected: StatusCode) {
        assert_eq!(error_response(&err).status(), expected);
    }
}
