//! Asset loan routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use tresora_db::entities::sea_orm_active_enums::LoanStatus;
use tresora_db::repositories::loan::{IssueLoanInput, LoanError, LoanRepository, UpdateLoanInput};

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans))
        .route("/loans", post(issue_loan))
        .route("/loans/{id}", get(get_loan))
        .route("/loans/{id}", put(update_loan))
        .route("/loans/{id}", delete(delete_loan))
        .route("/loans/{id}/return", post(return_loan))
}

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// Scope to one asset.
    pub asset_id: Option<Uuid>,
}

/// Request body for issuing a loan.
#[derive(Debug, Deserialize)]
pub struct IssueLoanRequest {
    /// Asset to loan out.
    pub asset_id: Uuid,
    /// Borrowing user.
    pub user_id: Uuid,
    /// Loan start date.
    pub loan_date: NaiveDate,
    /// Expected return date.
    pub due_date: Option<NaiveDate>,
    /// Borrower signature image, base64-free raw bytes.
    pub signature: Option<Vec<u8>>,
}

/// Request body for updating a loan.
#[derive(Debug, Deserialize)]
pub struct UpdateLoanRequest {
    /// Expected return date.
    pub due_date: Option<NaiveDate>,
    /// Actual return date.
    pub return_date: Option<NaiveDate>,
    /// Loan status; completing restores the asset to stock.
    pub status: Option<LoanStatus>,
    /// Borrower signature image.
    pub signature: Option<Vec<u8>>,
}

/// Request body for returning a loan.
#[derive(Debug, Deserialize, Default)]
pub struct ReturnLoanRequest {
    /// Return date (default: today).
    pub return_date: Option<NaiveDate>,
}

fn error_response(err: &LoanError) -> axum::response::Response {
    match err {
        LoanError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Loan not found: {id}")
            })),
        )
            .into_response(),
        LoanError::AssetNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "asset_not_found",
                "message": format!("Asset not found: {id}")
            })),
        )
            .into_response(),
        LoanError::UserNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "user_not_found",
                "message": format!("User not found: {id}")
            })),
        )
            .into_response(),
        LoanError::AssetNotAvailable => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "asset_not_available",
                "message": "Asset not available"
            })),
        )
            .into_response(),
        LoanError::AlreadyReturned => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "already_returned",
                "message": "Loan already returned"
            })),
        )
            .into_response(),
        LoanError::Database(e) => {
            error!(error = %e, "Loan operation failed");
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

/// GET `/loans` - List loans.
async fn list_loans(
    State(state): State<AppState>,
    Query(query): Query<ListLoansQuery>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.list_loans(query.asset_id).await {
        Ok(loans) => (StatusCode::OK, Json(json!({ "loans": loans }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/loans` - Issue a loan for an available asset.
async fn issue_loan(
    State(state): State<AppState>,
    Json(payload): Json<IssueLoanRequest>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    let input = IssueLoanInput {
        asset_id: payload.asset_id,
        user_id: payload.user_id,
        loan_date: payload.loan_date,
        due_date: payload.due_date,
        signature: payload.signature,
    };

    match repo.issue_loan(input).await {
        Ok(loan) => {
            info!(loan_id = %loan.id, asset_id = %loan.asset_id, "Loan issued");
            (StatusCode::CREATED, Json(loan)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/loans/{id}` - Get one loan.
async fn get_loan(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.get_loan(id).await {
        Ok(loan) => (StatusCode::OK, Json(loan)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/loans/{id}` - Update a loan.
async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLoanRequest>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    let input = UpdateLoanInput {
        due_date: payload.due_date.map(Some),
        return_date: payload.return_date,
        status: payload.status,
        signature: payload.signature.map(Some),
    };

    match repo.update_loan(id, input).await {
        Ok(loan) => {
            info!(loan_id = %id, "Loan updated");
            (StatusCode::OK, Json(loan)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/loans/{id}` - Delete a loan, restoring the asset if ongoing.
async fn delete_loan(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.delete_loan(id).await {
        Ok(()) => {
            info!(loan_id = %id, "Loan deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/loans/{id}/return` - Return an ongoing loan.
async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReturnLoanRequest>>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    let return_date = payload.and_then(|Json(p)| p.return_date);

    match repo.return_loan(id, return_date).await {
        Ok(loan) => {
            info!(loan_id = %id, asset_id = %loan.asset_id, "Loan returned");
            (StatusCode::OK, Json(loan)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LoanError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(LoanError::AssetNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(LoanError::AssetNotAvailable, StatusCode::BAD_REQUEST)]
    #[case(LoanError::AlreadyReturned, StatusCode::BAD_REQUEST)]
    fn test_error_status_mapping(#[case] err: LoanError, #[case] expected: StatusCode) {
        assert_eq!(error_response(&err).status(), expected);
    }
}
