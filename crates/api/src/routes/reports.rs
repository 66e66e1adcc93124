//! Report routes. All read-only.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::AppState;
use tresora_db::repositories::report::{ReportError, ReportRepository};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/summary", get(summary))
        .route("/reports/cash-flow", get(cash_flow))
        .route("/reports/assets", get(asset_summary))
        .route("/reports/overdue", get(overdue_invoices))
}

/// Query parameters for date-pinned reports.
#[derive(Debug, Deserialize, Default)]
pub struct AsOfQuery {
    /// Report date (default: today).
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for the cash flow report.
#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    /// Range start (inclusive).
    pub from: NaiveDate,
    /// Range end (inclusive).
    pub to: NaiveDate,
}

fn error_response(err: &ReportError) -> axum::response::Response {
    let ReportError::Database(e) = err;
    error!(error = %e, "Report query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// GET `/reports/summary` - Headline figures.
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());
    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match repo.summary(today).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/reports/cash-flow` - Revenue against expense for a date range.
async fn cash_flow(
    State(state): State<AppState>,
    Query(query): Query<CashFlowQuery>,
) -> impl IntoResponse {
    if query.from > query.to {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_range",
                "message": "Range start must not be after range end"
            })),
        )
            .into_response();
    }

    let repo = ReportRepository::new((*state.db).clone());

    match repo.cash_flow(query.from, query.to).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/reports/assets` - Asset register rollup.
async fn asset_summary(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    match repo.asset_summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/reports/overdue` - Invoices overdue as of the report date.
///
/// Overdue is computed here at read time; invoice rows are never updated.
async fn overdue_invoices(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());
    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match repo.overdue_invoices(today).await {
        Ok(overdue) => (StatusCode::OK, Json(json!({ "overdue": overdue }))).into_response(),
        Err(e) => error_response(&e),
    }
}
