//! API route modules.

pub mod accounts;
pub mod assets;
pub mod health;
pub mod invoices;
pub mod loans;
pub mod recurring;
pub mod reports;
pub mod transactions;

use axum::Router;

use crate::AppState;

/// Combines all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(invoices::routes())
        .merge(assets::routes())
        .merge(loans::routes())
        .merge(recurring::routes())
        .merge(reports::routes())
}
