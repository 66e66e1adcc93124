//! Invoice and payment routes.

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
use tresora_core::invoice::PaymentError;
use tresora_db::entities::sea_orm_active_enums::{InvoiceKind, InvoiceStatus, PaymentMethod};
use tresora_db::repositories::invoice::{
    AddPaymentInput, CreateInvoiceInput, InvoiceError, InvoiceLineInput, InvoiceRepository,
    UpdateInvoiceInput,
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", put(update_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
        .route("/invoices/{id}/payments", post(add_payment))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
}

/// One invoice line in a request body.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    /// What the line is for.
    pub designation: String,
    /// Quantity (non-negative).
    pub quantity: Decimal,
    /// Unit price (non-negative).
    pub unit_price: Decimal,
    /// Tax rate in percent (0-100).
    pub tax_rate: Decimal,
    /// Discount in percent (0-100).
    #[serde(default)]
    pub discount: Decimal,
}

impl From<LineRequest> for InvoiceLineInput {
    fn from(line: LineRequest) -> Self {
        Self {
            designation: line.designation,
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax_rate: line.tax_rate,
            discount: line.discount,
        }
    }
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Receivable or payable.
    pub kind: InvoiceKind,
    /// The client or supplier billed.
    pub third_party_id: Uuid,
    /// External invoice number, unique.
    pub invoice_number: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Invoice lines; totals are derived from these.
    pub lines: Vec<LineRequest>,
}

/// Request body for updating an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Rebill to another third party.
    pub third_party_id: Option<Uuid>,
    /// New invoice number.
    pub invoice_number: Option<String>,
    /// New issue date.
    pub issue_date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
    /// Externally-driven status change (sent, cancelled).
    pub status: Option<InvoiceStatus>,
    /// Replacement line set; replaces all existing lines.
    pub lines: Option<Vec<LineRequest>>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    /// Account the money moves through.
    pub account_id: Uuid,
    /// Positive amount, capped by the remaining balance.
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// How the payment was made.
    pub method: PaymentMethod,
}

fn error_response(err: &InvoiceError) -> axum::response::Response {
    match err {
        InvoiceError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Invoice not found: {id}")
            })),
        )
            .into_response(),
        InvoiceError::ThirdPartyNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "third_party_not_found",
                "message": format!("Third party not found: {id}")
            })),
        )
            .into_response(),
        InvoiceError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "account_not_found",
                "message": format!("Account not found: {id}")
            })),
        )
            .into_response(),
        InvoiceError::InvalidLine(detail) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_line",
                "message": format!("Invalid invoice line: {detail}")
            })),
        )
            .into_response(),
        InvoiceError::Payment(PaymentError::NonPositiveAmount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Payment amount must be positive"
            })),
        )
            .into_response(),
        InvoiceError::Payment(PaymentError::ExceedsRemaining { remaining }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "exceeds_remaining",
                "message": format!("Payment exceeds remaining balance of {remaining}")
            })),
        )
            .into_response(),
        InvoiceError::Cancelled => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invoice_cancelled",
                "message": "Invoice is cancelled and cannot accept payments"
            })),
        )
            .into_response(),
        InvoiceError::HasPayments => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "has_payments",
                "message": "Invoice has recorded payments and cannot be deleted"
            })),
        )
            .into_response(),
        InvoiceError::Database(e) => {
            error!(error = %e, "Invoice operation failed");
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

/// GET `/invoices` - List invoice headers.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.list_invoices(query.status).await {
        Ok(invoices) => (StatusCode::OK, Json(json!({ "invoices": invoices }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices` - Create an invoice with its lines.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let input = CreateInvoiceInput {
        kind: payload.kind,
        third_party_id: payload.third_party_id,
        invoice_number: payload.invoice_number,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        notes: payload.notes,
        lines: payload.lines.into_iter().map(Into::into).collect(),
    };

    match repo.create_invoice(input).await {
        Ok(details) => {
            info!(
                invoice_id = %details.invoice.id,
                invoice_number = %details.invoice.invoice_number,
                "Invoice created"
            );
            (StatusCode::CREATED, Json(details)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{id}` - Get an invoice with lines and payments.
async fn get_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.get_invoice(id).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/invoices/{id}` - Update an invoice; a new line set replaces all
/// existing lines and recomputes the totals.
async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let input = UpdateInvoiceInput {
        third_party_id: payload.third_party_id,
        invoice_number: payload.invoice_number,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        notes: payload.notes.map(Some),
        status: payload.status,
        lines: payload
            .lines
            .map(|lines| lines.into_iter().map(Into::into).collect()),
    };

    match repo.update_invoice(id, input).await {
        Ok(details) => {
            info!(invoice_id = %id, "Invoice updated");
            (StatusCode::OK, Json(details)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/invoices/{id}` - Delete an invoice without payments.
async fn delete_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete_invoice(id).await {
        Ok(()) => {
            info!(invoice_id = %id, "Invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{id}/payments` - Record a payment.
async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddPaymentRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let input = AddPaymentInput {
        account_id: payload.account_id,
        amount: payload.amount,
        payment_date: payload.payment_date,
        method: payload.method,
    };

    match repo.add_payment(id, input).await {
        Ok(result) => {
            info!(
                invoice_id = %id,
                payment_id = %result.payment.id,
                transaction_id = %result.transaction.id,
                "Payment recorded"
            );
            (StatusCode::CREATED, Json(result)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_line_discount_defaults_to_zero() {
        let line: LineRequest = serde_json::from_value(json!({
            "designation": "Consulting",
            "quantity": "2",
            "unit_price": "150.00",
            "tax_rate": "20"
        }))
        .unwrap();

        assert_eq!(line.discount, Decimal::ZERO);
    }

    #[rstest]
    #[case(InvoiceError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(InvoiceError::InvalidLine("quantity out of range".into()), StatusCode::BAD_REQUEST)]
    #[case(
        InvoiceError::Payment(PaymentError::NonPositiveAmount),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        InvoiceError::Payment(PaymentError::ExceedsRemaining { remaining: Decimal::ONE }),
        StatusCode::BAD_REQUEST
    )]
    #[case(InvoiceError::Cancelled, StatusCode::BAD_REQUEST)]
    #[case(InvoiceError::HasPayments, StatusCode::BAD_REQUEST)]
    fn test_error_status_mapping(#[case] err: InvoiceError, #[case] expected: StatusCode) {
        assert_eq!(error_response(&err).status(), expected);
    }
}
