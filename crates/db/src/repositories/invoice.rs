//! Invoice repository: the invoice and payment engine.
//!
//! Invoice totals are always derived from lines, never edited directly.
//! Recording a payment creates the ledger transaction, moves the account
//! balance, and advances the invoice status in one database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tresora_core::invoice::{
    LineInput, PaymentError, compute_totals, derive_status_after_payment, is_deletable,
    line_amounts, validate_payment,
};
use tresora_core::ledger::signed_effect;
use tresora_shared::types::round_money;
use uuid::Uuid;

use crate::entities::{
    invoice_lines, invoice_payments, invoices,
    sea_orm_active_enums::{InvoiceKind, InvoiceStatus, PaymentMethod},
    third_parties, transactions,
};
use crate::repositories::account::{LedgerError, apply_delta_in_txn};
use crate::repositories::transaction::{CreateTransactionInput, insert_transaction_in_txn};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Third party not found.
    #[error("Third party not found: {0}")]
    ThirdPartyNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A line carries an out-of-range quantity, price, or rate.
    #[error("Invalid invoice line: {0}")]
    InvalidLine(String),

    /// Payment rejected by the remaining-balance rules.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Cancelled invoices accept no further payments.
    #[error("Invoice is cancelled and cannot accept payments")]
    Cancelled,

    /// Invoices with recorded payments cannot be deleted.
    #[error("Invoice has recorded payments and cannot be deleted")]
    HasPayments,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for InvoiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => Self::AccountNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// One invoice line as supplied by the caller.
#[derive(Debug, Clone)]
pub struct InvoiceLineInput {
    /// What the line is for.
    pub designation: String,
    /// Quantity (non-negative).
    pub quantity: Decimal,
    /// Unit price (non-negative).
    pub unit_price: Decimal,
    /// Tax rate in percent (0-100).
    pub tax_rate: Decimal,
    /// Discount in percent (0-100).
    pub discount: Decimal,
}

impl From<&InvoiceLineInput> for LineInput {
    fn from(line: &InvoiceLineInput) -> Self {
        Self {
            designation: line.designation.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax_rate: line.tax_rate,
            discount: line.discount,
        }
    }
}

/// Input for creating an invoice with its lines.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
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
    pub lines: Vec<InvoiceLineInput>,
}

/// Input for updating an invoice. Omitted fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// Rebill to another third party.
    pub third_party_id: Option<Uuid>,
    /// New invoice number.
    pub invoice_number: Option<String>,
    /// New issue date.
    pub issue_date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// Change or clear the notes.
    pub notes: Option<Option<String>>,
    /// Externally-driven status change (sent, cancelled).
    pub status: Option<InvoiceStatus>,
    /// Replacement line set. Lines are replaced wholesale, never merged,
    /// and totals are recomputed from the new set.
    pub lines: Option<Vec<InvoiceLineInput>>,
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct AddPaymentInput {
    /// Account the money moves through.
    pub account_id: Uuid,
    /// Positive payment amount, capped by the remaining balance.
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// How the payment was made.
    pub method: PaymentMethod,
}

/// An invoice with its lines and payments.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithDetails {
    /// The invoice header.
    pub invoice: invoices::Model,
    /// Lines in position order.
    pub lines: Vec<invoice_lines::Model>,
    /// Payments in date order.
    pub payments: Vec<invoice_payments::Model>,
}

/// A recorded payment together with the ledger transaction it created.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentWithTransaction {
    /// The payment row.
    pub payment: invoice_payments::Model,
    /// The ledger transaction.
    pub transaction: transactions::Model,
}

/// Checks line fields against their valid ranges.
fn validate_lines(lines: &[InvoiceLineInput]) -> Result<(), InvoiceError> {
    for line in lines {
        if line.quantity < Decimal::ZERO {
            return Err(InvoiceError::InvalidLine(format!(
                "negative quantity on '{}'",
                line.designation
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(InvoiceError::InvalidLine(format!(
                "negative unit price on '{}'",
                line.designation
            )));
        }
        if line.tax_rate < Decimal::ZERO || line.tax_rate > Decimal::ONE_HUNDRED {
            return Err(InvoiceError::InvalidLine(format!(
                "tax rate out of range on '{}'",
                line.designation
            )));
        }
        if line.discount < Decimal::ZERO || line.discount > Decimal::ONE_HUNDRED {
            return Err(InvoiceError::InvalidLine(format!(
                "discount out of range on '{}'",
                line.designation
            )));
        }
    }
    Ok(())
}

/// Inserts the given lines for an invoice, storing per-line display amounts.
async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
    lines: &[InvoiceLineInput],
) -> Result<Vec<invoice_lines::Model>, DbErr> {
    let now = Utc::now().into();
    let mut inserted = Vec::with_capacity(lines.len());

    for (position, line) in lines.iter().enumerate() {
        let amounts = line_amounts(&line.into());
        let row = invoice_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            designation: Set(line.designation.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            tax_rate: Set(line.tax_rate),
            discount: Set(line.discount),
            subtotal: Set(round_money(amounts.subtotal)),
            tax: Set(round_money(amounts.tax)),
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            position: Set(position as i32),
            created_at: Set(now),
        };
        inserted.push(row.insert(conn).await?);
    }

    Ok(inserted)
}

/// Invoice repository for invoices, lines, and payments.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice and its lines, deriving the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the third party is missing, a line is out of
    /// range, or the database operation fails.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceWithDetails, InvoiceError> {
        validate_lines(&input.lines)?;

        let txn = self.db.begin().await?;

        third_parties::Entity::find_by_id(input.third_party_id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::ThirdPartyNotFound(input.third_party_id))?;

        let core_lines: Vec<LineInput> = input.lines.iter().map(Into::into).collect();
        let totals = compute_totals(&core_lines);

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind),
            third_party_id: Set(input.third_party_id),
            invoice_number: Set(input.invoice_number),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            subtotal: Set(totals.subtotal),
            tax_amount: Set(totals.tax_amount),
            total_amount: Set(totals.total_amount),
            amount_paid: Set(Decimal::ZERO),
            status: Set(InvoiceStatus::Draft),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let invoice = invoice.insert(&txn).await?;

        let lines = insert_lines(&txn, invoice.id, &input.lines).await?;

        txn.commit().await?;
        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments: Vec::new(),
        })
    }

    /// Updates an invoice, replacing its lines when a new set is given.
    ///
    /// Replacing lines recomputes the totals and re-derives the paid or
    /// partially-paid status against whatever has already been paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice or third party is missing, a line is
    /// out of range, or the database operation fails.
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<InvoiceWithDetails, InvoiceError> {
        if let Some(lines) = &input.lines {
            validate_lines(lines)?;
        }

        let txn = self.db.begin().await?;

        let existing = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        if let Some(third_party_id) = input.third_party_id {
            third_parties::Entity::find_by_id(third_party_id)
                .one(&txn)
                .await?
                .ok_or(InvoiceError::ThirdPartyNotFound(third_party_id))?;
        }

        let amount_paid = existing.amount_paid;
        let mut status = input.status.unwrap_or(existing.status);

        let mut active: invoices::ActiveModel = existing.into();
        if let Some(third_party_id) = input.third_party_id {
            active.third_party_id = Set(third_party_id);
        }
        if let Some(invoice_number) = input.invoice_number {
            active.invoice_number = Set(invoice_number);
        }
        if let Some(issue_date) = input.issue_date {
            active.issue_date = Set(issue_date);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }

        if let Some(lines) = &input.lines {
            invoice_lines::Entity::delete_many()
                .filter(invoice_lines::Column::InvoiceId.eq(id))
                .exec(&txn)
                .await?;
            insert_lines(&txn, id, lines).await?;

            let core_lines: Vec<LineInput> = lines.iter().map(Into::into).collect();
            let totals = compute_totals(&core_lines);
            active.subtotal = Set(totals.subtotal);
            active.tax_amount = Set(totals.tax_amount);
            active.total_amount = Set(totals.total_amount);

            if amount_paid > Decimal::ZERO {
                status = derive_status_after_payment(
                    amount_paid,
                    totals.total_amount,
                    status.into(),
                )
                .into();
            }
        }

        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let lines = invoice_lines::Entity::find()
            .filter(invoice_lines::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_lines::Column::Position)
            .all(&txn)
            .await?;
        let payments = invoice_payments::Entity::find()
            .filter(invoice_payments::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_payments::Column::PaymentDate)
            .all(&txn)
            .await?;

        txn.commit().await?;
        Ok(InvoiceWithDetails {
            invoice: updated,
            lines,
            payments,
        })
    }

    /// Records a payment against an invoice.
    ///
    /// In one database transaction: validates the amount against the
    /// remaining balance, creates the ledger transaction (revenue for
    /// receivables, expense for payables), moves the account balance,
    /// inserts the payment row, and advances the invoice status.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice or account is missing, the invoice is
    /// cancelled, the amount fails validation, or the database operation
    /// fails.
    pub async fn add_payment(
        &self,
        invoice_id: Uuid,
        input: AddPaymentInput,
    ) -> Result<PaymentWithTransaction, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        if invoice.status == InvoiceStatus::Cancelled {
            return Err(InvoiceError::Cancelled);
        }

        validate_payment(input.amount, invoice.total_amount, invoice.amount_paid)?;

        let kind = invoice.kind.payment_kind();
        let transaction = insert_transaction_in_txn(
            &txn,
            &CreateTransactionInput {
                account_id: input.account_id,
                category_id: None,
                kind,
                amount: input.amount,
                description: Some(format!("Payment for invoice {}", invoice.invoice_number)),
                transaction_date: input.payment_date,
            },
        )
        .await?;

        apply_delta_in_txn(
            &txn,
            input.account_id,
            signed_effect(kind.into(), input.amount),
        )
        .await?;

        let payment = invoice_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            transaction_id: Set(transaction.id),
            amount: Set(input.amount),
            payment_date: Set(input.payment_date),
            method: Set(input.method),
            created_at: Set(Utc::now().into()),
        };
        let payment = payment.insert(&txn).await?;

        let new_paid = invoice.amount_paid + input.amount;
        let new_status =
            derive_status_after_payment(new_paid, invoice.total_amount, invoice.status.into());

        let mut active: invoices::ActiveModel = invoice.into();
        active.amount_paid = Set(new_paid);
        active.status = Set(new_status.into());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(PaymentWithTransaction {
            payment,
            transaction,
        })
    }

    /// Deletes an invoice and its lines.
    ///
    /// Refused once any payment has been recorded: there is no payment
    /// reversal, so the ledger effects would be orphaned.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing, has payments, or the
    /// database operation fails.
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        if !is_deletable(invoice.status.into()) {
            return Err(InvoiceError::HasPayments);
        }

        // Lines cascade with the invoice.
        invoices::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Gets an invoice with its lines and payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or the query fails.
    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceWithDetails, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let lines = invoice_lines::Entity::find()
            .filter(invoice_lines::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_lines::Column::Position)
            .all(&self.db)
            .await?;

        let payments = invoice_payments::Entity::find()
            .filter(invoice_payments::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_payments::Column::PaymentDate)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments,
        })
    }

    /// Lists invoice headers, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<invoices::Model>, InvoiceError> {
        let mut query = invoices::Entity::find();
        if let Some(status) = status {
            query = query.filter(invoices::Column::Status.eq(status));
        }

        let invoices = query
            .order_by_desc(invoices::Column::IssueDate)
            .order_by_desc(invoices::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(invoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate: Decimal,
        discount: Decimal,
    ) -> InvoiceLineInput {
        InvoiceLineInput {
            designation: "item".to_string(),
            quantity,
            unit_price,
            tax_rate,
            discount,
        }
    }

    #[test]
    fn test_validate_lines_accepts_bounds() {
        let lines = vec![
            line(dec!(0), dec!(0), dec!(0), dec!(0)),
            line(dec!(10), dec!(99.99), dec!(100), dec!(100)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_validate_lines_rejects_out_of_range() {
        assert!(validate_lines(&[line(dec!(-1), dec!(10), dec!(0), dec!(0))]).is_err());
        assert!(validate_lines(&[line(dec!(1), dec!(-10), dec!(0), dec!(0))]).is_err());
        assert!(validate_lines(&[line(dec!(1), dec!(10), dec!(101), dec!(0))]).is_err());
        assert!(validate_lines(&[line(dec!(1), dec!(10), dec!(0), dec!(100.01))]).is_err());
    }

    #[test]
    fn test_line_input_conversion_preserves_fields() {
        let input = line(dec!(2), dec!(100), dec!(20), dec!(10));
        let core: LineInput = (&input).into();
        assert_eq!(core.quantity, dec!(2));
        assert_eq!(core.unit_price, dec!(100));
        assert_eq!(core.tax_rate, dec!(20));
        assert_eq!(core.discount, dec!(10));
    }
}
