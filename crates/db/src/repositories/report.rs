//! Report repository: read-only rollups.
//!
//! Nothing here writes. Overdue is computed at read time from the due date
//! and status; it is never persisted back onto the invoice.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tresora_core::asset::is_loan_marker;
use uuid::Uuid;

use crate::entities::{
    accounts, asset_loans, assets, invoices,
    sea_orm_active_enums::{AssetStatus, InvoiceKind, InvoiceStatus, LoanStatus, TransactionKind},
    transactions,
};

/// Error types for report queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Headline figures across the whole ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Sum of all account balances.
    pub total_balance: Decimal,
    /// Number of accounts.
    pub account_count: usize,
    /// Unpaid remainder across open receivable invoices.
    pub open_receivables: Decimal,
    /// Unpaid remainder across open payable invoices.
    pub open_payables: Decimal,
    /// Invoices overdue as of the report date.
    pub overdue_count: usize,
}

/// Revenue against expense over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct CashFlow {
    /// Range start (inclusive).
    pub from: NaiveDate,
    /// Range end (inclusive).
    pub to: NaiveDate,
    /// Total revenue in the range.
    pub revenue: Decimal,
    /// Total expense in the range.
    pub expense: Decimal,
    /// revenue - expense.
    pub net: Decimal,
}

/// Asset register rollup.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    /// Number of registered assets.
    pub total_assets: usize,
    /// Newly acquired assets.
    pub new: usize,
    /// Assets in service.
    pub in_service: usize,
    /// Assets under maintenance.
    pub maintenance: usize,
    /// Decommissioned assets.
    pub out_of_service: usize,
    /// Assets currently out on loan.
    pub loaned_out: usize,
    /// Ongoing loan rows.
    pub ongoing_loans: u64,
    /// Sum of known acquisition costs.
    pub total_acquisition_cost: Decimal,
}

/// One overdue invoice as of the report date.
#[derive(Debug, Clone, Serialize)]
pub struct OverdueInvoice {
    /// Invoice ID.
    pub invoice_id: Uuid,
    /// External invoice number.
    pub invoice_number: String,
    /// Receivable or payable.
    pub kind: InvoiceKind,
    /// Due date that has passed.
    pub due_date: NaiveDate,
    /// What is still owed.
    pub remaining: Decimal,
    /// Days past due.
    pub days_overdue: i64,
}

/// Returns true if an invoice counts as overdue on `today`.
///
/// Settled and cancelled invoices never count, whatever their due date.
fn counts_as_overdue(status: InvoiceStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    !matches!(status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) && due_date < today
}

/// Report repository for ledger, invoice, and asset rollups.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the headline summary as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn summary(&self, today: NaiveDate) -> Result<Summary, ReportError> {
        let accounts = accounts::Entity::find().all(&self.db).await?;
        let total_balance = accounts.iter().map(|a| a.balance).sum();

        let open = invoices::Entity::find()
            .filter(invoices::Column::Status.ne(InvoiceStatus::Paid))
            .filter(invoices::Column::Status.ne(InvoiceStatus::Cancelled))
            .all(&self.db)
            .await?;

        let mut open_receivables = Decimal::ZERO;
        let mut open_payables = Decimal::ZERO;
        let mut overdue_count = 0;
        for invoice in &open {
            let remaining = invoice.total_amount - invoice.amount_paid;
            match invoice.kind {
                InvoiceKind::ClientReceivable => open_receivables += remaining,
                InvoiceKind::ExpensePayable => open_payables += remaining,
            }
            if counts_as_overdue(invoice.status, invoice.due_date, today) {
                overdue_count += 1;
            }
        }

        Ok(Summary {
            total_balance,
            account_count: accounts.len(),
            open_receivables,
            open_payables,
            overdue_count,
        })
    }

    /// Revenue against expense for transactions dated within the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn cash_flow(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CashFlow, ReportError> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::TransactionDate.gte(from))
            .filter(transactions::Column::TransactionDate.lte(to))
            .all(&self.db)
            .await?;

        let mut revenue = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for row in rows {
            match row.kind {
                TransactionKind::Revenue => revenue += row.amount,
                TransactionKind::Expense => expense += row.amount,
            }
        }

        Ok(CashFlow {
            from,
            to,
            revenue,
            expense,
            net: revenue - expense,
        })
    }

    /// Rolls up the asset register.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn asset_summary(&self) -> Result<AssetSummary, ReportError> {
        let assets = assets::Entity::find().all(&self.db).await?;

        let count_status =
            |status: AssetStatus| assets.iter().filter(|a| a.status == status).count();
        let loaned_out = assets
            .iter()
            .filter(|a| is_loan_marker(&a.location))
            .count();
        let total_acquisition_cost = assets
            .iter()
            .filter_map(|a| a.acquisition_cost)
            .sum();

        let ongoing_loans = asset_loans::Entity::find()
            .filter(asset_loans::Column::Status.eq(LoanStatus::Ongoing))
            .count(&self.db)
            .await?;

        Ok(AssetSummary {
            total_assets: assets.len(),
            new: count_status(AssetStatus::New),
            in_service: count_status(AssetStatus::InService),
            maintenance: count_status(AssetStatus::Maintenance),
            out_of_service: count_status(AssetStatus::OutOfService),
            loaned_out,
            ongoing_loans,
            total_acquisition_cost,
        })
    }

    /// Lists invoices overdue as of `today`, most overdue first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn overdue_invoices(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<OverdueInvoice>, ReportError> {
        let candidates = invoices::Entity::find()
            .filter(invoices::Column::Status.ne(InvoiceStatus::Paid))
            .filter(invoices::Column::Status.ne(InvoiceStatus::Cancelled))
            .filter(invoices::Column::DueDate.lt(today))
            .order_by_asc(invoices::Column::DueDate)
            .all(&self.db)
            .await?;

        let overdue = candidates
            .into_iter()
            .map(|invoice| OverdueInvoice {
                invoice_id: invoice.id,
                invoice_number: invoice.invoice_number,
                kind: invoice.kind,
                due_date: invoice.due_date,
                remaining: invoice.total_amount - invoice.amount_paid,
                days_overdue: (today - invoice.due_date).num_days(),
            })
            .collect();

        Ok(overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_overdue_requires_past_due_date() {
        let today = date(2026, 8, 23);
        assert!(counts_as_overdue(InvoiceStatus::Sent, date(2026, 8, 22), today));
        assert!(!counts_as_overdue(InvoiceStatus::Sent, date(2026, 8, 23), today));
        assert!(!counts_as_overdue(InvoiceStatus::Sent, date(2026, 8, 24), today));
    }

    #[test]
    fn test_settled_invoices_never_overdue() {
        let today = date(2026, 8, 23);
        let past = date(2026, 1, 1);
        assert!(!counts_as_overdue(InvoiceStatus::Paid, past, today));
        assert!(!counts_as_overdue(InvoiceStatus::Cancelled, past, today));
        assert!(counts_as_overdue(InvoiceStatus::PartiallyPaid, past, today));
        assert!(counts_as_overdue(InvoiceStatus::Draft, past, today));
    }
}
