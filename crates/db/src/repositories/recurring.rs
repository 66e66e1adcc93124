//! Recurring repository: the recurring scheduler.
//!
//! Each execution writes a ledger transaction, moves the account balance,
//! and advances the next due date by one frequency period, all in one
//! database transaction. The batch runner executes each due operation
//! independently so one failure never blocks the rest.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tresora_core::ledger::signed_effect;
use tresora_core::schedule::advance_due_date;
use tresora_shared::types::is_positive_amount;
use tracing::warn;
use uuid::Uuid;

use crate::entities::{
    accounts, recurring_operations,
    sea_orm_active_enums::{Frequency, TransactionKind},
    transactions,
};
use crate::repositories::account::{LedgerError, apply_delta_in_txn};
use crate::repositories::transaction::{CreateTransactionInput, insert_transaction_in_txn};

/// Error types for recurring operations.
#[derive(Debug, thiserror::Error)]
pub enum RecurringError {
    /// Recurring operation not found.
    #[error("Recurring operation not found: {0}")]
    NotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Operation is inactive and cannot execute.
    #[error("Recurring operation is inactive")]
    Inactive,

    /// Operation has no account to execute against.
    #[error("Recurring operation has no account")]
    NoAccount,

    /// Amounts must be strictly positive.
    #[error("Recurring amount must be positive")]
    NonPositiveAmount,

    /// Due day must be between 1 and 31.
    #[error("Due day must be between 1 and 31")]
    InvalidDueDay,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for RecurringError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => Self::AccountNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for creating a recurring operation.
#[derive(Debug, Clone)]
pub struct CreateRecurringInput {
    /// What the operation is.
    pub description: String,
    /// Revenue or expense.
    pub kind: TransactionKind,
    /// Positive amount per execution.
    pub amount: Decimal,
    /// Execution frequency.
    pub frequency: Frequency,
    /// Day of the month (1-31) the operation lands on.
    pub due_day: i16,
    /// Account executions post to.
    pub account_id: Option<Uuid>,
    /// Category stamped on executions.
    pub category_id: Option<Uuid>,
    /// First due date.
    pub next_due_date: NaiveDate,
}

/// Input for updating a recurring operation. Omitted fields keep their
/// value.
#[derive(Debug, Clone, Default)]
pub struct UpdateRecurringInput {
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
    /// Change or clear the account.
    pub account_id: Option<Option<Uuid>>,
    /// Change or clear the category.
    pub category_id: Option<Option<Uuid>>,
    /// Pause or resume the schedule.
    pub is_active: Option<bool>,
    /// Move the next due date.
    pub next_due_date: Option<NaiveDate>,
}

/// The result of executing one recurring operation.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedOperation {
    /// The operation after its schedule advanced.
    pub operation: recurring_operations::Model,
    /// The ledger transaction the execution created.
    pub transaction: transactions::Model,
    /// The account after the balance moved.
    pub account: accounts::Model,
}

/// One operation the batch runner could not execute.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionFailure {
    /// The operation that failed.
    pub operation_id: Uuid,
    /// Its description, for the report.
    pub description: String,
    /// What went wrong.
    pub error: String,
}

/// Aggregate report from a batch run over all due operations.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Operations that were due.
    pub total_due: usize,
    /// Operations that executed.
    pub executed_count: usize,
    /// Operations that failed, with their errors.
    pub errors: Vec<ExecutionFailure>,
}

fn validate_due_day(due_day: i16) -> Result<(), RecurringError> {
    if (1..=31).contains(&due_day) {
        Ok(())
    } else {
        Err(RecurringError::InvalidDueDay)
    }
}

/// Recurring repository for scheduled operations.
#[derive(Debug, Clone)]
pub struct RecurringRepository {
    db: DatabaseConnection,
}

impl RecurringRepository {
    /// Creates a new recurring repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a recurring operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount or due day is out of range, or the
    /// database operation fails.
    pub async fn create_recurring(
        &self,
        input: CreateRecurringInput,
    ) -> Result<recurring_operations::Model, RecurringError> {
        if !is_positive_amount(input.amount) {
            return Err(RecurringError::NonPositiveAmount);
        }
        validate_due_day(input.due_day)?;

        let now = Utc::now().into();
        let operation = recurring_operations::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(input.description),
            kind: Set(input.kind),
            amount: Set(input.amount),
            frequency: Set(input.frequency),
            due_day: Set(input.due_day),
            account_id: Set(input.account_id),
            category_id: Set(input.category_id),
            is_active: Set(true),
            next_due_date: Set(input.next_due_date),
            last_executed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let operation = operation.insert(&self.db).await?;
        Ok(operation)
    }

    /// Lists all recurring operations ordered by next due date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recurring(
        &self,
    ) -> Result<Vec<recurring_operations::Model>, RecurringError> {
        let operations = recurring_operations::Entity::find()
            .order_by_asc(recurring_operations::Column::NextDueDate)
            .all(&self.db)
            .await?;
        Ok(operations)
    }

    /// Gets a recurring operation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is not found or the query fails.
    pub async fn get_recurring(
        &self,
        id: Uuid,
    ) -> Result<recurring_operations::Model, RecurringError> {
        let operation = recurring_operations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecurringError::NotFound(id))?;
        Ok(operation)
    }

    /// Updates a recurring operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is missing, a field is out of
    /// range, or the update fails.
    pub async fn update_recurring(
        &self,
        id: Uuid,
        input: UpdateRecurringInput,
    ) -> Result<recurring_operations::Model, RecurringError> {
        if let Some(amount) = input.amount
            && !is_positive_amount(amount)
        {
            return Err(RecurringError::NonPositiveAmount);
        }
        if let Some(due_day) = input.due_day {
            validate_due_day(due_day)?;
        }

        let operation = recurring_operations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecurringError::NotFound(id))?;

        let mut active: recurring_operations::ActiveModel = operation.into();
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(frequency) = input.frequency {
            active.frequency = Set(frequency);
        }
        if let Some(due_day) = input.due_day {
            active.due_day = Set(due_day);
        }
        if let Some(account_id) = input.account_id {
            active.account_id = Set(account_id);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(next_due_date) = input.next_due_date {
            active.next_due_date = Set(next_due_date);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a recurring operation.
    ///
    /// Transactions already written by past executions are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is not found or the delete fails.
    pub async fn delete_recurring(&self, id: Uuid) -> Result<(), RecurringError> {
        recurring_operations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecurringError::NotFound(id))?;

        recurring_operations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Executes one recurring operation now.
    ///
    /// In one database transaction: writes the ledger transaction, moves
    /// the account balance, advances the next due date by one frequency
    /// period, and stamps the execution time.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is missing, inactive, has no
    /// account, or the database operation fails.
    pub async fn execute_recurring(&self, id: Uuid) -> Result<ExecutedOperation, RecurringError> {
        let txn = self.db.begin().await?;

        let operation = recurring_operations::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RecurringError::NotFound(id))?;

        if !operation.is_active {
            return Err(RecurringError::Inactive);
        }
        let account_id = operation.account_id.ok_or(RecurringError::NoAccount)?;

        let today = Utc::now().date_naive();
        let transaction = insert_transaction_in_txn(
            &txn,
            &CreateTransactionInput {
                account_id,
                category_id: operation.category_id,
                kind: operation.kind,
                amount: operation.amount,
                description: Some(format!("{} (recurring)", operation.description)),
                transaction_date: today,
            },
        )
        .await?;

        let account = apply_delta_in_txn(
            &txn,
            account_id,
            signed_effect(operation.kind.into(), operation.amount),
        )
        .await?;

        #[allow(clippy::cast_sign_loss)]
        let due_day = operation.due_day as u32;
        let next = advance_due_date(operation.next_due_date, operation.frequency.into(), due_day);

        let mut active: recurring_operations::ActiveModel = operation.into();
        active.next_due_date = Set(next);
        active.last_executed_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let operation = active.update(&txn).await?;

        txn.commit().await?;
        Ok(ExecutedOperation {
            operation,
            transaction,
            account,
        })
    }

    /// Executes every active operation whose next due date has arrived.
    ///
    /// Each operation runs in its own database transaction; a failure is
    /// recorded in the report and the batch continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the due-operation query itself fails.
    pub async fn execute_due(&self, today: NaiveDate) -> Result<ExecutionReport, RecurringError> {
        let due = recurring_operations::Entity::find()
            .filter(recurring_operations::Column::IsActive.eq(true))
            .filter(recurring_operations::Column::NextDueDate.lte(today))
            .filter(recurring_operations::Column::AccountId.is_not_null())
            .order_by_asc(recurring_operations::Column::NextDueDate)
            .all(&self.db)
            .await?;

        let total_due = due.len();
        let mut executed_count = 0;
        let mut errors = Vec::new();

        for operation in due {
            match self.execute_recurring(operation.id).await {
                Ok(_) => executed_count += 1,
                Err(err) => {
                    warn!(
                        operation_id = %operation.id,
                        error = %err,
                        "recurring execution failed, continuing batch"
                    );
                    errors.push(ExecutionFailure {
                        operation_id: operation.id,
                        description: operation.description,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(ExecutionReport {
            total_due,
            executed_count,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_day_bounds() {
        assert!(validate_due_day(1).is_ok());
        assert!(validate_due_day(31).is_ok());
        assert!(validate_due_day(0).is_err());
        assert!(validate_due_day(32).is_err());
        assert!(validate_due_day(-5).is_err());
    }
}
