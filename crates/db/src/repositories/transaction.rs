//! Transaction repository: the transaction engine.
//!
//! Records revenue/expense movements and keeps the owning account balance
//! in sync. Every mutation pairs its row write with the matching balance
//! delta inside one database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tresora_core::ledger::{reversal_effect, signed_effect};
use tresora_shared::types::is_positive_amount;
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::TransactionKind, transactions};
use crate::repositories::account::{LedgerError, apply_delta_in_txn};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction amounts must be strictly positive.
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for TransactionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => Self::AccountNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
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

/// Input for updating a transaction. Omitted fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// Move the transaction to another account.
    pub account_id: Option<Uuid>,
    /// Change or clear the category.
    pub category_id: Option<Option<Uuid>>,
    /// Flip revenue/expense.
    pub kind: Option<TransactionKind>,
    /// New positive amount.
    pub amount: Option<Decimal>,
    /// Change or clear the description.
    pub description: Option<Option<String>>,
    /// New transaction date.
    pub transaction_date: Option<NaiveDate>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// The two balance deltas an in-place edit produces, in application order:
/// reverse the old effect on the old account, then apply the new effect on
/// the new account. Both are applied even when the account is unchanged,
/// since amount or kind may differ.
#[must_use]
pub fn update_deltas(
    old_account: Uuid,
    old_kind: TransactionKind,
    old_amount: Decimal,
    new_account: Uuid,
    new_kind: TransactionKind,
    new_amount: Decimal,
) -> [(Uuid, Decimal); 2] {
    [
        (old_account, reversal_effect(old_kind.into(), old_amount)),
        (new_account, signed_effect(new_kind.into(), new_amount)),
    ]
}

/// Inserts a transaction row inside an open database transaction.
///
/// Shared with the invoice payment engine and the recurring scheduler so
/// that a payment or an executed recurring operation produces exactly the
/// same row shape a direct create does.
pub(crate) async fn insert_transaction_in_txn(
    txn: &DatabaseTransaction,
    input: &CreateTransactionInput,
) -> Result<transactions::Model, DbErr> {
    let now = Utc::now().into();
    let transaction = transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(input.account_id),
        category_id: Set(input.category_id),
        kind: Set(input.kind),
        amount: Set(input.amount),
        description: Set(input.description.clone()),
        transaction_date: Set(input.transaction_date),
        created_at: Set(now),
        updated_at: Set(now),
    };

    transaction.insert(txn).await
}

/// Transaction repository for ledger movements.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction and applies its effect to the account balance.
    ///
    /// Both writes happen in one database transaction; neither is visible
    /// unless both commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the account does not
    /// exist, or the database operation fails.
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        if !is_positive_amount(input.amount) {
            return Err(TransactionError::NonPositiveAmount);
        }

        let txn = self.db.begin().await?;

        apply_delta_in_txn(
            &txn,
            input.account_id,
            signed_effect(input.kind.into(), input.amount),
        )
        .await?;

        let transaction = insert_transaction_in_txn(&txn, &input).await?;

        txn.commit().await?;
        Ok(transaction)
    }

    /// Updates a transaction in place, rebalancing the affected accounts.
    ///
    /// The old effect is reversed on the old account, then the new effect
    /// is applied on the new account (which may be the same one), then the
    /// row is updated - all inside one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or either account is missing,
    /// the new amount is not positive, or the database operation fails.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        input: UpdateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        if let Some(amount) = input.amount
            && !is_positive_amount(amount)
        {
            return Err(TransactionError::NonPositiveAmount);
        }

        let txn = self.db.begin().await?;

        let existing = transactions::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        let new_account = input.account_id.unwrap_or(existing.account_id);
        let new_kind = input.kind.unwrap_or(existing.kind);
        let new_amount = input.amount.unwrap_or(existing.amount);

        let deltas = update_deltas(
            existing.account_id,
            existing.kind,
            existing.amount,
            new_account,
            new_kind,
            new_amount,
        );
        for (account_id, delta) in deltas {
            apply_delta_in_txn(&txn, account_id, delta).await?;
        }

        let mut active: transactions::ActiveModel = existing.into();
        active.account_id = Set(new_account);
        active.kind = Set(new_kind);
        active.amount = Set(new_amount);
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(date) = input.transaction_date {
            active.transaction_date = Set(date);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a transaction, reversing its effect on the account first.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not found or the database
    /// operation fails.
    pub async fn delete_transaction(&self, id: Uuid) -> Result<(), TransactionError> {
        let txn = self.db.begin().await?;

        let existing = transactions::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        apply_delta_in_txn(
            &txn,
            existing.account_id,
            reversal_effect(existing.kind.into(), existing.amount),
        )
        .await?;

        transactions::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is not found or the query fails.
    pub async fn get_transaction(&self, id: Uuid) -> Result<transactions::Model, TransactionError> {
        let transaction = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))?;
        Ok(transaction)
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, TransactionError> {
        let mut query = transactions::Entity::find();

        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(date_to));
        }

        let transactions = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_deltas_same_account_amount_change() {
        // Balance 1000, expense 200 -> 800, edit to 300 -> 700.
        let account = Uuid::new_v4();
        let deltas = update_deltas(
            account,
            TransactionKind::Expense,
            dec!(200),
            account,
            TransactionKind::Expense,
            dec!(300),
        );

        assert_eq!(deltas[0], (account, dec!(200)));
        assert_eq!(deltas[1], (account, dec!(-300)));

        let balance = dec!(800) + deltas[0].1 + deltas[1].1;
        assert_eq!(balance, dec!(700));
    }

    #[test]
    fn test_update_deltas_account_move() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let deltas = update_deltas(
            from,
            TransactionKind::Revenue,
            dec!(100),
            to,
            TransactionKind::Revenue,
            dec!(100),
        );

        assert_eq!(deltas[0], (from, dec!(-100)));
        assert_eq!(deltas[1], (to, dec!(100)));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::Revenue),
            Just(TransactionKind::Expense),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// When the account is unchanged, the two deltas collapse into the
        /// single rebalance the ledger expects.
        #[test]
        fn prop_same_account_deltas_sum_to_rebalance(
            old_kind in kind_strategy(),
            old_amount in amount_strategy(),
            new_kind in kind_strategy(),
            new_amount in amount_strategy(),
        ) {
            let account = Uuid::new_v4();
            let deltas = update_deltas(
                account, old_kind, old_amount,
                account, new_kind, new_amount,
            );

            let combined: Decimal = deltas.iter().map(|(_, d)| *d).sum();
            let expected = tresora_core::ledger::rebalance_delta(
                old_kind.into(), old_amount,
                new_kind.into(), new_amount,
            );
            prop_assert_eq!(combined, expected);
        }

        /// A no-op edit produces deltas that cancel exactly.
        #[test]
        fn prop_noop_edit_cancels(
            kind in kind_strategy(),
            amount in amount_strategy(),
        ) {
            let account = Uuid::new_v4();
            let deltas = update_deltas(account, kind, amount, account, kind, amount);
            let combined: Decimal = deltas.iter().map(|(_, d)| *d).sum();
            prop_assert_eq!(combined, Decimal::ZERO);
        }
    }
}
