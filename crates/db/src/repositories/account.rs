//! Account repository: the account ledger.
//!
//! Holds the balance-adjustment primitive every other engine routes
//! through. No sign decision lives here; callers pass an already-signed
//! delta and the ledger just applies it.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    accounts, assets, recurring_operations, sea_orm_active_enums::AccountKind, transactions,
};

/// Error for the balance-delta primitive.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Account is referenced by transactions, assets, or recurring
    /// operations and cannot be deleted.
    #[error("Cannot delete account: {0} records reference it")]
    CannotDeleteWithReferences(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for AccountError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => Self::NotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Input for updating an account.
///
/// The balance is deliberately absent: it is only ever mutated through
/// balance deltas applied by the engines.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Display name.
    pub name: Option<String>,
    /// Account kind.
    pub kind: Option<AccountKind>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
}

/// Applies a signed delta to an account balance inside an open database
/// transaction.
///
/// This is the only code path that writes `accounts.balance`. Used by the
/// transaction engine, the invoice payment engine, and the recurring
/// scheduler.
pub(crate) async fn apply_delta_in_txn(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    delta: Decimal,
) -> Result<accounts::Model, LedgerError> {
    let account = accounts::Entity::find_by_id(account_id)
        .one(txn)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))?;

    let new_balance = account.balance + delta;

    let mut active: accounts::ActiveModel = account.into();
    active.balance = Set(new_balance);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(txn).await?;
    Ok(updated)
}

/// Account repository for CRUD and balance operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            kind: Set(input.kind),
            balance: Set(Decimal::ZERO),
            currency: Set(input.currency),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Lists all accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<accounts::Model>, AccountError> {
        let account = accounts::Entity::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }

    /// Updates account metadata (never the balance).
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the update fails.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut active: accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an account.
    ///
    /// Refused while any transaction, asset, or recurring operation still
    /// references it; reversing those first is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or is still referenced.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AccountError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let references = self.count_references(id).await?;
        if references > 0 {
            return Err(AccountError::CannotDeleteWithReferences(references));
        }

        accounts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Applies a signed delta to an account balance as a standalone
    /// atomic operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the write fails.
    pub async fn apply_delta(
        &self,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<accounts::Model, AccountError> {
        let txn = self.db.begin().await?;
        let account = apply_delta_in_txn(&txn, account_id, delta).await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Gets the current balance of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found.
    pub async fn get_balance(&self, account_id: Uuid) -> Result<Decimal, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;
        Ok(account.balance)
    }

    /// Sums the balances of all accounts (reporting).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sum_balances(&self) -> Result<Decimal, AccountError> {
        let accounts = accounts::Entity::find().all(&self.db).await?;
        Ok(accounts.iter().map(|a| a.balance).sum())
    }

    /// Counts rows in other tables still pointing at this account.
    async fn count_references(&self, account_id: Uuid) -> Result<u64, AccountError> {
        let transactions = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;

        let recurring = recurring_operations::Entity::find()
            .filter(recurring_operations::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;

        let assets = assets::Entity::find()
            .filter(assets::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;

        Ok(transactions + recurring + assets)
    }
}
