//! Loan repository: the asset loan engine.
//!
//! Issuing a loan stamps the asset's location with a loan marker and the
//! loan row and marker always move together in one database transaction,
//! so an asset can never be out on two ongoing loans.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tresora_core::asset::{LOCATION_IN_STOCK, is_loan_marker, is_loanable, loan_marker};
use uuid::Uuid;

use crate::entities::{
    asset_loans, assets,
    sea_orm_active_enums::{AssetStatus, LoanStatus},
    users,
};

/// Error types for loan operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    NotFound(Uuid),

    /// Asset not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Asset is not in service and in stock.
    #[error("Asset not available")]
    AssetNotAvailable,

    /// The loan has already been returned.
    #[error("Loan already returned")]
    AlreadyReturned,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for issuing a loan.
#[derive(Debug, Clone)]
pub struct IssueLoanInput {
    /// Asset to loan out.
    pub asset_id: Uuid,
    /// Borrowing user.
    pub user_id: Uuid,
    /// Loan start date.
    pub loan_date: NaiveDate,
    /// Expected return date.
    pub due_date: Option<NaiveDate>,
    /// Borrower signature image.
    pub signature: Option<Vec<u8>>,
}

/// Input for updating a loan. Omitted fields keep their value.
///
/// Setting the status to completed behaves exactly like a return,
/// including restoring the asset's location.
#[derive(Debug, Clone, Default)]
pub struct UpdateLoanInput {
    /// Change or clear the expected return date.
    pub due_date: Option<Option<NaiveDate>>,
    /// Actual return date, used when completing.
    pub return_date: Option<NaiveDate>,
    /// Loan status.
    pub status: Option<LoanStatus>,
    /// Change or clear the signature.
    pub signature: Option<Option<Vec<u8>>>,
}

/// Puts a loaned asset back in service and in stock if it still carries a
/// loan marker. Restores both fields: a status edit made while the asset
/// was out must not survive the return.
async fn restore_asset_location(
    txn: &DatabaseTransaction,
    asset_id: Uuid,
) -> Result<(), LoanError> {
    let asset = assets::Entity::find_by_id(asset_id)
        .one(txn)
        .await?
        .ok_or(LoanError::AssetNotFound(asset_id))?;

    if is_loan_marker(&asset.location) {
        let mut active: assets::ActiveModel = asset.into();
        active.status = Set(AssetStatus::InService);
        active.location = Set(LOCATION_IN_STOCK.to_string());
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;
    }

    Ok(())
}

/// Loan repository for asset loans.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a loan for an available asset.
    ///
    /// The availability check, the location marker, and the loan row are
    /// all inside one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset or user is missing, the asset is not
    /// available, or the database operation fails.
    pub async fn issue_loan(
        &self,
        input: IssueLoanInput,
    ) -> Result<asset_loans::Model, LoanError> {
        let txn = self.db.begin().await?;

        let asset = assets::Entity::find_by_id(input.asset_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::AssetNotFound(input.asset_id))?;

        if !is_loanable(asset.status.into(), &asset.location) {
            return Err(LoanError::AssetNotAvailable);
        }

        users::Entity::find_by_id(input.user_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::UserNotFound(input.user_id))?;

        let mut active: assets::ActiveModel = asset.into();
        active.location = Set(loan_marker(input.user_id));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let now = Utc::now().into();
        let loan = asset_loans::ActiveModel {
            id: Set(Uuid::new_v4()),
            asset_id: Set(input.asset_id),
            user_id: Set(input.user_id),
            loan_date: Set(input.loan_date),
            due_date: Set(input.due_date),
            return_date: Set(None),
            status: Set(LoanStatus::Ongoing),
            signature: Set(input.signature),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let loan = loan.insert(&txn).await?;

        txn.commit().await?;
        Ok(loan)
    }

    /// Returns an ongoing loan, restoring the asset to stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing, already returned, or the
    /// database operation fails.
    pub async fn return_loan(
        &self,
        id: Uuid,
        return_date: Option<NaiveDate>,
    ) -> Result<asset_loans::Model, LoanError> {
        let txn = self.db.begin().await?;

        let loan = asset_loans::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LoanError::NotFound(id))?;

        if loan.status == LoanStatus::Completed {
            return Err(LoanError::AlreadyReturned);
        }

        restore_asset_location(&txn, loan.asset_id).await?;

        let mut active: asset_loans::ActiveModel = loan.into();
        active.status = Set(LoanStatus::Completed);
        active.return_date = Set(Some(
            return_date.unwrap_or_else(|| Utc::now().date_naive()),
        ));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Updates a loan. Completing through an update behaves like a return.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing or the update fails.
    pub async fn update_loan(
        &self,
        id: Uuid,
        input: UpdateLoanInput,
    ) -> Result<asset_loans::Model, LoanError> {
        let txn = self.db.begin().await?;

        let loan = asset_loans::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LoanError::NotFound(id))?;

        let completing =
            input.status == Some(LoanStatus::Completed) && loan.status == LoanStatus::Ongoing;
        if completing {
            restore_asset_location(&txn, loan.asset_id).await?;
        }

        let mut active: asset_loans::ActiveModel = loan.into();
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(return_date) = input.return_date {
            active.return_date = Set(Some(return_date));
        } else if completing {
            active.return_date = Set(Some(Utc::now().date_naive()));
        }
        if let Some(signature) = input.signature {
            active.signature = Set(signature);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a loan, restoring the asset to stock if it was ongoing.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing or the database operation
    /// fails.
    pub async fn delete_loan(&self, id: Uuid) -> Result<(), LoanError> {
        let txn = self.db.begin().await?;

        let loan = asset_loans::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LoanError::NotFound(id))?;

        if loan.status == LoanStatus::Ongoing {
            restore_asset_location(&txn, loan.asset_id).await?;
        }

        asset_loans::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets a loan by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is not found or the query fails.
    pub async fn get_loan(&self, id: Uuid) -> Result<asset_loans::Model, LoanError> {
        let loan = asset_loans::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LoanError::NotFound(id))?;
        Ok(loan)
    }

    /// Lists loans, optionally scoped to one asset, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_loans(
        &self,
        asset_id: Option<Uuid>,
    ) -> Result<Vec<asset_loans::Model>, LoanError> {
        let mut query = asset_loans::Entity::find();
        if let Some(asset_id) = asset_id {
            query = query.filter(asset_loans::Column::AssetId.eq(asset_id));
        }

        let loans = query
            .order_by_desc(asset_loans::Column::LoanDate)
            .all(&self.db)
            .await?;
        Ok(loans)
    }
}
