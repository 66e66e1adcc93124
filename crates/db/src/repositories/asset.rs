//! Asset repository.
//!
//! Plain CRUD over the asset register. Availability is carried entirely by
//! the (status, location) pair; the loan engine owns the loan markers, so
//! this repository refuses to delete an asset that is currently out.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tresora_core::asset::is_loan_marker;
use uuid::Uuid;

use crate::entities::{
    asset_loans, assets,
    sea_orm_active_enums::{AssetStatus, LoanStatus},
};

/// Error types for asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset not found.
    #[error("Asset not found: {0}")]
    NotFound(Uuid),

    /// Asset is out on a loan and cannot be deleted.
    #[error("Asset is currently loaned out and cannot be deleted")]
    CurrentlyLoaned,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for registering an asset.
#[derive(Debug, Clone)]
pub struct CreateAssetInput {
    /// Display name.
    pub name: String,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Initial service status.
    pub status: AssetStatus,
    /// Initial location (`in_stock`, `office`, ...).
    pub location: String,
    /// Account carrying the acquisition cost.
    pub account_id: Option<Uuid>,
    /// Acquisition cost.
    pub acquisition_cost: Option<Decimal>,
    /// Acquisition date.
    pub acquisition_date: Option<chrono::NaiveDate>,
}

/// Input for updating an asset. Omitted fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateAssetInput {
    /// Display name.
    pub name: Option<String>,
    /// Change or clear the serial number.
    pub serial_number: Option<Option<String>>,
    /// Service status.
    pub status: Option<AssetStatus>,
    /// Location. Loan markers are reserved for the loan engine.
    pub location: Option<String>,
    /// Change or clear the cost account.
    pub account_id: Option<Option<Uuid>>,
    /// Change or clear the acquisition cost.
    pub acquisition_cost: Option<Option<Decimal>>,
    /// Change or clear the acquisition date.
    pub acquisition_date: Option<Option<chrono::NaiveDate>>,
}

/// Asset repository for the asset register.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    db: DatabaseConnection,
}

impl AssetRepository {
    /// Creates a new asset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a new asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_asset(&self, input: CreateAssetInput) -> Result<assets::Model, AssetError> {
        let now = Utc::now().into();
        let asset = assets::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            serial_number: Set(input.serial_number),
            status: Set(input.status),
            location: Set(input.location),
            account_id: Set(input.account_id),
            acquisition_cost: Set(input.acquisition_cost),
            acquisition_date: Set(input.acquisition_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let asset = asset.insert(&self.db).await?;
        Ok(asset)
    }

    /// Lists all assets ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_assets(&self) -> Result<Vec<assets::Model>, AssetError> {
        let assets = assets::Entity::find()
            .order_by_asc(assets::Column::Name)
            .all(&self.db)
            .await?;
        Ok(assets)
    }

    /// Gets an asset by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not found or the query fails.
    pub async fn get_asset(&self, id: Uuid) -> Result<assets::Model, AssetError> {
        let asset = assets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;
        Ok(asset)
    }

    /// Updates asset metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not found or the update fails.
    pub async fn update_asset(
        &self,
        id: Uuid,
        input: UpdateAssetInput,
    ) -> Result<assets::Model, AssetError> {
        let asset = assets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        let mut active: assets::ActiveModel = asset.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(serial_number) = input.serial_number {
            active.serial_number = Set(serial_number);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(account_id) = input.account_id {
            active.account_id = Set(account_id);
        }
        if let Some(acquisition_cost) = input.acquisition_cost {
            active.acquisition_cost = Set(acquisition_cost);
        }
        if let Some(acquisition_date) = input.acquisition_date {
            active.acquisition_date = Set(acquisition_date);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an asset.
    ///
    /// Refused while the asset carries a loan marker or has an ongoing
    /// loan row; the loan must be returned or deleted first.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not found, is loaned out, or the
    /// database operation fails.
    pub async fn delete_asset(&self, id: Uuid) -> Result<(), AssetError> {
        let asset = assets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        if is_loan_marker(&asset.location) {
            return Err(AssetError::CurrentlyLoaned);
        }

        let ongoing = asset_loans::Entity::find()
            .filter(asset_loans::Column::AssetId.eq(id))
            .filter(asset_loans::Column::Status.eq(LoanStatus::Ongoing))
            .count(&self.db)
            .await?;
        if ongoing > 0 {
            return Err(AssetError::CurrentlyLoaned);
        }

        asset_loans::Entity::delete_many()
            .filter(asset_loans::Column::AssetId.eq(id))
            .exec(&self.db)
            .await?;
        assets::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
