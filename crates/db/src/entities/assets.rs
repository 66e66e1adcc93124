//! `SeaORM` Entity for the assets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AssetStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    /// `in_stock`, `office`, or a loan marker while the asset is out.
    pub location: String,
    /// Optional account carrying the acquisition cost.
    pub account_id: Option<Uuid>,
    pub acquisition_cost: Option<Decimal>,
    pub acquisition_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(has_many = "super::asset_loans::Entity")]
    AssetLoans,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::asset_loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetLoans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
