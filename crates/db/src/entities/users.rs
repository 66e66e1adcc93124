//! `SeaORM` Entity for the users table.
//!
//! Users are referenced by asset loans; authentication is handled outside
//! this system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset_loans::Entity")]
    AssetLoans,
}

impl Related<super::asset_loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetLoans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
