//! `SeaORM` Entity for the invoice_lines table.
//!
//! Lines are replaced wholesale on invoice edit, never merged.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub designation: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Tax rate in percent (0-100).
    pub tax_rate: Decimal,
    /// Discount in percent (0-100).
    pub discount: Decimal,
    /// Pre-tax line subtotal, stored for display.
    pub subtotal: Decimal,
    /// Tax component, stored for display.
    pub tax: Decimal,
    /// Order within the invoice.
    pub position: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
