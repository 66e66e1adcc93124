//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceKind, InvoiceStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: InvoiceKind,
    pub third_party_id: Uuid,
    pub invoice_number: String,
    pub issue_date: Date,
    pub due_date: Date,
    /// Derived from lines; never edited directly.
    pub subtotal: Decimal,
    /// Derived from lines; never edited directly.
    pub tax_amount: Decimal,
    /// subtotal + tax_amount.
    pub total_amount: Decimal,
    /// Running sum of payments.
    pub amount_paid: Decimal,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::third_parties::Entity",
        from = "Column::ThirdPartyId",
        to = "super::third_parties::Column::Id"
    )]
    ThirdParties,
    #[sea_orm(has_many = "super::invoice_lines::Entity")]
    InvoiceLines,
    #[sea_orm(has_many = "super::invoice_payments::Entity")]
    InvoicePayments,
}

impl Related<super::third_parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThirdParties.def()
    }
}

impl Related<super::invoice_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceLines.def()
    }
}

impl Related<super::invoice_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoicePayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
