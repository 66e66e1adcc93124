//! `SeaORM` entity definitions.

pub mod accounts;
pub mod asset_loans;
pub mod assets;
pub mod categories;
pub mod invoice_lines;
pub mod invoice_payments;
pub mod invoices;
pub mod recurring_operations;
pub mod sea_orm_active_enums;
pub mod third_parties;
pub mod transactions;
pub mod users;
