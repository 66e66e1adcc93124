//! Postgres enum mappings shared by the entities.
//!
//! Conversions to and from the pure `tresora-core` enums live here so the
//! repositories never re-implement sign or status decisions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account kind (money pool flavor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Mobile money wallet.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    /// Physical cash box.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money in.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Money out.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<TransactionKind> for tresora_core::ledger::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Revenue => Self::Revenue,
            TransactionKind::Expense => Self::Expense,
        }
    }
}

/// Invoice kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_kind")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Money owed to us by a client.
    #[sea_orm(string_value = "client_receivable")]
    ClientReceivable,
    /// Money we owe a supplier.
    #[sea_orm(string_value = "expense_payable")]
    ExpensePayable,
}

impl InvoiceKind {
    /// The ledger direction a payment against this invoice takes.
    #[must_use]
    pub const fn payment_kind(self) -> TransactionKind {
        match self {
            Self::ClientReceivable => TransactionKind::Revenue,
            Self::ExpensePayable => TransactionKind::Expense,
        }
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Not yet issued.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Issued to the third party.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Partially settled.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Fully settled.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past due (set externally; the payment engine never writes this).
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<InvoiceStatus> for tresora_core::invoice::PaymentStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<tresora_core::invoice::PaymentStatus> for InvoiceStatus {
    fn from(status: tresora_core::invoice::PaymentStatus) -> Self {
        use tresora_core::invoice::PaymentStatus;
        match status {
            PaymentStatus::Draft => Self::Draft,
            PaymentStatus::Sent => Self::Sent,
            PaymentStatus::PartiallyPaid => Self::PartiallyPaid,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Overdue => Self::Overdue,
            PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Mobile money.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    /// Cheque.
    #[sea_orm(string_value = "cheque")]
    Cheque,
    /// Card payment.
    #[sea_orm(string_value = "card")]
    Card,
}

/// Asset service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "asset_status")]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Newly acquired.
    #[sea_orm(string_value = "new")]
    New,
    /// In service.
    #[sea_orm(string_value = "in_service")]
    InService,
    /// Under maintenance.
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Decommissioned.
    #[sea_orm(string_value = "out_of_service")]
    OutOfService,
}

impl From<AssetStatus> for tresora_core::asset::AssetStatus {
    fn from(status: AssetStatus) -> Self {
        match status {
            AssetStatus::New => Self::New,
            AssetStatus::InService => Self::InService,
            AssetStatus::Maintenance => Self::Maintenance,
            AssetStatus::OutOfService => Self::OutOfService,
        }
    }
}

/// Asset loan status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Asset is out with the borrower.
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    /// Asset has been returned.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Recurring operation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "frequency")]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every quarter.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Every year.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl From<Frequency> for tresora_core::schedule::Frequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Monthly => Self::Monthly,
            Frequency::Quarterly => Self::Quarterly,
            Frequency::Yearly => Self::Yearly,
        }
    }
}

/// Third party kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "third_party_kind")]
#[serde(rename_all = "snake_case")]
pub enum ThirdPartyKind {
    /// A client we bill.
    #[sea_orm(string_value = "client")]
    Client,
    /// A supplier billing us.
    #[sea_orm(string_value = "supplier")]
    Supplier,
}
