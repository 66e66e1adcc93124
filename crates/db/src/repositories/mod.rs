//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Every operation that touches more than one row runs inside a single
//! database transaction: it either fully commits or fully rolls back.

pub mod account;
pub mod asset;
pub mod invoice;
pub mod loan;
pub mod recurring;
pub mod report;
pub mod transaction;

pub use account::{
    AccountError, AccountRepository, CreateAccountInput, LedgerError, UpdateAccountInput,
};
pub use asset::{AssetError, AssetRepository, CreateAssetInput, UpdateAssetInput};
pub use invoice::{
    AddPaymentInput, CreateInvoiceInput, InvoiceError, InvoiceLineInput, InvoiceRepository,
    InvoiceWithDetails, PaymentWithTransaction, UpdateInvoiceInput,
};
pub use loan::{IssueLoanInput, LoanError, LoanRepository, UpdateLoanInput};
pub use recurring::{
    CreateRecurringInput, ExecutedOperation, ExecutionFailure, ExecutionReport, RecurringError,
    RecurringRepository, UpdateRecurringInput,
};
pub use report::{AssetSummary, CashFlow, OverdueInvoice, ReportError, ReportRepository, Summary};
pub use transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, TransactionRepository,
    UpdateTransactionInput,
};
