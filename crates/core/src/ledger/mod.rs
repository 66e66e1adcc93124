//! Ledger arithmetic.
//!
//! Every account balance in the system is a running balance kept in sync
//! by applying signed deltas. The sign decision lives here so that the
//! transaction engine, the invoice payment engine, and the recurring
//! scheduler all agree on it.

pub mod effect;

pub use effect::{TransactionKind, rebalance_delta, reversal_effect, signed_effect};
