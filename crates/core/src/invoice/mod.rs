//! Invoice math and payment status rules.
//!
//! Totals are always derived from lines and status is always derived from
//! `(amount_paid, total_amount)` - neither is ever adjusted by hand, so the
//! stored values cannot drift from the line items and payments they
//! summarize.

pub mod lines;
pub mod status;

pub use lines::{InvoiceTotals, LineAmounts, LineInput, compute_totals, line_amounts};
pub use status::{
    PaymentError, PaymentStatus, derive_status_after_payment, is_deletable, validate_payment,
};
