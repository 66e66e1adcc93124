//! Invoice payment status derivation and payment validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invoice lifecycle status.
///
/// `PartiallyPaid` and `Paid` are derived from `(amount_paid, total_amount)`
/// by the payment engine; the remaining variants are set externally
/// (drafting, sending, cancelling) or computed at report time (overdue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet issued.
    Draft,
    /// Issued to the third party.
    Sent,
    /// Some, but not all, of the total has been paid.
    PartiallyPaid,
    /// Fully settled.
    Paid,
    /// Past due date without full payment (report-time only).
    Overdue,
    /// Cancelled; no further payments.
    Cancelled,
}

/// Errors for payment validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Payment amounts must be strictly positive.
    #[error("payment amount must be positive")]
    NonPositiveAmount,

    /// Payment would overshoot the invoice total.
    #[error("payment exceeds remaining balance of {remaining}")]
    ExceedsRemaining {
        /// What is still owed on the invoice.
        remaining: Decimal,
    },
}

/// Validates a prospective payment against the invoice's remaining balance.
///
/// # Errors
///
/// Returns [`PaymentError::NonPositiveAmount`] for zero or negative amounts
/// and [`PaymentError::ExceedsRemaining`] when the amount is greater than
/// `total_amount - amount_paid`.
pub fn validate_payment(
    amount: Decimal,
    total_amount: Decimal,
    amount_paid: Decimal,
) -> Result<(), PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }

    let remaining = total_amount - amount_paid;
    if amount > remaining {
        return Err(PaymentError::ExceedsRemaining { remaining });
    }

    Ok(())
}

/// Derives the status after a payment has been applied.
///
/// `amount_paid >= total_amount` means paid; any positive amount below the
/// total means partially paid. Payments never move an invoice back toward
/// draft, and `current` is returned unchanged when nothing has been paid.
#[must_use]
pub fn derive_status_after_payment(
    amount_paid: Decimal,
    total_amount: Decimal,
    current: PaymentStatus,
) -> PaymentStatus {
    if amount_paid >= total_amount {
        PaymentStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        PaymentStatus::PartiallyPaid
    } else {
        current
    }
}

/// Returns true when an invoice may be deleted.
///
/// Invoices with recorded payments are protected: there is no payment
/// reversal operation, so deleting them would orphan ledger effects.
#[must_use]
pub fn is_deletable(status: PaymentStatus) -> bool {
    !matches!(status, PaymentStatus::Paid | PaymentStatus::PartiallyPaid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_then_full_payment() {
        // Invoice total 240: pay 150 -> partially paid; pay 90 more -> paid.
        let total = dec!(240);

        assert_eq!(validate_payment(dec!(150), total, dec!(0)), Ok(()));
        let status = derive_status_after_payment(dec!(150), total, PaymentStatus::Sent);
        assert_eq!(status, PaymentStatus::PartiallyPaid);

        assert_eq!(validate_payment(dec!(90), total, dec!(150)), Ok(()));
        let status = derive_status_after_payment(dec!(240), total, status);
        assert_eq!(status, PaymentStatus::Paid);

        // One more unit is rejected.
        assert_eq!(
            validate_payment(dec!(1), total, dec!(240)),
            Err(PaymentError::ExceedsRemaining {
                remaining: dec!(0)
            })
        );
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        assert_eq!(
            validate_payment(dec!(0), dec!(100), dec!(0)),
            Err(PaymentError::NonPositiveAmount)
        );
        assert_eq!(
            validate_payment(dec!(-10), dec!(100), dec!(0)),
            Err(PaymentError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_exact_remaining_accepted() {
        assert_eq!(validate_payment(dec!(100), dec!(100), dec!(0)), Ok(()));
        assert_eq!(validate_payment(dec!(40), dec!(100), dec!(60)), Ok(()));
    }

    #[test]
    fn test_unpaid_invoice_keeps_current_status() {
        assert_eq!(
            derive_status_after_payment(dec!(0), dec!(100), PaymentStatus::Draft),
            PaymentStatus::Draft
        );
        assert_eq!(
            derive_status_after_payment(dec!(0), dec!(100), PaymentStatus::Sent),
            PaymentStatus::Sent
        );
    }

    #[test]
    fn test_deletable_statuses() {
        assert!(is_deletable(PaymentStatus::Draft));
        assert!(is_deletable(PaymentStatus::Sent));
        assert!(is_deletable(PaymentStatus::Overdue));
        assert!(is_deletable(PaymentStatus::Cancelled));
        assert!(!is_deletable(PaymentStatus::PartiallyPaid));
        assert!(!is_deletable(PaymentStatus::Paid));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn status_strategy() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::Draft),
            Just(PaymentStatus::Sent),
            Just(PaymentStatus::PartiallyPaid),
            Just(PaymentStatus::Paid),
            Just(PaymentStatus::Overdue),
            Just(PaymentStatus::Cancelled),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A validated payment never overshoots: amount_paid + amount <= total.
        #[test]
        fn prop_payment_cap(
            total in amount_strategy(),
            paid in amount_strategy(),
            amount in amount_strategy(),
        ) {
            let paid = paid.min(total);
            let accepted = validate_payment(amount, total, paid).is_ok();
            prop_assert_eq!(accepted, amount > Decimal::ZERO && paid + amount <= total);
        }

        /// Status after payment only ever moves forward: a positive running
        /// total never derives draft or sent, and reaching the total always
        /// derives paid.
        #[test]
        fn prop_status_monotone(
            total in amount_strategy(),
            paid in amount_strategy(),
            current in status_strategy(),
        ) {
            let status = derive_status_after_payment(paid, total, current);
            if paid >= total {
                prop_assert_eq!(status, PaymentStatus::Paid);
            } else {
                prop_assert_eq!(status, PaymentStatus::PartiallyPaid);
            }
        }
    }
}
