//! Money arithmetic helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary values are `rust_decimal::Decimal`, accumulated at full
//! precision and rounded to two decimal places only when persisted or
//! formatted.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed scale for all persisted monetary values.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the amount is a valid positive money amount.
#[must_use]
pub fn is_positive_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_truncates_to_two_places() {
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(10.006)), dec!(10.01));
        assert_eq!(round_money(dec!(10)), dec!(10));
    }

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(-2.675)), dec!(-2.68));
    }

    #[test]
    fn test_is_positive_amount() {
        assert!(is_positive_amount(dec!(0.01)));
        assert!(!is_positive_amount(dec!(0)));
        assert!(!is_positive_amount(dec!(-5)));
    }
}
