//! Invoice line math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tresora_shared::types::round_money;

/// One invoice line as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// What the line is for.
    pub designation: String,
    /// Quantity (non-negative).
    pub quantity: Decimal,
    /// Unit price (non-negative).
    pub unit_price: Decimal,
    /// Tax rate in percent (0-100).
    pub tax_rate: Decimal,
    /// Discount in percent (0-100).
    pub discount: Decimal,
}

/// The pre-tax and tax components of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// Pre-tax line subtotal.
    pub subtotal: Decimal,
    /// Tax on the line subtotal.
    pub tax: Decimal,
}

/// Invoice-level totals accumulated across all lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Sum of line taxes.
    pub tax_amount: Decimal,
    /// subtotal + tax_amount.
    pub total_amount: Decimal,
}

/// Computes the pre-tax subtotal and tax for one line.
///
/// subtotal = quantity x unit_price x (1 - discount/100)
/// tax = subtotal x tax_rate/100
///
/// Amounts are kept at full precision here; rounding happens once at the
/// invoice level in [`compute_totals`].
#[must_use]
pub fn line_amounts(line: &LineInput) -> LineAmounts {
    let gross = line.quantity * line.unit_price;
    let subtotal = gross * (Decimal::ONE - line.discount / Decimal::ONE_HUNDRED);
    let tax = subtotal * line.tax_rate / Decimal::ONE_HUNDRED;
    LineAmounts { subtotal, tax }
}

/// Accumulates invoice totals across all lines.
///
/// Subtotal and tax are accumulated at full precision and rounded to two
/// decimal places once, then the total is their exact sum, so the identity
/// `total_amount == subtotal + tax_amount` always holds on persisted values.
#[must_use]
pub fn compute_totals(lines: &[LineInput]) -> InvoiceTotals {
    let mut subtotal = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;

    for line in lines {
        let amounts = line_amounts(line);
        subtotal += amounts.subtotal;
        tax_amount += amounts.tax;
    }

    let subtotal = round_money(subtotal);
    let tax_amount = round_money(tax_amount);

    InvoiceTotals {
        subtotal,
        tax_amount,
        total_amount: subtotal + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, tax_rate: Decimal, discount: Decimal) -> LineInput {
        LineInput {
            designation: "item".to_string(),
            quantity,
            unit_price,
            tax_rate,
            discount,
        }
    }

    #[test]
    fn test_single_line_no_discount() {
        // qty 2 x 100 at 20% tax: subtotal 200, tax 40, total 240
        let totals = compute_totals(&[line(dec!(2), dec!(100), dec!(20), dec!(0))]);
        assert_eq!(totals.subtotal, dec!(200.00));
        assert_eq!(totals.tax_amount, dec!(40.00));
        assert_eq!(totals.total_amount, dec!(240.00));
    }

    #[test]
    fn test_discount_applies_before_tax() {
        // 1 x 100 with 10% discount and 20% tax: subtotal 90, tax 18
        let totals = compute_totals(&[line(dec!(1), dec!(100), dec!(20), dec!(10))]);
        assert_eq!(totals.subtotal, dec!(90.00));
        assert_eq!(totals.tax_amount, dec!(18.00));
        assert_eq!(totals.total_amount, dec!(108.00));
    }

    #[test]
    fn test_multiple_lines_accumulate() {
        let totals = compute_totals(&[
            line(dec!(2), dec!(100), dec!(20), dec!(0)),
            line(dec!(1), dec!(50), dec!(0), dec!(0)),
        ]);
        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.tax_amount, dec!(40.00));
        assert_eq!(totals.total_amount, dec!(290.00));
    }

    #[test]
    fn test_empty_lines_zero_totals() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_quantities_round_once() {
        // 3 x 0.333 at 19.6% tax; rounding happens at the invoice level only.
        let totals = compute_totals(&[line(dec!(3), dec!(0.333), dec!(19.6), dec!(0))]);
        assert_eq!(totals.subtotal, dec!(1.00));
        assert_eq!(totals.tax_amount, dec!(0.20));
        assert_eq!(totals.total_amount, dec!(1.20));
    }

    fn pct_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn qty_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_00i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<LineInput>> {
        prop::collection::vec(
            (qty_strategy(), price_strategy(), pct_strategy(), pct_strategy()).prop_map(
                |(quantity, unit_price, tax_rate, discount)| LineInput {
                    designation: "item".to_string(),
                    quantity,
                    unit_price,
                    tax_rate,
                    discount,
                },
            ),
            0..12,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The invoice total identity holds for any line set.
        #[test]
        fn prop_total_identity(lines in lines_strategy()) {
            let totals = compute_totals(&lines);
            prop_assert_eq!(totals.total_amount, totals.subtotal + totals.tax_amount);
        }

        /// Totals are never negative for valid (non-negative) inputs.
        #[test]
        fn prop_totals_non_negative(lines in lines_strategy()) {
            let totals = compute_totals(&lines);
            prop_assert!(totals.subtotal >= Decimal::ZERO);
            prop_assert!(totals.tax_amount >= Decimal::ZERO);
            prop_assert!(totals.total_amount >= Decimal::ZERO);
        }

        /// Persisted totals carry at most two decimal places.
        #[test]
        fn prop_totals_two_decimal_places(lines in lines_strategy()) {
            let totals = compute_totals(&lines);
            prop_assert!(totals.subtotal.scale() <= 2);
            prop_assert!(totals.tax_amount.scale() <= 2);
            prop_assert!(totals.total_amount.scale() <= 2);
        }
    }
}
