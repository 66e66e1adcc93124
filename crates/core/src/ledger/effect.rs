//! Signed balance effects for ledger transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing into the account.
    Revenue,
    /// Money flowing out of the account.
    Expense,
}

/// Returns the signed effect a transaction has on its account balance.
///
/// Revenue adds, expense subtracts. `amount` is always positive; the sign
/// is decided here and nowhere else.
#[must_use]
pub fn signed_effect(kind: TransactionKind, amount: Decimal) -> Decimal {
    match kind {
        TransactionKind::Revenue => amount,
        TransactionKind::Expense => -amount,
    }
}

/// Returns the delta that undoes a previously applied transaction.
#[must_use]
pub fn reversal_effect(kind: TransactionKind, amount: Decimal) -> Decimal {
    -signed_effect(kind, amount)
}

/// Returns the single delta to apply when a transaction is edited in place
/// and old and new account are the same.
///
/// Both legs are applied in sequence even when they land on the same
/// account, since amount or kind may differ.
#[must_use]
pub fn rebalance_delta(
    old_kind: TransactionKind,
    old_amount: Decimal,
    new_kind: TransactionKind,
    new_amount: Decimal,
) -> Decimal {
    reversal_effect(old_kind, old_amount) + signed_effect(new_kind, new_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_revenue_adds() {
        assert_eq!(signed_effect(TransactionKind::Revenue, dec!(200)), dec!(200));
    }

    #[test]
    fn test_expense_subtracts() {
        assert_eq!(signed_effect(TransactionKind::Expense, dec!(200)), dec!(-200));
    }

    #[test]
    fn test_reversal_undoes_effect() {
        assert_eq!(reversal_effect(TransactionKind::Expense, dec!(200)), dec!(200));
        assert_eq!(reversal_effect(TransactionKind::Revenue, dec!(50)), dec!(-50));
    }

    #[test]
    fn test_amount_edit_scenario() {
        // Account at 1000. Expense of 200 -> 800. Edit amount to 300 -> 700.
        // Delete -> back to 1000.
        let mut balance = dec!(1000);
        balance += signed_effect(TransactionKind::Expense, dec!(200));
        assert_eq!(balance, dec!(800));

        balance += rebalance_delta(
            TransactionKind::Expense,
            dec!(200),
            TransactionKind::Expense,
            dec!(300),
        );
        assert_eq!(balance, dec!(700));

        balance += reversal_effect(TransactionKind::Expense, dec!(300));
        assert_eq!(balance, dec!(1000));
    }

    #[test]
    fn test_kind_flip_edit() {
        // Expense 100 edited into revenue 100 swings the balance by +200.
        assert_eq!(
            rebalance_delta(
                TransactionKind::Expense,
                dec!(100),
                TransactionKind::Revenue,
                dec!(100),
            ),
            dec!(200)
        );
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::Revenue),
            Just(TransactionKind::Expense),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Applying a transaction and then its reversal is a no-op on any
        /// starting balance.
        #[test]
        fn prop_reversal_cancels_effect(
            start in amount_strategy(),
            kind in kind_strategy(),
            amount in amount_strategy(),
        ) {
            let after = start + signed_effect(kind, amount) + reversal_effect(kind, amount);
            prop_assert_eq!(after, start);
        }

        /// Rebalance equals reverse-then-apply, in one delta.
        #[test]
        fn prop_rebalance_matches_two_step(
            old_kind in kind_strategy(),
            old_amount in amount_strategy(),
            new_kind in kind_strategy(),
            new_amount in amount_strategy(),
        ) {
            let one_step = rebalance_delta(old_kind, old_amount, new_kind, new_amount);
            let two_step = reversal_effect(old_kind, old_amount)
                + signed_effect(new_kind, new_amount);
            prop_assert_eq!(one_step, two_step);
        }

        /// Balance conservation: for any sequence of create/edit/delete
        /// operations, the final balance equals the starting balance plus the
        /// sum of signed effects of the transactions that still exist.
        #[test]
        fn prop_balance_conservation(
            start in amount_strategy(),
            ops in prop::collection::vec(
                (kind_strategy(), amount_strategy(), kind_strategy(), amount_strategy(), any::<u8>()),
                1..30,
            ),
        ) {
            let mut balance = start;
            let mut live: Vec<(TransactionKind, Decimal)> = Vec::new();

            for (kind, amount, new_kind, new_amount, action) in ops {
                match action % 3 {
                    // create
                    0 => {
                        balance += signed_effect(kind, amount);
                        live.push((kind, amount));
                    }
                    // edit the most recent live transaction
                    1 => {
                        if let Some(last) = live.last_mut() {
                            balance += rebalance_delta(last.0, last.1, new_kind, new_amount);
                            *last = (new_kind, new_amount);
                        }
                    }
                    // delete the most recent live transaction
                    _ => {
                        if let Some((k, a)) = live.pop() {
                            balance += reversal_effect(k, a);
                        }
                    }
                }
            }

            let expected: Decimal = start
                + live
                    .iter()
                    .map(|&(k, a)| signed_effect(k, a))
                    .sum::<Decimal>();
            prop_assert_eq!(balance, expected);
        }
    }
}
