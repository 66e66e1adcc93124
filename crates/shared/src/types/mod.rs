//! Shared value types.

pub mod money;

pub use money::{is_positive_amount, round_money};
