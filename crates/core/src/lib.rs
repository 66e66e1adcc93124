//! Core business logic for Tresora.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All ledger arithmetic, invoice math, asset availability
//! rules, and schedule calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Signed balance effects for revenue/expense movements
//! - `invoice` - Line math, totals, and payment status derivation
//! - `asset` - Loanability rules and loan location markers
//! - `schedule` - Recurring operation due-date arithmetic

pub mod asset;
pub mod invoice;
pub mod ledger;
pub mod schedule;
