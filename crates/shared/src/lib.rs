//! Shared types and configuration for Tresora.
//!
//! This crate holds everything that more than one layer needs:
//! configuration loading and money arithmetic helpers.

pub mod config;
pub mod types;

pub use config::AppConfig;
