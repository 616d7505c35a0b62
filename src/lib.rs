//! RINGSIDE — Interactive fight-betting workflow engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod saga;
pub mod types;
pub mod wager;
