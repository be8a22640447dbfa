//! Reports module for tally
//!
//! The ledger report derives every statement for a budget and renders it
//! for the terminal.

pub mod ledger;

pub use ledger::Ledger;
