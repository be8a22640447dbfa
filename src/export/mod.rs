//! Export module for tally
//!
//! Renders a computed ledger as JSON.

pub mod json;

pub use json::{LedgerData, LedgerExport, StatementView};
