//! tally - monthly statement reconciliation
//!
//! tally turns account definitions, recorded balances and transfers into
//! per-account monthly statements. Each statement classifies the month's
//! movements, rebuilds running balances from both ends and tracks whether a
//! deficit is covered by money arriving the next month. Statements are then
//! rolled up per owner and account type.
//!
//! # Architecture
//!
//! - `models`: months, money, balances, accounts, transfers and the sealed budget
//! - `statement`: transaction and summary statements
//! - `services`: statement table construction and summary rollup
//! - `load`: YAML record loading
//! - `reports`: the ledger report
//! - `export`: JSON rendering
//! - `config`: path resolution and settings
//! - `cli`: command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::load::scan_dir;
//! use tally::models::Budget;
//! use tally::reports::Ledger;
//!
//! let mut builder = Budget::builder();
//! scan_dir(Path::new("records"), ".yaml", &mut builder)?;
//! let ledger = Ledger::compute(&builder.build()?)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod load;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod statement;

pub use error::{TallyError, TallyResult};
