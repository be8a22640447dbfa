//! CLI command handlers
//!
//! Bridges clap argument parsing with the loader, the statement engine and
//! the renderers.

pub mod report;

pub use report::{compute_ledger, handle_report_command, OutputFormat, ReportArgs};
