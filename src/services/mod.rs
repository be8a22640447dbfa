//! Service layer for tally
//!
//! Services derive statement tables from a sealed [`Budget`](crate::models::Budget).
//! Nothing here performs I/O or mutates the budget.

pub mod statement;
pub mod summary;

pub use statement::{StatementService, StatementTable};
pub use summary::SummaryService;
