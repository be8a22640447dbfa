//! Record loading
//!
//! Turns a directory of YAML record files into a populated
//! [`BudgetBuilder`](crate::models::BudgetBuilder). The loader checks record
//! shape and the month proximity of every dated amount; references between
//! accounts are only resolved when the budget is built.

pub mod scanner;
pub mod yaml;

pub use scanner::{load_file, scan_dir};
pub use yaml::load_str;
