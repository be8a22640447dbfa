//! Core data model for tally
//!
//! Value types (months, money, balances), accounts and transfers, and the
//! sealed [`Budget`] aggregate they are assembled into.

pub mod account;
pub mod balance;
pub mod budget;
pub mod money;
pub mod month;
pub mod transfer;

pub use account::{Account, AccountBuilder, AccountMetadata, AccountType};
pub use balance::{Balance, Confidence};
pub use budget::{Budget, BudgetBuilder};
pub use money::{Money, MoneyParseError};
pub use month::Month;
pub use transfer::{Transfer, TransferDraft};
