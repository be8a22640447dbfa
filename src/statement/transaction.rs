//! Classified movements on a transaction statement

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::models::{Account, Balance, Money};

/// How a movement is attributed on a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Unknown,
    /// Outflow to a party that does not share an owner, or is external
    Expense,
    /// Inflow from a party that does not share an owner, or is external
    Income,
    /// Movement between non-external accounts with a common owner
    Transfer,
}

impl TransactionType {
    /// Classify a movement between two accounts
    ///
    /// `amount` is signed from the point of view of the statement's account.
    pub fn classify(from: &Account, to: &Account, amount: Money) -> Self {
        if to.has_common_owner(from) && !to.is_external() && !from.is_external() {
            Self::Transfer
        } else if amount.is_positive() {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

/// A single movement as seen from one account
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    balance: Balance,
    description: String,
    counterparty: Arc<Account>,
    kind: TransactionType,
    balance_from_start: Option<Money>,
    balance_from_end: Option<Money>,
}

impl Transaction {
    pub fn new(
        balance: Balance,
        description: impl Into<String>,
        counterparty: Arc<Account>,
        kind: TransactionType,
    ) -> Self {
        Self {
            balance,
            description: description.into(),
            counterparty,
            kind,
            balance_from_start: None,
            balance_from_end: None,
        }
    }

    /// Signed amount: positive into the statement's account
    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn amount(&self) -> Money {
        self.balance.amount()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The other side of the movement
    pub fn counterparty(&self) -> &Arc<Account> {
        &self.counterparty
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionType::Transfer
    }

    /// Running balance after this movement, counted from the start balance
    pub fn balance_from_start(&self) -> Option<Money> {
        self.balance_from_start
    }

    /// Balance just before this movement, counted back from the end balance
    pub fn balance_from_end(&self) -> Option<Money> {
        self.balance_from_end
    }

    pub(crate) fn set_balance_from_start(&mut self, amount: Money) {
        self.balance_from_start = Some(amount);
    }

    pub(crate) fn set_balance_from_end(&mut self, amount: Money) {
        self.balance_from_end = Some(amount);
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.counterparty.name(),
            self.balance,
            self.kind,
            self.description
        )
    }
}
