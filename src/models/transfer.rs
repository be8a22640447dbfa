//! Transfers between accounts
//!
//! A [`Transfer`] moves a [`Balance`] from one (account, month) endpoint to
//! another. Records refer to accounts by name; a [`TransferDraft`] holds
//! those names until the budget is sealed and they can be resolved.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::account::Account;
use super::balance::Balance;
use super::month::Month;
use crate::error::{TallyError, TallyResult};

/// Max months between a transfer's from and to months
pub const MAX_ENDPOINT_DISTANCE: i32 = 1;

/// Max months between a dated amount and the month it is filed under
pub const MAX_DATE_DISTANCE: i32 = 2;

/// A directed movement of money between two (account, month) endpoints
///
/// Ordering is chronological by balance, then by months, account names and
/// description. Equality is structural and agrees with the ordering, so
/// duplicate transfers compare equal.
#[derive(Debug, Clone)]
pub struct Transfer {
    from_account: Arc<Account>,
    from_month: Month,
    to_account: Arc<Account>,
    to_month: Month,
    description: String,
    balance: Balance,
}

impl Transfer {
    pub fn new(
        from_account: Arc<Account>,
        from_month: Month,
        to_account: Arc<Account>,
        to_month: Month,
        description: impl Into<String>,
        balance: Balance,
    ) -> Self {
        Self {
            from_account,
            from_month,
            to_account,
            to_month,
            description: description.into(),
            balance,
        }
    }

    pub fn from_account(&self) -> &Arc<Account> {
        &self.from_account
    }

    pub fn from_month(&self) -> Month {
        self.from_month
    }

    pub fn to_account(&self) -> &Arc<Account> {
        &self.to_account
    }

    pub fn to_month(&self) -> Month {
        self.to_month
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }
}

impl Ord for Transfer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.balance
            .cmp(&other.balance)
            .then_with(|| self.from_month.cmp(&other.from_month))
            .then_with(|| self.to_month.cmp(&other.to_month))
            .then_with(|| self.from_account.name().cmp(other.from_account.name()))
            .then_with(|| self.to_account.name().cmp(other.to_account.name()))
            .then_with(|| self.description.cmp(&other.description))
    }
}

impl PartialOrd for Transfer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Transfer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Transfer {}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {} {}",
            self.from_account.name(),
            self.from_month,
            self.to_account.name(),
            self.to_month,
            self.balance
        )
    }
}

/// A transfer whose endpoints are still account names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDraft {
    pub from_name: String,
    pub from_month: Month,
    pub to_name: String,
    pub to_month: Month,
    pub description: String,
    pub balance: Balance,
}

impl TransferDraft {
    pub fn new(
        from_name: impl Into<String>,
        from_month: Month,
        to_name: impl Into<String>,
        to_month: Month,
        balance: Balance,
    ) -> Self {
        Self {
            from_name: from_name.into(),
            from_month,
            to_name: to_name.into(),
            to_month,
            description: String::new(),
            balance,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check the endpoint and date proximity constraints
    pub fn check_proximity(&self) -> TallyResult<()> {
        let gap = self.from_month.distance(&self.to_month).abs();
        if gap > MAX_ENDPOINT_DISTANCE {
            return Err(TallyError::Temporal(format!(
                "Transfer from {} to {}: months {} and {} are {} months apart ({} max)",
                self.from_name,
                self.to_name,
                self.from_month,
                self.to_month,
                gap,
                MAX_ENDPOINT_DISTANCE
            )));
        }

        let dated = Month::from_date(self.balance.date());
        if dated.distance(&self.from_month).abs() > MAX_DATE_DISTANCE
            || dated.distance(&self.to_month).abs() > MAX_DATE_DISTANCE
        {
            return Err(TallyError::Temporal(format!(
                "Transfer from {} to {}: {} is too far from month {} or {}",
                self.from_name, self.to_name, self.balance, self.from_month, self.to_month
            )));
        }
        Ok(())
    }

    /// Bind the draft to sealed accounts
    pub fn resolve(&self, accounts: &HashMap<String, Arc<Account>>) -> TallyResult<Transfer> {
        let lookup = |name: &str, other: &str| {
            accounts.get(name).cloned().ok_or_else(|| TallyError::NotFound {
                entity_type: "Account",
                identifier: format!("{} (referenced by transfer with {})", name, other),
            })
        };
        let to_account = lookup(&self.to_name, &self.from_name)?;
        let from_account = lookup(&self.from_name, &self.to_name)?;
        self.check_proximity()?;

        Ok(Transfer::new(
            from_account,
            self.from_month,
            to_account,
            self.to_month,
            self.description.clone(),
            self.balance,
        ))
    }
}
