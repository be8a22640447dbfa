//! The sealed budget aggregate
//!
//! A [`BudgetBuilder`] accumulates account drafts, balance cells and
//! transfer drafts keyed by account name. [`BudgetBuilder::build`] resolves
//! every name, validates lifecycle and temporal constraints, and returns an
//! immutable [`Budget`] or the first failure. No partially built budget is
//! ever handed out.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::account::{Account, AccountBuilder};
use super::balance::Balance;
use super::month::Month;
use super::transfer::{Transfer, TransferDraft, MAX_DATE_DISTANCE};
use crate::error::{TallyError, TallyResult};

/// Immutable container for all raw financial data
#[derive(Debug, Clone)]
pub struct Budget {
    months: Vec<Month>,
    accounts: Vec<Arc<Account>>,
    balances: HashMap<String, HashMap<Month, Balance>>,
    transfers: HashMap<String, HashMap<Month, Vec<Arc<Transfer>>>>,
}

impl Budget {
    pub fn builder() -> BudgetBuilder {
        BudgetBuilder::default()
    }

    /// Months in scope, most recent first
    pub fn months(&self) -> &[Month] {
        &self.months
    }

    /// All accounts, sorted by name
    pub fn accounts(&self) -> &[Arc<Account>] {
        &self.accounts
    }

    pub fn account(&self, name: &str) -> Option<&Arc<Account>> {
        self.accounts.iter().find(|account| account.name() == name)
    }

    /// Accounts open during at least one of `months`
    pub fn open_accounts(&self, months: &[Month]) -> Vec<Arc<Account>> {
        self.accounts
            .iter()
            .filter(|account| account.is_open_in_any(months))
            .cloned()
            .collect()
    }

    /// Recorded balance at the start of `month`
    pub fn balance(&self, account: &Account, month: Month) -> Option<&Balance> {
        self.balances
            .get(account.name())
            .and_then(|months| months.get(&month))
    }

    /// Transfers touching `account` in `month`, in chronological order
    pub fn transfers(&self, account: &Account, month: Month) -> &[Arc<Transfer>] {
        self.transfers
            .get(account.name())
            .and_then(|months| months.get(&month))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Staged, single-use builder for [`Budget`]
#[derive(Debug, Default)]
pub struct BudgetBuilder {
    months: Vec<Month>,
    accounts: Vec<AccountBuilder>,
    balances: BTreeMap<String, BTreeMap<Month, Balance>>,
    transfers: Vec<TransferDraft>,
}

impl BudgetBuilder {
    /// Expand `[start, end]` into explicit months
    pub fn set_period(&mut self, start: Month, end: Month) -> TallyResult<&mut Self> {
        if start > end {
            return Err(TallyError::Validation(format!(
                "Budget period ends {} before it starts {}",
                end, start
            )));
        }
        self.months.extend(Month::range(start, end));
        Ok(self)
    }

    pub fn has_period(&self) -> bool {
        !self.months.is_empty()
    }

    /// Drop every month collected so far
    pub fn clear_period(&mut self) -> &mut Self {
        self.months.clear();
        self
    }

    pub fn add_account(&mut self, account: AccountBuilder) -> &mut Self {
        self.accounts.push(account);
        self
    }

    pub fn account_draft(&self, name: &str) -> Option<&AccountBuilder> {
        self.accounts.iter().find(|draft| draft.name() == name)
    }

    /// Record the balance for `account` at the start of `month`
    ///
    /// A later call for the same cell replaces the earlier value.
    pub fn add_balance(
        &mut self,
        account: impl Into<String>,
        month: Month,
        balance: Balance,
    ) -> &mut Self {
        self.balances
            .entry(account.into())
            .or_default()
            .insert(month, balance);
        self
    }

    pub fn add_balances(
        &mut self,
        account: &str,
        balances: impl IntoIterator<Item = (Month, Balance)>,
    ) -> &mut Self {
        for (month, balance) in balances {
            self.add_balance(account, month, balance);
        }
        self
    }

    pub fn add_transfer(&mut self, transfer: TransferDraft) -> &mut Self {
        self.transfers.push(transfer);
        self
    }

    pub fn add_transfers(&mut self, transfers: impl IntoIterator<Item = TransferDraft>) -> &mut Self {
        self.transfers.extend(transfers);
        self
    }

    /// Fold another builder's records into this one
    pub fn merge(&mut self, other: BudgetBuilder) -> &mut Self {
        self.months.extend(other.months);
        self.accounts.extend(other.accounts);
        for (account, months) in other.balances {
            self.balances.entry(account).or_default().extend(months);
        }
        self.transfers.extend(other.transfers);
        self
    }

    /// Resolve and validate everything, producing the sealed budget
    pub fn build(&self) -> TallyResult<Budget> {
        let mut months = self.months.clone();
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        if months.is_empty() {
            return Err(TallyError::EmptyPeriod);
        }

        let mut accounts: HashMap<String, Arc<Account>> = HashMap::new();
        for draft in &self.accounts {
            let account = draft.build()?;
            if accounts.contains_key(account.name()) {
                return Err(TallyError::duplicate_account(account.name()));
            }
            accounts.insert(account.name().to_string(), Arc::new(account));
        }

        let mut transfers: HashMap<String, HashMap<Month, Vec<Arc<Transfer>>>> = HashMap::new();
        for draft in &self.transfers {
            let transfer = Arc::new(draft.resolve(&accounts)?);
            let month = transfer.from_month();
            for account in [transfer.from_account(), transfer.to_account()] {
                if !account.is_open(month) {
                    return Err(TallyError::AccountClosed {
                        account: account.name().to_string(),
                        month,
                        transfer: transfer.to_string(),
                    });
                }
            }

            for (account, month) in [
                (transfer.to_account(), transfer.to_month()),
                (transfer.from_account(), transfer.from_month()),
            ] {
                transfers
                    .entry(account.name().to_string())
                    .or_default()
                    .entry(month)
                    .or_default()
                    .push(Arc::clone(&transfer));
            }
        }
        for cell in transfers.values_mut().flat_map(|months| months.values_mut()) {
            cell.sort();
        }

        let mut balances: HashMap<String, HashMap<Month, Balance>> = HashMap::new();
        for (name, cells) in &self.balances {
            if !accounts.contains_key(name) {
                return Err(TallyError::account_not_found(name.clone()));
            }
            for (month, balance) in cells {
                let distance = Month::from_date(balance.date()).distance(month).abs();
                if distance > MAX_DATE_DISTANCE {
                    return Err(TallyError::Temporal(format!(
                        "Balance {} for account {} is {} months from {} ({} max)",
                        balance, name, distance, month, MAX_DATE_DISTANCE
                    )));
                }
            }
            balances.insert(
                name.clone(),
                cells.iter().map(|(month, balance)| (*month, *balance)).collect(),
            );
        }

        let mut accounts: Vec<Arc<Account>> = accounts.into_values().collect();
        accounts.sort_by(|a, b| a.name().cmp(b.name()));

        debug!(
            months = months.len(),
            accounts = accounts.len(),
            transfers = self.transfers.len(),
            "budget sealed"
        );

        Ok(Budget {
            months,
            accounts,
            balances,
            transfers,
        })
    }
}
