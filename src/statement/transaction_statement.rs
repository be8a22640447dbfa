//! Per-account monthly statement
//!
//! A [`TransactionStatement`] classifies every transfer touching one
//! account in one month, totals the movements, and reconstructs running
//! balances forward from the start balance and backward from the end
//! balance. It also records whether same-owner money arriving this month
//! can cover a shortfall left at the end of the previous month.

use std::sync::Arc;

use super::transaction::{Transaction, TransactionType};
use super::{Statement, StatementTotals};
use crate::error::{TallyError, TallyResult};
use crate::models::{Account, Balance, Month, Transfer};

/// Statement for one account and one month
#[derive(Debug, Clone)]
pub struct TransactionStatement {
    account: Arc<Account>,
    totals: StatementTotals,
    transactions: Vec<Transaction>,
    covers_previous: bool,
    covers_projected_previous: bool,
    has_projected_transfer: bool,
    is_covered: bool,
    is_projected_covered: bool,
}

impl TransactionStatement {
    pub fn builder(account: Arc<Account>, month: Month) -> TransactionStatementBuilder {
        TransactionStatementBuilder::new(account, month)
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    /// Classified movements, newest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// A confirmed same-owner inflow this month can cover last month's deficit
    pub fn covers_previous(&self) -> bool {
        self.covers_previous
    }

    /// A same-owner inflow of any confidence can cover last month's deficit
    pub fn covers_projected_previous(&self) -> bool {
        self.covers_projected_previous
    }

    pub fn has_projected_transfer(&self) -> bool {
        self.has_projected_transfer
    }

    /// No deficit at the end of the month, or one covered by the next month
    pub fn is_covered(&self) -> bool {
        match self.end_balance() {
            None => true,
            Some(end) if !end.amount().is_negative() => true,
            Some(_) => self.is_covered,
        }
    }

    /// Covered, possibly only by a projected inflow next month
    pub fn is_projected_covered(&self) -> bool {
        self.is_covered() || self.is_projected_covered
    }
}

impl Statement for TransactionStatement {
    fn totals(&self) -> &StatementTotals {
        &self.totals
    }

    fn is_closed(&self) -> bool {
        !self.account.is_open(self.totals.month)
    }
}

/// Single-use builder for [`TransactionStatement`]
///
/// Transfers may be supplied before or after the bounding balances; running
/// balances are recomputed whenever either changes.
#[derive(Debug, Clone)]
pub struct TransactionStatementBuilder {
    account: Arc<Account>,
    totals: StatementTotals,
    transactions: Vec<Transaction>,
    covers_previous: bool,
    covers_projected_previous: bool,
    has_projected_transfer: bool,
    is_covered: bool,
    is_projected_covered: bool,
}

impl TransactionStatementBuilder {
    pub fn new(account: Arc<Account>, month: Month) -> Self {
        let totals = StatementTotals::new(account.name(), month);
        Self {
            account,
            totals,
            transactions: Vec::new(),
            covers_previous: false,
            covers_projected_previous: false,
            has_projected_transfer: false,
            is_covered: false,
            is_projected_covered: false,
        }
    }

    pub fn month(&self) -> Month {
        self.totals.month
    }

    /// Classify the month's transfers
    ///
    /// `transfers` must be in chronological order; they are walked newest
    /// first and the resulting transactions are stored in that order.
    pub fn transfers(mut self, transfers: &[Arc<Transfer>]) -> TallyResult<Self> {
        let start = self.totals.start_balance;
        let end = self.totals.end_balance;
        self.totals = StatementTotals::new(self.account.name(), self.totals.month);
        self.totals.start_balance = start;
        self.totals.end_balance = end;
        self.transactions = Vec::with_capacity(transfers.len());
        self.covers_previous = false;
        self.covers_projected_previous = false;
        self.has_projected_transfer = false;

        for transfer in transfers.iter().rev() {
            let transaction = self.classify(transfer)?;
            self.transactions.push(transaction);
        }

        if let Some(start) = start {
            self.reconstruct_forward(&start)?;
        }
        if let Some(end) = end {
            self.reconstruct_backward(&end)?;
        }
        Ok(self)
    }

    /// Set the recorded opening balance and rebuild running balances forward
    pub fn start_balance(mut self, balance: Balance) -> TallyResult<Self> {
        self.reconstruct_forward(&balance)?;
        self.totals.set_start_balance(Some(balance));
        Ok(self)
    }

    /// Set the closing balance and rebuild running balances backward
    pub fn end_balance(mut self, balance: Balance) -> TallyResult<Self> {
        self.reconstruct_backward(&balance)?;
        self.totals.set_end_balance(Some(balance));
        Ok(self)
    }

    /// Whether the next month covers a deficit at the end of this one
    pub fn covered(mut self, is_covered: bool) -> Self {
        self.is_covered = is_covered;
        self
    }

    pub fn projected_covered(mut self, is_covered: bool) -> Self {
        self.is_projected_covered = is_covered;
        self
    }

    pub fn build(self) -> TransactionStatement {
        TransactionStatement {
            account: self.account,
            totals: self.totals,
            transactions: self.transactions,
            covers_previous: self.covers_previous,
            covers_projected_previous: self.covers_projected_previous,
            has_projected_transfer: self.has_projected_transfer,
            is_covered: self.is_covered,
            is_projected_covered: self.is_projected_covered,
        }
    }

    fn classify(&mut self, transfer: &Transfer) -> TallyResult<Transaction> {
        let account = Arc::clone(&self.account);
        self.has_projected_transfer |= transfer.balance().is_projected();

        let (balance, counterparty, kind) = if **transfer.to_account() == *account {
            let balance = *transfer.balance();
            let from = transfer.from_account();
            let kind = TransactionType::classify(from, &account, balance.amount());
            (balance, Arc::clone(from), kind)
        } else if **transfer.from_account() == *account {
            let balance = transfer.balance().negate();
            let to = transfer.to_account();
            let kind = TransactionType::classify(&account, to, balance.amount());
            (balance, Arc::clone(to), kind)
        } else {
            return Err(TallyError::Invariant(format!(
                "transfer ({} to {}) supplied to the statement of {}",
                transfer.from_account(),
                transfer.to_account(),
                account
            )));
        };

        self.totals.add_flow(balance.amount());
        match kind {
            TransactionType::Expense => self.totals.add_payment(balance.amount()),
            TransactionType::Income => self.totals.add_income(balance.amount()),
            TransactionType::Transfer => self.totals.add_transfer(balance.amount()),
            TransactionType::Unknown => {}
        }

        if !self.covers_previous
            && balance.amount().is_positive()
            && transfer.from_account().has_common_owner(&account)
        {
            self.covers_projected_previous = true;
            if balance.is_confirmed() {
                self.covers_previous = true;
            }
        }

        Ok(Transaction::new(
            balance,
            transfer.description(),
            counterparty,
            kind,
        ))
    }

    fn reconstruct_forward(&mut self, start: &Balance) -> TallyResult<()> {
        let mut amount = start.amount();
        for transaction in self.transactions.iter_mut().rev() {
            if transaction.balance().date() < start.date() {
                return Err(TallyError::MisdatedBalance(format!(
                    "Balance {} {} for account {} starts after transaction {}/{} desc{{{}}}",
                    self.totals.month,
                    start,
                    self.account.name(),
                    transaction.counterparty().name(),
                    transaction.balance(),
                    transaction.description()
                )));
            }
            amount += transaction.amount();
            transaction.set_balance_from_start(amount);
        }
        Ok(())
    }

    fn reconstruct_backward(&mut self, end: &Balance) -> TallyResult<()> {
        // Checked against the oldest transaction, which is the last one stored.
        if let Some(oldest) = self.transactions.last() {
            if end.date() < oldest.balance().date() {
                return Err(TallyError::MisdatedBalance(format!(
                    "Account {} has {} end balance {} yet transaction {} is past that",
                    self.account.name(),
                    self.totals.month,
                    end,
                    oldest
                )));
            }
        }

        let mut amount = end.amount();
        for transaction in self.transactions.iter_mut() {
            amount -= transaction.amount();
            transaction.set_balance_from_end(amount);
        }
        Ok(())
    }
}
