//! Derived monthly statements
//!
//! Both statement shapes share [`StatementTotals`] (subject, month,
//! optional bounds and the flow totals) and expose it through the
//! [`Statement`] trait, which supplies the derived figures.

pub mod summary_statement;
pub mod transaction;
pub mod transaction_statement;

pub use summary_statement::{SummaryStatement, SummaryStatementBuilder};
pub use transaction::{Transaction, TransactionType};
pub use transaction_statement::{TransactionStatement, TransactionStatementBuilder};

use crate::models::{Balance, Money, Month};

/// Figures common to every statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTotals {
    name: String,
    month: Month,
    start_balance: Option<Balance>,
    end_balance: Option<Balance>,
    in_flows: Money,
    out_flows: Money,
    total_transfers: Money,
    total_payments: Money,
    income: Money,
}

impl StatementTotals {
    pub fn new(name: impl Into<String>, month: Month) -> Self {
        Self {
            name: name.into(),
            month,
            start_balance: None,
            end_balance: None,
            in_flows: Money::zero(),
            out_flows: Money::zero(),
            total_transfers: Money::zero(),
            total_payments: Money::zero(),
            income: Money::zero(),
        }
    }

    pub(crate) fn set_start_balance(&mut self, balance: Option<Balance>) {
        self.start_balance = balance;
    }

    pub(crate) fn set_end_balance(&mut self, balance: Option<Balance>) {
        self.end_balance = balance;
    }

    /// Positive amounts go to in-flows, the rest to out-flows
    pub(crate) fn add_flow(&mut self, amount: Money) {
        if amount.is_positive() {
            self.in_flows += amount;
        } else {
            self.out_flows += amount;
        }
    }

    pub(crate) fn add_transfer(&mut self, amount: Money) {
        self.total_transfers += amount;
    }

    pub(crate) fn add_payment(&mut self, amount: Money) {
        self.total_payments += amount;
    }

    pub(crate) fn add_income(&mut self, amount: Money) {
        self.income += amount;
    }
}

/// Shared contract of transaction and summary statements
pub trait Statement {
    fn totals(&self) -> &StatementTotals;

    /// True when the subject was not open during the statement's month
    fn is_closed(&self) -> bool;

    fn name(&self) -> &str {
        &self.totals().name
    }

    fn month(&self) -> Month {
        self.totals().month
    }

    /// Subject name with whitespace replaced, suffixed with the month
    fn id(&self) -> String {
        let name: String = self
            .name()
            .chars()
            .map(|c| if matches!(c, ' ' | '\n' | '\t') { '_' } else { c })
            .collect();
        format!("{}_{}", name, self.month())
    }

    fn start_balance(&self) -> Option<&Balance> {
        self.totals().start_balance.as_ref()
    }

    fn end_balance(&self) -> Option<&Balance> {
        self.totals().end_balance.as_ref()
    }

    fn in_flows(&self) -> Money {
        self.totals().in_flows
    }

    /// Sum of outgoing movements, zero or negative
    fn out_flows(&self) -> Money {
        self.totals().out_flows
    }

    /// Net of movements between accounts sharing an owner
    fn total_transfers(&self) -> Money {
        self.totals().total_transfers
    }

    /// Net of movements to external parties
    fn total_payments(&self) -> Money {
        self.totals().total_payments
    }

    /// Net of movements from external parties
    fn income(&self) -> Money {
        self.totals().income
    }

    /// Total added or subtracted by the recorded movements
    fn add_sub(&self) -> Money {
        self.in_flows() + self.out_flows()
    }

    fn change(&self) -> Option<Money> {
        match (self.start_balance(), self.end_balance()) {
            (Some(start), Some(end)) => Some(end.amount() - start.amount()),
            _ => None,
        }
    }

    /// Change relative to the start balance, in percent
    fn percent_change(&self) -> Option<f64> {
        let start = self.start_balance()?;
        if start.amount().is_zero() {
            return None;
        }
        let change = self.change()?;
        Some(100.0 * change.cents() as f64 / start.amount().cents() as f64)
    }

    /// Change not explained by the recorded movements
    ///
    /// Non-zero means a movement is missing from the records or was
    /// misclassified.
    fn unaccounted(&self) -> Option<Money> {
        self.change().map(|change| change - self.add_sub())
    }
}
