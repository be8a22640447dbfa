//! Owner and type rollups of transaction statements

use std::sync::Arc;

use super::transaction_statement::TransactionStatement;
use super::{Statement, StatementTotals};
use crate::error::{TallyError, TallyResult};
use crate::models::Month;

/// Aggregate of the open transaction statements sharing a label and month
#[derive(Debug, Clone)]
pub struct SummaryStatement {
    totals: StatementTotals,
    statements: Vec<Arc<TransactionStatement>>,
    is_closed: bool,
}

impl SummaryStatement {
    pub fn builder(name: impl Into<String>, month: Month) -> SummaryStatementBuilder {
        SummaryStatementBuilder::new(name, month)
    }

    /// Contributing statements, sorted by account name
    pub fn statements(&self) -> &[Arc<TransactionStatement>] {
        &self.statements
    }
}

impl Statement for SummaryStatement {
    fn totals(&self) -> &StatementTotals {
        &self.totals
    }

    fn is_closed(&self) -> bool {
        self.is_closed
    }
}

#[derive(Debug, Clone)]
pub struct SummaryStatementBuilder {
    totals: StatementTotals,
    statements: Vec<Arc<TransactionStatement>>,
    is_closed: bool,
}

impl SummaryStatementBuilder {
    pub fn new(name: impl Into<String>, month: Month) -> Self {
        Self {
            totals: StatementTotals::new(name, month),
            statements: Vec::new(),
            is_closed: true,
        }
    }

    /// Fold one account statement into the rollup
    ///
    /// Closed statements are ignored. A statement for another month is a
    /// defect.
    pub fn add_statement(&mut self, statement: &Arc<TransactionStatement>) -> TallyResult<&mut Self> {
        if statement.is_closed() {
            return Ok(self);
        }
        if statement.month() != self.totals.month {
            return Err(TallyError::Invariant(format!(
                "Statement for month {} is being added to summary {} for month {}",
                statement.month(),
                self.totals.name,
                self.totals.month
            )));
        }

        let start = match (self.totals.start_balance, statement.start_balance()) {
            (Some(sum), Some(other)) => Some(sum.add(other)),
            (sum, other) => sum.or_else(|| other.copied()),
        };
        let end = match (self.totals.end_balance, statement.end_balance()) {
            (Some(sum), Some(other)) => Some(sum.add(other)),
            (sum, other) => sum.or_else(|| other.copied()),
        };
        self.totals.set_start_balance(start);
        self.totals.set_end_balance(end);

        self.totals.in_flows += statement.in_flows();
        self.totals.out_flows += statement.out_flows();
        self.totals.add_transfer(statement.total_transfers());
        self.totals.add_payment(statement.total_payments());
        self.totals.add_income(statement.income());

        self.is_closed = false;
        self.statements.push(Arc::clone(statement));
        Ok(self)
    }

    pub fn build(mut self) -> SummaryStatement {
        self.statements
            .sort_by(|a, b| a.name().cmp(b.name()));
        SummaryStatement {
            totals: self.totals,
            statements: self.statements,
            is_closed: self.is_closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Balance, Confidence, Money, Transfer};
    use chrono::NaiveDate;

    fn jan() -> Month {
        Month::new(2024, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn account(name: &str, account_type: AccountType) -> Arc<Account> {
        Arc::new(
            Account::builder(name, account_type)
                .owner("Alice")
                .build()
                .unwrap(),
        )
    }

    fn statement(
        account: &Arc<Account>,
        start: Option<i64>,
        end: Option<i64>,
        transfers: &[Arc<Transfer>],
    ) -> Arc<TransactionStatement> {
        let mut builder = TransactionStatement::builder(Arc::clone(account), jan())
            .transfers(transfers)
            .unwrap();
        if let Some(cents) = start {
            builder = builder
                .start_balance(Balance::confirmed(Money::from_cents(cents), day(1)))
                .unwrap();
        }
        if let Some(cents) = end {
            builder = builder
                .end_balance(Balance::projected(Money::from_cents(cents), day(31)))
                .unwrap();
        }
        Arc::new(builder.build())
    }

    #[test]
    fn test_rollup_sums_and_sorts() {
        let checking = account("Checking", AccountType::Checking);
        let credit = account("Credit", AccountType::Credit);
        let move_money = Arc::new(Transfer::new(
            Arc::clone(&checking),
            jan(),
            Arc::clone(&credit),
            jan(),
            "pay card",
            Balance::confirmed(Money::from_cents(500), day(10)),
        ));

        let mut builder = SummaryStatement::builder("Alice SUMMARY", jan());
        builder
            .add_statement(&statement(&credit, None, Some(700), &[Arc::clone(&move_money)]))
            .unwrap()
            .add_statement(&statement(&checking, Some(1000), Some(500), &[move_money]))
            .unwrap();
        let summary = builder.build();

        assert!(!summary.is_closed());
        let names: Vec<_> = summary.statements().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Checking", "Credit"]);
        assert_eq!(summary.start_balance().unwrap().amount().cents(), 1000);
        let end = summary.end_balance().unwrap();
        assert_eq!(end.amount().cents(), 1200);
        assert_eq!(end.confidence(), Confidence::Projected);
        assert_eq!(summary.in_flows().cents(), 500);
        assert_eq!(summary.out_flows().cents(), -500);
        assert_eq!(summary.total_transfers(), Money::zero());
    }

    #[test]
    fn test_closed_contributors_are_skipped() {
        let old = Arc::new(
            Account::builder("Old", AccountType::Checking)
                .owner("Alice")
                .closed_on(Month::new(2023, 6).unwrap())
                .build()
                .unwrap(),
        );
        let mut builder = SummaryStatement::builder("Alice CHECKING", jan());
        builder.add_statement(&statement(&old, None, None, &[])).unwrap();
        let summary = builder.build();
        assert!(summary.is_closed());
        assert!(summary.statements().is_empty());
        assert!(summary.start_balance().is_none());
    }

    #[test]
    fn test_month_mismatch_is_a_defect() {
        let checking = account("Checking", AccountType::Checking);
        let mut builder = SummaryStatement::builder("Alice SUMMARY", Month::new(2024, 1).unwrap());
        let err = builder
            .add_statement(&statement(&checking, None, None, &[]))
            .unwrap_err();
        assert!(matches!(err, TallyError::Invariant(_)));
    }
}
