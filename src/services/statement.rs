//! Statement table service
//!
//! Chains each open account's monthly statements backward through the
//! budget period, so every month's closing balance and coverage come from
//! the month after it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{TallyError, TallyResult};
use crate::models::{Account, Budget, Month};
use crate::statement::{Statement, TransactionStatement, TransactionStatementBuilder};

/// Statements keyed by subject name, then month
pub type StatementTable<S> = BTreeMap<String, BTreeMap<Month, Arc<S>>>;

/// Service deriving transaction statements from a sealed budget
pub struct StatementService<'a> {
    budget: &'a Budget,
}

impl<'a> StatementService<'a> {
    pub fn new(budget: &'a Budget) -> Self {
        Self { budget }
    }

    /// Build the (account name, month) table of transaction statements
    ///
    /// Only accounts open in at least one budget month are included.
    pub fn build_table(&self) -> TallyResult<StatementTable<TransactionStatement>> {
        let months = self.budget.months();
        let newest = months.first().copied().ok_or(TallyError::EmptyPeriod)?;

        let accounts = self.budget.open_accounts(months);
        info!("Number of accounts {}", accounts.len());

        let mut table = StatementTable::new();
        for account in accounts {
            let virtual_next = Arc::new(self.month_builder(&account, newest.next())?.build());
            let mut statements = BTreeMap::new();

            months.iter().try_fold(virtual_next, |next, &month| {
                let mut builder = self.month_builder(&account, month)?;
                if let Some(end) = next.start_balance() {
                    builder = builder.end_balance(*end)?;
                }
                let statement = Arc::new(
                    builder
                        .covered(next.covers_previous())
                        .projected_covered(next.covers_projected_previous())
                        .build(),
                );
                statements.insert(month, Arc::clone(&statement));
                Ok::<_, TallyError>(statement)
            })?;

            debug!(account = %account.name(), months = statements.len(), "Built statements");
            table.insert(account.name().to_string(), statements);
        }

        Ok(table)
    }

    /// Statement builder seeded with the month's transfers and recorded balance
    fn month_builder(
        &self,
        account: &Arc<Account>,
        month: Month,
    ) -> TallyResult<TransactionStatementBuilder> {
        let mut builder = TransactionStatement::builder(Arc::clone(account), month)
            .transfers(self.budget.transfers(account, month))?;
        if let Some(balance) = self.budget.balance(account, month) {
            builder = builder.start_balance(*balance)?;
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountBuilder, AccountType, Balance, Money, TransferDraft};
    use chrono::NaiveDate;

    fn month(year: i32, m: u32) -> Month {
        Month::new(year, m).unwrap()
    }

    fn date(year: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, m, d).unwrap()
    }

    fn budget() -> Budget {
        let mut builder = Budget::builder();
        builder
            .set_period(month(2024, 0), month(2024, 2))
            .unwrap()
            .add_account(AccountBuilder::new("Checking", AccountType::Checking).owner("Alice"))
            .add_account(AccountBuilder::new("Savings", AccountType::Investment).owner("Alice"))
            .add_account(
                AccountBuilder::new("Old", AccountType::Checking)
                    .owner("Alice")
                    .closed_on(month(2023, 5)),
            )
            .add_balance(
                "Checking",
                month(2024, 0),
                Balance::confirmed(Money::from_cents(10000), date(2024, 1, 1)),
            )
            .add_balance(
                "Checking",
                month(2024, 2),
                Balance::confirmed(Money::from_cents(-10000), date(2024, 3, 1)),
            )
            .add_balance(
                "Checking",
                month(2024, 3),
                Balance::confirmed(Money::from_cents(5000), date(2024, 4, 1)),
            )
            .add_transfer(
                TransferDraft::new(
                    "Savings",
                    month(2024, 2),
                    "Checking",
                    month(2024, 2),
                    Balance::confirmed(Money::from_cents(15000), date(2024, 3, 5)),
                )
                .description("top up"),
            );
        builder.build().unwrap()
    }

    #[test]
    fn test_end_balance_chains_from_next_month() {
        let budget = budget();
        let table = StatementService::new(&budget).build_table().unwrap();

        assert!(!table.contains_key("Old"));
        assert!(table.contains_key("Savings"));
        let checking = &table["Checking"];
        assert_eq!(checking.len(), 3);

        let mar = &checking[&month(2024, 2)];
        // Seeded from the month after the period.
        assert_eq!(mar.end_balance().unwrap().amount().cents(), 5000);
        assert_eq!(mar.start_balance().unwrap().amount().cents(), -10000);
        assert_eq!(mar.unaccounted(), Some(Money::zero()));

        let feb = &checking[&month(2024, 1)];
        assert_eq!(feb.start_balance(), None);
        assert_eq!(feb.end_balance().unwrap().amount().cents(), -10000);

        let jan = &checking[&month(2024, 0)];
        assert_eq!(jan.start_balance().unwrap().amount().cents(), 10000);
        assert_eq!(jan.end_balance(), None);
    }

    #[test]
    fn test_coverage_flows_back_one_month() {
        let budget = budget();
        let table = StatementService::new(&budget).build_table().unwrap();
        let checking = &table["Checking"];

        let mar = &checking[&month(2024, 2)];
        assert!(mar.covers_previous());
        assert!(mar.is_covered());

        let feb = &checking[&month(2024, 1)];
        assert!(feb.end_balance().unwrap().amount().is_negative());
        assert!(feb.is_covered());
        assert!(feb.is_projected_covered());

        let savings = &table["Savings"][&month(2024, 1)];
        assert!(savings.is_covered());
    }
}
