//! Ledger report
//!
//! Runs the statement engine and the summary rollup over a budget and
//! keeps everything a renderer needs: the months in scope, the open
//! accounts and both statement tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::TallyResult;
use crate::models::{Account, Budget, Money, Month};
use crate::services::{StatementService, StatementTable, SummaryService};
use crate::statement::{Statement, SummaryStatement, TransactionStatement};

/// Fully derived statements for one budget
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Months in scope, most recent first
    pub months: Vec<Month>,
    /// Accounts open in at least one month, keyed by name
    pub accounts: BTreeMap<String, Arc<Account>>,
    pub statements: StatementTable<TransactionStatement>,
    pub summaries: StatementTable<SummaryStatement>,
}

impl Ledger {
    /// Derive all statements for `budget`
    pub fn compute(budget: &Budget) -> TallyResult<Self> {
        let months = budget.months().to_vec();
        let accounts: BTreeMap<String, Arc<Account>> = budget
            .open_accounts(&months)
            .into_iter()
            .map(|account| (account.name().to_string(), account))
            .collect();

        let statements = StatementService::new(budget).build_table()?;
        let summaries = SummaryService::new(&accounts).build_table(&statements)?;

        Ok(Self {
            months,
            accounts,
            statements,
            summaries,
        })
    }

    pub fn statement(&self, account: &str, month: Month) -> Option<&Arc<TransactionStatement>> {
        self.statements.get(account).and_then(|by_month| by_month.get(&month))
    }

    pub fn summary(&self, label: &str, month: Month) -> Option<&Arc<SummaryStatement>> {
        self.summaries.get(label).and_then(|by_month| by_month.get(&month))
    }

    /// Format the report for terminal display
    ///
    /// With a `name_filter`, only subjects whose name contains it
    /// (case-insensitive) are shown.
    pub fn format_terminal(&self, name_filter: Option<&str>, currency_symbol: &str) -> String {
        let filter = name_filter.map(str::to_lowercase);
        let keep = |name: &str| {
            filter
                .as_deref()
                .map_or(true, |f| name.to_lowercase().contains(f))
        };

        let mut output = String::new();
        output.push_str("Ledger Report\n");
        output.push_str(&"=".repeat(96));
        output.push('\n');
        if let (Some(newest), Some(oldest)) = (self.months.first(), self.months.last()) {
            output.push_str(&format!("Period: {} - {}\n", oldest, newest));
        }

        for (name, by_month) in self.statements.iter().filter(|(name, _)| keep(name)) {
            let heading = match self.accounts.get(name) {
                Some(account) => account.to_string(),
                None => name.clone(),
            };
            output.push_str(&format!("\n{}\n", heading));
            push_header(&mut output);
            for month in &self.months {
                if let Some(statement) = by_month.get(month) {
                    let mut flags = String::new();
                    if !statement.is_covered() {
                        flags.push_str(if statement.is_projected_covered() {
                            "~"
                        } else {
                            "!"
                        });
                    }
                    if statement.has_projected_transfer() {
                        flags.push('P');
                    }
                    push_row(&mut output, &**statement, &flags, currency_symbol);
                }
            }
        }

        let summaries: Vec<_> = self
            .summaries
            .iter()
            .filter(|(name, _)| keep(name))
            .collect();
        if !summaries.is_empty() {
            output.push('\n');
            output.push_str("Summaries\n");
            output.push_str(&"-".repeat(96));
            output.push('\n');
        }
        for (label, by_month) in summaries {
            output.push_str(&format!("\n{}\n", label));
            push_header(&mut output);
            for month in &self.months {
                if let Some(summary) = by_month.get(month) {
                    push_row(&mut output, &**summary, "", currency_symbol);
                }
            }
        }

        output.push_str(&"-".repeat(96));
        output.push('\n');
        output.push_str("! = uncovered deficit, ~ = covered only by projections, P = has projected transfers\n");
        output
    }
}

fn push_header(output: &mut String) {
    output.push_str(&format!(
        "{:<9} {:>13} {:>13} {:>13} {:>13} {:>13} {:>8} {:<5}\n",
        "Month", "Start", "In", "Out", "End", "Unaccounted", "Change", "Flags"
    ));
}

fn push_row(output: &mut String, statement: &dyn Statement, flags: &str, symbol: &str) {
    if statement.is_closed() {
        output.push_str(&format!("{:<9} closed\n", statement.month()));
        return;
    }
    let money = |amount: Option<Money>| {
        amount
            .map(|m| m.format_with_symbol(symbol))
            .unwrap_or_else(|| "-".to_string())
    };
    let percent = statement
        .percent_change()
        .map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "-".to_string());
    output.push_str(&format!(
        "{:<9} {:>13} {:>13} {:>13} {:>13} {:>13} {:>8} {:<5}\n",
        statement.month(),
        money(statement.start_balance().map(|b| b.amount())),
        money(Some(statement.in_flows())),
        money(Some(statement.out_flows())),
        money(statement.end_balance().map(|b| b.amount())),
        money(statement.unaccounted()),
        percent,
        flags
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountBuilder, AccountType, Balance, TransferDraft};
    use chrono::NaiveDate;

    fn month(s: &str) -> Month {
        Month::parse(s).unwrap()
    }

    fn budget() -> Budget {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let mut builder = Budget::builder();
        builder
            .set_period(month("Jan2024"), month("Feb2024"))
            .unwrap()
            .add_account(AccountBuilder::new("Alice Checking", AccountType::Checking).owner("Alice"))
            .add_account(AccountBuilder::new("Alice Credit", AccountType::Credit).owner("Alice"))
            .add_account(
                AccountBuilder::new("Closed Savings", AccountType::Investment)
                    .owner("Alice")
                    .closed_on(month("Jan2023")),
            )
            .add_balance(
                "Alice Checking",
                month("Jan2024"),
                Balance::confirmed(Money::from_units(1000), date(1, 1)),
            )
            .add_balance(
                "Alice Checking",
                month("Feb2024"),
                Balance::confirmed(Money::from_units(500), date(2, 1)),
            )
            .add_transfer(
                TransferDraft::new(
                    "Alice Checking",
                    month("Jan2024"),
                    "Alice Credit",
                    month("Jan2024"),
                    Balance::confirmed(Money::from_units(500), date(1, 10)),
                )
                .description("card payment"),
            );
        builder.build().unwrap()
    }

    #[test]
    fn test_compute_keeps_open_accounts_only() {
        let ledger = Ledger::compute(&budget()).unwrap();
        assert_eq!(ledger.months, vec![month("Feb2024"), month("Jan2024")]);
        let names: Vec<_> = ledger.accounts.keys().cloned().collect();
        assert_eq!(names, vec!["Alice Checking", "Alice Credit"]);

        let jan = ledger.statement("Alice Checking", month("Jan2024")).unwrap();
        assert_eq!(jan.unaccounted(), Some(Money::zero()));
        assert!(ledger.statement("Closed Savings", month("Jan2024")).is_none());

        let summary = ledger.summary("Alice SUMMARY", month("Jan2024")).unwrap();
        assert_eq!(summary.statements().len(), 2);
        assert_eq!(summary.total_transfers(), Money::zero());
    }

    #[test]
    fn test_format_terminal() {
        let ledger = Ledger::compute(&budget()).unwrap();
        let text = ledger.format_terminal(None, "$");
        assert!(text.contains("Period: Jan2024 - Feb2024"));
        assert!(text.contains("Alice Checking (CHECKING)"));
        assert!(text.contains("$1000.00"));
        assert!(text.contains("-50.0%"));
        assert!(text.contains("Alice SUMMARY"));

        let filtered = ledger.format_terminal(Some("credit"), "€");
        assert!(filtered.contains("Alice Credit (CREDIT)"));
        assert!(filtered.contains("Alice CREDIT"));
        assert!(!filtered.contains("Alice Checking"));
        assert!(filtered.contains("€500.00"));
    }
}
