//! JSON rendering of a ledger
//!
//! The output is a response envelope: `success`, `message` and, on
//! success, `data` holding the months, the open accounts and both statement
//! tables. Amounts are integer cents. Closed statements render as
//! `{"isClosed": true}` only.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{TallyError, TallyResult};
use crate::models::{Account, Balance, Confidence, Month};
use crate::reports::Ledger;
use crate::services::StatementTable;
use crate::statement::{Statement, SummaryStatement, Transaction, TransactionStatement};

/// Response envelope around a rendered ledger
#[derive(Debug, Clone, Serialize)]
pub struct LedgerExport {
    pub success: bool,
    pub message: String,
    pub data: Option<LedgerData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerData {
    pub months: Vec<Month>,
    pub account_name_to_account: BTreeMap<String, Account>,
    pub statements: BTreeMap<String, BTreeMap<Month, StatementView>>,
    pub summaries: BTreeMap<String, BTreeMap<Month, StatementView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceView {
    pub amount: i64,
    #[serde(rename = "type")]
    pub confidence: Confidence,
    pub date: NaiveDate,
}

impl From<&Balance> for BalanceView {
    fn from(balance: &Balance) -> Self {
        Self {
            amount: balance.amount().cents(),
            confidence: balance.confidence(),
            date: balance.date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub to_account_name: String,
    pub is_expense: bool,
    pub is_income: bool,
    pub description: String,
    pub balance: BalanceView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_from_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_from_end: Option<i64>,
}

impl From<&Transaction> for TransactionView {
    fn from(transaction: &Transaction) -> Self {
        Self {
            to_account_name: transaction.counterparty().name().to_string(),
            is_expense: transaction.is_expense(),
            is_income: transaction.is_income(),
            description: transaction.description().to_string(),
            balance: transaction.balance().into(),
            balance_from_start: transaction.balance_from_start().map(|m| m.cents()),
            balance_from_end: transaction.balance_from_end().map(|m| m.cents()),
        }
    }
}

/// Figures shared by both statement shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiguresView {
    pub start_balance: Option<BalanceView>,
    pub end_balance: Option<BalanceView>,
    pub add_sub: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<i64>,
    /// Rounded to two decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unaccounted: Option<i64>,
    pub income: i64,
    pub total_transfers: i64,
    pub total_payments: i64,
    pub in_flows: i64,
    pub out_flows: i64,
}

impl FiguresView {
    fn of(statement: &dyn Statement) -> Self {
        Self {
            start_balance: statement.start_balance().map(BalanceView::from),
            end_balance: statement.end_balance().map(BalanceView::from),
            add_sub: statement.add_sub().cents(),
            change: statement.change().map(|m| m.cents()),
            percent_change: statement
                .percent_change()
                .filter(|p| p.is_finite())
                .map(|p| (p * 100.0).round() / 100.0),
            unaccounted: statement.unaccounted().map(|m| m.cents()),
            income: statement.income().cents(),
            total_transfers: statement.total_transfers().cents(),
            total_payments: statement.total_payments().cents(),
            in_flows: statement.in_flows().cents(),
            out_flows: statement.out_flows().cents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageView {
    pub is_covered: bool,
    pub is_projected_covered: bool,
    pub has_projected_transfer: bool,
    pub transactions: Vec<TransactionView>,
}

/// One rendered statement; every part is absent for a closed statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
    #[serde(flatten)]
    pub figures: Option<FiguresView>,
    #[serde(flatten)]
    pub coverage: Option<CoverageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<String>>,
}

impl StatementView {
    fn closed() -> Self {
        Self {
            is_closed: Some(true),
            figures: None,
            coverage: None,
            accounts: None,
        }
    }
}

impl From<&TransactionStatement> for StatementView {
    fn from(statement: &TransactionStatement) -> Self {
        if statement.is_closed() {
            return Self::closed();
        }
        Self {
            is_closed: None,
            figures: Some(FiguresView::of(statement)),
            coverage: Some(CoverageView {
                is_covered: statement.is_covered(),
                is_projected_covered: statement.is_projected_covered(),
                has_projected_transfer: statement.has_projected_transfer(),
                transactions: statement
                    .transactions()
                    .iter()
                    .map(TransactionView::from)
                    .collect(),
            }),
            accounts: None,
        }
    }
}

impl From<&SummaryStatement> for StatementView {
    fn from(summary: &SummaryStatement) -> Self {
        if summary.is_closed() {
            return Self::closed();
        }
        Self {
            is_closed: None,
            figures: Some(FiguresView::of(summary)),
            coverage: None,
            accounts: Some(
                summary
                    .statements()
                    .iter()
                    .map(|s| s.name().to_string())
                    .collect(),
            ),
        }
    }
}

fn render_table<S>(
    table: &StatementTable<S>,
) -> BTreeMap<String, BTreeMap<Month, StatementView>>
where
    for<'s> &'s S: Into<StatementView>,
{
    table
        .iter()
        .map(|(name, by_month)| {
            let rendered = by_month
                .iter()
                .map(|(month, statement)| (*month, (&**statement).into()))
                .collect();
            (name.clone(), rendered)
        })
        .collect()
}

impl LedgerExport {
    /// Successful response carrying the whole ledger
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: Some(LedgerData {
                months: ledger.months.clone(),
                account_name_to_account: ledger
                    .accounts
                    .iter()
                    .map(|(name, account)| (name.clone(), Account::clone(account)))
                    .collect(),
                statements: render_table(&ledger.statements),
                summaries: render_table(&ledger.summaries),
            }),
        }
    }

    /// Failed response carrying only the error message
    pub fn failure(error: &TallyError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
        }
    }

    pub fn from_result(result: &TallyResult<Ledger>) -> Self {
        match result {
            Ok(ledger) => Self::from_ledger(ledger),
            Err(error) => Self::failure(error),
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W, pretty: bool) -> TallyResult<()> {
        let written = if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)
        } else {
            serde_json::to_writer(&mut *writer, self)
        };
        written?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountBuilder, AccountType, Budget, Money, TransferDraft};
    use serde_json::Value;

    fn month(s: &str) -> Month {
        Month::parse(s).unwrap()
    }

    fn ledger() -> Ledger {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let mut builder = Budget::builder();
        builder
            .set_period(month("Jan2024"), month("Feb2024"))
            .unwrap()
            .add_account(AccountBuilder::new("Alice Checking", AccountType::Checking).owner("Alice"))
            .add_account(
                AccountBuilder::new("Late Card", AccountType::CreditCard)
                    .owner("Alice")
                    .opened_on(month("Feb2024")),
            )
            .add_account(AccountBuilder::new("Employer", AccountType::External).owner("Acme"))
            .add_balance(
                "Alice Checking",
                month("Jan2024"),
                Balance::confirmed(Money::from_units(300), date(1, 1)),
            )
            .add_balance(
                "Alice Checking",
                month("Feb2024"),
                Balance::confirmed(Money::from_units(500), date(2, 1)),
            )
            .add_transfer(
                TransferDraft::new(
                    "Employer",
                    month("Jan2024"),
                    "Alice Checking",
                    month("Jan2024"),
                    Balance::confirmed(Money::from_units(200), date(1, 20)),
                )
                .description("salary"),
            );
        Ledger::compute(&builder.build().unwrap()).unwrap()
    }

    fn rendered() -> Value {
        let mut out = Vec::new();
        LedgerExport::from_ledger(&ledger())
            .write(&mut out, false)
            .unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_envelope_and_months() {
        let json = rendered();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "");
        assert_eq!(json["data"]["months"], serde_json::json!(["Feb2024", "Jan2024"]));
        assert_eq!(
            json["data"]["accountNameToAccount"]["Late Card"]["type"],
            "CREDIT_CARD"
        );
    }

    #[test]
    fn test_transaction_statement_shape() {
        let json = rendered();
        let jan = &json["data"]["statements"]["Alice Checking"]["Jan2024"];
        assert_eq!(jan["startBalance"]["amount"], 30000);
        assert_eq!(jan["startBalance"]["type"], "CONFIRMED");
        assert_eq!(jan["startBalance"]["date"], "2024-01-01");
        assert_eq!(jan["endBalance"]["amount"], 50000);
        assert_eq!(jan["income"], 20000);
        assert_eq!(jan["unaccounted"], 0);
        assert_eq!(jan["percentChange"], 66.67);
        assert_eq!(jan["isCovered"], true);

        let transaction = &jan["transactions"][0];
        assert_eq!(transaction["toAccountName"], "Employer");
        assert_eq!(transaction["isIncome"], true);
        assert_eq!(transaction["description"], "salary");
        assert_eq!(transaction["balanceFromStart"], 50000);
        assert_eq!(transaction["balanceFromEnd"], 30000);
    }

    #[test]
    fn test_closed_statements_render_flag_only() {
        let json = rendered();
        let closed = &json["data"]["statements"]["Late Card"]["Jan2024"];
        assert_eq!(closed, &serde_json::json!({"isClosed": true}));

        let summary = &json["data"]["summaries"]["Alice CREDIT_CARD"]["Jan2024"];
        assert_eq!(summary, &serde_json::json!({"isClosed": true}));

        let summary = &json["data"]["summaries"]["Alice SUMMARY"]["Feb2024"];
        assert_eq!(summary["accounts"], serde_json::json!(["Alice Checking", "Late Card"]));
        assert!(summary.get("isClosed").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let export = LedgerExport::failure(&TallyError::EmptyPeriod);
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().contains("at least one month"));
        assert!(json["data"].is_null());
    }
}
