//! Summary table service
//!
//! Rolls transaction statements up into per-owner buckets: one per account
//! type (`"Alice CHECKING"`) and one across all of an owner's non-external
//! accounts (`"Alice SUMMARY"`).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::statement::StatementTable;
use crate::error::{TallyError, TallyResult};
use crate::models::{Account, Month};
use crate::statement::{SummaryStatement, SummaryStatementBuilder, TransactionStatement};

/// Service rolling account statements up by owner and type
pub struct SummaryService<'a> {
    accounts: &'a BTreeMap<String, Arc<Account>>,
}

impl<'a> SummaryService<'a> {
    pub fn new(accounts: &'a BTreeMap<String, Arc<Account>>) -> Self {
        Self { accounts }
    }

    /// Labels an account contributes to
    ///
    /// Each label appears once even when the type bucket and the owner
    /// bucket coincide, as for `SUMMARY` accounts.
    pub fn labels(account: &Account) -> BTreeSet<String> {
        let mut labels = BTreeSet::new();
        for owner in account.owners() {
            labels.insert(format!("{} {}", owner, account.account_type()));
            if !account.is_external() {
                labels.insert(format!("{} SUMMARY", owner));
            }
        }
        labels
    }

    /// Build the (label, month) table of summary statements
    pub fn build_table(
        &self,
        statements: &StatementTable<TransactionStatement>,
    ) -> TallyResult<StatementTable<SummaryStatement>> {
        let mut builders: BTreeMap<String, BTreeMap<Month, SummaryStatementBuilder>> =
            BTreeMap::new();

        for (name, by_month) in statements {
            let account = self.accounts.get(name).ok_or_else(|| {
                TallyError::Invariant(format!(
                    "Account and statements are out of sync, could not locate account {}",
                    name
                ))
            })?;

            for label in Self::labels(account) {
                let bucket = builders.entry(label.clone()).or_default();
                for (month, statement) in by_month {
                    bucket
                        .entry(*month)
                        .or_insert_with(|| SummaryStatementBuilder::new(label.clone(), *month))
                        .add_statement(statement)?;
                }
            }
        }

        Ok(builders
            .into_iter()
            .map(|(label, by_month)| {
                let built = by_month
                    .into_iter()
                    .map(|(month, builder)| (month, Arc::new(builder.build())))
                    .collect();
                (label, built)
            })
            .collect())
    }
}
