//! YAML record loader
//!
//! Each record file is a single YAML document. A document may carry a
//! `budget_period`, an account definition (`name`, `type`, `owner`, ...),
//! its `balances` and its outgoing `transfers_to`. Everything is fed into
//! a [`BudgetBuilder`]; name resolution happens later, in
//! [`BudgetBuilder::build`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::error::{TallyError, TallyResult};
use crate::models::transfer::MAX_DATE_DISTANCE;
use crate::models::{
    AccountBuilder, AccountMetadata, AccountType, Balance, BudgetBuilder, Confidence, Money,
    Month, TransferDraft,
};

#[derive(Debug, Default, Deserialize)]
struct Record {
    budget_period: Option<PeriodRecord>,
    name: Option<String>,
    #[serde(rename = "type")]
    account_type: Option<String>,
    owner: Option<Vec<String>>,
    desc: Option<String>,
    number: Option<String>,
    url: Option<String>,
    username: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    opened_on: Option<Month>,
    closed_on: Option<Month>,
    balances: Option<Vec<BalanceRecord>>,
    transfers_to: Option<BTreeMap<String, Option<Vec<TransferRecord>>>>,
}

#[derive(Debug, Deserialize)]
struct PeriodRecord {
    start: Option<Month>,
    end: Option<Month>,
}

#[derive(Debug, Deserialize)]
struct BalanceRecord {
    grp: Option<Month>,
    date: Option<NaiveDate>,
    camt: Option<Amount>,
    pamt: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct TransferRecord {
    grp: Option<Month>,
    dst: Option<Month>,
    date: Option<NaiveDate>,
    camt: Option<Amount>,
    pamt: Option<Amount>,
    desc: Option<String>,
}

/// Amount as written in a record
///
/// Integers are whole units; decimals and strings carry cents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Amount {
    Whole(i64),
    Decimal(f64),
    Text(String),
}

impl Amount {
    fn to_money(&self) -> TallyResult<Money> {
        match self {
            Self::Whole(units) => units
                .checked_mul(100)
                .map(Money::from_cents)
                .ok_or_else(|| TallyError::Load(format!("Amount {} is out of range", units))),
            Self::Decimal(units) => Ok(Money::from_f64(*units)),
            Self::Text(text) => Money::parse(text).map_err(|_| {
                TallyError::Load(format!("Failed to parse value '{}' as decimal", text))
            }),
        }
    }
}

/// Which amount field wins when a record carries both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preferred {
    /// Balance cells: `camt` first
    Confirmed,
    /// Transfers: `pamt` first
    Projected,
}

/// Read a balance from `date` plus `camt` or `pamt`
///
/// `camt` is a confirmed amount and `pamt` a projected one.
fn read_balance(
    date: Option<NaiveDate>,
    camt: Option<&Amount>,
    pamt: Option<&Amount>,
    preferred: Preferred,
) -> TallyResult<Balance> {
    let date = date.ok_or_else(|| TallyError::Load("No date given for balance record".into()))?;
    let confirmed = camt.map(|amount| (amount, Confidence::Confirmed));
    let projected = pamt.map(|amount| (amount, Confidence::Projected));
    let chosen = match preferred {
        Preferred::Confirmed => confirmed.or(projected),
        Preferred::Projected => projected.or(confirmed),
    };
    match chosen {
        Some((amount, confidence)) => Ok(Balance::new(amount.to_money()?, date, confidence)),
        None => Err(TallyError::Load(format!(
            "No balance amount (camt/pamt) specified for date {}",
            date
        ))),
    }
}

/// Parse one YAML document and feed it into `builder`
pub fn load_str(content: &str, builder: &mut BudgetBuilder) -> TallyResult<()> {
    if content.trim().is_empty() {
        return Ok(());
    }
    let record: Option<Record> = serde_yaml::from_str(content)
        .map_err(|e| TallyError::Load(format!("Failed to parse record: {}", e)))?;
    match record {
        Some(record) => apply(record, builder),
        None => Ok(()),
    }
}

fn apply(record: Record, builder: &mut BudgetBuilder) -> TallyResult<()> {
    if let Some(period) = &record.budget_period {
        let start = period
            .start
            .ok_or_else(|| TallyError::Load("Budget period is specified without start".into()))?;
        let end = period
            .end
            .ok_or_else(|| TallyError::Load("Budget period is specified without end".into()))?;
        if start > end {
            return Err(TallyError::Load(format!(
                "Budget period is specified with end {} before start {}",
                end, start
            )));
        }
        builder.set_period(start, end)?;
    }

    let Some(name) = record.name.clone() else {
        return Ok(());
    };

    builder.add_account(account_draft(&name, &record)?);

    match &record.balances {
        Some(balances) => {
            builder.add_balances(&name, load_balances(&name, balances)?);
        }
        None => warn!(account = %name, "Account has no balances record"),
    }

    if let Some(transfers_to) = &record.transfers_to {
        for (to_name, transfers) in transfers_to {
            for transfer in transfers.iter().flatten() {
                builder.add_transfer(load_transfer(&name, to_name, transfer)?);
            }
        }
    }

    Ok(())
}

fn account_draft(name: &str, record: &Record) -> TallyResult<AccountBuilder> {
    let type_name = record
        .account_type
        .as_deref()
        .ok_or_else(|| TallyError::Load(format!("Account {} type is not set", name)))?;
    let account_type = AccountType::parse(type_name).ok_or_else(|| {
        TallyError::Load(format!(
            "Failed to load account {}: unknown type {}",
            name, type_name
        ))
    })?;
    let owners = record
        .owner
        .as_ref()
        .filter(|owners| !owners.is_empty())
        .ok_or_else(|| TallyError::Load(format!("No owners defined for account {}", name)))?;

    let mut draft = AccountBuilder::new(name, account_type)
        .owners(owners.iter().cloned())
        .metadata(AccountMetadata {
            description: record.desc.clone(),
            number: record.number.clone(),
            url: record.url.clone(),
            user_name: record.username.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
        });
    if let Some(month) = record.opened_on {
        draft = draft.opened_on(month);
    }
    if let Some(month) = record.closed_on {
        draft = draft.closed_on(month);
    }
    Ok(draft)
}

fn load_balances(name: &str, records: &[BalanceRecord]) -> TallyResult<BTreeMap<Month, Balance>> {
    let mut balances = BTreeMap::new();
    for record in records {
        let month = record.grp.ok_or_else(|| {
            TallyError::Load(format!(
                "Expected grp field in balance record for account {}",
                name
            ))
        })?;
        let balance = read_balance(
            record.date,
            record.camt.as_ref(),
            record.pamt.as_ref(),
            Preferred::Confirmed,
        )
        .map_err(|e| {
            TallyError::Load(format!(
                "Failed to add balance for account {} {}: {}",
                name, month, e
            ))
        })?;

        let distance = Month::from_date(balance.date()).distance(&month).abs();
        if distance > MAX_DATE_DISTANCE {
            return Err(TallyError::Load(format!(
                "For {} account {} and month {} are {} months apart ({} max).",
                name, balance, month, distance, MAX_DATE_DISTANCE
            )));
        }
        if balances.insert(month, balance).is_some() {
            return Err(TallyError::Duplicate {
                entity_type: "Balance",
                identifier: format!("{} {}", name, month),
            });
        }
    }
    Ok(balances)
}

fn load_transfer(from: &str, to: &str, record: &TransferRecord) -> TallyResult<TransferDraft> {
    let from_month = record
        .grp
        .ok_or_else(|| TallyError::Load(format!("Transfer from {} to {} has no grp", from, to)))?;
    let to_month = record.dst.unwrap_or(from_month);

    let balance = read_balance(
        record.date,
        record.camt.as_ref(),
        record.pamt.as_ref(),
        Preferred::Projected,
    )
    .map_err(|e| {
        TallyError::Load(format!(
            "Failed to parse transfer from {} to {} for {}: {}",
            from, to, from_month, e
        ))
    })?;

    let draft = TransferDraft::new(from, from_month, to, to_month, balance)
        .description(record.desc.clone().unwrap_or_default());
    draft
        .check_proximity()
        .map_err(|e| TallyError::Load(e.to_string()))?;
    Ok(draft)
}
