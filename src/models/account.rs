//! Account model
//!
//! Accounts carry identity, ownership, type and an optional open/closed
//! window in months. They are assembled through [`AccountBuilder`] and are
//! immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::month::Month;
use crate::error::{TallyError, TallyResult};

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Bill,
    Checking,
    Credit,
    CreditCard,
    DeferredIncome,
    External,
    Income,
    Investment,
    Retirement,
    Summary,
    Tax,
}

impl AccountType {
    /// Parse account type from its record name or its enum name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "bill" | "BILL" => Some(Self::Bill),
            "checking" | "CHECKING" => Some(Self::Checking),
            "credit" | "CREDIT" => Some(Self::Credit),
            "credit-card" | "CREDIT_CARD" => Some(Self::CreditCard),
            "deferred income" | "DEFERRED_INCOME" => Some(Self::DeferredIncome),
            "external" | "EXTERNAL" => Some(Self::External),
            "income" | "INCOME" => Some(Self::Income),
            "investment" | "INVESTMENT" => Some(Self::Investment),
            "retirement" | "RETIREMENT" => Some(Self::Retirement),
            "_summary_" | "SUMMARY" => Some(Self::Summary),
            "tax_" | "TAX" => Some(Self::Tax),
            _ => None,
        }
    }

    /// Accounts of these types stay out of the per-owner SUMMARY rollup
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Tax | Self::External | Self::DeferredIncome)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bill => "BILL",
            Self::Checking => "CHECKING",
            Self::Credit => "CREDIT",
            Self::CreditCard => "CREDIT_CARD",
            Self::DeferredIncome => "DEFERRED_INCOME",
            Self::External => "EXTERNAL",
            Self::Income => "INCOME",
            Self::Investment => "INVESTMENT",
            Self::Retirement => "RETIREMENT",
            Self::Summary => "SUMMARY",
            Self::Tax => "TAX",
        };
        f.write_str(name)
    }
}

/// Free-form descriptive fields; the engine never looks at these
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A financial account
///
/// Equality and hashing use (name, type) only.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    name: String,
    #[serde(rename = "type")]
    account_type: AccountType,
    owners: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opened_on: Option<Month>,
    #[serde(skip_serializing_if = "Option::is_none")]
    closed_on: Option<Month>,
    #[serde(flatten)]
    metadata: AccountMetadata,
}

impl Account {
    /// Start a new account draft
    pub fn builder(name: impl Into<String>, account_type: AccountType) -> AccountBuilder {
        AccountBuilder::new(name, account_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn opened_on(&self) -> Option<Month> {
        self.opened_on
    }

    pub fn closed_on(&self) -> Option<Month> {
        self.closed_on
    }

    pub fn metadata(&self) -> &AccountMetadata {
        &self.metadata
    }

    pub fn is_external(&self) -> bool {
        self.account_type.is_external()
    }

    pub fn is_summary(&self) -> bool {
        self.account_type == AccountType::Summary
    }

    pub fn has_common_owner(&self, other: &Account) -> bool {
        self.owners.iter().any(|owner| other.owners.contains(owner))
    }

    /// Whether the account is open during `month`
    ///
    /// A missing opened bound means open since the beginning of time, a
    /// missing closed bound means never closed.
    pub fn is_open(&self, month: Month) -> bool {
        if matches!(self.opened_on, Some(opened) if opened > month) {
            return false;
        }
        match self.closed_on {
            Some(closed) => closed >= month,
            None => true,
        }
    }

    /// Whether the account is open during at least one of `months`
    pub fn is_open_in_any(&self, months: &[Month]) -> bool {
        months.iter().any(|month| self.is_open(*month))
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.account_type == other.account_type
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.account_type.hash(state);
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// Mutable draft of an [`Account`]
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    name: String,
    account_type: AccountType,
    owners: Vec<String>,
    opened_on: Option<Month>,
    closed_on: Option<Month>,
    metadata: AccountMetadata,
}

impl AccountBuilder {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            owners: Vec::new(),
            opened_on: None,
            closed_on: None,
            metadata: AccountMetadata::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    pub fn owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners.extend(owners.into_iter().map(Into::into));
        self
    }

    pub fn opened_on(mut self, month: Month) -> Self {
        self.opened_on = Some(month);
        self
    }

    pub fn closed_on(mut self, month: Month) -> Self {
        self.closed_on = Some(month);
        self
    }

    pub fn metadata(mut self, metadata: AccountMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Freeze the draft
    pub fn build(&self) -> TallyResult<Account> {
        if self.name.trim().is_empty() {
            return Err(TallyError::Validation("Account name cannot be empty".into()));
        }
        if self.owners.is_empty() {
            return Err(TallyError::Validation(format!(
                "No owners defined for account {}",
                self.name
            )));
        }
        if let (Some(opened), Some(closed)) = (self.opened_on, self.closed_on) {
            if closed < opened {
                return Err(TallyError::Validation(format!(
                    "Account {} was closed {} before it was opened {}",
                    self.name, closed, opened
                )));
            }
        }

        Ok(Account {
            name: self.name.clone(),
            account_type: self.account_type,
            owners: self.owners.clone(),
            opened_on: self.opened_on,
            closed_on: self.closed_on,
            metadata: self.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn test_build_requires_owner() {
        let err = Account::builder("Checking", AccountType::Checking)
            .build()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_closed_before_opened_is_rejected() {
        let err = Account::builder("Checking", AccountType::Checking)
            .owner("Alice")
            .opened_on(m(2024, 5))
            .closed_on(m(2024, 4))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("closed Apr2024 before it was opened Jun2024"));
    }

    #[test]
    fn test_is_open_bounded() {
        let account = Account::builder("Savings", AccountType::Investment)
            .owner("Alice")
            .opened_on(m(2024, 1))
            .closed_on(m(2024, 3))
            .build()
            .unwrap();
        assert!(!account.is_open(m(2024, 0)));
        assert!(account.is_open(m(2024, 1)));
        assert!(account.is_open(m(2024, 2)));
        assert!(account.is_open(m(2024, 3)));
        assert!(!account.is_open(m(2024, 4)));
    }

    #[test]
    fn test_is_open_unbounded() {
        let forever = Account::builder("Wallet", AccountType::Checking)
            .owner("Alice")
            .build()
            .unwrap();
        assert!(forever.is_open(m(1900, 0)));
        assert!(forever.is_open(m(2999, 11)));

        let closing = Account::builder("Old", AccountType::Checking)
            .owner("Alice")
            .closed_on(m(2020, 0))
            .build()
            .unwrap();
        assert!(closing.is_open(m(1900, 0)));
        assert!(!closing.is_open(m(2020, 1)));
        assert!(closing.is_open_in_any(&[m(2020, 1), m(2020, 0)]));
        assert!(!closing.is_open_in_any(&[m(2020, 1)]));
    }

    #[test]
    fn test_common_owner_and_external() {
        let joint = Account::builder("Joint", AccountType::Checking)
            .owners(["Alice", "Bob"])
            .build()
            .unwrap();
        let bob = Account::builder("Bob Credit", AccountType::Credit)
            .owner("Bob")
            .build()
            .unwrap();
        let irs = Account::builder("IRS", AccountType::Tax)
            .owner("Gov")
            .build()
            .unwrap();
        assert!(joint.has_common_owner(&bob));
        assert!(bob.has_common_owner(&joint));
        assert!(!joint.has_common_owner(&irs));
        assert!(irs.is_external());
        assert!(!joint.is_external());
        assert!(AccountType::DeferredIncome.is_external());
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!(AccountType::parse("credit-card"), Some(AccountType::CreditCard));
        assert_eq!(AccountType::parse("CREDIT_CARD"), Some(AccountType::CreditCard));
        assert_eq!(
            AccountType::parse("deferred income"),
            Some(AccountType::DeferredIncome)
        );
        assert_eq!(AccountType::parse("tax_"), Some(AccountType::Tax));
        assert_eq!(AccountType::parse("_summary_"), Some(AccountType::Summary));
        assert_eq!(AccountType::parse("savings"), None);
    }

    #[test]
    fn test_equality_uses_name_and_type() {
        let a = Account::builder("Checking", AccountType::Checking)
            .owner("Alice")
            .build()
            .unwrap();
        let b = Account::builder("Checking", AccountType::Checking)
            .owner("Bob")
            .build()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{}", a), "Checking (CHECKING)");
    }
}
