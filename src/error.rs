//! Error types for tally
//!
//! A single error enum covers the whole crate. Every failure aborts the
//! enclosing build or derive call; nothing is retried or recovered
//! internally.

use thiserror::Error;

use crate::models::Month;

/// The main error type for tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Record loading errors (shape of the input, amounts, periods)
    #[error("Load error: {0}")]
    Load(String),

    /// Construction-time invariant failures for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A budget with no months in scope
    #[error("Budget must have at least one month to build statements for")]
    EmptyPeriod,

    /// A transfer touches an account outside its open window
    #[error("Account {account} is not open on {month} for transfer {transfer}")]
    AccountClosed {
        account: String,
        month: Month,
        transfer: String,
    },

    /// Transfer or balance dated too far from the month it belongs to
    #[error("Temporal error: {0}")]
    Temporal(String),

    /// A transaction dated outside the statement's start/end balances
    #[error("Misdated balance: {0}")]
    MisdatedBalance(String),

    /// Defects: states the engine never produces from a sealed budget
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl TallyError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "duplicate" error for accounts
    pub fn duplicate_account(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error is one of the temporal-consistency failures
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Temporal(_) | Self::AccountClosed { .. } | Self::MisdatedBalance(_)
        )
    }
}

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for TallyError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for tally operations
pub type TallyResult<T> = Result<T, TallyError>;
