use std::fmt;

use thiserror::Error;

/// Kind of persisted record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Category,
    Account,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Category => f.write_str("Category"),
            RecordKind::Account => f.write_str("Account"),
        }
    }
}

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Referential integrity violated: {kind} `{name}` does not exist")]
    ReferentialIntegrity { kind: RecordKind, name: String },
    #[error("{kind} `{name}` not found")]
    NotFound { kind: RecordKind, name: String },
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl LedgerError {
    pub fn missing_category(name: impl Into<String>) -> Self {
        LedgerError::ReferentialIntegrity {
            kind: RecordKind::Category,
            name: name.into(),
        }
    }

    pub fn category_not_found(name: impl Into<String>) -> Self {
        LedgerError::NotFound {
            kind: RecordKind::Category,
            name: name.into(),
        }
    }

    pub fn account_not_found(name: impl Into<String>) -> Self {
        LedgerError::NotFound {
            kind: RecordKind::Account,
            name: name.into(),
        }
    }

    /// True for lookups that found no matching row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
