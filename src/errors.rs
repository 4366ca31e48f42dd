//! Unified error type for the bank backend.
//!
//! Every core operation returns [`Result`]. Callers classify failures with
//! [`Error::kind`] rather than matching on individual variants.

use sea_orm::DbErr;
use thiserror::Error;

/// All failures the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// No account with the given identifier exists
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// The identifier that was looked up (id, phone or name)
        id: String,
    },

    /// No ledger entry touches the given account
    #[error("No transactions found for account {account_id}")]
    TransactionNotFound {
        /// Account whose history was empty
        account_id: String,
    },

    /// The debit would take the source balance below zero
    #[error("Insufficient funds: balance is {current}, transfer requires {required}")]
    InsufficientFunds {
        /// Balance observed at the serialization point, in minor units
        current: i64,
        /// Requested amount, in minor units
        required: i64,
    },

    /// Amount is zero, negative, or not representable in minor units
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount, as given
        amount: String,
    },

    /// Self-transfer or malformed account identifiers
    #[error("Invalid transfer: {reason}")]
    InvalidTransfer {
        /// Why the transfer was rejected
        reason: String,
    },

    /// Malformed input that is not an amount (empty names, bad ids)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// Missing, expired or forged credentials; or insufficient role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Reason shown to the caller
        message: String,
    },

    /// Persistence failure that is not a plain driver error, e.g. exhausted retries
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },

    /// A third-party service (the language model) failed or answered nonsense
    #[error("Upstream service error: {message}")]
    Upstream {
        /// What went wrong
        message: String,
    },

    #[error("Database error: {0}")]
    #[allow(missing_docs)]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    #[allow(missing_docs)]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    #[allow(missing_docs)]
    EnvVar(#[from] std::env::VarError),
}

/// Coarse classification of [`Error`], used by front ends to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Account or transaction absent
    NotFound,
    /// Transfer debit exceeds balance
    InsufficientFunds,
    /// Non-positive or unrepresentable amount
    InvalidAmount,
    /// Self-transfer or malformed identifiers
    InvalidTransfer,
    /// Other malformed input
    InvalidInput,
    /// Authentication or authorization failure
    Unauthorized,
    /// Anything the persistence layer, environment or an upstream service caused
    Storage,
}

impl Error {
    /// Classifies this error into one of the [`ErrorKind`]s.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound { .. } | Self::TransactionNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InvalidTransfer { .. } => ErrorKind::InvalidTransfer,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Config { .. }
            | Self::Storage { .. }
            | Self::Upstream { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_) => ErrorKind::Storage,
        }
    }

    /// True when the store rejected the write because another writer held the lock.
    ///
    /// SQLite reports these as `SQLITE_BUSY` / `SQLITE_LOCKED`; sea-orm only exposes
    /// them through the driver message.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Database(err) => {
                let message = err.to_string().to_lowercase();
                message.contains("database is locked")
                    || message.contains("database table is locked")
                    || message.contains("busy")
            }
            _ => false,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
