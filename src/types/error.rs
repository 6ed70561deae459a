//! Error types for the ledger engine
//!
//! This module defines the two error families of the crate:
//!
//! - **`LedgerError`**: expected, recoverable outcomes of a ledger operation
//!   (unknown account, bad amount, insufficient balance, same-account
//!   transfer). The operation that returns one has performed no mutation.
//! - **`ProcessingError`**: fatal errors of the CLI adapter (cannot open the
//!   script, output cannot be written, runtime cannot start).

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Outcome of a rejected ledger operation
///
/// None of these is retried internally; each is reported once to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The referenced account id does not exist
    #[error("Account {id} not found")]
    NotFound {
        /// The id that was looked up
        id: AccountId,
    },

    /// Amount is zero or negative, or an opening balance is negative
    #[error("Invalid amount {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Withdraw or transfer would drive the balance below zero
    #[error("Insufficient balance in account {id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// Account that would go negative
        id: AccountId,
        /// Balance observed under the account lock
        balance: Decimal,
        /// Amount requested
        requested: Decimal,
    },

    /// Transfer source equals destination
    #[error("Cannot transfer from account {id} to itself")]
    SameAccount {
        /// The account named on both sides
        id: AccountId,
    },

    /// A credit would exceed the representable decimal range
    ///
    /// The operation is rejected before any balance is written.
    #[error("Arithmetic overflow in {operation} for account {id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being credited
        id: AccountId,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a NotFound error
    pub fn not_found(id: AccountId) -> Self {
        LedgerError::NotFound { id }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(id: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            id,
            balance,
            requested,
        }
    }

    /// Create a SameAccount error
    pub fn same_account(id: AccountId) -> Self {
        LedgerError::SameAccount { id }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            id,
        }
    }
}

/// Fatal error of the script-processing adapter
///
/// Row-level problems (malformed CSV rows, rejected operations) never produce
/// one of these; they are logged and counted instead.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The input script could not be opened
    #[error("Failed to open file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The async runtime could not be built
    #[error("Failed to create tokio runtime: {0}")]
    Runtime(String),
}

impl ProcessingError {
    /// Create an Open error for `path`
    pub fn open(path: &std::path::Path, source: std::io::Error) -> Self {
        ProcessingError::Open {
            path: path.display().to_string(),
            source,
        }
    }
}
