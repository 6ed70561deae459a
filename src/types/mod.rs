//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `transaction`: Journal records and identifiers
//! - `operation`: Typed ledger requests read from scripts
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod operation;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::{LedgerError, ProcessingError};
pub use operation::{Operation, OperationRecord};
pub use transaction::{NewTransaction, TransactionId, TransactionKind, TransactionRecord};
