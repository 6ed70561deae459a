//! Concurrent Ledger Engine Library
//! # Overview
//!
//! This library provides an in-process ledger of monetary accounts with an
//! append-only transaction journal. It stays correct under unbounded
//! concurrent access: no lost updates, no negative balances, no deadlocks.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, Operation, errors)
//! - [`core`] - Engine components:
//!   - [`core::ledger`] - Account table, per-account locks and balance mutations
//!   - [`core::journal`] - Append-only log of completed operations
//!   - [`core::bank`] - Ledger and journal coupled into one engine object
//!   - [`core::batch_processor`] - Concurrent execution of operation batches
//! - [`io`] - CSV operation scripts and CSV output
//! - [`strategy`] - Sync and async script processing
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - tracing subscriber setup
//!
//! # Operations
//!
//! - **Open**: Create an account with a non-negative opening balance
//! - **Deposit**: Credit a strictly positive amount
//! - **Withdraw**: Debit a strictly positive amount, never below zero
//! - **Transfer**: Move funds between two distinct accounts atomically
//!
//! Every successful deposit, withdraw and transfer is journaled exactly once,
//! with the caller's correlation id.
//!
//! # Example
//!
//! ```
//! use ledger_engine::Bank;
//! use rust_decimal::Decimal;
//!
//! let bank = Bank::new();
//! let alice = bank.open_account("Alice", Decimal::new(10000, 2)).unwrap();
//! let bob = bank.open_account("Bob", Decimal::ZERO).unwrap();
//!
//! bank.transfer(alice.id, bob.id, Decimal::new(2500, 2), "req-1").unwrap();
//!
//! assert_eq!(bank.account(bob.id).unwrap().balance, Decimal::new(2500, 2));
//! assert_eq!(bank.transactions(alice.id).len(), 1);
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{Bank, Journal, Ledger};
pub use io::{write_accounts_csv, write_journal_csv};
pub use types::{
    Account, AccountId, LedgerError, NewTransaction, Operation, OperationRecord,
    ProcessingError, TransactionId, TransactionKind, TransactionRecord,
};
