//! Core business logic module
//!
//! This module contains the ledger engine components:
//! - `lock_table` - Lazily created per-key reader/writer locks
//! - `ledger` - Account table and balance mutations
//! - `journal` - Append-only transaction log
//! - `bank` - Ledger and journal coupled into one engine object
//! - `batch_processor` - Concurrent execution of script batches

pub mod bank;
pub mod batch_processor;
pub mod journal;
pub mod ledger;
pub mod lock_table;

pub use bank::Bank;
pub use batch_processor::{BatchProcessor, ProcessingResult, Round};
pub use journal::Journal;
pub use ledger::Ledger;
pub use lock_table::LockTable;
