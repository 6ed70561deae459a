//! Transaction journal
//!
//! This module provides the `Journal`, the append-only record of completed
//! balance mutations. It is independent from the ledger's locks: one
//! reader/writer lock guards both the record table and the id counter.
//! Journal writes are far less contended than balance mutations, so the
//! coarse lock is enough.
//!
//! Records are never modified or removed. Queries return copies sorted by id.

use crate::types::{AccountId, NewTransaction, TransactionId, TransactionRecord};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct JournalTable {
    last_id: TransactionId,
    records: BTreeMap<TransactionId, TransactionRecord>,
}

/// Append-only log of completed operations
///
/// `Journal` is `Send + Sync` and never calls back into the ledger.
#[derive(Debug, Default)]
pub struct Journal {
    table: RwLock<JournalTable>,
}

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning the next id and the creation time
    ///
    /// Never rejects a record: validation already happened in the ledger
    /// before the caller decided to journal the operation.
    ///
    /// # Returns
    ///
    /// A copy of the stored record
    pub fn append(&self, entry: NewTransaction) -> TransactionRecord {
        let mut table = self.table.write();
        table.last_id += 1;
        let id = table.last_id;

        let record = TransactionRecord::from_new(id, entry, Utc::now());
        table.records.insert(id, record.clone());
        record
    }

    /// Records in which `account_id` is the source or the destination
    ///
    /// Full scan with a participation filter; each call is a fresh snapshot.
    pub fn query_by_account(&self, account_id: AccountId) -> Vec<TransactionRecord> {
        self.table
            .read()
            .records
            .values()
            .filter(|record| record.involves(account_id))
            .cloned()
            .collect()
    }

    /// Snapshot of every record
    pub fn query_all(&self) -> Vec<TransactionRecord> {
        self.table.read().records.values().cloned().collect()
    }

    /// Number of records appended so far
    pub fn len(&self) -> usize {
        self.table.read().records.len()
    }

    /// Whether nothing has been appended yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
