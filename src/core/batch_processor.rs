//! Batch processing with account-based partitioning
//!
//! This module provides the `BatchProcessor`, which runs a batch of script
//! operations against a shared `Bank` on tokio's blocking pool.
//!
//! # Design
//!
//! A batch is first split into rounds:
//!
//! - every `open` is a round of its own, so account ids are handed out in
//!   script order;
//! - each run of operations between two opens is one concurrent round.
//!
//! A concurrent round is then partitioned into groups of operations that
//! share an account, directly or through a chain of transfers. Each group
//! runs sequentially in script order on its own `spawn_blocking` task, since
//! the ledger takes blocking locks; groups run in parallel. Operations in
//! different groups touch disjoint accounts and therefore commute, so the
//! final state matches running the batch in order.
//!
//! ```text
//! BatchProcessor
//!     └── Arc<Bank>  (shared ledger + journal)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::error;

use super::Bank;
use crate::types::{AccountId, LedgerError, OperationRecord};

/// Result of processing a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was processed
    pub record: OperationRecord,

    /// Whether the bank applied it
    pub result: Result<(), LedgerError>,
}

/// One scheduling step of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum Round {
    /// Must run alone, after everything before it
    Sequential(OperationRecord),

    /// May be spread over several tasks
    Concurrent(Vec<OperationRecord>),
}

/// Concurrent batch processor
///
/// Cloning is cheap; every clone shares the same bank.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    bank: Arc<Bank>,
}

impl BatchProcessor {
    /// Create a processor driving `bank`
    pub fn new(bank: Arc<Bank>) -> Self {
        Self { bank }
    }

    /// Split a batch into rounds at every `open`
    ///
    /// Concatenating the rounds gives back the batch in its original order.
    pub fn split_rounds(&self, batch: Vec<OperationRecord>) -> Vec<Round> {
        let mut rounds = Vec::new();
        let mut pending: Vec<OperationRecord> = Vec::new();

        for record in batch {
            if record.operation.is_open() {
                if !pending.is_empty() {
                    rounds.push(Round::Concurrent(std::mem::take(&mut pending)));
                }
                rounds.push(Round::Sequential(record));
            } else {
                pending.push(record);
            }
        }

        if !pending.is_empty() {
            rounds.push(Round::Concurrent(pending));
        }

        rounds
    }

    /// Partition operations into groups with pairwise disjoint account sets
    ///
    /// # Guarantees
    ///
    /// - each operation appears in exactly one group
    /// - two operations sharing an account are in the same group
    /// - operations keep their original relative order within a group
    pub fn partition_by_accounts(
        &self,
        records: Vec<OperationRecord>,
    ) -> Vec<Vec<OperationRecord>> {
        let mut groups: Vec<Vec<(usize, OperationRecord)>> = Vec::new();
        let mut parent: Vec<usize> = Vec::new();
        let mut owner: HashMap<AccountId, usize> = HashMap::new();

        for (position, record) in records.into_iter().enumerate() {
            let accounts = record.operation.accounts();

            let mut roots: Vec<usize> = accounts
                .iter()
                .filter_map(|account| owner.get(account).copied())
                .map(|group| find_root(&mut parent, group))
                .collect();
            roots.sort_unstable();
            roots.dedup();

            let group = match roots.first() {
                Some(&root) => root,
                None => {
                    groups.push(Vec::new());
                    parent.push(groups.len() - 1);
                    groups.len() - 1
                }
            };

            // A transfer bridging two groups merges them
            for &other in roots.iter().skip(1) {
                parent[other] = group;
                let moved = std::mem::take(&mut groups[other]);
                groups[group].extend(moved);
            }

            for account in accounts {
                owner.insert(account, group);
            }
            groups[group].push((position, record));
        }

        groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|mut group| {
                group.sort_by_key(|(position, _)| *position);
                group.into_iter().map(|(_, record)| record).collect()
            })
            .collect()
    }

    /// Run a group of operations in order
    ///
    /// Failures are captured in the results and do not stop the group.
    pub fn process_group(&self, records: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        records
            .into_iter()
            .map(|record| {
                let result = self.bank.execute(&record);
                ProcessingResult { record, result }
            })
            .collect()
    }

    /// Process a batch round by round
    ///
    /// Results of a concurrent round come back group by group, so the
    /// overall order may differ from the input.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());

        for round in self.split_rounds(batch) {
            match round {
                Round::Sequential(record) => results.extend(self.process_group(vec![record])),
                Round::Concurrent(records) => {
                    let tasks: Vec<_> = self
                        .partition_by_accounts(records)
                        .into_iter()
                        .map(|group| {
                            let processor = self.clone();
                            tokio::task::spawn_blocking(move || processor.process_group(group))
                        })
                        .collect();

                    for outcome in join_all(tasks).await {
                        match outcome {
                            Ok(group_results) => results.extend(group_results),
                            Err(err) => error!(error = %err, "operation task panicked"),
                        }
                    }
                }
            }
        }

        results
    }
}

fn find_root(parent: &mut [usize], mut group: usize) -> usize {
    while parent[group] != group {
        parent[group] = parent[parent[group]];
        group = parent[group];
    }
    group
}
