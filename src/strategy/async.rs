//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. It reads the script in batches and runs each
//! batch through a `BatchProcessor` on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (rounds + account partitioning)
//!         └── Arc<Bank> (shared ledger + journal)
//! ```
//!
//! Batches are processed one after another. Within a batch, `open` rows run
//! alone and in order, so account ids match the synchronous strategy; the
//! rows between them run in parallel groups of disjoint accounts.

use crate::core::{Bank, BatchProcessor};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use crate::types::ProcessingError;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how many rows are read per batch and the number of runtime
/// worker threads executing a batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of rows per batch
    pub batch_size: usize,
    /// Number of worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        bank: &Arc<Bank>,
    ) -> Result<ProcessingSummary, ProcessingError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .max_blocking_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| ProcessingError::Runtime(e.to_string()))?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(Arc::clone(bank));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| ProcessingError::open(input_path, e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut summary = ProcessingSummary::default();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                debug!(rows = batch.len(), "processing batch");

                // Wait for the whole batch before reading the next one
                for processed in processor.process_batch(batch).await {
                    summary.record(&processed.result);
                }
            }

            summary.malformed = reader.malformed();
            Ok(summary)
        })
    }
}
