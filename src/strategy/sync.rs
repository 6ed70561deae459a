//! Synchronous processing strategy
//!
//! Streams the script through a `SyncReader` and executes each operation on
//! the calling thread, strictly in file order. Memory use is bounded by the
//! bank's state, not by the size of the script.

use crate::core::Bank;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use crate::types::ProcessingError;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_engine::core::Bank;
/// use ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let bank = Arc::new(Bank::new());
/// let summary = SyncProcessingStrategy
///     .process(Path::new("operations.csv"), &bank)
///     .expect("Processing failed");
/// println!("{} applied, {} rejected", summary.applied, summary.rejected);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        bank: &Arc<Bank>,
    ) -> Result<ProcessingSummary, ProcessingError> {
        let reader = SyncReader::new(input_path)?;
        let mut summary = ProcessingSummary::default();

        for row in reader {
            match row {
                Ok(record) => summary.record(&bank.execute(&record)),
                Err(e) => {
                    summary.malformed += 1;
                    warn!(error = %e, "skipping malformed row");
                }
            }
        }

        Ok(summary)
    }
}
