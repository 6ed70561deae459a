//! Processing strategy module for operation scripts
//!
//! This module defines the Strategy pattern for complete script processing
//! pipelines, covering both CSV parsing and execution against the bank. This
//! allows the synchronous and the asynchronous batch implementations to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::Bank;
use crate::types::{LedgerError, ProcessingError};
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Counts of what happened to the rows of a script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Operations the bank applied
    pub applied: usize,

    /// Well-formed operations the bank rejected
    pub rejected: usize,

    /// Rows that could not be parsed into an operation
    pub malformed: usize,
}

impl ProcessingSummary {
    /// Count the outcome of one executed operation
    pub fn record(&mut self, result: &Result<(), LedgerError>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(_) => self.rejected += 1,
        }
    }
}

/// Processing strategy trait for complete script pipelines
///
/// Each strategy reads operations from a CSV script and applies them to a
/// shared bank. Writing the resulting accounts and journal is left to the
/// caller, which owns the bank.
pub trait ProcessingStrategy: Send + Sync {
    /// Apply every operation in `input_path` to `bank`
    ///
    /// Malformed rows and rejected operations are logged and counted but do
    /// not stop processing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The async runtime cannot be created
    fn process(
        &self,
        input_path: &Path,
        bank: &Arc<Bank>,
    ) -> Result<ProcessingSummary, ProcessingError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` selects the defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
