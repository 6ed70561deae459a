//! Ledger Engine CLI
//!
//! Applies a CSV script of account operations to an in-memory ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --strategy sync operations.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > accounts.csv
//! cargo run -- --journal journal.csv --log-format json operations.csv > accounts.csv
//! ```
//!
//! The final accounts are written to stdout, logs to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, output not writable, etc.)

use ledger_engine::cli;
use ledger_engine::core::Bank;
use ledger_engine::io::{write_accounts_csv, write_journal_csv};
use ledger_engine::logging;
use ledger_engine::strategy;
use ledger_engine::types::ProcessingError;
use std::fs::File;
use std::io::BufWriter;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    let args = cli::parse_args();
    logging::init(&args.log_level, args.log_format);

    if let Err(e) = run(&args) {
        error!(error = %e, "processing failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), ProcessingError> {
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let bank = Arc::new(Bank::new());
    let summary = strategy.process(&args.input_file, &bank)?;
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        malformed = summary.malformed,
        "script processed"
    );

    let mut output = std::io::stdout().lock();
    write_accounts_csv(&bank.accounts(), &mut output)?;

    if let Some(path) = &args.journal {
        let file = File::create(path).map_err(|e| ProcessingError::open(path, e))?;
        let mut writer = BufWriter::new(file);
        write_journal_csv(&bank.all_transactions(), &mut writer)?;
        info!(path = %path.display(), records = bank.journal().len(), "journal written");
    }

    Ok(())
}
