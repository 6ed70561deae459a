//! Benchmarks for lock contention and processing strategies
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! - `contention` runs transfers and deposits on a shared bank from
//!   several threads at once.
//! - `strategies` applies a generated script of 10,000 rows over 100
//!   accounts with each processing strategy.

use ledger_engine::cli::StrategyType;
use ledger_engine::core::Bank;
use ledger_engine::strategy::{create_strategy, BatchConfig};
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::{Arc, LazyLock};
use tempfile::NamedTempFile;

fn main() {
    divan::main();
}

const ACCOUNTS: u64 = 100;
const ROWS: u64 = 10_000;

fn funded_bank(accounts: u64) -> Bank {
    let bank = Bank::new();
    for i in 0..accounts {
        bank.open_account(format!("acct-{i}"), Decimal::new(1_000_000, 0))
            .expect("opening balance is valid");
    }
    bank
}

static PAIR: LazyLock<Bank> = LazyLock::new(|| funded_bank(2));
static SPREAD: LazyLock<Bank> = LazyLock::new(|| funded_bank(ACCOUNTS));

static SCRIPT: LazyLock<NamedTempFile> = LazyLock::new(|| {
    let mut file = NamedTempFile::new().expect("Failed to create script file");
    writeln!(file, "type,account,counterparty,amount,name,correlation").unwrap();
    for i in 0..ACCOUNTS {
        writeln!(file, "open,,,1000.00,acct-{i},").unwrap();
    }
    for i in 0..ROWS {
        let account = i % ACCOUNTS + 1;
        let other = (i * 7 + 3) % ACCOUNTS + 1;
        match i % 3 {
            0 => writeln!(file, "deposit,{account},,1.25,,").unwrap(),
            1 => writeln!(file, "withdraw,{account},,0.75,,").unwrap(),
            _ if account != other => writeln!(file, "transfer,{account},{other},2.00,,").unwrap(),
            _ => writeln!(file, "deposit,{other},,0.50,,").unwrap(),
        }
    }
    file.flush().unwrap();
    file
});

mod contention {
    use super::*;

    /// Both directions between the same two accounts
    #[divan::bench(threads = [1, 2, 4, 8])]
    fn opposite_transfers() {
        let one = Decimal::ONE;
        let _ = divan::black_box(PAIR.transfer(1, 2, one, ""));
        let _ = divan::black_box(PAIR.transfer(2, 1, one, ""));
    }

    /// Every thread hammers one account
    #[divan::bench(threads = [1, 2, 4, 8])]
    fn deposits_same_account() {
        let _ = divan::black_box(PAIR.deposit(1, Decimal::ONE, ""));
    }

    /// Transfers spread over many accounts
    #[divan::bench(threads = [1, 2, 4, 8])]
    fn transfers_spread(bencher: divan::Bencher) {
        bencher
            .with_inputs(|| {
                let from = next_index() % ACCOUNTS + 1;
                let to = from % ACCOUNTS + 1;
                (from, to)
            })
            .bench_values(|(from, to)| SPREAD.transfer(from, to, Decimal::ONE, "").is_ok());
    }

    /// Consistent snapshot of every account
    #[divan::bench]
    fn list_accounts() -> usize {
        SPREAD.accounts().len()
    }

    fn next_index() -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(0);
        NEXT.fetch_add(7919, Ordering::Relaxed)
    }
}

mod strategies {
    use super::*;

    #[divan::bench]
    fn sync_strategy() {
        let bank = Arc::new(Bank::new());
        create_strategy(StrategyType::Sync, None)
            .process(SCRIPT.path(), &bank)
            .expect("Processing failed");
    }

    #[divan::bench]
    fn async_strategy() {
        let bank = Arc::new(Bank::new());
        create_strategy(StrategyType::Async, Some(BatchConfig::default()))
            .process(SCRIPT.path(), &bank)
            .expect("Processing failed");
    }
}
