//! Concurrency property tests
//!
//! These tests drive a shared `Bank` from many OS threads and check the
//! engine's guarantees:
//! - money is conserved by transfers
//! - balances never go negative
//! - opposite-direction transfers never deadlock
//! - exactly one of several racing withdrawals or transfers of the full
//!   balance wins
//! - reads return independent copies
//! - concurrently created accounts get the ids 1..=M
//! - every successful mutation is journaled exactly once

#[cfg(test)]
mod tests {
    use ledger_engine::core::Bank;
    use ledger_engine::{AccountId, LedgerError, TransactionKind};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;
    use std::sync::mpsc;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    const DEADLOCK_BUDGET: Duration = Duration::from_secs(30);

    fn bank_with(balances: &[Decimal]) -> Arc<Bank> {
        let bank = Bank::new();
        for (i, balance) in balances.iter().enumerate() {
            bank.open_account(format!("acct-{}", i + 1), *balance).unwrap();
        }
        Arc::new(bank)
    }

    /// Run `work` on `threads` threads released together by a barrier
    ///
    /// Panics if the threads do not all finish within `DEADLOCK_BUDGET`.
    fn race<T, F>(threads: usize, work: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let barrier = Arc::new(Barrier::new(threads));
        let (tx, rx) = mpsc::channel();

        for i in 0..threads {
            let work = Arc::clone(&work);
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            thread::spawn(move || {
                barrier.wait();
                let _ = tx.send(work(i));
            });
        }
        drop(tx);

        (0..threads)
            .map(|_| {
                rx.recv_timeout(DEADLOCK_BUDGET)
                    .expect("threads did not finish in time (deadlock?)")
            })
            .collect()
    }

    #[test]
    fn test_example_scenario_in_order() {
        let bank = Bank::new();

        let alice = bank.open_account("Alice", dec!(100.00)).unwrap();
        let bob = bank.open_account("Bob", dec!(50.00)).unwrap();
        assert_eq!((alice.id, alice.balance), (1, dec!(100.00)));
        assert_eq!(bob.id, 2);

        bank.deposit(1, dec!(25.00), "s-2").unwrap();
        assert_eq!(bank.account(1).unwrap().balance, dec!(125.00));

        let rejected = bank.withdraw(1, dec!(200.00), "s-3");
        assert!(matches!(
            rejected,
            Err(LedgerError::InsufficientBalance { id: 1, .. })
        ));
        assert_eq!(bank.account(1).unwrap().balance, dec!(125.00));

        bank.transfer(1, 2, dec!(75.00), "s-4").unwrap();
        assert_eq!(bank.account(1).unwrap().balance, dec!(50.00));
        assert_eq!(bank.account(2).unwrap().balance, dec!(125.00));

        let transfers: Vec<_> = bank
            .all_transactions()
            .into_iter()
            .filter(|r| r.kind == TransactionKind::Transfer)
            .collect();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_account_id, Some(1));
        assert_eq!(transfers[0].to_account_id, 2);
        assert_eq!(transfers[0].amount, dec!(75.00));
    }

    #[test]
    fn test_concurrent_deposits_are_not_lost() {
        let bank = bank_with(&[dec!(125.00)]);

        let shared = Arc::clone(&bank);
        let results = race(100, move |_| shared.deposit(1, dec!(1.00), "").is_ok());

        assert!(results.iter().all(|ok| *ok));
        assert_eq!(bank.account(1).unwrap().balance, dec!(225.00));
        assert_eq!(bank.transactions(1).len(), 100);
    }

    #[test]
    fn test_opposite_transfers_complete_and_conserve() {
        let bank = bank_with(&[dec!(1000.00), dec!(1000.00)]);
        let before = bank.total_balance();

        let shared = Arc::clone(&bank);
        let results = race(200, move |i| {
            let (from, to) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
            shared.transfer(from, to, dec!(50.00), "")
        });

        assert_eq!(results.len(), 200);
        for result in &results {
            match result {
                Ok(_) | Err(LedgerError::InsufficientBalance { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(
            bank.account(1).unwrap().balance + bank.account(2).unwrap().balance,
            before
        );
    }

    #[test]
    fn test_transfer_ring_does_not_deadlock() {
        let bank = bank_with(&[dec!(100), dec!(100), dec!(100), dec!(100)]);

        // Every thread takes a pair in a different direction around the ring
        let shared = Arc::clone(&bank);
        race(64, move |i| {
            let from = (i % 4) as AccountId + 1;
            let to = ((i + 1) % 4) as AccountId + 1;
            for _ in 0..50 {
                let _ = shared.transfer(from, to, dec!(3), "");
            }
        });

        assert_eq!(bank.total_balance(), dec!(400));
    }

    #[test]
    fn test_single_winner_for_full_balance_withdrawals() {
        let bank = bank_with(&[dec!(80.00)]);

        let shared = Arc::clone(&bank);
        let results = race(32, move |_| shared.withdraw(1, dec!(80.00), ""));

        let winners = results.iter().filter(|r| r.is_ok()).count();
        let insufficient = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientBalance { .. })))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(insufficient, 31);
        assert_eq!(bank.account(1).unwrap().balance, dec!(0));
        assert_eq!(bank.all_transactions().len(), 1);
    }

    #[test]
    fn test_single_winner_for_full_balance_transfers() {
        for _ in 0..20 {
            let bank = bank_with(&[dec!(80.00), dec!(0)]);

            let shared = Arc::clone(&bank);
            let results = race(32, move |_| shared.transfer(1, 2, dec!(80.00), ""));

            let winners = results.iter().filter(|r| r.is_ok()).count();
            let insufficient = results
                .iter()
                .filter(|r| matches!(r, Err(LedgerError::InsufficientBalance { id: 1, .. })))
                .count();

            assert_eq!(winners, 1);
            assert_eq!(insufficient, 31);
            assert_eq!(bank.account(1).unwrap().balance, dec!(0));
            assert_eq!(bank.account(2).unwrap().balance, dec!(80.00));
            assert_eq!(bank.total_balance(), dec!(80.00));

            let journal = bank.all_transactions();
            assert_eq!(journal.len(), 1);
            assert_eq!(journal[0].kind, TransactionKind::Transfer);
            assert_eq!(journal[0].from_account_id, Some(1));
        }
    }

    #[test]
    fn test_balances_never_negative_under_mixed_load() {
        let bank = bank_with(&[dec!(20), dec!(20), dec!(20)]);

        let shared = Arc::clone(&bank);
        race(48, move |i| {
            let id = (i % 3) as AccountId + 1;
            for round in 0..40 {
                match round % 3 {
                    0 => {
                        let _ = shared.withdraw(id, dec!(7), "");
                    }
                    1 => {
                        let _ = shared.transfer(id, id % 3 + 1, dec!(5), "");
                    }
                    _ => {
                        let _ = shared.deposit(id, dec!(1), "");
                    }
                }
                for account in shared.accounts() {
                    assert!(account.balance >= Decimal::ZERO);
                }
            }
        });

        assert!(bank.accounts().iter().all(|a| a.balance >= Decimal::ZERO));
    }

    #[test]
    fn test_snapshots_conserve_money_while_transfers_run() {
        let bank = bank_with(&[dec!(300), dec!(300), dec!(300)]);

        let shared = Arc::clone(&bank);
        race(12, move |i| {
            if i % 3 == 0 {
                // Readers
                for _ in 0..100 {
                    assert_eq!(shared.total_balance(), dec!(900));
                }
            } else {
                for step in 0..100usize {
                    let from = ((i + step) % 3) as AccountId + 1;
                    let to = from % 3 + 1;
                    let _ = shared.transfer(from, to, dec!(11), "");
                }
            }
        });
    }

    #[test]
    fn test_copy_isolation() {
        let bank = bank_with(&[dec!(10)]);

        let mut copy = bank.account(1).unwrap();
        copy.balance = dec!(999);
        copy.name.push_str("-changed");

        let mut snapshot = bank.accounts();
        snapshot[0].balance = dec!(-1);

        let fresh = bank.account(1).unwrap();
        assert_eq!(fresh.balance, dec!(10));
        assert_eq!(fresh.name, "acct-1");
    }

    #[test]
    fn test_concurrent_creation_yields_gap_free_ids() {
        let bank = Arc::new(Bank::new());

        let shared = Arc::clone(&bank);
        let ids = race(64, move |i| {
            shared
                .open_account(format!("acct-{i}"), dec!(1))
                .unwrap()
                .id
        });

        let unique: BTreeSet<AccountId> = ids.into_iter().collect();
        assert_eq!(unique, (1..=64).collect::<BTreeSet<_>>());
        assert_eq!(bank.ledger().len(), 64);
    }

    #[test]
    fn test_lookups_racing_creation_see_consistent_accounts() {
        let bank = Arc::new(Bank::new());

        // Half the threads create, half poke at ids that may not exist yet
        let shared = Arc::clone(&bank);
        race(32, move |i| {
            if i % 2 == 0 {
                shared.open_account(format!("acct-{i}"), dec!(5)).unwrap();
            } else {
                for id in 1..=16 {
                    match shared.deposit(id, dec!(1), "") {
                        Ok(_) | Err(LedgerError::NotFound { .. }) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            }
        });

        let accounts = bank.accounts();
        assert_eq!(accounts.len(), 16);
        let deposits = bank.all_transactions().len();
        assert_eq!(
            bank.total_balance(),
            dec!(80) + Decimal::from(deposits as u64)
        );
    }

    #[test]
    fn test_journal_matches_successful_mutations() {
        let bank = bank_with(&[dec!(50), dec!(50)]);

        let shared = Arc::clone(&bank);
        let outcomes = race(40, move |i| {
            let correlation = format!("t-{i}");
            let result = match i % 4 {
                0 => shared.deposit(1, dec!(2), &correlation),
                1 => shared.withdraw(2, dec!(9), &correlation),
                2 => shared.transfer(1, 2, dec!(6), &correlation),
                _ => shared.transfer(2, 1, dec!(6), &correlation),
            };
            result.ok().map(|record| (record.id, correlation))
        });

        let applied: Vec<_> = outcomes.into_iter().flatten().collect();
        let journal = bank.all_transactions();

        assert_eq!(journal.len(), applied.len());
        let ids: Vec<_> = journal.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=journal.len() as u64).collect::<Vec<_>>());
        for (id, correlation) in applied {
            assert_eq!(journal[(id - 1) as usize].correlation_id, correlation);
        }
    }
}
