//! Account ledger
//!
//! This module provides the `Ledger`, the concurrent account table and the
//! balance mutations performed on it (create, deposit, withdraw, transfer).
//!
//! # Locking
//!
//! Two kinds of lock protect the ledger:
//!
//! - the **structural lock** (`RwLock<AccountTable>`) guards the id counter and
//!   the table of created accounts. It is held exclusively to allocate an id and
//!   insert an account, and in read mode for table-wide snapshots;
//! - one **account lock** per id, handed out by a [`LockTable`]. The account
//!   lock owns the account value itself (`RwLock<Option<Account>>`), so a
//!   balance can only be written by the thread holding that lock exclusively.
//!   `None` marks an id that was looked up but never created.
//!
//! Lock order is always structural lock first, then account locks in
//! ascending id order. Operations on a single account never take the
//! structural lock at all.
//!
//! # Transfers
//!
//! `transfer` takes the two account locks lowest id first, whatever the
//! direction, so two transfers between the same pair can never each hold one
//! lock while waiting for the other. It runs in two phases: a read-only
//! pre-check that rejects doomed transfers without blocking readers, then an
//! exclusive commit that re-validates everything before touching a balance.

use crate::core::lock_table::LockTable;
use crate::types::{Account, AccountId, LedgerError};
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Account lock together with the account value it guards
type AccountSlot = Arc<RwLock<Option<Account>>>;

/// State guarded by the structural lock
#[derive(Debug, Default)]
struct AccountTable {
    /// Last id handed out; ids start at 1
    last_id: AccountId,

    /// Created accounts, keyed (and therefore iterated) in id order
    accounts: BTreeMap<AccountId, AccountSlot>,
}

/// Concurrent table of monetary accounts
///
/// `Ledger` is `Send + Sync`; share it between threads behind an `Arc`.
/// Every read returns an independent copy of the account.
#[derive(Debug, Default)]
pub struct Ledger {
    table: RwLock<AccountTable>,
    locks: LockTable<AccountId, Option<Account>>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with an opening balance
    ///
    /// Ids are allocated under the structural lock, so concurrent callers
    /// receive distinct, gap-free, increasing ids. A rejected call does not
    /// consume an id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `initial_balance` is negative.
    pub fn create_account(
        &self,
        name: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(initial_balance));
        }

        let mut table = self.table.write();
        let id = table.last_id + 1;
        let account = Account::new(id, name, initial_balance, Utc::now());

        // The slot may already exist if the id was looked up before creation.
        // Whoever holds it never waits on the structural lock, so this cannot
        // deadlock.
        let slot = self.locks.lock_for(&id);
        *slot.write() = Some(account.clone());

        table.last_id = id;
        table.accounts.insert(id, slot);

        Ok(account)
    }

    /// Get a copy of an account
    ///
    /// A miss still leaves an empty lock slot for `id` in the lock table,
    /// so the table grows with every distinct unknown id looked up.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account with this id exists.
    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let lock = self.locks.lock_for(&id);
        let slot = lock.read();
        let account = resolve(&slot, id)?.clone();
        Ok(account)
    }

    /// Credit `amount` to an account
    ///
    /// Like every lookup, an unknown `id` leaves an empty lock slot behind.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `NotFound` if the account does not exist
    /// - `ArithmeticOverflow` if the new balance is not representable
    pub fn deposit(&self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.deposit_then(id, amount, |_| ())
    }

    /// Deposit, then run `on_commit` on the updated account while its lock is
    /// still held
    ///
    /// Anything `on_commit` does is ordered with the mutation itself relative
    /// to every other operation on this account.
    pub fn deposit_then<R>(
        &self,
        id: AccountId,
        amount: Decimal,
        on_commit: impl FnOnce(&Account) -> R,
    ) -> Result<R, LedgerError> {
        ensure_positive(amount)?;

        let lock = self.locks.lock_for(&id);
        let mut slot = lock.write();
        let account = resolve_mut(&mut slot, id)?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", id))?;
        account.updated_at = Utc::now();

        Ok(on_commit(account))
    }

    /// Debit `amount` from an account
    ///
    /// The balance check and the debit happen under one exclusive hold of
    /// the account lock.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `NotFound` if the account does not exist
    /// - `InsufficientBalance` if the balance is lower than `amount`
    pub fn withdraw(&self, id: AccountId, amount: Decimal) -> Result<(), LedgerError> {
        self.withdraw_then(id, amount, |_| ())
    }

    /// Withdraw, then run `on_commit` on the updated account while its lock is
    /// still held
    pub fn withdraw_then<R>(
        &self,
        id: AccountId,
        amount: Decimal,
        on_commit: impl FnOnce(&Account) -> R,
    ) -> Result<R, LedgerError> {
        ensure_positive(amount)?;

        let lock = self.locks.lock_for(&id);
        let mut slot = lock.write();
        let account = resolve_mut(&mut slot, id)?;

        ensure_covers(account, amount)?;
        account.balance -= amount;
        account.updated_at = Utc::now();

        Ok(on_commit(account))
    }

    /// Move `amount` from `from_id` to `to_id`
    ///
    /// Atomic for every observer: no one sees the debit without the credit.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `SameAccount` if `from_id == to_id`
    /// - `NotFound` if either account does not exist (source checked first)
    /// - `InsufficientBalance` if the source balance is lower than `amount`
    /// - `ArithmeticOverflow` if the destination balance is not representable
    pub fn transfer(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.transfer_then(from_id, to_id, amount, |_, _| ())
    }

    /// Transfer, then run `on_commit` on the updated source and destination
    /// while both account locks are still held
    pub fn transfer_then<R>(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
        on_commit: impl FnOnce(&Account, &Account) -> R,
    ) -> Result<R, LedgerError> {
        ensure_positive(amount)?;
        if from_id == to_id {
            return Err(LedgerError::same_account(from_id));
        }

        // Lowest id first, regardless of direction
        let (first_id, second_id) = (from_id.min(to_id), from_id.max(to_id));
        let first = self.locks.lock_for(&first_id);
        let second = self.locks.lock_for(&second_id);
        let from_is_first = from_id == first_id;

        // Phase 1: optimistic pre-check under reader locks. Its result only
        // decides whether to go on; it is not trusted for the commit.
        {
            let first_slot = first.read();
            let second_slot = second.read();
            let (from_slot, to_slot) = if from_is_first {
                (&*first_slot, &*second_slot)
            } else {
                (&*second_slot, &*first_slot)
            };

            if let Err(err) = validate_transfer(from_slot, to_slot, from_id, to_id, amount) {
                trace!(
                    from_account_id = from_id,
                    to_account_id = to_id,
                    amount = %amount,
                    error = %err,
                    "transfer rejected by pre-check"
                );
                return Err(err);
            }
        }

        // Phase 2: exclusive commit. State may have changed since phase 1,
        // so everything is checked again before any balance is written.
        let mut first_slot = first.write();
        let mut second_slot = second.write();
        let (from_slot, to_slot) = if from_is_first {
            (&mut *first_slot, &mut *second_slot)
        } else {
            (&mut *second_slot, &mut *first_slot)
        };

        if let Err(err) = validate_transfer(from_slot, to_slot, from_id, to_id, amount) {
            debug!(
                from_account_id = from_id,
                to_account_id = to_id,
                amount = %amount,
                error = %err,
                "transfer passed pre-check but failed re-validation"
            );
            return Err(err);
        }

        let from = resolve_mut(from_slot, from_id)?;
        let to = resolve_mut(to_slot, to_id)?;

        let credited = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", to_id))?;

        let now = Utc::now();
        from.balance -= amount;
        from.updated_at = now;
        to.balance = credited;
        to.updated_at = now;

        Ok(on_commit(from, to))
    }

    /// Consistent snapshot of every account, in id order
    ///
    /// Holds the structural lock in read mode and takes every account's
    /// reader lock in ascending id order (the transfer lock order) before
    /// copying, so no transfer can be observed half-applied.
    pub fn list_accounts(&self) -> Vec<Account> {
        let table = self.table.read();
        let guards: Vec<_> = table.accounts.values().map(|slot| slot.read()).collect();
        let accounts: Vec<Account> = guards
            .iter()
            .filter_map(|guard| (**guard).clone())
            .collect();
        accounts
    }

    /// Sum of all balances over a consistent snapshot
    pub fn total_balance(&self) -> Decimal {
        self.list_accounts()
            .iter()
            .map(|account| account.balance)
            .sum()
    }

    /// Number of created accounts
    pub fn len(&self) -> usize {
        self.table.read().accounts.len()
    }

    /// Whether no account has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

fn ensure_covers(account: &Account, amount: Decimal) -> Result<(), LedgerError> {
    if account.balance < amount {
        return Err(LedgerError::insufficient_balance(
            account.id,
            account.balance,
            amount,
        ));
    }
    Ok(())
}

fn resolve(slot: &Option<Account>, id: AccountId) -> Result<&Account, LedgerError> {
    slot.as_ref().ok_or_else(|| LedgerError::not_found(id))
}

fn resolve_mut(slot: &mut Option<Account>, id: AccountId) -> Result<&mut Account, LedgerError> {
    slot.as_mut().ok_or_else(|| LedgerError::not_found(id))
}

/// Existence of both sides, then sufficiency of the source
fn validate_transfer(
    from: &Option<Account>,
    to: &Option<Account>,
    from_id: AccountId,
    to_id: AccountId,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let from = resolve(from, from_id)?;
    resolve(to, to_id)?;
    ensure_covers(from, amount)
}
