//! Ledger and journal wired together
//!
//! `Bank` is the engine object callers share through an `Arc`. Every
//! successful balance mutation is journaled from inside the ledger's commit
//! callback, while the account locks of the mutation are still held, so the
//! mutation and its journal record form one unit:
//!
//! - a successful deposit, withdraw or transfer has exactly one record;
//! - a rejected one has none;
//! - records touching one account are numbered in the order that account
//!   was mutated.
//!
//! Locks are always taken account first, journal second. The journal never
//! calls back into the ledger.

use crate::core::journal::Journal;
use crate::core::ledger::Ledger;
use crate::types::{
    Account, AccountId, LedgerError, NewTransaction, Operation, OperationRecord,
    TransactionRecord,
};
use rust_decimal::Decimal;
use tracing::{info, trace, warn};

/// Account ledger plus transaction journal
#[derive(Debug, Default)]
pub struct Bank {
    ledger: Ledger,
    journal: Journal,
}

impl Bank {
    /// Create a bank with no accounts and an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Underlying journal
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Open an account with a non-negative opening balance
    ///
    /// Opening balances are not journaled.
    pub fn open_account(
        &self,
        name: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        let name = name.into();
        match self.ledger.create_account(name.clone(), initial_balance) {
            Ok(account) => {
                info!(
                    account_id = account.id,
                    name = %account.name,
                    initial_balance = %account.balance,
                    "account opened"
                );
                Ok(account)
            }
            Err(err) => {
                warn!(
                    name = %name,
                    initial_balance = %initial_balance,
                    error = %err,
                    "open rejected"
                );
                Err(err)
            }
        }
    }

    /// Copy of one account
    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.ledger.get_account(id)
    }

    /// Consistent snapshot of every account, in id order
    pub fn accounts(&self) -> Vec<Account> {
        self.ledger.list_accounts()
    }

    /// Deposit and journal the result
    pub fn deposit(
        &self,
        id: AccountId,
        amount: Decimal,
        correlation_id: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = self.ledger.deposit_then(id, amount, |_| {
            self.journal
                .append(NewTransaction::deposit(id, amount, correlation_id))
        });

        match &result {
            Ok(record) => info!(
                account_id = id,
                amount = %amount,
                transaction_id = record.id,
                correlation_id,
                "deposit applied"
            ),
            Err(err) => warn!(
                account_id = id,
                amount = %amount,
                correlation_id,
                error = %err,
                "deposit rejected"
            ),
        }
        result
    }

    /// Withdraw and journal the result
    pub fn withdraw(
        &self,
        id: AccountId,
        amount: Decimal,
        correlation_id: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = self.ledger.withdraw_then(id, amount, |_| {
            self.journal
                .append(NewTransaction::withdraw(id, amount, correlation_id))
        });

        match &result {
            Ok(record) => info!(
                account_id = id,
                amount = %amount,
                transaction_id = record.id,
                correlation_id,
                "withdraw applied"
            ),
            Err(err) => warn!(
                account_id = id,
                amount = %amount,
                correlation_id,
                error = %err,
                "withdraw rejected"
            ),
        }
        result
    }

    /// Transfer and journal the result
    pub fn transfer(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
        correlation_id: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = self.ledger.transfer_then(from_id, to_id, amount, |_, _| {
            self.journal.append(NewTransaction::transfer(
                from_id,
                to_id,
                amount,
                correlation_id,
            ))
        });

        match &result {
            Ok(record) => info!(
                from_account_id = from_id,
                to_account_id = to_id,
                amount = %amount,
                transaction_id = record.id,
                correlation_id,
                "transfer applied"
            ),
            Err(err) => warn!(
                from_account_id = from_id,
                to_account_id = to_id,
                amount = %amount,
                correlation_id,
                error = %err,
                "transfer rejected"
            ),
        }
        result
    }

    /// Journal records involving `account_id`, in id order
    ///
    /// An unknown account simply has no records.
    pub fn transactions(&self, account_id: AccountId) -> Vec<TransactionRecord> {
        self.journal.query_by_account(account_id)
    }

    /// Every journal record, in id order
    pub fn all_transactions(&self) -> Vec<TransactionRecord> {
        self.journal.query_all()
    }

    /// Sum of all balances over a consistent snapshot
    pub fn total_balance(&self) -> Decimal {
        self.ledger.total_balance()
    }

    /// Run one parsed script operation
    ///
    /// The outcome detail (new account, journal record) is logged by the
    /// operation itself; callers only need to know whether it was applied.
    pub fn execute(&self, record: &OperationRecord) -> Result<(), LedgerError> {
        let correlation_id = record.correlation_id.as_str();
        trace!(
            operation = record.operation.name(),
            correlation_id,
            "executing operation"
        );
        match &record.operation {
            Operation::Open {
                name,
                initial_balance,
            } => self.open_account(name.as_str(), *initial_balance).map(|_| ()),
            Operation::Deposit { account, amount } => {
                self.deposit(*account, *amount, correlation_id).map(|_| ())
            }
            Operation::Withdraw { account, amount } => {
                self.withdraw(*account, *amount, correlation_id).map(|_| ())
            }
            Operation::Transfer { from, to, amount } => {
                self.transfer(*from, *to, *amount, correlation_id).map(|_| ())
            }
        }
    }
}
