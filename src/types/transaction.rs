//! Transaction-related types for the ledger engine
//!
//! This module defines the journal record types: `NewTransaction` describes a
//! completed operation before it is journaled, `TransactionRecord` is the
//! immutable entry the journal stores and returns.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Transaction identifier
///
/// Independent sequence from account ids, starting at 1.
pub type TransactionId = u64;

/// Kinds of balance mutation recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit funds to an account
    Deposit,

    /// Debit funds from an account
    ///
    /// The debited account is recorded as `to_account_id`, the sole participant.
    Withdraw,

    /// Move funds between two accounts
    ///
    /// The only kind that carries a `from_account_id`.
    Transfer,
}

impl TransactionKind {
    /// Lowercase name used in CSV output and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed operation that has not been journaled yet
///
/// The journal assigns `id` and `created_at` on append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,

    /// Source account, present only for transfers
    pub from_account_id: Option<AccountId>,

    /// Credited account (deposit, transfer) or debited account (withdraw)
    pub to_account_id: AccountId,

    /// Always strictly positive
    pub amount: Decimal,

    pub description: String,

    /// Opaque trace token copied from the calling context
    pub correlation_id: String,
}

impl NewTransaction {
    /// Describe a deposit into `account_id`
    pub fn deposit(
        account_id: AccountId,
        amount: Decimal,
        correlation_id: impl Into<String>,
    ) -> Self {
        NewTransaction {
            kind: TransactionKind::Deposit,
            from_account_id: None,
            to_account_id: account_id,
            amount,
            description: "Deposit to account".to_string(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Describe a withdrawal from `account_id`
    pub fn withdraw(
        account_id: AccountId,
        amount: Decimal,
        correlation_id: impl Into<String>,
    ) -> Self {
        NewTransaction {
            kind: TransactionKind::Withdraw,
            from_account_id: None,
            to_account_id: account_id,
            amount,
            description: "Withdraw from account".to_string(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Describe a transfer from `from_account_id` to `to_account_id`
    pub fn transfer(
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Decimal,
        correlation_id: impl Into<String>,
    ) -> Self {
        NewTransaction {
            kind: TransactionKind::Transfer,
            from_account_id: Some(from_account_id),
            to_account_id,
            amount,
            description: "Transfer between accounts".to_string(),
            correlation_id: correlation_id.into(),
        }
    }
}

/// Journal entry
///
/// Created once by `Journal::append` and immutable thereafter. Query results
/// are clones of the stored entries.
///
/// Serializes to the journal CSV columns
/// `id, type, from, to, amount, description, correlation, created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "from")]
    pub from_account_id: Option<AccountId>,
    #[serde(rename = "to")]
    pub to_account_id: AccountId,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "correlation")]
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Build the stored form of `entry`
    pub fn from_new(id: TransactionId, entry: NewTransaction, created_at: DateTime<Utc>) -> Self {
        TransactionRecord {
            id,
            kind: entry.kind,
            from_account_id: entry.from_account_id,
            to_account_id: entry.to_account_id,
            amount: entry.amount,
            description: entry.description,
            correlation_id: entry.correlation_id,
            created_at,
        }
    }

    /// Whether `account_id` participates as source or destination
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.to_account_id == account_id || self.from_account_id == Some(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::deposit(NewTransaction::deposit(1, dec!(5), "c"), TransactionKind::Deposit, None, "Deposit to account")]
    #[case::withdraw(NewTransaction::withdraw(1, dec!(5), "c"), TransactionKind::Withdraw, None, "Withdraw from account")]
    #[case::transfer(NewTransaction::transfer(2, 1, dec!(5), "c"), TransactionKind::Transfer, Some(2), "Transfer between accounts")]
    fn test_constructors(
        #[case] entry: NewTransaction,
        #[case] kind: TransactionKind,
        #[case] from: Option<AccountId>,
        #[case] description: &str,
    ) {
        assert_eq!(entry.kind, kind);
        assert_eq!(entry.from_account_id, from);
        assert_eq!(entry.to_account_id, 1);
        assert_eq!(entry.description, description);
        assert_eq!(entry.correlation_id, "c");
    }

    #[rstest]
    #[case::destination(1, true)]
    #[case::source(2, true)]
    #[case::bystander(3, false)]
    fn test_involves_transfer_participants(#[case] account: AccountId, #[case] expected: bool) {
        let record = TransactionRecord::from_new(
            1,
            NewTransaction::transfer(2, 1, dec!(10), ""),
            Utc::now(),
        );
        assert_eq!(record.involves(account), expected);
    }

    #[test]
    fn test_withdraw_involves_only_debited_account() {
        let record =
            TransactionRecord::from_new(4, NewTransaction::withdraw(9, dec!(1), ""), Utc::now());
        assert!(record.involves(9));
        assert!(!record.involves(0));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TransactionKind::Withdraw.to_string(), "withdraw");
    }
}
