//! Operation requests read from scripts
//!
//! An `OperationRecord` is an already-parsed request for one of the ledger
//! mutations, together with the correlation token that will be copied into
//! the journal.

use super::account::AccountId;
use rust_decimal::Decimal;

/// A single ledger request with typed arguments
///
/// Amounts are not sign-checked here; the ledger rejects non-positive
/// amounts with `InvalidAmount`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create an account with an opening balance
    Open {
        name: String,
        initial_balance: Decimal,
    },

    /// Credit an existing account
    Deposit { account: AccountId, amount: Decimal },

    /// Debit an existing account
    Withdraw { account: AccountId, amount: Decimal },

    /// Move funds from `from` to `to`
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

impl Operation {
    /// Whether this operation allocates an account id
    ///
    /// Id allocation is order-sensitive, so the async strategy runs these
    /// one at a time.
    pub fn is_open(&self) -> bool {
        matches!(self, Operation::Open { .. })
    }

    /// Existing accounts this operation reads or writes
    ///
    /// Empty for `Open`, which only touches the account it creates.
    pub fn accounts(&self) -> Vec<AccountId> {
        match self {
            Operation::Open { .. } => vec![],
            Operation::Deposit { account, .. } | Operation::Withdraw { account, .. } => {
                vec![*account]
            }
            Operation::Transfer { from, to, .. } => vec![*from, *to],
        }
    }

    /// Lowercase operation name, as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Open { .. } => "open",
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Transfer { .. } => "transfer",
        }
    }
}

/// Operation plus the caller-supplied correlation token
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub operation: Operation,
    pub correlation_id: String,
}
