//! Account-related types for the ledger engine
//!
//! This module defines the Account structure held by the ledger and handed
//! out to callers as an independent copy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Account identifier
///
/// Assigned once at creation from a gap-free sequence starting at 1,
/// never reused.
pub type AccountId = u64;

/// Monetary account state
///
/// `Account` is a plain value type. The ledger owns the live copy behind the
/// account's lock; every read returns a clone, so mutating a returned value
/// never affects engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique handle assigned at creation
    pub id: AccountId,

    /// Display label, immutable after creation
    pub name: String,

    /// Current balance
    ///
    /// Never negative: every mutation path checks this before writing.
    pub balance: Decimal,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the balance last changed (equal to `created_at` until then)
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with the given opening balance
    ///
    /// # Arguments
    ///
    /// * `id` - The id allocated by the ledger
    /// * `name` - Display label
    /// * `balance` - Opening balance (validated non-negative by the caller)
    /// * `now` - Creation timestamp, used for both `created_at` and `updated_at`
    pub fn new(
        id: AccountId,
        name: impl Into<String>,
        balance: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Account {
            id,
            name: name.into(),
            balance,
            created_at: now,
            updated_at: now,
        }
    }
}
