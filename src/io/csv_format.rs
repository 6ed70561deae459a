//! CSV format handling for operation scripts and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to typed operations
//! - Account and journal output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    Account, AccountId, Operation, OperationRecord, ProcessingError, TransactionRecord,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;
use uuid::Uuid;

/// CSV record structure for deserialization
///
/// Matches the script format with columns:
/// `type, account, counterparty, amount, name, correlation`.
/// Every column but `type` is optional because each operation uses a
/// different subset.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub account: Option<AccountId>,
    pub counterparty: Option<AccountId>,
    pub amount: Option<String>,
    pub name: Option<String>,
    pub correlation: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation type (case-insensitive)
/// - Parses the amount into a Decimal
/// - Checks that the columns the operation needs are present
/// - Generates a correlation id when the row carries none
///
/// Amount signs are left to the ledger, which rejects them with a typed error.
///
/// # Returns
///
/// * `Ok(OperationRecord)` - Successfully converted record
/// * `Err(String)` - Description of the malformed row
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let op_type = csv_record.op_type.to_lowercase();

    let amount = match csv_record.amount.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            Decimal::from_str(raw)
                .map_err(|_| format!("Invalid amount '{}' for {}", raw, op_type))?,
        ),
        _ => None,
    };
    let require_amount =
        || amount.ok_or_else(|| format!("{} operation requires an amount", op_type));
    let require_account = || {
        csv_record
            .account
            .ok_or_else(|| format!("{} operation requires an account", op_type))
    };

    let operation = match op_type.as_str() {
        "open" => {
            let name = csv_record
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| "open operation requires a name".to_string())?;
            Operation::Open {
                name: name.to_string(),
                initial_balance: require_amount()?,
            }
        }
        "deposit" => Operation::Deposit {
            account: require_account()?,
            amount: require_amount()?,
        },
        "withdraw" => Operation::Withdraw {
            account: require_account()?,
            amount: require_amount()?,
        },
        "transfer" => Operation::Transfer {
            from: require_account()?,
            to: csv_record
                .counterparty
                .ok_or_else(|| "transfer operation requires a counterparty".to_string())?,
            amount: require_amount()?,
        },
        _ => return Err(format!("Invalid operation type: '{}'", csv_record.op_type)),
    };

    let correlation_id = match csv_record.correlation.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    Ok(OperationRecord {
        operation,
        correlation_id,
    })
}

/// Write account states to CSV format
///
/// Writes accounts with columns: id, name, balance.
/// Accounts are sorted by id and balances are printed with two decimals.
pub fn write_accounts_csv(
    accounts: &[Account],
    output: &mut dyn Write,
) -> Result<(), ProcessingError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "name", "balance"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.name,
            format!("{:.2}", account.balance.round_dp(2)),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Write journal records to CSV format
///
/// Columns: id, type, from, to, amount, description, correlation, created_at.
/// `from` is empty for deposits and withdrawals; `created_at` is RFC 3339.
/// The header is written even when there are no records.
pub fn write_journal_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), ProcessingError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer.write_record(JOURNAL_HEADER)?;

    let mut sorted_records: Vec<&TransactionRecord> = records.iter().collect();
    sorted_records.sort_by_key(|record| record.id);

    for record in sorted_records {
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}

const JOURNAL_HEADER: [&str; 8] = [
    "id",
    "type",
    "from",
    "to",
    "amount",
    "description",
    "correlation",
    "created_at",
];
