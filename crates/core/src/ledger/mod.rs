//! Completion ledger: which forecast files the ingestion side has processed.

mod sqlite;
mod store;

pub use sqlite::{SqliteLedger, SqliteLedgerSource, LEDGER_TIME_FORMAT};
pub use store::{CompletionLedger, LedgerError, LedgerRecord, LedgerSource};
