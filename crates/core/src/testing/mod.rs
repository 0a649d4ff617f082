//! Testing utilities and mock implementations.
//!
//! This module provides in-memory and mock implementations of the ledger and
//! container traits, so the orchestrator can be exercised without docker or
//! an ingestion database.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexorch_core::testing::{MemoryLedger, MockLauncher, MockPreprocessor};
//!
//! let ledger = MemoryLedger::new();
//! let preprocessor = MockPreprocessor::marking(ledger.clone());
//! let launcher = MockLauncher::new();
//!
//! // Fail the second launch
//! launcher.fail_at(1).await;
//! ```

mod memory_ledger;
mod mock_launcher;
mod mock_preprocessor;

pub use memory_ledger::MemoryLedger;
pub use mock_launcher::{MockLauncher, RecordedLaunch};
pub use mock_preprocessor::MockPreprocessor;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::{params, Connection};

    use crate::ledger::{LedgerRecord, LEDGER_TIME_FORMAT};

    /// An on-the-hour instant.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap_or_else(|| panic!("invalid fixture instant {year}-{month}-{day}T{hour}"))
    }

    /// Issue time from trigger-style `YYYYMMDD` and `HH` strings.
    pub fn issue_time(date: &str, hour: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date}{hour}00"), "%Y%m%d%H%M")
            .unwrap_or_else(|e| panic!("invalid fixture issue time {date} {hour}: {e}"))
    }

    /// Create (if needed) and fill an ingestion-style ledger database.
    pub fn seed_ledger(path: &Path, records: &[LedgerRecord]) -> rusqlite::Result<()> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS uploaded (
                forecast_ref_time TEXT NOT NULL,
                step INTEGER NOT NULL,
                processed BOOLEAN,
                PRIMARY KEY (forecast_ref_time, step)
            );
            "#,
        )?;

        for record in records {
            conn.execute(
                "INSERT OR REPLACE INTO uploaded (forecast_ref_time, step, processed) VALUES (?, ?, ?)",
                params![
                    record.forecast_ref_time.format(LEDGER_TIME_FORMAT).to_string(),
                    record.step,
                    record.processed
                ],
            )?;
        }
        Ok(())
    }
}
