//! SQLite-backed ledger, shared with the ingestion pipeline.
//!
//! The ingestion side owns table `uploaded(forecast_ref_time, step, processed)`
//! and stores reference times as `YYYY-MM-DD HH:MM:SS` text. This side only
//! ever opens the database read-only.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use super::{CompletionLedger, LedgerError, LedgerRecord, LedgerSource};

/// Text format of `uploaded.forecast_ref_time`.
pub const LEDGER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read-only handle on the ingestion ledger.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open an existing ledger database read-only.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let unavailable = |reason: String| LedgerError::Unavailable {
            path: path.display().to_string(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable("database file does not exist".to_string()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| unavailable(e.to_string()))?;

        conn.prepare("SELECT forecast_ref_time, step, processed FROM uploaded LIMIT 0")
            .map_err(|e| unavailable(e.to_string()))?;

        debug!("Opened ledger at {}", path.display());
        Ok(Self { conn })
    }

    fn format_time(time: NaiveDateTime) -> String {
        time.format(LEDGER_TIME_FORMAT).to_string()
    }

    fn row_to_record(
        forecast_ref_time: NaiveDateTime,
        row: &rusqlite::Row,
    ) -> rusqlite::Result<LedgerRecord> {
        let processed: Option<bool> = row.get(0)?;
        let step: i64 = row.get(1)?;
        let step =
            u32::try_from(step).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, step))?;

        Ok(LedgerRecord::new(forecast_ref_time, step, processed.unwrap_or(false)))
    }
}

impl CompletionLedger for SqliteLedger {
    fn record(
        &self,
        forecast_ref_time: NaiveDateTime,
        step: u32,
    ) -> Result<Option<LedgerRecord>, LedgerError> {
        let result = self.conn.query_row(
            "SELECT processed, CAST(step AS INTEGER) FROM uploaded WHERE forecast_ref_time = ? AND CAST(step AS INTEGER) = ?",
            params![Self::format_time(forecast_ref_time), step],
            |row| Self::row_to_record(forecast_ref_time, row),
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!(
                    "No ledger row for forecast_ref_time={} step={}",
                    forecast_ref_time, step
                );
                Ok(None)
            }
            Err(e) => Err(LedgerError::Query(e.to_string())),
        }
    }

    fn records_for(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT processed, CAST(step AS INTEGER) FROM uploaded WHERE forecast_ref_time = ? ORDER BY CAST(step AS INTEGER)",
            )
            .map_err(|e| LedgerError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![Self::format_time(forecast_ref_time)], |row| {
                Self::row_to_record(forecast_ref_time, row)
            })
            .map_err(|e| LedgerError::Query(e.to_string()))?;

        let mut records = Vec::new();
        for row_result in rows {
            records.push(row_result.map_err(|e| LedgerError::Query(e.to_string()))?);
        }

        Ok(records)
    }
}

/// Opens a new [`SqliteLedger`] on every call.
#[derive(Debug, Clone)]
pub struct SqliteLedgerSource {
    path: PathBuf,
}

impl SqliteLedgerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerSource for SqliteLedgerSource {
    fn open(&self) -> Result<Box<dyn CompletionLedger>, LedgerError> {
        Ok(Box::new(SqliteLedger::open(&self.path)?))
    }
}
