//! Ledger read contract.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::forecast::ForecastIdentity;

/// Error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be opened.
    #[error("Ledger unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// A query against an open ledger failed.
    #[error("Ledger query failed: {0}")]
    Query(String),
}

/// One ingestion row: a forecast run at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerRecord {
    pub forecast_ref_time: NaiveDateTime,
    pub step: u32,
    pub processed: bool,
}

impl LedgerRecord {
    pub fn new(forecast_ref_time: NaiveDateTime, step: u32, processed: bool) -> Self {
        Self {
            forecast_ref_time,
            step,
            processed,
        }
    }

    /// The forecast product this row describes.
    pub fn identity(&self) -> ForecastIdentity {
        ForecastIdentity::new(self.forecast_ref_time, self.step)
    }
}

/// Read-only view over ingestion state.
///
/// Implementations are opened per invocation and dropped when it ends.
pub trait CompletionLedger: Send {
    /// Look up a single `(forecast_ref_time, step)` row.
    fn record(
        &self,
        forecast_ref_time: NaiveDateTime,
        step: u32,
    ) -> Result<Option<LedgerRecord>, LedgerError>;

    /// All known rows for one forecast run, ordered by step.
    fn records_for(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<LedgerRecord>, LedgerError>;

    /// Whether the row exists and is marked processed.
    fn is_processed(
        &self,
        forecast_ref_time: NaiveDateTime,
        step: u32,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .record(forecast_ref_time, step)?
            .is_some_and(|record| record.processed))
    }

    /// Identities marked processed across the given forecast runs.
    ///
    /// Issues exactly one `records_for` query per issue time.
    fn processed_identities(
        &self,
        issue_times: &BTreeSet<NaiveDateTime>,
    ) -> Result<HashSet<ForecastIdentity>, LedgerError> {
        let mut processed = HashSet::new();
        for issue_time in issue_times {
            processed.extend(
                self.records_for(*issue_time)?
                    .into_iter()
                    .filter(|record| record.processed)
                    .map(|record| record.identity()),
            );
        }
        Ok(processed)
    }
}

/// Hands out a fresh ledger handle per invocation.
pub trait LedgerSource: Send + Sync {
    fn open(&self) -> Result<Box<dyn CompletionLedger>, LedgerError>;
}
