//! In-memory ledger for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

use crate::ledger::{CompletionLedger, LedgerError, LedgerRecord, LedgerSource};

/// In-memory implementation of both ledger traits.
///
/// Clones share state, so a test can keep one handle for seeding and
/// assertions while the orchestrator opens others.
///
/// # Example
///
/// ```rust,ignore
/// use flexorch_core::testing::MemoryLedger;
///
/// let ledger = MemoryLedger::new();
/// ledger.insert(LedgerRecord::new(issue_time, 6, true));
///
/// let orchestrator = PipelineOrchestrator::new(evaluator, Arc::new(ledger.clone()), ...);
/// // ...
/// assert_eq!(ledger.query_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    /// Rows keyed by `(forecast_ref_time, step)`.
    records: Arc<Mutex<BTreeMap<(NaiveDateTime, u32), bool>>>,
    /// Fail every query while set.
    fail_queries: Arc<AtomicBool>,
    /// Fail `open` while set.
    unavailable: Arc<AtomicBool>,
    /// Number of `records_for` calls.
    queries: Arc<AtomicUsize>,
    /// Number of handles opened.
    opens: Arc<AtomicUsize>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row.
    pub fn insert(&self, record: LedgerRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((record.forecast_ref_time, record.step), record.processed);
    }

    /// Mark steps `1..=last_step` of one forecast run as processed.
    pub fn mark_run_processed(&self, forecast_ref_time: NaiveDateTime, last_step: u32) {
        for step in 1..=last_step {
            self.insert(LedgerRecord::new(forecast_ref_time, step, true));
        }
    }

    /// Make every subsequent query fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `open` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of per-run queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of handles opened so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(LedgerError::Query("mock query failure".to_string()));
        }
        Ok(())
    }
}

impl CompletionLedger for MemoryLedger {
    fn record(
        &self,
        forecast_ref_time: NaiveDateTime,
        step: u32,
    ) -> Result<Option<LedgerRecord>, LedgerError> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(forecast_ref_time, step))
            .map(|processed| LedgerRecord::new(forecast_ref_time, step, *processed)))
    }

    fn records_for(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.check_available()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((frt, _), _)| *frt == forecast_ref_time)
            .map(|((frt, step), processed)| LedgerRecord::new(*frt, *step, *processed))
            .collect())
    }
}

impl LedgerSource for MemoryLedger {
    fn open(&self) -> Result<Box<dyn CompletionLedger>, LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable {
                path: ":memory:".to_string(),
                reason: "mock ledger unavailable".to_string(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}
