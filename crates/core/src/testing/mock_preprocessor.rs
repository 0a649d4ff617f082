//! Mock preprocessor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::container::{ContainerError, Preprocessor};
use crate::ledger::LedgerRecord;
use crate::trigger::Trigger;

use super::MemoryLedger;

/// Mock implementation of the Preprocessor trait.
///
/// Records every trigger it receives. When built with [`MockPreprocessor::marking`],
/// a successful run marks the triggering record processed in the given ledger,
/// like the real preprocessing image does.
#[derive(Debug, Clone, Default)]
pub struct MockPreprocessor {
    /// Recorded triggers.
    runs: Arc<RwLock<Vec<Trigger>>>,
    /// If set, the next run will fail with this error.
    next_error: Arc<RwLock<Option<ContainerError>>>,
    /// Ledger updated on success.
    ledger: Option<MemoryLedger>,
}

impl MockPreprocessor {
    /// Create a mock that only records calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that marks the triggering record processed on success.
    pub fn marking(ledger: MemoryLedger) -> Self {
        Self {
            ledger: Some(ledger),
            ..Self::default()
        }
    }

    /// Get all recorded triggers.
    pub async fn recorded_runs(&self) -> Vec<Trigger> {
        self.runs.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: ContainerError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Preprocessor for MockPreprocessor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, trigger: &Trigger) -> Result<(), ContainerError> {
        self.runs.write().await.push(trigger.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(ledger) = &self.ledger {
            if let Ok(issue_time) = trigger.issue_datetime() {
                ledger.insert(LedgerRecord::new(issue_time, trigger.step, true));
            }
        }
        Ok(())
    }
}
