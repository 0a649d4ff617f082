//! Mock simulation launcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::container::{ContainerError, SimulationLauncher};
use crate::readiness::SimulationConfig;

/// A recorded launch attempt for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedLaunch {
    /// The config that was submitted.
    pub config: SimulationConfig,
    /// Whether the launch succeeded.
    pub success: bool,
}

/// Mock implementation of the SimulationLauncher trait.
///
/// Provides controllable behavior for testing:
/// - Track launch attempts for assertions
/// - Fail the next launch with a specific error
/// - Fail the launch at a given attempt index
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    /// Recorded launch attempts.
    launches: Arc<RwLock<Vec<RecordedLaunch>>>,
    /// If set, the next launch will fail with this error.
    next_error: Arc<RwLock<Option<ContainerError>>>,
    /// Zero-based attempt index that fails.
    fail_at: Arc<RwLock<Option<usize>>>,
}

impl MockLauncher {
    /// Create a new mock launcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded launch attempts.
    pub async fn recorded_launches(&self) -> Vec<RecordedLaunch> {
        self.launches.read().await.clone()
    }

    /// Configs of successful launches, in order.
    pub async fn launched_configs(&self) -> Vec<SimulationConfig> {
        self.launches
            .read()
            .await
            .iter()
            .filter(|launch| launch.success)
            .map(|launch| launch.config.clone())
            .collect()
    }

    /// Get the number of launch attempts.
    pub async fn attempt_count(&self) -> usize {
        self.launches.read().await.len()
    }

    /// Configure the next launch to fail with the given error.
    pub async fn set_next_error(&self, error: ContainerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail the launch attempt with this zero-based index.
    pub async fn fail_at(&self, index: usize) {
        *self.fail_at.write().await = Some(index);
    }
}

#[async_trait]
impl SimulationLauncher for MockLauncher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn launch(&self, config: &SimulationConfig) -> Result<(), ContainerError> {
        let mut launches = self.launches.write().await;
        let attempt = launches.len();
        let fail_here = *self.fail_at.read().await == Some(attempt);

        let error = match self.next_error.write().await.take() {
            Some(error) => Some(error),
            None if fail_here => Some(ContainerError::failed(
                "simulation",
                Some(1),
                "mock launch failure",
            )),
            None => None,
        };

        launches.push(RecordedLaunch {
            config: config.clone(),
            success: error.is_none(),
        });

        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
