//! Collaborator contracts for the pipeline's external steps.

use async_trait::async_trait;

use crate::readiness::SimulationConfig;
use crate::trigger::Trigger;

use super::error::ContainerError;

/// Converts a freshly ingested forecast file and records it in the ledger.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Process the file described by `trigger`; returns once the run finished.
    async fn run(&self, trigger: &Trigger) -> Result<(), ContainerError>;
}

/// Starts one dispersion simulation.
#[async_trait]
pub trait SimulationLauncher: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Launch a simulation for `config`; returns once the run finished.
    async fn launch(&self, config: &SimulationConfig) -> Result<(), ContainerError>;
}
