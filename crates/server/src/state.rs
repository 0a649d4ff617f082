use std::sync::Arc;

use flexorch_core::{
    Config, DockerLauncher, DockerPreprocessor, PipelineOrchestrator, ReadinessEvaluator,
    SanitizedConfig, SqliteLedgerSource,
};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: PipelineOrchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: PipelineOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }
}

/// Wire the orchestrator to the SQLite ledger and the configured docker collaborators.
pub fn build_orchestrator(config: &Config) -> PipelineOrchestrator {
    let mut orchestrator = PipelineOrchestrator::new(
        ReadinessEvaluator::from_config(config),
        Arc::new(SqliteLedgerSource::new(&config.database.path)),
    );

    if let Some(preprocess) = &config.preprocess {
        orchestrator =
            orchestrator.with_preprocessor(Arc::new(DockerPreprocessor::new(preprocess.clone())));
    }
    if let Some(launcher) = &config.launcher {
        orchestrator = orchestrator.with_launcher(Arc::new(DockerLauncher::new(launcher.clone())));
    }

    orchestrator
}
