pub mod config;
pub mod container;
pub mod forecast;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod readiness;
pub mod testing;
pub mod time;
pub mod trigger;
pub mod window;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig, SimulationDefaults, TimeSettings,
};
pub use container::{
    ContainerError, DockerLauncher, DockerPreprocessor, LauncherConfig, PreprocessConfig,
    Preprocessor, SimulationLauncher,
};
pub use forecast::{label, ForecastIdentity};
pub use ledger::{CompletionLedger, LedgerError, LedgerRecord, LedgerSource, SqliteLedgerSource};
pub use orchestrator::{InvocationOutcome, OrchestratorError, PipelineOrchestrator};
pub use readiness::{ReadinessEvaluator, SimulationConfig};
pub use trigger::{Trigger, TriggerError};
pub use window::{candidate_starts, candidate_windows, SimulationWindow};
