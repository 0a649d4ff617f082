//! Pipeline orchestrator for forecast-driven simulations.
//!
//! The orchestrator drives one trigger through the state machine:
//! - **Preprocess**: run the preprocessing container for the ingested file
//! - **Aggregate**: check the ledger and find every simulation window with complete inputs
//! - **Launch**: start one simulation per ready window, in start order

mod runner;
mod types;

pub use runner::PipelineOrchestrator;
pub use types::{InvocationOutcome, OrchestratorError, PipelineState};
