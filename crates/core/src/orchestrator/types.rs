//! Types for the pipeline orchestrator.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::ContainerError;
use crate::ledger::LedgerError;
use crate::readiness::SimulationConfig;
use crate::trigger::TriggerError;

/// Errors that end an invocation.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The notification could not be interpreted.
    #[error("invalid trigger: {0}")]
    InvalidTrigger(#[from] TriggerError),

    /// A collaborator needed for a full run was never provided.
    #[error("no {stage} collaborator configured")]
    NotConfigured { stage: &'static str },

    /// The preprocessing container failed.
    #[error("preprocessing failed for {issue_time} step {step}: {source}")]
    Preprocess {
        issue_time: NaiveDateTime,
        step: u32,
        #[source]
        source: ContainerError,
    },

    /// The ledger could not be opened or queried.
    #[error("ledger error for {issue_time} step {step}: {source}")]
    Ledger {
        issue_time: NaiveDateTime,
        step: u32,
        #[source]
        source: LedgerError,
    },

    /// A simulation launch failed; later windows were not attempted.
    #[error("launch of window {window_start} failed for {issue_time} step {step}: {source}")]
    Launch {
        issue_time: NaiveDateTime,
        step: u32,
        window_start: String,
        #[source]
        source: ContainerError,
    },
}

impl OrchestratorError {
    /// Pipeline stage the error came from.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidTrigger(_) => "trigger",
            Self::NotConfigured { stage } => *stage,
            Self::Preprocess { .. } => "preprocess",
            Self::Ledger { .. } => "ledger",
            Self::Launch { .. } => "launch",
        }
    }
}

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    PreprocessRequested,
    PreprocessDone,
    AggregationRequested,
    NotYetProcessed,
    NoWindowsReady,
    WindowsReady { count: usize },
    SimulationLaunched { index: usize },
    Complete,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::PreprocessRequested => write!(f, "preprocess_requested"),
            Self::PreprocessDone => write!(f, "preprocess_done"),
            Self::AggregationRequested => write!(f, "aggregation_requested"),
            Self::NotYetProcessed => write!(f, "not_yet_processed"),
            Self::NoWindowsReady => write!(f, "no_windows_ready"),
            Self::WindowsReady { count } => write!(f, "windows_ready({})", count),
            Self::SimulationLaunched { index } => write!(f, "simulation_launched({})", index),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Terminal result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// The triggering file is not marked processed yet.
    NotYetProcessed,
    /// No candidate window has all its inputs.
    NoWindowsReady,
    /// Every satisfied window was launched, in start order.
    Launched { simulations: Vec<SimulationConfig> },
}

impl InvocationOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotYetProcessed => "not_yet_processed",
            Self::NoWindowsReady => "no_windows_ready",
            Self::Launched { .. } => "launched",
        }
    }

    /// Configs that were launched.
    pub fn simulations(&self) -> &[SimulationConfig] {
        match self {
            Self::Launched { simulations } => simulations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(InvocationOutcome::NoWindowsReady).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "no_windows_ready"}));

        let launched = InvocationOutcome::Launched {
            simulations: vec![],
        };
        let json = serde_json::to_value(&launched).unwrap();
        assert_eq!(json["outcome"], "launched");
        assert!(json["simulations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(InvocationOutcome::NotYetProcessed.label(), "not_yet_processed");
        assert!(InvocationOutcome::NotYetProcessed.simulations().is_empty());
    }

    #[test]
    fn test_error_stage_and_display() {
        let err = OrchestratorError::from(TriggerError::InvalidHour("25".to_string()));
        assert_eq!(err.stage(), "trigger");

        let issue_time = chrono::NaiveDate::from_ymd_opt(2023, 10, 22)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let err = OrchestratorError::Ledger {
            issue_time,
            step: 12,
            source: LedgerError::Query("disk I/O error".to_string()),
        };
        assert_eq!(err.stage(), "ledger");
        assert_eq!(
            err.to_string(),
            "ledger error for 2023-10-22 06:00:00 step 12: Ledger query failed: disk I/O error"
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::WindowsReady { count: 2 }.to_string(), "windows_ready(2)");
        assert_eq!(PipelineState::Complete.to_string(), "complete");
    }
}
