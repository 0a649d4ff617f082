//! Pipeline orchestrator implementation.
//!
//! One invocation handles one trigger, strictly in order:
//! preprocess, check the triggering record, evaluate readiness, then launch
//! every satisfied window. Nothing is spawned and nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::container::{Preprocessor, SimulationLauncher};
use crate::ledger::LedgerSource;
use crate::metrics;
use crate::readiness::{ReadinessEvaluator, SimulationConfig};
use crate::trigger::Trigger;

use super::types::{InvocationOutcome, OrchestratorError, PipelineState};

fn advance(state: &mut PipelineState, next: PipelineState) {
    info!("Pipeline state {} -> {}", state, next);
    *state = next;
}

/// Drives one trigger through preprocessing, readiness and launch.
///
/// Only [`aggregate`](Self::aggregate) works without container collaborators;
/// [`run`](Self::run) needs both.
pub struct PipelineOrchestrator {
    evaluator: ReadinessEvaluator,
    ledger: Arc<dyn LedgerSource>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
    launcher: Option<Arc<dyn SimulationLauncher>>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    pub fn new(evaluator: ReadinessEvaluator, ledger: Arc<dyn LedgerSource>) -> Self {
        Self {
            evaluator,
            ledger,
            preprocessor: None,
            launcher: None,
        }
    }

    /// Set the preprocessing collaborator.
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Set the simulation launcher.
    pub fn with_launcher(mut self, launcher: Arc<dyn SimulationLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn evaluator(&self) -> &ReadinessEvaluator {
        &self.evaluator
    }

    /// Run a full invocation for `trigger`.
    pub async fn run(&self, trigger: &Trigger) -> Result<InvocationOutcome, OrchestratorError> {
        let span = info_span!(
            "invocation",
            id = %Uuid::new_v4(),
            date = %trigger.issue_date,
            time = %trigger.issue_time,
            step = trigger.step,
        );
        let start = Instant::now();

        let result = self.run_stages(trigger).instrument(span.clone()).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(e) => {
                span.in_scope(|| error!("Invocation failed at {} stage: {}", e.stage(), e));
                "failed"
            }
        };
        metrics::INVOCATIONS.with_label_values(&[label]).inc();
        metrics::INVOCATION_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run_stages(&self, trigger: &Trigger) -> Result<InvocationOutcome, OrchestratorError> {
        let issue_time = trigger.issue_datetime()?;
        let step = trigger.step;
        let preprocessor = self
            .preprocessor
            .as_ref()
            .ok_or(OrchestratorError::NotConfigured { stage: "preprocess" })?;
        let launcher = self
            .launcher
            .as_ref()
            .ok_or(OrchestratorError::NotConfigured { stage: "launch" })?;
        let mut state = PipelineState::Idle;

        advance(&mut state, PipelineState::PreprocessRequested);
        preprocessor
            .run(trigger)
            .await
            .map_err(|source| OrchestratorError::Preprocess {
                issue_time,
                step,
                source,
            })?;
        advance(&mut state, PipelineState::PreprocessDone);

        advance(&mut state, PipelineState::AggregationRequested);
        let Some(configs) = self.evaluate_readiness(issue_time, step)? else {
            advance(&mut state, PipelineState::NotYetProcessed);
            advance(&mut state, PipelineState::Complete);
            return Ok(InvocationOutcome::NotYetProcessed);
        };

        if configs.is_empty() {
            advance(&mut state, PipelineState::NoWindowsReady);
            advance(&mut state, PipelineState::Complete);
            return Ok(InvocationOutcome::NoWindowsReady);
        }

        advance(
            &mut state,
            PipelineState::WindowsReady {
                count: configs.len(),
            },
        );
        for (index, config) in configs.iter().enumerate() {
            launcher
                .launch(config)
                .await
                .map_err(|source| OrchestratorError::Launch {
                    issue_time,
                    step,
                    window_start: config.forecast_datetime.clone(),
                    source,
                })?;
            advance(&mut state, PipelineState::SimulationLaunched { index });
        }
        advance(&mut state, PipelineState::Complete);

        Ok(InvocationOutcome::Launched {
            simulations: configs,
        })
    }

    /// Readiness only: no preprocessing, no launch.
    ///
    /// Returns an empty list when the triggering record is not processed yet.
    pub fn aggregate(&self, trigger: &Trigger) -> Result<Vec<SimulationConfig>, OrchestratorError> {
        let issue_time = trigger.issue_datetime()?;
        let _span = info_span!(
            "aggregate",
            id = %Uuid::new_v4(),
            date = %trigger.issue_date,
            time = %trigger.issue_time,
            step = trigger.step,
        )
        .entered();

        Ok(self
            .evaluate_readiness(issue_time, trigger.step)?
            .unwrap_or_default())
    }

    /// `None` when the triggering record is not marked processed.
    ///
    /// The ledger handle lives only for the duration of this call.
    fn evaluate_readiness(
        &self,
        issue_time: NaiveDateTime,
        step: u32,
    ) -> Result<Option<Vec<SimulationConfig>>, OrchestratorError> {
        let ledger_error = |source| OrchestratorError::Ledger {
            issue_time,
            step,
            source,
        };

        let ledger = self.ledger.open().map_err(ledger_error)?;

        if !ledger.is_processed(issue_time, step).map_err(ledger_error)? {
            info!(
                "Forecast {} step {} not yet processed, nothing to aggregate",
                issue_time, step
            );
            return Ok(None);
        }
        debug!("Forecast {} step {} is processed", issue_time, step);

        let configs = self
            .evaluator
            .evaluate(ledger.as_ref(), issue_time, step)
            .map_err(ledger_error)?;
        Ok(Some(configs))
    }
}
