//! Readiness evaluation: which candidate windows have all their inputs.
//!
//! Ledger access is batched. The distinct forecast runs referenced by every
//! candidate window are queried once each, and window membership checks run
//! against the resulting in-memory set.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, TimeSettings};
use crate::forecast::ISSUE_TIME_FORMAT;
use crate::ledger::{CompletionLedger, LedgerError};
use crate::metrics;
use crate::window::{candidate_windows, SimulationWindow};

/// Launcher-facing description of one runnable simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Start date, `YYYYMMDD`.
    #[serde(rename = "IBDATE")]
    pub ibdate: String,
    /// Start hour, `HH`.
    #[serde(rename = "IBTIME")]
    pub ibtime: String,
    /// End date, `YYYYMMDD`.
    #[serde(rename = "IEDATE")]
    pub iedate: String,
    /// End hour, `HH`.
    #[serde(rename = "IETIME")]
    pub ietime: String,
    /// Window start, `YYYYMMDDHHMM`.
    pub forecast_datetime: String,
    pub release_site: String,
}

impl SimulationConfig {
    pub fn from_window(window: &SimulationWindow, release_site: &str) -> Self {
        Self {
            ibdate: window.start.format("%Y%m%d").to_string(),
            ibtime: window.start.format("%H").to_string(),
            iedate: window.end.format("%Y%m%d").to_string(),
            ietime: window.end.format("%H").to_string(),
            forecast_datetime: window.start.format(ISSUE_TIME_FORMAT).to_string(),
            release_site: release_site.to_string(),
        }
    }

    /// Environment variables understood by the simulation container.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("IBDATE", self.ibdate.clone()),
            ("IBTIME", self.ibtime.clone()),
            ("IEDATE", self.iedate.clone()),
            ("IETIME", self.ietime.clone()),
            ("FORECAST_DATETIME", self.forecast_datetime.clone()),
            ("RELEASE_SITE_NAME", self.release_site.clone()),
        ]
    }
}

/// Decides which simulation windows are runnable for an ingested lead time.
#[derive(Debug, Clone)]
pub struct ReadinessEvaluator {
    settings: TimeSettings,
    release_site: String,
}

impl ReadinessEvaluator {
    pub fn new(settings: TimeSettings, release_site: impl Into<String>) -> Self {
        Self {
            settings,
            release_site: release_site.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.time_settings, config.simulation.release_site.clone())
    }

    pub fn settings(&self) -> &TimeSettings {
        &self.settings
    }

    /// Windows whose span could include `issue_time + step`.
    pub fn candidate_windows(&self, issue_time: NaiveDateTime, step: u32) -> Vec<SimulationWindow> {
        candidate_windows(issue_time, step, &self.settings)
    }

    /// Keeps the windows whose inputs are all processed, preserving order.
    pub fn satisfied_windows(
        &self,
        ledger: &dyn CompletionLedger,
        windows: Vec<SimulationWindow>,
    ) -> Result<Vec<SimulationWindow>, LedgerError> {
        let issue_times: BTreeSet<NaiveDateTime> =
            windows.iter().flat_map(|w| w.issue_times()).collect();

        metrics::WINDOWS_EVALUATED.inc_by(windows.len() as u64);
        metrics::LEDGER_QUERIES.inc_by(issue_times.len() as u64);

        let processed = ledger.processed_identities(&issue_times)?;
        debug!(
            "Ledger holds {} processed forecasts across {} forecast runs",
            processed.len(),
            issue_times.len()
        );

        let satisfied: Vec<SimulationWindow> = windows
            .into_iter()
            .filter(|window| {
                let ready = window.is_satisfied_by(&processed);
                if !ready {
                    debug!(
                        "Window starting {} not ready, first missing input: {}",
                        window.start,
                        window
                            .missing(&processed)
                            .next()
                            .map(|id| id.serialize())
                            .unwrap_or_default()
                    );
                }
                ready
            })
            .collect();

        metrics::WINDOWS_SATISFIED.inc_by(satisfied.len() as u64);
        Ok(satisfied)
    }

    /// Configs for every satisfied window, in ascending start order.
    ///
    /// An empty result is the normal "not enough data yet" outcome.
    pub fn evaluate(
        &self,
        ledger: &dyn CompletionLedger,
        issue_time: NaiveDateTime,
        step: u32,
    ) -> Result<Vec<SimulationConfig>, LedgerError> {
        let windows = self.candidate_windows(issue_time, step);
        info!("Generated {} candidate simulation start times", windows.len());

        let configs: Vec<SimulationConfig> = self
            .satisfied_windows(ledger, windows)?
            .iter()
            .map(|window| self.build_config(window))
            .collect();

        if configs.is_empty() {
            info!("Not enough pre-processed forecasts to run a simulation");
        } else {
            info!("{} simulation windows ready", configs.len());
        }

        Ok(configs)
    }

    pub fn build_config(&self, window: &SimulationWindow) -> SimulationConfig {
        let config = SimulationConfig::from_window(window, &self.release_site);
        debug!(
            "Simulation window {} to {}: {:?}",
            window.start, window.end, config
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerRecord;
    use crate::testing::fixtures::{at, issue_time};
    use crate::testing::MemoryLedger;

    fn evaluator() -> ReadinessEvaluator {
        ReadinessEvaluator::new(TimeSettings::default(), "BEZ")
    }

    /// Marks every lead time 1..=6 of the given runs as processed.
    fn ledger_with_runs(runs: &[NaiveDateTime]) -> MemoryLedger {
        let ledger = MemoryLedger::new();
        for run in runs {
            for step in 1..=6 {
                ledger.insert(LedgerRecord::new(*run, step, true));
            }
        }
        ledger
    }

    #[test]
    fn test_build_config_formats_window() {
        let window = SimulationWindow {
            start: at(2023, 10, 22, 6),
            end: at(2023, 10, 22, 18),
            required_identities: vec![],
        };
        let config = evaluator().build_config(&window);

        assert_eq!(config.ibdate, "20231022");
        assert_eq!(config.ibtime, "06");
        assert_eq!(config.iedate, "20231022");
        assert_eq!(config.ietime, "18");
        assert_eq!(config.forecast_datetime, "202310220600");
        assert_eq!(config.release_site, "BEZ");
    }

    #[test]
    fn test_config_serialization_shape() {
        let window = SimulationWindow {
            start: at(2023, 10, 22, 18),
            end: at(2023, 10, 23, 0),
            required_identities: vec![],
        };
        let config = evaluator().build_config(&window);
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["IBDATE"], "20231022");
        assert_eq!(json["IBTIME"], "18");
        assert_eq!(json["IEDATE"], "20231023");
        assert_eq!(json["IETIME"], "00");
        assert_eq!(json["forecast_datetime"], "202310221800");
        assert_eq!(json["release_site"], "BEZ");
    }

    #[test]
    fn test_env_vars_use_launcher_names() {
        let window = SimulationWindow {
            start: at(2023, 10, 22, 6),
            end: at(2023, 10, 22, 12),
            required_identities: vec![],
        };
        let config = SimulationConfig::from_window(&window, "LEI");
        let env = config.env_vars();

        assert_eq!(env[4], ("FORECAST_DATETIME", "202310220600".to_string()));
        assert_eq!(env[5], ("RELEASE_SITE_NAME", "LEI".to_string()));
    }

    fn twelve_hour_windows() -> ReadinessEvaluator {
        let settings = TimeSettings {
            tincr: 1,
            tdelta: 12,
            tfreq_f: 6,
            tfreq: 6,
        };
        ReadinessEvaluator::new(settings, "BEZ")
    }

    #[test]
    fn test_evaluate_emits_only_covered_windows() {
        // Trigger 22T06 step 6 → candidates start 22T06 and 22T12.
        // Window 22T06 reads runs 22T00, 22T06 and 22T12.
        // Window 22T12 additionally reads run 22T18.
        let ledger = ledger_with_runs(&[
            at(2023, 10, 22, 0),
            at(2023, 10, 22, 6),
            at(2023, 10, 22, 12),
        ]);

        let configs = twelve_hour_windows()
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].forecast_datetime, "202310220600");
        assert_eq!(configs[0].ietime, "17");
    }

    #[test]
    fn test_evaluate_queries_each_run_once() {
        let ledger = ledger_with_runs(&[at(2023, 10, 22, 0), at(2023, 10, 22, 6)]);

        twelve_hour_windows()
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();

        // Runs 22T00, 22T06, 22T12 and 22T18 across both candidates.
        assert_eq!(ledger.query_count(), 4);
    }

    #[test]
    fn test_evaluate_single_candidate_with_defaults() {
        // endpoint 22T11, floor 22T05 → only window 22T06.
        let ledger = ledger_with_runs(&[at(2023, 10, 22, 0), at(2023, 10, 22, 6)]);

        let configs = evaluator()
            .evaluate(&ledger, issue_time("20231022", "06"), 5)
            .unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].ibtime, "06");
        // Last input consumed is 22T11, run 22T06 step 5.
        assert_eq!(configs[0].ietime, "11");
    }

    #[test]
    fn test_evaluate_empty_when_nothing_processed() {
        let ledger = MemoryLedger::new();
        let configs = evaluator()
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();
        assert!(configs.is_empty());
    }

    #[test]
    fn test_evaluate_orders_by_start_time() {
        let settings = TimeSettings {
            tincr: 1,
            tdelta: 12,
            tfreq_f: 3,
            tfreq: 6,
        };
        let evaluator = ReadinessEvaluator::new(settings, "BEZ");
        let ledger = ledger_with_runs(&[
            at(2023, 10, 21, 18),
            at(2023, 10, 22, 0),
            at(2023, 10, 22, 6),
            at(2023, 10, 22, 12),
            at(2023, 10, 22, 18),
        ]);

        let configs = evaluator
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();

        let starts: Vec<&str> = configs.iter().map(|c| c.forecast_datetime.as_str()).collect();
        assert_eq!(
            starts,
            vec!["202310220300", "202310220600", "202310220900", "202310221200"]
        );
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let ledger = ledger_with_runs(&[
            at(2023, 10, 22, 0),
            at(2023, 10, 22, 6),
            at(2023, 10, 22, 12),
        ]);
        let evaluator = twelve_hour_windows();

        let first = evaluator
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();
        let second = evaluator
            .evaluate(&ledger, issue_time("20231022", "06"), 6)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ledger_growth_only_adds_windows() {
        let ledger = ledger_with_runs(&[
            at(2023, 10, 22, 0),
            at(2023, 10, 22, 6),
            at(2023, 10, 22, 12),
        ]);
        let evaluator = twelve_hour_windows();
        let trigger = issue_time("20231022", "06");

        let before = evaluator.evaluate(&ledger, trigger, 6).unwrap();
        for step in 1..=5 {
            ledger.insert(LedgerRecord::new(at(2023, 10, 22, 18), step, true));
        }
        let after = evaluator.evaluate(&ledger, trigger, 6).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        for config in &before {
            assert!(after.contains(config));
        }
    }

    #[test]
    fn test_evaluate_propagates_ledger_failure() {
        let ledger = ledger_with_runs(&[at(2023, 10, 22, 0)]);
        ledger.set_fail_queries(true);

        let result = evaluator().evaluate(&ledger, issue_time("20231022", "06"), 6);
        assert!(matches!(result, Err(LedgerError::Query(_))));
    }
}
