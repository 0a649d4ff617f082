//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Invocations (outcome, duration)
//! - Readiness evaluation (windows, ledger queries)
//! - External containers (preprocessing, simulation launches)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Invocation Metrics
// =============================================================================

/// Invocations total by outcome.
pub static INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flexorch_invocations_total", "Total pipeline invocations"),
        &["outcome"], // "launched", "no_windows_ready", "not_yet_processed", "failed"
    )
    .unwrap()
});

/// Invocation duration in seconds.
pub static INVOCATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flexorch_invocation_duration_seconds",
            "Duration of a full pipeline invocation",
        )
        .buckets(vec![
            0.1, 1.0, 10.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 7200.0, 14400.0,
        ]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Readiness Metrics
// =============================================================================

/// Candidate windows evaluated.
pub static WINDOWS_EVALUATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flexorch_windows_evaluated_total",
        "Total candidate simulation windows evaluated",
    )
    .unwrap()
});

/// Candidate windows with every input processed.
pub static WINDOWS_SATISFIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flexorch_windows_satisfied_total",
        "Total simulation windows with complete inputs",
    )
    .unwrap()
});

/// Per-issue-time ledger queries.
pub static LEDGER_QUERIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "flexorch_ledger_queries_total",
        "Total ledger queries for forecast runs",
    )
    .unwrap()
});

// =============================================================================
// Container Metrics
// =============================================================================

/// Container runs by kind and result.
pub static CONTAINER_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("flexorch_container_runs_total", "Total container runs"),
        &["kind", "result"], // kind: "preprocess", "simulation"; result: "success", "failed"
    )
    .unwrap()
});

/// Container run duration in seconds.
pub static CONTAINER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "flexorch_container_duration_seconds",
            "Duration of container runs",
        )
        .buckets(vec![1.0, 10.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 7200.0]),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Invocations
        Box::new(INVOCATIONS.clone()),
        Box::new(INVOCATION_DURATION.clone()),
        // Readiness
        Box::new(WINDOWS_EVALUATED.clone()),
        Box::new(WINDOWS_SATISFIED.clone()),
        Box::new(LEDGER_QUERIES.clone()),
        // Containers
        Box::new(CONTAINER_RUNS.clone()),
        Box::new(CONTAINER_DURATION.clone()),
    ]
}
