//! Candidate simulation windows.
//!
//! When a forecast lead time has been ingested, every simulation window whose
//! span could contain that instant becomes a candidate. Windows start on
//! `tfreq_f` boundaries and span `tdelta` hours.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDateTime};

use crate::config::TimeSettings;
use crate::forecast::{label, ForecastIdentity};
use crate::time::{align_floor, next_boundary_after};

/// One candidate simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationWindow {
    pub start: NaiveDateTime,
    /// Last sampled instant, the final input the simulation consumes.
    pub end: NaiveDateTime,
    /// Inputs sampled every `tincr` hours over `[start, start + tdelta)`, in time order.
    pub required_identities: Vec<ForecastIdentity>,
}

impl SimulationWindow {
    pub fn new(start: NaiveDateTime, settings: &TimeSettings) -> Self {
        let samples: Vec<NaiveDateTime> = (0..settings.tdelta)
            .step_by(settings.tincr as usize)
            .map(|h| start + Duration::hours(i64::from(h)))
            .collect();
        let end = samples.last().copied().unwrap_or(start);

        Self {
            start,
            end,
            required_identities: samples
                .into_iter()
                .map(|instant| label(instant, settings.tfreq))
                .collect(),
        }
    }

    /// Distinct forecast runs this window reads from.
    pub fn issue_times(&self) -> BTreeSet<NaiveDateTime> {
        self.required_identities
            .iter()
            .map(|identity| identity.issue_time)
            .collect()
    }

    /// Whether every required input is in `processed`.
    pub fn is_satisfied_by(&self, processed: &HashSet<ForecastIdentity>) -> bool {
        self.required_identities
            .iter()
            .all(|identity| processed.contains(identity))
    }

    /// Required inputs not yet in `processed`.
    pub fn missing<'a>(
        &'a self,
        processed: &'a HashSet<ForecastIdentity>,
    ) -> impl Iterator<Item = &'a ForecastIdentity> + 'a {
        self.required_identities
            .iter()
            .filter(move |identity| !processed.contains(identity))
    }
}

/// Start times of every window that could include `issue_time + lead_hours`.
///
/// Returned in ascending order with a constant `tfreq_f` step. An empty result
/// means no window is plausible yet.
pub fn candidate_starts(
    issue_time: NaiveDateTime,
    lead_hours: u32,
    tdelta: u32,
    tfreq_f: u32,
) -> Vec<NaiveDateTime> {
    let endpoint = issue_time + Duration::hours(i64::from(lead_hours));
    let floor = endpoint - Duration::hours(i64::from(tdelta));

    let earliest = next_boundary_after(floor, tfreq_f);
    let latest = align_floor(endpoint, tfreq_f);
    let step = Duration::hours(i64::from(tfreq_f));

    let mut starts = Vec::new();
    let mut current = earliest;
    while current <= latest {
        starts.push(current);
        current += step;
    }
    starts
}

/// Candidate windows for an ingested lead time, in ascending start order.
pub fn candidate_windows(
    issue_time: NaiveDateTime,
    lead_hours: u32,
    settings: &TimeSettings,
) -> Vec<SimulationWindow> {
    candidate_starts(issue_time, lead_hours, settings.tdelta, settings.tfreq_f)
        .into_iter()
        .map(|start| SimulationWindow::new(start, settings))
        .collect()
}
