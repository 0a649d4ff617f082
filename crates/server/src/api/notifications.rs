//! Ingestion notification handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use flexorch_core::{InvocationOutcome, OrchestratorError, Trigger};

use crate::metrics::NOTIFICATIONS_REJECTED;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct NotificationErrorResponse {
    pub error: String,
    /// Pipeline stage that failed
    pub stage: String,
}

impl NotificationErrorResponse {
    fn from_error(error: &OrchestratorError) -> Self {
        Self {
            error: error.to_string(),
            stage: error.stage().to_string(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Run one full invocation for an ingested forecast file.
///
/// The request completes once every launched simulation has finished.
pub async fn notify(
    State(state): State<Arc<AppState>>,
    Json(trigger): Json<Trigger>,
) -> Result<Json<InvocationOutcome>, (StatusCode, Json<NotificationErrorResponse>)> {
    if let Err(e) = trigger.issue_datetime() {
        NOTIFICATIONS_REJECTED.inc();
        warn!("Rejected notification: {}", e);
        let error = OrchestratorError::from(e);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(NotificationErrorResponse::from_error(&error)),
        ));
    }

    match state.orchestrator().run(&trigger).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(NotificationErrorResponse::from_error(&e)),
        )),
    }
}
