//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with an in-memory ledger and mock containers injected, so notifications
//! can be exercised without docker or an ingestion database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use flexorch_core::{
    Config, DatabaseConfig, LauncherConfig, PipelineOrchestrator, PreprocessConfig,
    ReadinessEvaluator, ServerConfig, SimulationDefaults, TimeSettings,
    testing::{MemoryLedger, MockLauncher, MockPreprocessor},
};
use flexorch_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use flexorch_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_notification() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/notifications", json!({
///         "date": "20231022", "time": "06", "step": 5
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Ingestion ledger seen by readiness checks
    pub ledger: MemoryLedger,
    /// Preprocessor that marks the triggering record processed
    pub preprocessor: MockPreprocessor,
    /// Launcher recording every simulation
    pub launcher: MockLauncher,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON endpoints
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default time settings.
    pub fn new() -> Self {
        Self::with_settings(TimeSettings::default())
    }

    /// Create a test fixture with custom time settings.
    pub fn with_settings(time_settings: TimeSettings) -> Self {
        let ledger = MemoryLedger::new();
        let preprocessor = MockPreprocessor::marking(ledger.clone());
        let launcher = MockLauncher::new();

        let config = Config {
            time_settings,
            database: DatabaseConfig::default(),
            simulation: SimulationDefaults::default(),
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            preprocess: Some(PreprocessConfig {
                env_file: Some("/secret/preprocess.env".into()),
                ..PreprocessConfig::new("flexpart-ifs-preprocessing:latest")
            }),
            launcher: Some(LauncherConfig::new("flexpart-ifs:latest")),
        };

        let orchestrator = PipelineOrchestrator::new(
            ReadinessEvaluator::from_config(&config),
            Arc::new(ledger.clone()),
        )
        .with_preprocessor(Arc::new(preprocessor.clone()))
        .with_launcher(Arc::new(launcher.clone()));

        let state = Arc::new(AppState::new(config, orchestrator));
        let router = create_router(state);

        Self {
            router,
            ledger,
            preprocessor,
            launcher,
        }
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test router.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
