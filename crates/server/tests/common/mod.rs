//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock indexers injected, so the cache endpoints can be exercised
//! without an upstream aggregator.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use trackercache_core::{
    testing::MockIndexer, CacheStore, Config, Indexer, IndexerConfig, LiveSettings,
    ResultsService, ServerConfig, UpstreamConfig,
};

/// Re-export fixtures for test convenience
pub use trackercache_core::testing::fixtures;

/// Test fixture for API testing with mock indexers.
///
/// Two mock indexers are registered, `abc` and `xyz`.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.abc.set_results(fixtures::releases("ubuntu", 3)).await;
///
///     let response = fixture.post("/api/v1/search", json!({ "search_term": "ubuntu" })).await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock indexer `abc`
    pub abc: Arc<MockIndexer>,
    /// Mock indexer `xyz`
    pub xyz: Arc<MockIndexer>,
    /// Live settings shared with the cache
    pub settings: Arc<LiveSettings>,
    /// The result cache behind the router
    pub cache: Arc<CacheStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub async fn new() -> Self {
        let abc = Arc::new(MockIndexer::new("abc"));
        let xyz = Arc::new(MockIndexer::new("xyz"));

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            upstream: Some(UpstreamConfig {
                url: "http://upstream.invalid".to_string(),
                api_key: "secret-key".to_string(),
                timeout_secs: 5,
            }),
            indexers: vec![
                IndexerConfig {
                    id: "abc".to_string(),
                    name: Some("ABC Tracker".to_string()),
                    indexer_type: "public".to_string(),
                },
                IndexerConfig {
                    id: "xyz".to_string(),
                    name: Some("XYZ Tracker".to_string()),
                    indexer_type: "public".to_string(),
                },
            ],
            ..Default::default()
        };

        let settings = Arc::new(LiveSettings::from_config(&config));
        let cache = Arc::new(CacheStore::new(settings.clone()));
        let service = Arc::new(ResultsService::new(
            cache.clone(),
            vec![
                Arc::clone(&abc) as Arc<dyn Indexer>,
                Arc::clone(&xyz) as Arc<dyn Indexer>,
            ],
        ));

        let state = Arc::new(trackercache_server::state::AppState::new(
            config,
            settings.clone(),
            service,
        ));
        let router = trackercache_server::api::create_router(state);

        Self {
            router,
            abc,
            xyz,
            settings,
            cache,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

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

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

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

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
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
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
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
