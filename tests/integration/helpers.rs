//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use docrelay_core::config::AppConfig;
use docrelay_core::types::UserId;
use docrelay_database::Stores;
use docrelay_directory::StaticDirectory;
use docrelay_entity::user::DirectoryUser;
use docrelay_realtime::RealtimeEngine;
use docrelay_realtime::gateway::PushGateway;
use docrelay_realtime::message::Envelope;

const TEST_CONFIG: &str = r#"
[database]
url = "memory"

[directory]
base_url = "http://127.0.0.1:1"
admin_role = "admin"

[logging]
level = "warn"
format = "pretty"
"#;

/// How long a test waits for an asynchronous push.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Directory with one administrator (`adm`) and two plain users.
pub fn directory() -> Arc<StaticDirectory> {
    Arc::new(
        StaticDirectory::new()
            .with_user(DirectoryUser::new("A", "alice", Some("alice@example.com".into())), ["user"])
            .with_user(DirectoryUser::new("B", "bob", None), ["user"])
            .with_user(DirectoryUser::new("adm", "boss", None), ["Admin"]),
    )
}

/// Test configuration with the in-memory stores.
pub fn config() -> AppConfig {
    AppConfig::from_toml(TEST_CONFIG).expect("Failed to parse test config")
}

/// Gateway that records every delivery instead of writing to sockets.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pushes: Mutex<Vec<(Option<UserId>, Envelope)>>,
    notify: Notify,
}

#[async_trait]
impl PushGateway for RecordingGateway {
    async fn send_to_user(&self, user_id: &UserId, envelope: Envelope) {
        self.pushes
            .lock()
            .unwrap()
            .push((Some(user_id.clone()), envelope));
        self.notify.notify_waiters();
    }

    async fn broadcast(&self, envelope: Envelope) {
        self.pushes.lock().unwrap().push((None, envelope));
        self.notify.notify_waiters();
    }
}

impl RecordingGateway {
    /// Snapshot of what has been delivered so far.
    pub fn pushes(&self) -> Vec<(Option<UserId>, Envelope)> {
        self.pushes.lock().unwrap().clone()
    }

    /// Wait until at least `count` deliveries were recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<(Option<UserId>, Envelope)> {
        let waited = tokio::time::timeout(PUSH_TIMEOUT, async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.pushes.lock().unwrap().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await;
        assert!(
            waited.is_ok(),
            "Expected {count} pushes, got {:?}",
            self.pushes()
        );
        self.pushes()
    }

    /// Give the drain task a moment, then assert nothing more arrived.
    pub async fn assert_settled_at(&self, count: usize) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(self.pushes().len(), count, "Unexpected pushes: {:?}", self.pushes());
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Stores shared with the router
    pub stores: Stores,
    /// Engine shared with the router
    pub realtime: RealtimeEngine,
    /// Everything the engine pushed
    pub gateway: Arc<RecordingGateway>,
}

impl TestApp {
    /// Create a new test application over memory stores.
    pub fn new() -> Self {
        Self::with_stores(Stores::memory())
    }

    /// Create a test application over the given stores.
    pub fn with_stores(stores: Stores) -> Self {
        let config = config();
        let gateway = Arc::new(RecordingGateway::default());
        let realtime = RealtimeEngine::with_gateway(
            config.realtime.clone(),
            gateway.clone(),
            &stores,
            directory(),
            &config.directory.admin_role,
        );
        let state = docrelay_api::AppState::new(config, stores.clone(), realtime.clone());

        Self {
            router: docrelay_api::build_router(state),
            stores,
            realtime,
            gateway,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
