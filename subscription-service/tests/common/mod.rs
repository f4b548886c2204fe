use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::put;
use axum::{Json, Router};
use secrecy::Secret;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use subscription_service::config::{Config, PubSubConfig, ServerConfig};
use subscription_service::startup::Application;

pub const TEST_PROJECT: &str = "test-project";
pub const TEST_TOPIC: &str = "fhir-events";

/// A recorded create-subscription call against the fake admin API.
#[derive(Debug, Clone)]
pub struct RecordedCreate {
    pub name: String,
    pub body: serde_json::Value,
}

/// In-process stand-in for the Pub/Sub subscription admin REST API.
#[derive(Clone, Default)]
pub struct FakePubSub {
    pub requests: Arc<Mutex<Vec<RecordedCreate>>>,
    pub existing: Arc<Mutex<HashSet<String>>>,
    pub fail_status: Arc<Mutex<Option<u16>>>,
}

impl FakePubSub {
    /// Mark a subscription name as already present.
    pub fn add_existing(&self, name: &str) {
        self.existing.lock().unwrap().insert(name.to_string());
    }

    /// Make every create call fail with the given HTTP status.
    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn recorded(&self) -> Vec<RecordedCreate> {
        self.requests.lock().unwrap().clone()
    }

    /// Spawn the fake server on a random port and return its base URL.
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route(
                "/projects/:project/subscriptions/:name",
                put(create_subscription),
            )
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Pub/Sub listener");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        format!("http://127.0.0.1:{}", port)
    }
}

async fn create_subscription(
    State(fake): State<FakePubSub>,
    Path((project, name)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Some(status) = *fake.fail_status.lock().unwrap() {
        return (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({
                "error": { "code": status, "message": "injected failure", "status": "UNKNOWN" }
            })),
        );
    }

    if !fake.existing.lock().unwrap().insert(name.clone()) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": { "code": 409, "message": "Resource already exists in the project", "status": "ALREADY_EXISTS" }
            })),
        );
    }

    fake.requests.lock().unwrap().push(RecordedCreate {
        name: name.clone(),
        body: body.clone(),
    });

    (
        StatusCode::OK,
        Json(json!({
            "name": format!("projects/{}/subscriptions/{}", project, name),
            "topic": body["topic"],
            "filter": body["filter"],
        })),
    )
}

pub struct TestApp {
    pub address: String,
    pub pubsub: FakePubSub,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let pubsub = FakePubSub::default();
        let api_base_url = pubsub.spawn().await;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            pubsub: PubSubConfig {
                project_id: TEST_PROJECT.to_string(),
                topic_id: TEST_TOPIC.to_string(),
                api_base_url,
                access_token: Secret::new("test-token".to_string()),
                enabled: true,
            },
            service_name: "subscription-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, pubsub }
    }
}
