//! Application startup and lifecycle management.

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use webhook_core::error::AppError;
use webhook_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};

use crate::config::Config;
use crate::handlers;
use crate::services::{MockSubscriptionAdmin, PubSubAdminClient, SubscriptionAdmin};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub admin: Arc<dyn SubscriptionAdmin>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let admin: Arc<dyn SubscriptionAdmin> = if config.pubsub.enabled {
            let client = PubSubAdminClient::new(config.pubsub.clone());
            if client.is_configured() {
                tracing::info!("Pub/Sub admin client initialized");
            } else {
                tracing::warn!(
                    "Pub/Sub project or topic not configured - subscription creation will fail"
                );
            }
            Arc::new(client)
        } else {
            tracing::info!("Pub/Sub provider disabled, using mock subscription admin");
            Arc::new(MockSubscriptionAdmin::new())
        };

        let state = AppState {
            config: config.clone(),
            admin,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .route(
                "/subscriptions",
                post(handlers::subscriptions::create_subscription),
            )
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Subscription service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
