//! Subscription creation handler.

use axum::extract::State;
use axum::http::StatusCode;
use webhook_core::error::AppError;

use crate::models::{resource_filter, CreateSubscriptionRequest};
use crate::services::metrics;
use crate::services::pubsub::{AdminError, SubscriptionSpec};
use crate::startup::AppState;

pub const CREATED: &str = "Webhook subscription created!";
pub const ALREADY_EXISTS: &str = "Subscription already exists!";

/// Create a push subscription filtered to the requested FHIR resource types.
///
/// An already-existing subscription of the same name is an expected outcome,
/// reported with the same plain-text contract as success.
pub async fn create_subscription(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, &'static str), AppError> {
    // Two-stage parse so malformed JSON and a wrong-shaped request report
    // distinct messages.
    let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(error = %e, "Subscription request is not valid JSON");
        AppError::BadRequest(anyhow::anyhow!("Malformed JSON: {}", e))
    })?;
    let request: CreateSubscriptionRequest = serde_json::from_value(value).map_err(|e| {
        tracing::warn!(error = %e, "Subscription request has missing or malformed fields");
        AppError::BadRequest(anyhow::anyhow!("Missing or malformed fields: {}", e))
    })?;

    let filter = resource_filter(&request.fhir_resources);

    tracing::info!(
        name = %request.name,
        endpoint = %request.endpoint,
        filter = %filter,
        "Creating webhook subscription"
    );

    let spec = SubscriptionSpec {
        name: request.name,
        push_endpoint: request.endpoint,
        filter,
    };

    match state.admin.create_subscription(&spec).await {
        Ok(subscription) => {
            metrics::record_subscription("created");
            tracing::info!(subscription = %subscription.name, "Webhook subscription created");
            Ok((StatusCode::CREATED, CREATED))
        }
        Err(AdminError::AlreadyExists) => {
            metrics::record_subscription("already_exists");
            tracing::warn!(name = %spec.name, "Subscription already exists");
            Ok((StatusCode::OK, ALREADY_EXISTS))
        }
        Err(AdminError::Configuration(message)) => {
            metrics::record_subscription("failed");
            tracing::error!(error = %message, "Subscription admin misconfigured");
            Err(AppError::InternalError(anyhow::anyhow!(message)))
        }
        Err(e) => {
            metrics::record_subscription("failed");
            tracing::error!(error = %e, "Failed to create subscription");
            Err(AppError::BadGateway(e.to_string()))
        }
    }
}
