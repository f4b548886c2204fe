//! Push delivery handler.
//!
//! Receives the envelope a Pub/Sub push subscription delivers, decodes the
//! embedded payload, and acknowledges receipt.

use axum::http::StatusCode;
use webhook_core::error::AppError;

use crate::models::PushEnvelope;
use crate::services::metrics;

/// Body Pub/Sub expects back to consider the delivery acknowledged.
const ACK: &str = "ACK";

/// Receive a push delivery, decode its payload, and answer `"ACK"`.
///
/// Decoded text is logged only; the response never carries payload content.
pub async fn receive_push(body: String) -> Result<(StatusCode, &'static str), AppError> {
    tracing::info!(payload = %body, "Received push delivery");

    let envelope = PushEnvelope::parse(&body).map_err(|e| {
        metrics::record_delivery("rejected");
        tracing::warn!(error = %e, "Failed to parse push envelope");
        AppError::BadRequest(anyhow::anyhow!(e))
    })?;

    let decoded = envelope.decode_data().map_err(|e| {
        metrics::record_delivery("rejected");
        tracing::warn!(error = %e, "Failed to decode push payload");
        AppError::BadRequest(anyhow::anyhow!(e))
    })?;

    tracing::info!(
        message_id = ?envelope.message.message_id,
        subscription = ?envelope.subscription,
        attributes = ?envelope.message.attributes,
        decoded = %decoded,
        "Decoded push payload"
    );

    metrics::record_delivery("acknowledged");
    Ok((StatusCode::OK, ACK))
}
