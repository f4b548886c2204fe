//! Pub/Sub push envelope model and payload decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Malformed JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Missing or malformed envelope fields: {0}")]
    Structure(#[source] serde_json::Error),

    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Envelope a Pub/Sub push subscription delivers to its endpoint.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    /// Full name of the subscription that made the delivery.
    pub subscription: Option<String>,
}

/// The published message inside a push envelope.
///
/// Only `data` is mandatory; the remaining fields are delivery metadata
/// Pub/Sub attaches on the way out.
#[derive(Debug, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded message payload (standard alphabet).
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
    #[serde(rename = "publishTime")]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    /// Parse a raw request body into an envelope.
    ///
    /// Parsing runs in two stages so malformed JSON and a valid JSON document
    /// of the wrong shape surface as distinct errors.
    pub fn parse(body: &str) -> Result<Self, EnvelopeError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(EnvelopeError::Parse)?;
        serde_json::from_value(value).map_err(EnvelopeError::Structure)
    }

    /// Decode `message.data` into text.
    ///
    /// Invalid UTF-8 in the decoded bytes is replaced rather than rejected,
    /// matching how the payload was read before this service existed.
    pub fn decode_data(&self) -> Result<String, EnvelopeError> {
        let bytes = STANDARD.decode(&self.message.data)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
