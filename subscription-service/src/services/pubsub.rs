//! Pub/Sub subscription administration client.
//!
//! Speaks the REST surface of the managed Pub/Sub service for subscription
//! creation. Everything else about the service stays external; this module
//! only models the create call and its outcomes.

use crate::config::PubSubConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    /// A subscription of that name is already attached to the topic.
    #[error("Subscription already exists")]
    AlreadyExists,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Subscription admin API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// What the service asks the collaborator to create.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSpec {
    pub name: String,
    pub push_endpoint: String,
    pub filter: String,
}

/// Subscription as reported back by the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSubscription {
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub filter: String,
}

#[async_trait]
pub trait SubscriptionAdmin: Send + Sync {
    async fn create_subscription(
        &self,
        spec: &SubscriptionSpec,
    ) -> Result<CreatedSubscription, AdminError>;
}

#[derive(Debug, Serialize)]
struct CreateSubscriptionBody {
    topic: String,
    #[serde(rename = "pushConfig")]
    push_config: PushConfigBody,
    filter: String,
}

#[derive(Debug, Serialize)]
struct PushConfigBody {
    #[serde(rename = "pushEndpoint")]
    push_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ApiErrorDetail {
    code: u16,
    message: String,
    status: String,
}

/// REST client for the Pub/Sub subscription admin API.
#[derive(Clone)]
pub struct PubSubAdminClient {
    client: Client,
    config: PubSubConfig,
}

impl PubSubAdminClient {
    pub fn new(config: PubSubConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check whether the project and topic are configured.
    pub fn is_configured(&self) -> bool {
        !self.config.project_id.is_empty() && !self.config.topic_id.is_empty()
    }

    fn access_token(&self) -> Result<String, AdminError> {
        // Stands in for a real OAuth2 service-account exchange; the
        // deployment environment supplies a short-lived token directly.
        let token = self.config.access_token.expose_secret();
        if token.is_empty() {
            return Err(AdminError::Configuration(
                "Pub/Sub access token not configured".to_string(),
            ));
        }
        Ok(token.clone())
    }
}

#[async_trait]
impl SubscriptionAdmin for PubSubAdminClient {
    async fn create_subscription(
        &self,
        spec: &SubscriptionSpec,
    ) -> Result<CreatedSubscription, AdminError> {
        if !self.is_configured() {
            return Err(AdminError::Configuration(
                "Pub/Sub project or topic not configured".to_string(),
            ));
        }

        let body = CreateSubscriptionBody {
            topic: format!(
                "projects/{}/topics/{}",
                self.config.project_id, self.config.topic_id
            ),
            push_config: PushConfigBody {
                push_endpoint: spec.push_endpoint.clone(),
            },
            filter: spec.filter.clone(),
        };

        let url = format!(
            "{}/projects/{}/subscriptions/{}",
            self.config.api_base_url, self.config.project_id, spec.name
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(self.access_token()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(AdminError::AlreadyExists);
        }
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(err) => err.error.message,
                Err(_) => format!("{} with no error detail", status),
            };
            return Err(AdminError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let subscription = response.json::<CreatedSubscription>().await?;
        tracing::info!(
            subscription = %subscription.name,
            topic = %subscription.topic,
            filter = %subscription.filter,
            "Subscription created"
        );

        Ok(subscription)
    }
}

/// In-memory stand-in used when the Pub/Sub provider is disabled.
#[derive(Default)]
pub struct MockSubscriptionAdmin {
    created: Mutex<Vec<SubscriptionSpec>>,
}

impl MockSubscriptionAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<SubscriptionSpec> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionAdmin for MockSubscriptionAdmin {
    async fn create_subscription(
        &self,
        spec: &SubscriptionSpec,
    ) -> Result<CreatedSubscription, AdminError> {
        let mut created = self.created.lock().unwrap();
        if created.iter().any(|existing| existing.name == spec.name) {
            return Err(AdminError::AlreadyExists);
        }
        created.push(spec.clone());

        tracing::info!(
            name = %spec.name,
            filter = %spec.filter,
            "[MOCK] Subscription would be created"
        );

        Ok(CreatedSubscription {
            name: spec.name.clone(),
            topic: String::new(),
            filter: spec.filter.clone(),
        })
    }
}
