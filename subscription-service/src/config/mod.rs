use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;
use webhook_core::config::{get_env, is_prod};

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub pubsub: PubSubConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PubSubConfig {
    /// Cloud project the topic and subscriptions live in.
    pub project_id: String,
    /// Topic new subscriptions attach to.
    pub topic_id: String,
    /// Base URL of the subscription admin API; overridable for tests.
    pub api_base_url: String,
    pub access_token: Secret<String>,
    pub enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host =
            env::var("SUBSCRIPTION_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SUBSCRIPTION_SERVICE_PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse()?;

        // PROJECT_ID and TOPIC_ID keep the names the original deployment
        // used; both are mandatory in production.
        let is_prod = is_prod();
        let project_id = get_env("PROJECT_ID", Some(""), is_prod)?;
        let topic_id = get_env("TOPIC_ID", Some(""), is_prod)?;
        let api_base_url = env::var("PUBSUB_API_BASE_URL")
            .unwrap_or_else(|_| "https://pubsub.googleapis.com/v1".to_string());
        let access_token = get_env("PUBSUB_ACCESS_TOKEN", Some(""), is_prod)?;
        let enabled = env::var("PUBSUB_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            server: ServerConfig { host, port },
            pubsub: PubSubConfig {
                project_id,
                topic_id,
                api_base_url,
                access_token: Secret::new(access_token),
                enabled,
            },
            service_name: "subscription-service".to_string(),
        })
    }
}
