pub mod metrics;
pub mod pubsub;

pub use metrics::{get_metrics, init_metrics};
pub use pubsub::{MockSubscriptionAdmin, PubSubAdminClient, SubscriptionAdmin};
