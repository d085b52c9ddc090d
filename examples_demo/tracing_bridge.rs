use scopelog::layer::RecordLayer;
use scopelog::Logger;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn main() {
    let logger = Logger::builder("bridge")
        .scope(&json!({"service": "auth"}))
        .build();
    let subscriber = Registry::default().with(RecordLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");

    info!("starting service");
    error!(user_id = 42, reason = "invalid password", "authentication failed for {{user_id}}");
}
