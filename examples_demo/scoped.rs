use scopelog::{Logger, LoggerConfig};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // SCOPELOG_CONTEXT / SCOPELOG_SCOPE override the defaults below.
    let config = match std::env::var(scopelog::env::SCOPELOG_CONTEXT_ENV) {
        Ok(_) => LoggerConfig::from_env(),
        Err(_) => LoggerConfig::new("http").with_scope(json!({"region": "eu-west-1"})),
    };
    let root = Logger::from_config(config);

    let request = root.scope_to("request", &json!({"request_id": "r-42", "user": "ann"}));
    let db = request.scope_to("db", &json!({"pool": "primary"}));

    request.info("GET {path}", &[json!("/orders")])?;
    db.debug("query took {ms} ms", &[json!(12.5)])?;
    // Fixed fields cannot be spoofed by scope or template fields.
    db.trace("{level} is ignored", &[json!("spoofed")])?;
    root.info("parent loggers keep their own scope", &[])?;

    Ok(())
}
