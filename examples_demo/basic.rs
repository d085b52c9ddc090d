use scopelog::Logger;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Root logger writing JSON lines to stdout with the wall clock.
    let log = Logger::new("basic");

    log.info("service started", &[])?;
    log.warn("cache {name} is {pct}% full", &[json!("sessions"), json!(93)])?;
    log.error(
        "order {order_id} failed: {reason}",
        &[json!(123), json!("card declined")],
    )?;

    Ok(())
}
