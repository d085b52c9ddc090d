use async_trait::async_trait;
use scopelog::forward::{AsyncLogSink, ForwardConfig, ForwardingSink};
use scopelog::{LogRecord, Logger};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

/// Stand-in for a remote collector.
struct PrintBackend;

#[async_trait]
impl AsyncLogSink for PrintBackend {
    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("[collector] {}", record.to_json_line()?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let (sink, handle) = ForwardingSink::spawn(Arc::new(PrintBackend), ForwardConfig::default());
    let log = Logger::builder("worker").sink(Arc::new(sink)).build();

    let n: u64 = 1_000;
    let start = Instant::now();
    for i in 0..n {
        log.error("iteration {i} failed", &[json!(i)])?;
    }
    let elapsed = start.elapsed();

    // Dropping the last handle closes the channel; the task drains and exits.
    drop(log);
    handle.await?;

    eprintln!(
        "sent {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
