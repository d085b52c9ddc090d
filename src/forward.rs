use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::error::Error;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};

/// Asynchronous destination for records shipped by a [`ForwardingSink`].
///
/// Implementations talk to a remote backend (HTTP collector, message
/// queue, database). `send` runs on the forwarding task and never on the
/// thread that produced the record.
#[async_trait]
pub trait AsyncLogSink: Send + Sync {
    /// Send a single log record to the underlying backend.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted by the backend.
    /// - `Err(..)` if the backend failed. The forwarding task treats this as
    ///   transient and retries the whole batch with backoff.
    async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered records, if the backend buffers.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Tuning for [`ForwardingSink`].
///
/// **Fields**
/// - `channel_buffer`: records queued before `write` starts failing with
///   [`SinkError::ChannelFull`].
/// - `batch_size`: records handed to the backend per batch.
/// - `flush_interval`: longest wait before a partial batch is sent.
/// - `max_attempts`: sends per batch, first try included, before the batch
///   is dropped.
#[derive(Clone, Debug)]
pub struct ForwardConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

/// Messages understood by the forwarding task. A flush request is queued
/// behind the records written before it.
enum Command {
    Record(LogRecord),
    Flush(Option<oneshot::Sender<()>>),
}

/// [`LogSink`] that queues records on a bounded channel for a background
/// task, which batches them into an [`AsyncLogSink`].
///
/// `write` never blocks: a full queue is reported to the caller and counted
/// in `dropped_events`. Dropping every clone of the sink closes the
/// channel; the task then ships what is left, flushes the backend and
/// exits.
#[derive(Clone)]
pub struct ForwardingSink {
    sender: mpsc::Sender<Command>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Rejected because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
    /// Delivered to the backend.
    pub sent_events: Arc<AtomicU64>,
}

impl ForwardingSink {
    /// Create the sink and spawn its forwarding task on the current Tokio
    /// runtime.
    ///
    /// Minimal thresholds are enforced for `channel_buffer`, `batch_size`,
    /// `flush_interval` and `max_attempts` to avoid degenerate
    /// configurations.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn spawn(sink: Arc<dyn AsyncLogSink>, config: ForwardConfig) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));
        let max_attempts = config.max_attempts.max(1);

        let (tx, mut rx) = mpsc::channel::<Command>(buffer);

        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));
        let sent_events = Arc::new(AtomicU64::new(0));
        let sent_events_bg = Arc::clone(&sent_events);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let retry = Retry {
                backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(10),
                attempts: max_attempts,
            };
            // One ticker for the whole loop so incoming records do not push
            // the next flush further out.
            let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    maybe = rx.recv() => match maybe {
                        Some(Command::Record(record)) => {
                            batch.push(record);
                            if batch.len() >= batch_size {
                                ship(&*sink, &mut batch, &retry, &sent_events_bg).await;
                            }
                        }
                        Some(Command::Flush(ack)) => {
                            if !batch.is_empty() {
                                ship(&*sink, &mut batch, &retry, &sent_events_bg).await;
                            }
                            if let Err(e) = sink.flush().await {
                                tracing::warn!(error = %e, "log backend flush failed");
                            }
                            if let Some(ack) = ack {
                                let _ = ack.send(());
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            ship(&*sink, &mut batch, &retry, &sent_events_bg).await;
                        }
                    }
                }
            }

            if !batch.is_empty() {
                ship(&*sink, &mut batch, &retry, &sent_events_bg).await;
            }
            if let Err(e) = sink.flush().await {
                tracing::warn!(error = %e, "log backend flush failed on shutdown");
            }
            tracing::debug!("log forwarding task stopped");
        });

        (
            Self {
                sender: tx,
                enqueued_events,
                dropped_events,
                sent_events,
            },
            handle,
        )
    }

    /// Ship everything written so far and flush the backend, waiting until
    /// the forwarding task has done both.
    pub async fn flush_async(&self) -> Result<(), SinkError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.sender
            .send(Command::Flush(Some(ack_tx)))
            .await
            .map_err(|_| SinkError::Closed)?;
        ack_rx.await.map_err(|_| SinkError::Closed)
    }
}

impl LogSink for ForwardingSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        match self.sender.try_send(Command::Record(record.clone())) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::ChannelFull)
            }
            Err(TrySendError::Closed(_)) => Err(SinkError::Closed),
        }
    }

    /// Queue a flush request behind the records already written and return.
    ///
    /// The forwarding task ships the pending batch and flushes the backend
    /// when it reaches the request. Use [`ForwardingSink::flush_async`] to
    /// wait for that.
    fn flush(&self) -> Result<(), SinkError> {
        match self.sender.try_send(Command::Flush(None)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SinkError::ChannelFull),
            Err(TrySendError::Closed(_)) => Err(SinkError::Closed),
        }
    }
}

struct Retry {
    backoff: Duration,
    max_backoff: Duration,
    attempts: u32,
}

async fn ship(
    sink: &dyn AsyncLogSink,
    batch: &mut Vec<LogRecord>,
    retry: &Retry,
    sent: &AtomicU64,
) {
    if let Err(e) = send_batch(sink, batch, retry, sent).await {
        tracing::warn!(error = %e, dropped = batch.len(), "giving up on log batch");
    }
    batch.clear();
}

/// Send `batch` in order, resuming after the last delivered record on each
/// retry so nothing is shipped twice.
async fn send_batch(
    sink: &dyn AsyncLogSink,
    batch: &[LogRecord],
    retry: &Retry,
    sent: &AtomicU64,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut backoff = retry.backoff;
    let mut delivered = 0;
    let mut attempt = 1;

    loop {
        let mut last_err = None;
        for record in &batch[delivered..] {
            match sink.send(record).await {
                Ok(()) => {
                    delivered += 1;
                    sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    last_err = Some(e);
                    break;
                }
            }
        }

        let err = match last_err {
            None => return Ok(()),
            Some(e) => e,
        };
        if attempt >= retry.attempts {
            return Err(err);
        }

        tracing::warn!(error = %err, ?backoff, attempt, "log backend send failed, retrying");
        sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, retry.max_backoff);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::assemble;
    use crate::scope::Scope;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<String>>,
        failures_left: AtomicU64,
        flushes: AtomicU64,
    }

    #[async_trait]
    impl AsyncLogSink for CollectingSink {
        async fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
            if self.failures_left.load(Ordering::Relaxed) > 0 {
                self.failures_left.fetch_sub(1, Ordering::Relaxed);
                return Err("backend unavailable".into());
            }
            self.seen
                .lock()
                .push(record.message().unwrap_or_default().to_string());
            Ok(())
        }

        async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.flushes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn record(n: u64) -> LogRecord {
        assemble("info", "fwd", &Scope::empty(), "now", Some("n={n}"), &[json!(n)])
    }

    fn fast_config() -> ForwardConfig {
        ForwardConfig {
            channel_buffer: 64,
            batch_size: 4,
            flush_interval: Duration::from_millis(10),
            max_attempts: 3,
        }
    }

    #[tokio::test]
    async fn drains_and_flushes_on_close() {
        let backend = Arc::new(CollectingSink::default());
        let (sink, handle) = ForwardingSink::spawn(backend.clone(), fast_config());

        for n in 0..10 {
            sink.write(&record(n)).unwrap();
        }
        assert_eq!(sink.enqueued_events.load(Ordering::Relaxed), 10);
        let sent = Arc::clone(&sink.sent_events);
        drop(sink);
        handle.await.unwrap();

        let seen = backend.seen.lock().clone();
        let expected: Vec<String> = (0..10).map(|n| format!("n={n}")).collect();
        assert_eq!(seen, expected);
        assert_eq!(sent.load(Ordering::Relaxed), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_without_duplicates() {
        let backend = Arc::new(CollectingSink {
            failures_left: AtomicU64::new(2),
            ..Default::default()
        });
        let (sink, handle) = ForwardingSink::spawn(backend.clone(), fast_config());

        for n in 0..3 {
            sink.write(&record(n)).unwrap();
        }
        drop(sink);
        handle.await.unwrap();

        assert_eq!(*backend.seen.lock(), ["n=0", "n=1", "n=2"]);
    }

    #[tokio::test]
    async fn full_channel_is_reported() {
        let backend = Arc::new(CollectingSink::default());
        let config = ForwardConfig {
            channel_buffer: 16,
            batch_size: 1024,
            flush_interval: Duration::from_secs(60),
            max_attempts: 1,
        };
        // Current-thread runtime: the forwarding task cannot run until we yield.
        let (sink, _handle) = ForwardingSink::spawn(backend, config);

        for n in 0..16 {
            sink.write(&record(n)).unwrap();
        }
        assert!(matches!(sink.write(&record(16)), Err(SinkError::ChannelFull)));
        assert_eq!(sink.dropped_events.load(Ordering::Relaxed), 1);
    }

    fn slow_config() -> ForwardConfig {
        ForwardConfig {
            channel_buffer: 64,
            batch_size: 128,
            flush_interval: Duration::from_secs(60),
            max_attempts: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn steady_trickle_still_flushes_partial_batches() {
        let backend = Arc::new(CollectingSink::default());
        let config = ForwardConfig {
            flush_interval: Duration::from_secs(1),
            ..slow_config()
        };
        let (sink, _handle) = ForwardingSink::spawn(backend.clone(), config);

        for n in 0..20 {
            sink.write(&record(n)).unwrap();
            sleep(Duration::from_millis(500)).await;
        }

        let delivered = sink.sent_events.load(Ordering::Relaxed);
        assert!(delivered >= 16, "delivered = {delivered}");
        let seen = backend.seen.lock().clone();
        let expected: Vec<String> = (0..seen.len()).map(|n| format!("n={n}")).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn sync_flush_ships_pending_batch() {
        let backend = Arc::new(CollectingSink::default());
        let (sink, _handle) = ForwardingSink::spawn(backend.clone(), slow_config());

        sink.write(&record(0)).unwrap();
        LogSink::flush(&sink).unwrap();
        // Far below the flush interval: only the flush request can ship it.
        sleep(Duration::from_millis(1)).await;

        assert_eq!(sink.sent_events.load(Ordering::Relaxed), 1);
        assert_eq!(backend.flushes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn flush_async_waits_for_delivery() {
        let backend = Arc::new(CollectingSink::default());
        let (sink, _handle) = ForwardingSink::spawn(backend.clone(), slow_config());

        for n in 0..3 {
            sink.write(&record(n)).unwrap();
        }
        sink.flush_async().await.unwrap();

        assert_eq!(*backend.seen.lock(), ["n=0", "n=1", "n=2"]);
        assert_eq!(backend.flushes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn single_attempt_drops_failing_batch() {
        let backend = Arc::new(CollectingSink {
            failures_left: AtomicU64::new(1),
            ..Default::default()
        });
        let (sink, _handle) = ForwardingSink::spawn(backend.clone(), slow_config());

        sink.write(&record(0)).unwrap();
        sink.flush_async().await.unwrap();
        sink.write(&record(1)).unwrap();
        sink.flush_async().await.unwrap();

        assert_eq!(*backend.seen.lock(), ["n=1"]);
    }
}
