use crate::record::LogRecord;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Destination for assembled [`LogRecord`]s.
///
/// Implementations do the actual output (console, file, forwarding to a
/// transport). The logger calls `write` synchronously, exactly once per
/// record, and hands any error straight back to the caller of the level
/// method. Sinks shared between threads must synchronize internally.
pub trait LogSink: Send + Sync {
    /// Emit a single record.
    ///
    /// **Returns**
    /// - `Ok(())` once the record was accepted.
    /// - `Err(..)` if the sink could not take it (I/O, serialization,
    ///   full queue). The logger does not retry.
    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush buffered output, if the sink buffers at all.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Error type returned by [`LogSink`] implementations.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log record: {0}")]
    Io(#[from] io::Error),

    #[error("log channel full, record dropped")]
    ChannelFull,

    #[error("log sink is closed")]
    Closed,
}

/// Writes each record as one line of compact JSON into `W`.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.lock().write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

/// Default sink: one JSON line per record on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        io::stdout().lock().write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        io::stdout().lock().flush()?;
        Ok(())
    }
}

/// Keeps every record in memory.
///
/// Handy for tests and for embedding code that wants to inspect what
/// would have been written.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<LogRecord> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
