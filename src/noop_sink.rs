use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the cost of record assembly without any output,
/// and for code paths that must hold a logger but should stay silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
