use chrono::{SecondsFormat, Utc};

/// Source of the `@timestamp` value.
///
/// The logger treats the returned text as opaque and never parses it.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Wall clock rendering UTC ISO-8601 with millisecond precision,
/// e.g. `2024-05-04T08:39:33.905Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Clock pinned to one value. Useful in tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(now: impl Into<String>) -> Self {
        FixedClock(now.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
