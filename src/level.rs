use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// The numeric values are part of the public contract: raw levels coming
/// from configuration or foreign callers are matched against them by
/// [`LogLevel::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Text written into the `level` field of a record.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Map a raw numeric level onto the enum, `None` outside `1..=5`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(LogLevel::Error),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Info),
            4 => Some(LogLevel::Debug),
            5 => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Level text for a raw numeric level. Unknown values are reported as
    /// `"info"` rather than rejected.
    pub fn label_for_raw(raw: i64) -> &'static str {
        Self::from_raw(raw).unwrap_or(LogLevel::Info).as_str()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a level name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::TRACE => LogLevel::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_are_stable() {
        assert_eq!(LogLevel::Error as u8, 1);
        assert_eq!(LogLevel::Warn as u8, 2);
        assert_eq!(LogLevel::Info as u8, 3);
        assert_eq!(LogLevel::Debug as u8, 4);
        assert_eq!(LogLevel::Trace as u8, 5);
    }

    #[test]
    fn raw_levels_round_into_enum() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_raw(level as i64), Some(level));
        }
        assert_eq!(LogLevel::from_raw(0), None);
        assert_eq!(LogLevel::from_raw(55), None);
    }

    #[test]
    fn unknown_raw_level_is_info() {
        assert_eq!(LogLevel::label_for_raw(55), "info");
        assert_eq!(LogLevel::label_for_raw(-1), "info");
        assert_eq!(LogLevel::label_for_raw(5), "trace");
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "\"error\"");
        let level: LogLevel = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(level, LogLevel::Trace);
    }

    #[test]
    fn maps_to_and_from_tracing() {
        for level in LogLevel::ALL {
            let tracing_level: tracing::Level = level.into();
            assert_eq!(LogLevel::from(&tracing_level), level);
        }
    }
}
