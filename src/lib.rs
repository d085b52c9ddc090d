//! Leveled, timestamped JSON log records built from `{token}` message
//! templates, positional arguments and an inherited, immutable scope.
//!
//! ```
//! use scopelog::{FixedClock, Logger, MemorySink};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let log = Logger::builder("tests")
//!     .clock(Arc::new(FixedClock::new("2024-05-04T08:39:33.905Z")))
//!     .sink(sink.clone())
//!     .build();
//!
//! let conn = log.scope_to("parser", &json!({"connection": "123p"}));
//! conn.warn("{user} sent {count} bytes", &[json!("ann"), json!(15)]).unwrap();
//!
//! assert_eq!(
//!     sink.last().unwrap().to_json_line().unwrap(),
//!     r#"{"@timestamp":"2024-05-04T08:39:33.905Z","context":"parser","level":"warn","message":"ann sent 15 bytes","connection":"123p","user":"ann","count":15}"#
//! );
//! ```

pub mod level;
mod tokenize;
pub mod scope;
pub mod record;
pub mod clock;
pub mod sink;
pub mod noop_sink;
pub mod logger;
pub mod config;
pub mod env;

#[cfg(feature = "forward")]
pub mod forward;

#[cfg(feature = "layer")]
pub mod layer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, LoggerConfig};
pub use level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use noop_sink::NoopSink;
pub use record::LogRecord;
pub use scope::Scope;
pub use sink::{LogSink, MemorySink, SinkError, StdoutSink, WriterSink};
