//! # Rust Event Logger
//!
//! Structured event logging built from small composable pieces.
//!
//! ## Features
//!
//! - **Events**: immutable records with level, prefix, sub-prefix and metadata
//! - **Pipelines**: one sink, one formatter, a level filter and pending fields
//! - **Fan-out**: several loggers composed into one, flattened and nil-free
//! - **Relay**: a background worker fed over a bounded channel
//! - **Call stacks**: captured traces parsed into per-thread metadata
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use rust_event_logger::info;
//!
//! let memory = MemorySink::new();
//! let logger = new_logger(vec![with_prefix("app"), with_out(vec![memory.sink()])]);
//!
//! info!(logger, "listening on {}", 8080);
//! assert!(memory.contents().contains("[app] listening on 8080"));
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        multi_logger, new_logger, with_filter, with_format, with_out, with_prefix, with_sub,
        ChanneledLogger, Event, FieldValue, Fields, JsonFormatter, LevelFilter, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerExt, LoggerMetrics, Result, SinkLogger,
        TextFormatter,
    };
    pub use crate::sinks::{MemorySink, Sink};
}

pub use crate::core::{
    add_out, default_config, format_json, format_logfmt, format_text, global, init_global,
    multi_conf, multi_logger, new_logger, nil_config, skip_exit, std_out, teardown_global,
    with_filter, with_format, with_out, with_prefix, with_remote, with_sub, CallFrame,
    ChanneledLogger, Event, EventBuilder, FieldValue, Fields, Formatter, JsonFormatter,
    LevelFilter, LogLevel, LogfmtFormatter, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerExt, LoggerMetrics, MultiConf, MultiLogger, MultiWriteError, NetworkLogger, NilLogger,
    Result, SinkLogger, StackTrace, TextFormatter, ThreadRecord, TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::sinks::{ConnAddr, MemorySink, Out, Sink};
