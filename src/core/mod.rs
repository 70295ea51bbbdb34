//! Core logger types and traits

pub mod config;
pub mod error;
pub mod event;
pub mod fields;
pub mod formatter;
pub mod global;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod multi;
pub mod relay;
pub mod remote;
pub mod stack_trace;
pub mod timestamp;

pub use config::{
    add_out, default_config, format_json, format_logfmt, format_text, multi_conf, new_logger,
    nil_config, skip_exit, std_out, with_filter, with_format, with_out, with_prefix, with_remote,
    with_sub, LoggerBuilder, LoggerConfig, MultiConf,
};
pub use error::{LoggerError, MultiWriteError, Result};
pub use event::{Event, EventBuilder, CALL_STACK_KEY, DEFAULT_PREFIX, DEFAULT_SUB};
pub use fields::{FieldValue, Fields};
pub use formatter::{
    Formatter, JsonFormatter, LogfmtFormatter, SharedFormatter, TextFormatter,
};
pub use global::{global, init_global, teardown_global};
pub use log_level::{LevelFilter, LogLevel};
pub use logger::{Logger, LoggerExt, NilLogger, SinkLogger};
pub use metrics::LoggerMetrics;
pub use multi::{multi_logger, MultiLogger};
pub use relay::{ChanneledLogger, DEFAULT_CHANNEL_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use remote::NetworkLogger;
pub use stack_trace::{CallFrame, StackTrace, ThreadRecord};
pub use timestamp::TimestampFormat;
