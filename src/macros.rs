//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They accept any
//! [`Logger`](crate::Logger), including an `Arc<dyn Logger>`.
//!
//! # Examples
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use rust_event_logger::info;
//!
//! let memory = MemorySink::new();
//! let logger = new_logger(vec![with_out(vec![memory.sink()])]);
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(memory.lines().len(), 2);
//! ```

/// Log a message at `level` with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = new_logger(vec![with_out(vec![MemorySink::new().sink()])]);
/// use rust_event_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::LoggerExt as _;
        $logger.logf($level, format_args!($($arg)+))
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = new_logger(vec![with_out(vec![MemorySink::new().sink()])]);
/// use rust_event_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message; exits the process unless the logger skips
/// exit.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # use rust_event_logger::skip_exit;
/// # let logger = new_logger(vec![with_out(vec![MemorySink::new().sink()]), skip_exit()]);
/// use rust_event_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log a panic-level message; panics unless the logger skips exit.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Panic, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, LoggerBuilder, SinkLogger};
    use crate::sinks::MemorySink;

    fn capture(filter: LogLevel) -> (SinkLogger, MemorySink) {
        let memory = MemorySink::new();
        let logger = LoggerBuilder::new()
            .out(vec![memory.sink()])
            .filter(filter)
            .skip_exit(true)
            .build_sink_logger();
        (logger, memory)
    }

    #[test]
    fn test_log_macro() {
        let (logger, memory) = capture(LogLevel::Trace);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);

        let lines = memory.lines();
        assert!(lines[0].ends_with("Test message"));
        assert!(lines[1].ends_with("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, memory) = capture(LogLevel::Trace);
        trace!(logger, "Trace message");
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Warning message");
        error!(logger, "Error: {}", "timeout");
        fatal!(logger, "Critical failure: {}", "system");
        panic_log!(logger, "Not raised");

        let contents = memory.contents();
        for level in ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL", "PANIC"] {
            assert!(contents.contains(level), "missing {}", level);
        }
    }

    #[test]
    fn test_macros_respect_filter() {
        let (logger, memory) = capture(LogLevel::Warn);
        debug!(logger, "hidden");
        warn!(logger, "shown");
        assert_eq!(memory.lines().len(), 1);
    }

    #[test]
    fn test_macro_with_shared_logger() {
        let memory = MemorySink::new();
        let logger = LoggerBuilder::new()
            .out(vec![memory.sink()])
            .build();
        let by_ref = &logger;
        info!(by_ref, "shared {}", "arc");
        assert!(memory.contents().contains("shared arc"));
    }
}
