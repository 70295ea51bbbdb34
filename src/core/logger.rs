//! Logger capability and the single-sink pipeline

use super::{
    config::LoggerBuilder,
    error::{LoggerError, Result},
    event::{Event, DEFAULT_PREFIX, DEFAULT_SUB},
    fields::Fields,
    formatter::{Formatter, JsonFormatter, SharedFormatter},
    log_level::{LevelFilter, LogLevel},
    metrics::LoggerMetrics,
};
use crate::sinks::{partition, ConnAddr, Out, Sink};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Common surface of every logger variant.
///
/// Variants: [`SinkLogger`], [`MultiLogger`](super::MultiLogger),
/// [`ChanneledLogger`](super::ChanneledLogger),
/// [`NetworkLogger`](super::NetworkLogger) and [`NilLogger`].
pub trait Logger: Send + Sync {
    /// Filter, default, format and write one event.
    ///
    /// Returns the number of bytes written; `Ok(0)` when the event was below
    /// the level filter.
    fn output(&self, event: &Event) -> Result<usize>;

    /// Like [`output`](Logger::output), then ends control flow for `Panic`
    /// (panics with the message) and `Fatal` (exits the process) unless
    /// [`is_skip_exit`](Logger::is_skip_exit) is set.
    fn log(&self, event: &Event) -> Result<usize> {
        let result = self.output(event);
        terminate_if_needed(event, self.is_skip_exit());
        result
    }

    /// Raw byte path used when a logger is installed as a sink.
    ///
    /// Returns how many bytes of `buf` were consumed.
    fn write(&self, buf: &[u8]) -> Result<usize>;

    fn set_prefix(&self, prefix: &str);

    fn set_sub(&self, sub: &str);

    /// Pending metadata, merged into the next emitted event only
    fn set_fields(&self, fields: Fields);

    fn prefix(&self) -> String;

    fn sub(&self) -> String;

    fn is_skip_exit(&self) -> bool;

    /// Replace local writers; loggers without local writers ignore this
    fn set_writers(&self, _sinks: Vec<Sink>) {}

    fn add_writers(&self, _sinks: Vec<Sink>) {}

    /// Replace remote addresses; loggers without remote sinks ignore this
    fn set_remotes(&self, _addrs: Vec<ConnAddr>) {}

    fn add_remotes(&self, _addrs: Vec<ConnAddr>) {}

    /// Route writers and addresses to the matching re-dispatch method.
    ///
    /// An empty list resets local writers to the default console sink.
    fn set_outs(&self, outs: Vec<Out>) {
        if outs.is_empty() {
            self.set_writers(Vec::new());
            return;
        }
        let (writers, remotes) = partition(outs);
        if !writers.is_empty() {
            self.set_writers(writers);
        }
        if !remotes.is_empty() {
            self.set_remotes(remotes);
        }
    }

    fn add_outs(&self, outs: Vec<Out>) {
        let (writers, remotes) = partition(outs);
        if !writers.is_empty() {
            self.add_writers(writers);
        }
        if !remotes.is_empty() {
            self.add_remotes(remotes);
        }
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Members of a fan-out, used to flatten nested composition
    fn members(&self) -> Option<Vec<Arc<dyn Logger>>> {
        None
    }

    fn is_nil(&self) -> bool {
        false
    }
}

/// Panic or exit after an event at a terminal level was handled
pub(crate) fn terminate_if_needed(event: &Event, skip_exit: bool) {
    if skip_exit || !event.level().is_terminal() {
        return;
    }
    match event.level() {
        LogLevel::Panic => panic!("{}", event.message()),
        LogLevel::Fatal => std::process::exit(1),
        _ => {}
    }
}

macro_rules! level_helpers {
    ($plain:ident, $line:ident, $formatted:ident, $level:ident) => {
        fn $plain(&self, msg: impl fmt::Display) {
            let _ = self.log(&Event::new(LogLevel::$level, msg.to_string()));
        }

        fn $line(&self, msg: impl fmt::Display) {
            let _ = self.log(&Event::new(LogLevel::$level, format!("{}\n", msg)));
        }

        fn $formatted(&self, args: fmt::Arguments<'_>) {
            self.logf(LogLevel::$level, args);
        }
    };
}

/// Per-level helpers for every [`Logger`].
///
/// Each level comes in three flavours: `info(msg)`, `infoln(msg)` (adds a
/// trailing newline) and `infof(format_args!(..))`. Errors are discarded;
/// call [`Logger::output`] to observe them.
pub trait LoggerExt: Logger {
    fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let _ = self.log(&Event::new(level, fmt::format(args)));
    }

    fn print(&self, msg: impl fmt::Display) {
        let _ = self.log(&Event::new(LogLevel::Info, msg.to_string()));
    }

    fn println(&self, msg: impl fmt::Display) {
        let _ = self.log(&Event::new(LogLevel::Info, format!("{}\n", msg)));
    }

    fn printf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Info, args);
    }

    level_helpers!(trace, traceln, tracef, Trace);
    level_helpers!(debug, debugln, debugf, Debug);
    level_helpers!(info, infoln, infof, Info);
    level_helpers!(warn, warnln, warnf, Warn);
    level_helpers!(error, errorln, errorf, Error);
    level_helpers!(fatal, fatalln, fatalf, Fatal);
    level_helpers!(panic, panicln, panicf, Panic);
}

impl<L: Logger + ?Sized> LoggerExt for L {}

struct State {
    sink: Sink,
    formatter: SharedFormatter,
    prefix: String,
    sub: String,
    filter: LevelFilter,
    skip_exit: bool,
    pending: Fields,
}

/// The core pipeline: one sink, one formatter, one lock.
///
/// Every read and write of the configuration happens under the lock, so
/// concurrent `output` calls reach the sink one at a time and in lock order.
///
/// # Example
/// ```
/// use rust_event_logger::prelude::*;
///
/// let memory = MemorySink::new();
/// let logger = LoggerBuilder::new()
///     .prefix("svc")
///     .filter(LogLevel::Warn)
///     .out(vec![memory.sink()])
///     .build_sink_logger();
///
/// assert_eq!(logger.output(&Event::new(LogLevel::Info, "x")).unwrap(), 0);
/// assert!(logger.output(&Event::new(LogLevel::Error, "y")).unwrap() > 0);
/// assert!(memory.contents().contains("[svc] y"));
/// ```
pub struct SinkLogger {
    state: Mutex<State>,
    metrics: LoggerMetrics,
}

impl SinkLogger {
    pub(crate) fn from_parts(
        sink: Sink,
        formatter: SharedFormatter,
        prefix: String,
        sub: String,
        filter: LevelFilter,
        skip_exit: bool,
    ) -> Self {
        Self {
            state: Mutex::new(State {
                sink,
                formatter,
                prefix,
                sub,
                filter,
                skip_exit,
                pending: Fields::new(),
            }),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Builder for constructing a logger with a fluent API
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn filter(&self) -> LevelFilter {
        self.state.lock().filter
    }

    pub fn set_filter(&self, filter: impl Into<LevelFilter>) {
        self.state.lock().filter = filter.into();
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        self.state.lock().formatter = Arc::new(formatter);
    }

    pub fn formatter_name(&self) -> String {
        self.state.lock().formatter.name().to_string()
    }

    pub fn set_skip_exit(&self, skip_exit: bool) {
        self.state.lock().skip_exit = skip_exit;
    }

    /// Handle to the current sink
    pub fn sink(&self) -> Sink {
        self.state.lock().sink.clone()
    }

    /// Metadata waiting for the next event
    pub fn pending_fields(&self) -> Fields {
        self.state.lock().pending.clone()
    }
}

impl Logger for SinkLogger {
    fn output(&self, event: &Event) -> Result<usize> {
        let mut state = self.state.lock();

        if !state.filter.allows(event.level()) {
            self.metrics.record_filtered();
            return Ok(0);
        }

        let merged = event.with_defaults(&state.prefix, &state.sub, &state.pending);
        state.pending = Fields::new();

        let buf = match state.formatter.format(&merged) {
            Ok(buf) => buf,
            Err(e) => {
                self.metrics.record_failed();
                return Err(e);
            }
        };

        match state.sink.write_record(&buf) {
            Ok(n) => {
                self.metrics.record_written(n);
                Ok(n)
            }
            Err(e) => {
                self.metrics.record_failed();
                Err(LoggerError::io_operation(
                    "writing event",
                    state.sink.name().to_string(),
                    e,
                ))
            }
        }
    }

    /// A buffer holding a serde-encoded [`Event`] or a record written by
    /// [`JsonFormatter`] is emitted as that event; anything else becomes the
    /// message of an `Info` event.
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let event = serde_json::from_slice::<Event>(buf)
            .ok()
            .or_else(|| JsonFormatter::decode(buf))
            .unwrap_or_else(|| {
                let text = String::from_utf8_lossy(buf);
                let message = text.strip_suffix('\n').unwrap_or(&text);
                Event::new(LogLevel::Info, message)
            });
        self.output(&event)?;
        Ok(buf.len())
    }

    fn set_prefix(&self, prefix: &str) {
        self.state.lock().prefix = prefix.to_string();
    }

    fn set_sub(&self, sub: &str) {
        self.state.lock().sub = sub.to_string();
    }

    fn set_fields(&self, fields: Fields) {
        self.state.lock().pending = fields;
    }

    fn prefix(&self) -> String {
        self.state.lock().prefix.clone()
    }

    fn sub(&self) -> String {
        self.state.lock().sub.clone()
    }

    fn is_skip_exit(&self) -> bool {
        self.state.lock().skip_exit
    }

    fn set_writers(&self, sinks: Vec<Sink>) {
        self.state.lock().sink = Sink::join(sinks);
    }

    fn add_writers(&self, sinks: Vec<Sink>) {
        if sinks.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        let mut joined = Vec::with_capacity(sinks.len() + 1);
        joined.push(state.sink.clone());
        joined.extend(sinks);
        state.sink = Sink::join(joined);
    }

    fn flush(&self) -> Result<()> {
        let sink = self.state.lock().sink.clone();
        sink.flush_sink()?;
        Ok(())
    }
}

impl fmt::Debug for SinkLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SinkLogger")
            .field("sink", &state.sink)
            .field("formatter", &state.formatter.name())
            .field("prefix", &state.prefix)
            .field("sub", &state.sub)
            .field("filter", &state.filter)
            .field("skip_exit", &state.skip_exit)
            .finish()
    }
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NilLogger;

impl Logger for NilLogger {
    fn output(&self, _event: &Event) -> Result<usize> {
        Ok(0)
    }

    fn log(&self, _event: &Event) -> Result<usize> {
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        Ok(buf.len())
    }

    fn set_prefix(&self, _prefix: &str) {}

    fn set_sub(&self, _sub: &str) {}

    fn set_fields(&self, _fields: Fields) {}

    fn prefix(&self) -> String {
        DEFAULT_PREFIX.to_string()
    }

    fn sub(&self) -> String {
        DEFAULT_SUB.to_string()
    }

    fn is_skip_exit(&self) -> bool {
        true
    }

    fn is_nil(&self) -> bool {
        true
    }
}
