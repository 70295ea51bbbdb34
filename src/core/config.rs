//! Composable logger configuration
//!
//! A [`LoggerConfig`] is one reusable option that edits a [`LoggerBuilder`].
//! Options are applied in order, so for scalar settings the last one wins.
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use rust_event_logger::{format_json, multi_conf, new_logger, skip_exit, with_prefix};
//!
//! let memory = MemorySink::new();
//! let service = multi_conf(vec![with_prefix("svc"), format_json(), skip_exit()]);
//! let logger = new_logger(vec![service, with_out(vec![memory.sink()])]);
//!
//! logger.info("up");
//! assert!(memory.contents().contains("\"prefix\":\"svc\""));
//! ```

use super::{
    event::{DEFAULT_PREFIX, DEFAULT_SUB},
    formatter::{Formatter, JsonFormatter, LogfmtFormatter, SharedFormatter, TextFormatter},
    log_level::LevelFilter,
    logger::{Logger, NilLogger, SinkLogger},
    remote::NetworkLogger,
};
use crate::sinks::{ConnAddr, Sink};
use std::fmt;
use std::sync::Arc;

/// One configuration option
pub trait LoggerConfig: Send + Sync {
    fn apply(&self, builder: &mut LoggerBuilder);
}

impl<F> LoggerConfig for F
where
    F: Fn(&mut LoggerBuilder) + Send + Sync,
{
    fn apply(&self, builder: &mut LoggerBuilder) {
        self(builder)
    }
}

/// Accumulated logger settings
#[derive(Clone, Default)]
pub struct LoggerBuilder {
    out: Option<Sink>,
    remotes: Vec<ConnAddr>,
    formatter: Option<SharedFormatter>,
    prefix: Option<String>,
    sub: Option<String>,
    filter: LevelFilter,
    skip_exit: bool,
    nil: bool,
}

impl LoggerBuilder {
    /// Defaults: stderr, text formatter, prefix `log`, every level
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with `configs` applied in order
    pub fn from_configs<I>(configs: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn LoggerConfig>>,
    {
        Self::new().configure(configs)
    }

    #[must_use = "builder methods return a new value"]
    pub fn configure<I>(mut self, configs: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn LoggerConfig>>,
    {
        for config in configs {
            config.apply(&mut self);
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Replace the destination; several sinks are joined into one
    #[must_use = "builder methods return a new value"]
    pub fn out(mut self, sinks: Vec<Sink>) -> Self {
        self.set_out(sinks);
        self
    }

    /// Join more sinks onto the current destination
    #[must_use = "builder methods return a new value"]
    pub fn add_out(mut self, sinks: Vec<Sink>) -> Self {
        self.push_out(sinks);
        self
    }

    /// Send events to remote addresses; makes `build` produce a
    /// [`NetworkLogger`]
    #[must_use = "builder methods return a new value"]
    pub fn remote(mut self, addr: ConnAddr) -> Self {
        self.remotes.push(addr);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Minimum level; accepts a [`LogLevel`](super::LogLevel) or a raw code
    #[must_use = "builder methods return a new value"]
    pub fn filter(mut self, filter: impl Into<LevelFilter>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Keep `Fatal` and `Panic` events from ending control flow
    #[must_use = "builder methods return a new value"]
    pub fn skip_exit(mut self, skip_exit: bool) -> Self {
        self.skip_exit = skip_exit;
        self
    }

    /// Make `build` return a [`NilLogger`]
    #[must_use = "builder methods return a new value"]
    pub fn nil(mut self) -> Self {
        self.nil = true;
        self
    }

    fn set_out(&mut self, sinks: Vec<Sink>) {
        self.out = Some(Sink::join(sinks));
    }

    fn push_out(&mut self, sinks: Vec<Sink>) {
        if sinks.is_empty() {
            return;
        }
        let mut joined = Vec::with_capacity(sinks.len() + 1);
        joined.extend(self.out.take());
        joined.extend(sinks);
        self.out = Some(Sink::join(joined));
    }

    /// Build the configured logger variant
    pub fn build(self) -> Arc<dyn Logger> {
        if self.nil {
            return Arc::new(NilLogger);
        }
        if !self.remotes.is_empty() {
            let remotes = self.remotes.clone();
            return Arc::new(NetworkLogger::new(self.build_sink_logger(), remotes));
        }
        Arc::new(self.build_sink_logger())
    }

    /// Build a [`SinkLogger`], ignoring `nil` and remote addresses
    pub fn build_sink_logger(self) -> SinkLogger {
        SinkLogger::from_parts(
            self.out.unwrap_or_else(Sink::stderr),
            self.formatter
                .unwrap_or_else(|| Arc::new(TextFormatter::new())),
            self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            self.sub.unwrap_or_else(|| DEFAULT_SUB.to_string()),
            self.filter,
            self.skip_exit,
        )
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("out", &self.out)
            .field("remotes", &self.remotes)
            .field("formatter", &self.formatter.as_ref().map(|fmt| fmt.name()))
            .field("prefix", &self.prefix)
            .field("sub", &self.sub)
            .field("filter", &self.filter)
            .field("skip_exit", &self.skip_exit)
            .field("nil", &self.nil)
            .finish()
    }
}

/// Build a logger from options applied over the defaults
pub fn new_logger<I>(configs: I) -> Arc<dyn Logger>
where
    I: IntoIterator<Item = Box<dyn LoggerConfig>>,
{
    LoggerBuilder::from_configs(configs).build()
}

struct WithPrefix(String);

impl LoggerConfig for WithPrefix {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.prefix = Some(self.0.clone());
    }
}

pub fn with_prefix(prefix: impl Into<String>) -> Box<dyn LoggerConfig> {
    Box::new(WithPrefix(prefix.into()))
}

struct WithSub(String);

impl LoggerConfig for WithSub {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.sub = Some(self.0.clone());
    }
}

pub fn with_sub(sub: impl Into<String>) -> Box<dyn LoggerConfig> {
    Box::new(WithSub(sub.into()))
}

struct WithOut(Vec<Sink>);

impl LoggerConfig for WithOut {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.set_out(self.0.clone());
    }
}

/// Replace the destination. An empty list selects stderr.
pub fn with_out(sinks: Vec<Sink>) -> Box<dyn LoggerConfig> {
    Box::new(WithOut(sinks))
}

struct AddOut(Vec<Sink>);

impl LoggerConfig for AddOut {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.push_out(self.0.clone());
    }
}

/// Join sinks onto whatever destination earlier options chose
pub fn add_out(sinks: Vec<Sink>) -> Box<dyn LoggerConfig> {
    Box::new(AddOut(sinks))
}

struct WithRemote(ConnAddr);

impl LoggerConfig for WithRemote {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.remotes.push(self.0.clone());
    }
}

pub fn with_remote(addr: ConnAddr) -> Box<dyn LoggerConfig> {
    Box::new(WithRemote(addr))
}

struct WithFormat(SharedFormatter);

impl LoggerConfig for WithFormat {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.formatter = Some(Arc::clone(&self.0));
    }
}

pub fn with_format<F: Formatter + 'static>(formatter: F) -> Box<dyn LoggerConfig> {
    Box::new(WithFormat(Arc::new(formatter)))
}

struct WithFilter(LevelFilter);

impl LoggerConfig for WithFilter {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.filter = self.0;
    }
}

pub fn with_filter(filter: impl Into<LevelFilter>) -> Box<dyn LoggerConfig> {
    Box::new(WithFilter(filter.into()))
}

struct SkipExit;

impl LoggerConfig for SkipExit {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.skip_exit = true;
    }
}

pub fn skip_exit() -> Box<dyn LoggerConfig> {
    Box::new(SkipExit)
}

struct NilConfig;

impl LoggerConfig for NilConfig {
    fn apply(&self, builder: &mut LoggerBuilder) {
        builder.nil = true;
    }
}

/// Produce a [`NilLogger`] regardless of other options
pub fn nil_config() -> Box<dyn LoggerConfig> {
    Box::new(NilConfig)
}

/// Several options bundled into one, applied in order
pub struct MultiConf {
    configs: Vec<Box<dyn LoggerConfig>>,
}

impl MultiConf {
    pub fn new(configs: Vec<Box<dyn LoggerConfig>>) -> Self {
        Self { configs }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl LoggerConfig for MultiConf {
    fn apply(&self, builder: &mut LoggerBuilder) {
        for config in &self.configs {
            config.apply(builder);
        }
    }
}

pub fn multi_conf(configs: Vec<Box<dyn LoggerConfig>>) -> Box<dyn LoggerConfig> {
    Box::new(MultiConf::new(configs))
}

// Presets

/// Stderr, text, prefix `log`, no sub, every level
pub fn default_config() -> Box<dyn LoggerConfig> {
    multi_conf(vec![
        with_out(Vec::new()),
        format_text(),
        with_prefix(DEFAULT_PREFIX),
        with_sub(DEFAULT_SUB),
        with_filter(LevelFilter::ALL),
    ])
}

pub fn std_out() -> Box<dyn LoggerConfig> {
    with_out(vec![Sink::stdout()])
}

pub fn format_text() -> Box<dyn LoggerConfig> {
    with_format(TextFormatter::new())
}

pub fn format_json() -> Box<dyn LoggerConfig> {
    with_format(JsonFormatter::new())
}

pub fn format_logfmt() -> Box<dyn LoggerConfig> {
    with_format(LogfmtFormatter::new())
}
