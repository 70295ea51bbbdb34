//! Event: one immutable log record

use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use super::stack_trace::StackTrace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix an event carries when the caller did not pick one
pub const DEFAULT_PREFIX: &str = "log";

/// Sub-prefix an event carries when the caller did not pick one
pub const DEFAULT_SUB: &str = "";

/// Metadata key under which `call_stack` stores the captured trace
pub const CALL_STACK_KEY: &str = "callstack";

/// One log record.
///
/// Events are built once through [`EventBuilder`] and never mutated; loggers
/// that need to fill in defaults produce a new `Event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    time: DateTime<Utc>,
    prefix: String,
    sub: String,
    level: LogLevel,
    message: String,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    metadata: Fields,
}

impl Event {
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Shorthand for an event with default prefix and no metadata
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        EventBuilder::new().level(level).message(message).build()
    }

    pub fn time(&self) -> &DateTime<Utc> {
        &self.time
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sub(&self) -> &str {
        &self.sub
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Fields {
        &self.metadata
    }

    /// A builder seeded with this event's content; building it yields a new
    /// event with a fresh timestamp.
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder {
            prefix: self.prefix.clone(),
            sub: self.sub.clone(),
            level: self.level,
            message: self.message.clone(),
            metadata: self.metadata.clone(),
            time: None,
        }
    }

    /// Fill in logger-side defaults, returning a new event.
    ///
    /// The default prefix/sub sentinel is replaced by the logger's value when
    /// the logger's is not the sentinel itself. Logger metadata is adopted when
    /// the event has none, otherwise only keys the event lacks are added.
    pub(crate) fn with_defaults(&self, prefix: &str, sub: &str, metadata: &Fields) -> Event {
        let mut merged = self.clone();
        if merged.prefix == DEFAULT_PREFIX && prefix != DEFAULT_PREFIX {
            merged.prefix = prefix.to_string();
        }
        if merged.sub == DEFAULT_SUB && sub != DEFAULT_SUB {
            merged.sub = sub.to_string();
        }
        if merged.metadata.is_empty() {
            merged.metadata = metadata.clone();
        } else if !metadata.is_empty() {
            merged.metadata.merge_missing(metadata);
        }
        merged
    }
}

/// Builder for [`Event`]
#[derive(Debug, Clone)]
pub struct EventBuilder {
    prefix: String,
    sub: String,
    level: LogLevel,
    message: String,
    metadata: Fields,
    time: Option<DateTime<Utc>>,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            sub: DEFAULT_SUB.to_string(),
            level: LogLevel::default(),
            message: String::new(),
            metadata: Fields::new(),
            time: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = sub.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Append metadata; keys given later replace earlier ones
    #[must_use = "builder methods return a new value"]
    pub fn metadata(mut self, fields: Fields) -> Self {
        self.metadata.extend(fields);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.metadata.add_field(key, value);
        self
    }

    /// Pin the event time; unset, `build` stamps the current time
    #[must_use = "builder methods return a new value"]
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Capture the calling thread's stack (and, with `all`, the other
    /// threads' states) into the `callstack` metadata field.
    #[must_use = "builder methods return a new value"]
    pub fn call_stack(mut self, all: bool) -> Self {
        let trace = StackTrace::capture(all);
        self.metadata.add_field(CALL_STACK_KEY, trace.to_field().clone());
        self
    }

    pub fn build(self) -> Event {
        Event {
            time: self.time.unwrap_or_else(Utc::now),
            prefix: self.prefix,
            sub: self.sub,
            level: self.level,
            message: self.message,
            metadata: self.metadata,
        }
    }
}
