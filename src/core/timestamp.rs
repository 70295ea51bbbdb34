//! Event time rendering
//!
//! Formatters render [`Event::time`](super::Event::time) through a
//! [`TimestampFormat`]; epoch formats stay numeric in JSON output.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

/// How an event's time is written
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use rust_event_logger::core::TimestampFormat;
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&at)?, "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::Unix.format(&at)?, "1736332245");
/// # Ok::<(), rust_event_logger::LoggerError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,
    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,
    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,
    /// Seconds since the epoch
    Unix,
    UnixMillis,
    UnixMicros,
    /// Any strftime pattern
    Custom(String),
}

impl TimestampFormat {
    /// Epoch count for the numeric variants, `None` for textual ones
    pub fn epoch(&self, at: &DateTime<Utc>) -> Option<i64> {
        match self {
            TimestampFormat::Unix => Some(at.timestamp()),
            TimestampFormat::UnixMillis => Some(at.timestamp_millis()),
            TimestampFormat::UnixMicros => Some(at.timestamp_micros()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }

    /// Render `at`; fails with a formatter error when a custom pattern holds
    /// an unknown specifier.
    pub fn format(&self, at: &DateTime<Utc>) -> Result<String> {
        if let Some(count) = self.epoch(at) {
            return Ok(count.to_string());
        }
        match self {
            TimestampFormat::Iso8601Micros => Ok(at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()),
            TimestampFormat::Rfc3339 => Ok(at.to_rfc3339()),
            TimestampFormat::Custom(pattern) => {
                let mut rendered = String::new();
                write!(rendered, "{}", at.format(pattern))
                    .map_err(|_| invalid_pattern(pattern))?;
                Ok(rendered)
            }
            _ => Ok(at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        }
    }

    /// JSON number for epoch formats, JSON string otherwise
    pub fn to_json_value(&self, at: &DateTime<Utc>) -> Result<serde_json::Value> {
        match self.epoch(at) {
            Some(count) => Ok(serde_json::Value::from(count)),
            None => Ok(serde_json::Value::from(self.format(at)?)),
        }
    }
}

fn invalid_pattern(pattern: &str) -> LoggerError {
    LoggerError::formatter(
        "timestamp",
        format!("invalid strftime pattern '{}'", pattern),
    )
}

fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Parses the variant names case-insensitively; anything containing `%` is
/// taken as a custom pattern.
impl FromStr for TimestampFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        if name.contains('%') {
            if !is_valid_pattern(name) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("invalid strftime pattern '{}'", name),
                ));
            }
            return Ok(TimestampFormat::Custom(name.to_string()));
        }
        match name.to_ascii_lowercase().as_str() {
            "iso8601" | "iso" => Ok(TimestampFormat::Iso8601),
            "iso8601micros" | "iso8601_micros" => Ok(TimestampFormat::Iso8601Micros),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "unix" => Ok(TimestampFormat::Unix),
            "unixmillis" | "unix_millis" => Ok(TimestampFormat::UnixMillis),
            "unixmicros" | "unix_micros" => Ok(TimestampFormat::UnixMicros),
            _ => Err(LoggerError::config(
                "TimestampFormat",
                format!("unknown timestamp format '{}'", name),
            )),
        }
    }
}
