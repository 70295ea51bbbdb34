//! Event encoders
//!
//! A [`Formatter`] turns an [`Event`] into the bytes a sink receives.
//! Three encoders ship with the crate:
//! - [`TextFormatter`]: human-readable line (default)
//! - [`JsonFormatter`]: one JSON object per line
//! - [`LogfmtFormatter`]: `key=value` pairs for log aggregation tools

use super::error::Result;
use super::event::{Event, DEFAULT_PREFIX, DEFAULT_SUB};
use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, TimeZone, Utc};
use colored::Colorize;
use std::sync::Arc;

/// Strategy turning an event into a byte buffer.
///
/// Implementations must be deterministic for a given event and must not
/// alter it.
pub trait Formatter: Send + Sync {
    fn format(&self, event: &Event) -> Result<Vec<u8>>;

    fn name(&self) -> &str;
}

/// Shared handle to a formatter
pub type SharedFormatter = Arc<dyn Formatter>;

/// Human-readable text format
///
/// Example: `[2025-01-08T10:30:45.123Z] [INFO ] [svc] [db] Request processed user=7`
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    /// Keep one record on one line.
    ///
    /// A single trailing newline (as produced by the `*ln` helpers) is
    /// dropped; embedded line breaks and tabs are escaped so a message cannot
    /// forge extra records.
    fn sanitize_message(message: &str) -> String {
        let message = message.strip_suffix('\n').unwrap_or(message);
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }
}

impl Formatter for TextFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let level_str = if self.use_colors {
            format!("{:5}", event.level().to_str())
                .color(event.level().color_code())
                .to_string()
        } else {
            format!("{:5}", event.level().to_str())
        };

        let mut output = format!(
            "[{}] [{}] [{}]",
            self.timestamp_format.format(event.time())?,
            level_str,
            event.prefix()
        );
        if !event.sub().is_empty() {
            output.push_str(&format!(" [{}]", event.sub()));
        }
        output.push(' ');
        output.push_str(&Self::sanitize_message(event.message()));

        if !event.metadata().is_empty() {
            output.push(' ');
            output.push_str(&event.metadata().format_fields());
        }
        output.push('\n');

        Ok(output.into_bytes())
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// JSON lines format
///
/// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","prefix":"log","message":"Request processed"}`
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multi-line indented output
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn to_value(&self, event: &Event) -> Result<serde_json::Value> {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            self.timestamp_format.to_json_value(event.time())?,
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(event.level().to_str().to_string()),
        );
        json_obj.insert(
            "prefix".to_string(),
            serde_json::Value::String(event.prefix().to_string()),
        );
        if !event.sub().is_empty() {
            json_obj.insert(
                "sub".to_string(),
                serde_json::Value::String(event.sub().to_string()),
            );
        }
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(event.message().to_string()),
        );

        if !event.metadata().is_empty() {
            let metadata = event
                .metadata()
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json_value()))
                .collect();
            json_obj.insert("metadata".to_string(), serde_json::Value::Object(metadata));
        }

        Ok(serde_json::Value::Object(json_obj))
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let value = self.to_value(event)?;
        let mut buf = if self.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        buf.push(b'\n');
        Ok(buf)
    }

    fn name(&self) -> &str {
        "json"
    }
}

impl JsonFormatter {
    /// Rebuild an event from one record written by a `JsonFormatter`.
    ///
    /// Needs a known `level` and a string `message`. A timestamp that is
    /// neither RFC 3339 nor an epoch count leaves the event stamped with the
    /// current time.
    pub fn decode(buf: &[u8]) -> Option<Event> {
        let value: serde_json::Value = serde_json::from_slice(buf).ok()?;
        let record = value.as_object()?;

        let level: LogLevel = record.get("level")?.as_str()?.parse().ok()?;
        let message = record.get("message")?.as_str()?;
        let text = |key: &str, default: &str| {
            record
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };

        let mut builder = Event::builder()
            .level(level)
            .message(message)
            .prefix(text("prefix", DEFAULT_PREFIX))
            .sub(text("sub", DEFAULT_SUB));

        if let Some(time) = record.get("timestamp").and_then(decode_timestamp) {
            builder = builder.time(time);
        }
        if let Some(metadata) = record.get("metadata").and_then(|v| v.as_object()) {
            let fields: Fields = metadata
                .iter()
                .filter_map(|(key, value)| {
                    serde_json::from_value::<FieldValue>(value.clone())
                        .ok()
                        .map(|field| (key.clone(), field))
                })
                .collect();
            builder = builder.metadata(fields);
        }
        Some(builder.build())
    }
}

/// Epoch counts are told apart by magnitude: seconds, then millis, then micros
fn decode_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    if let Some(text) = value.as_str() {
        return DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    let count = value.as_i64()?;
    match count.unsigned_abs() {
        0..=99_999_999_999 => Utc.timestamp_opt(count, 0).single(),
        100_000_000_000..=99_999_999_999_999 => Utc.timestamp_millis_opt(count).single(),
        _ => Utc
            .timestamp_opt(
                count.div_euclid(1_000_000),
                (count.rem_euclid(1_000_000) * 1_000) as u32,
            )
            .single(),
    }
}

/// Logfmt format (key=value pairs)
///
/// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO prefix=log message="Request processed"`
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
            .collect()
    }

    /// Escape a logfmt value (quote if contains spaces)
    fn escape_value(value: &str) -> String {
        if value.is_empty()
            || value.contains(' ')
            || value.contains('"')
            || value.contains('=')
            || value.contains('\n')
        {
            Self::quote_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_value(value: &str) -> String {
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        )
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        let mut parts = vec![
            format!(
                "timestamp={}",
                Self::escape_value(&self.timestamp_format.format(event.time())?)
            ),
            format!("level={}", event.level().to_str()),
            format!("prefix={}", Self::escape_value(event.prefix())),
        ];
        if !event.sub().is_empty() {
            parts.push(format!("sub={}", Self::escape_value(event.sub())));
        }
        // message is always quoted
        parts.push(format!("message={}", Self::quote_value(event.message())));

        for (key, value) in event.metadata().sorted() {
            let formatted = match value {
                FieldValue::String(s) => Self::quote_value(s),
                other => Self::escape_value(&other.to_string()),
            };
            parts.push(format!("{}={}", Self::escape_key(key), formatted));
        }

        let mut line = parts.join(" ");
        line.push('\n');
        Ok(line.into_bytes())
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(formatter: &dyn Formatter, event: &Event) -> String {
        String::from_utf8(formatter.format(event).unwrap()).unwrap()
    }

    #[test]
    fn test_text_format() {
        let event = Event::builder()
            .prefix("svc")
            .sub("db")
            .level(LogLevel::Warn)
            .message("Test message")
            .build();
        let result = text(&TextFormatter::new(), &event);

        assert!(result.contains("[WARN ]"));
        assert!(result.contains("[svc] [db] Test message"));
        assert!(result.ends_with('\n'));
    }

    #[test]
    fn test_text_format_with_fields() {
        let event = Event::builder()
            .message("User logged in")
            .metadata(Fields::new().with_field("user_id", 123).with_field("action", "login"))
            .build();
        let result = text(&TextFormatter::new(), &event);

        assert!(result.contains("User logged in action=login user_id=123"));
    }

    #[test]
    fn test_text_format_blocks_line_injection() {
        let event = Event::new(LogLevel::Info, "login\nERROR fake entry\n");
        let result = text(&TextFormatter::new(), &event);

        assert_eq!(result.lines().count(), 1);
        assert!(result.contains("login\\nERROR fake entry"));
        assert!(!result.contains("entry\\n"));
    }

    #[test]
    fn test_json_format() {
        let event = Event::builder()
            .level(LogLevel::Error)
            .message("Error occurred")
            .field("request_id", "abc-123")
            .build();
        let result = text(&JsonFormatter::new(), &event);

        let parsed: serde_json::Value = serde_json::from_str(result.trim_end()).unwrap();
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["prefix"], "log");
        assert_eq!(parsed["message"], "Error occurred");
        assert_eq!(parsed["metadata"]["request_id"], "abc-123");
        assert!(parsed["timestamp"].is_string());
        assert!(parsed.get("sub").is_none());
    }

    #[test]
    fn test_json_numeric_timestamp() {
        let formatter = JsonFormatter::new().with_timestamp_format(TimestampFormat::UnixMillis);
        let result = text(&formatter, &Event::new(LogLevel::Info, "x"));
        let parsed: serde_json::Value = serde_json::from_str(result.trim_end()).unwrap();
        assert!(parsed["timestamp"].is_number());
    }

    #[test]
    fn test_json_pretty_is_multiline() {
        let event = Event::builder().message("spread").field("k", 1).build();
        let result = text(&JsonFormatter::new().pretty(), &event);

        assert!(result.lines().count() > 1);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["message"], "spread");
    }

    #[test]
    fn test_json_decode_restores_event() {
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        let event = Event::builder()
            .prefix("svc")
            .sub("db")
            .level(LogLevel::Fatal)
            .message("disk full")
            .field("free", 0)
            .field("mount", "/var")
            .time(at)
            .build();

        for formatter in [
            JsonFormatter::new(),
            JsonFormatter::new().pretty(),
            JsonFormatter::new().with_timestamp_format(TimestampFormat::Unix),
            JsonFormatter::new().with_timestamp_format(TimestampFormat::UnixMillis),
        ] {
            let decoded = JsonFormatter::decode(&formatter.format(&event).unwrap())
                .expect("record should decode");
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_json_decode_rejects_other_input() {
        assert!(JsonFormatter::decode(b"plain text\n").is_none());
        assert!(JsonFormatter::decode(br#"{"level":"LOUD","message":"x"}"#).is_none());
        assert!(JsonFormatter::decode(br#"{"level":"INFO"}"#).is_none());

        let minimal = JsonFormatter::decode(br#"{"level":"WARN","message":"m"}"#).unwrap();
        assert_eq!(minimal.level(), LogLevel::Warn);
        assert_eq!(minimal.prefix(), DEFAULT_PREFIX);
        assert!(minimal.metadata().is_empty());
    }

    #[test]
    fn test_custom_timestamp() {
        let event = Event::builder()
            .message("x")
            .time(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
            .build();
        let result = text(&TextFormatter::new().with_custom_timestamp("%d/%m/%Y"), &event);
        assert!(result.starts_with("[08/01/2025] [INFO ]"), "got {}", result);
    }

    #[test]
    fn test_bad_timestamp_pattern_fails_every_formatter() {
        let bad = TimestampFormat::Custom("%Q".into());
        let event = Event::new(LogLevel::Info, "x");
        let formatters: [&dyn Formatter; 3] = [
            &TextFormatter::new().with_timestamp_format(bad.clone()),
            &JsonFormatter::new().with_timestamp_format(bad.clone()),
            &LogfmtFormatter::new().with_timestamp_format(bad),
        ];
        for formatter in formatters {
            let err = formatter.format(&event).unwrap_err();
            assert!(err.is_format_error(), "{}: {}", formatter.name(), err);
        }
    }

    #[test]
    fn test_logfmt_format() {
        let event = Event::builder()
            .level(LogLevel::Warn)
            .message("Warning message")
            .field("query", "SELECT * FROM users WHERE id=1")
            .field("count", 5)
            .build();
        let result = text(&LogfmtFormatter::new(), &event);

        assert!(result.contains("level=WARN"));
        assert!(result.contains("message=\"Warning message\""));
        assert!(result.contains("query=\"SELECT * FROM users WHERE id=1\""));
        assert!(result.contains("count=5"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let event = Event::builder()
            .message("same")
            .field("b", 1)
            .field("a", 2)
            .build();
        for formatter in [
            &TextFormatter::new() as &dyn Formatter,
            &JsonFormatter::new(),
            &LogfmtFormatter::new(),
        ] {
            assert_eq!(formatter.format(&event).unwrap(), formatter.format(&event).unwrap());
        }
    }
}
