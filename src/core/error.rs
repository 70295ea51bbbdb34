//! Error types for the logger system

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// A sink accepted fewer bytes than it was given
    #[error("Short write on {sink}: wrote {written} of {expected} bytes")]
    ShortWrite {
        sink: String,
        written: usize,
        expected: usize,
    },

    /// Aggregated failures from a fan-out raw write
    #[error(transparent)]
    MultiWrite(#[from] MultiWriteError),

    /// Channel send error
    #[error("Failed to send log event to relay worker")]
    ChannelSendError,

    /// Relay already stopped
    #[error("Relay worker already stopped")]
    RelayStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Unknown level name or reserved level code
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a short write error
    pub fn short_write(sink: impl Into<String>, written: usize, expected: usize) -> Self {
        LoggerError::ShortWrite {
            sink: sink.into(),
            written,
            expected,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors raised while serializing an event
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            LoggerError::FormatterError { .. } | LoggerError::JsonError(_)
        )
    }
}

impl From<LoggerError> for std::io::Error {
    fn from(err: LoggerError) -> Self {
        match err {
            LoggerError::IoError(e) => e,
            LoggerError::IoOperation { source, .. } => source,
            LoggerError::ShortWrite { .. } => {
                std::io::Error::new(std::io::ErrorKind::WriteZero, err)
            }
            other => std::io::Error::other(other),
        }
    }
}

/// Every failure collected from one fan-out raw write, in member order.
#[derive(Debug, Default)]
pub struct MultiWriteError {
    errors: Vec<LoggerError>,
}

impl MultiWriteError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: LoggerError) {
        self.errors.push(err);
    }

    pub fn errors(&self) -> &[LoggerError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was collected, otherwise the aggregate
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::MultiWrite(self))
        }
    }
}

impl fmt::Display for MultiWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} member write(s) failed", self.errors.len())?;
        for err in &self.errors {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
