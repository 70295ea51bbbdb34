//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event severity.
///
/// Numeric codes are part of the wire format: codes 6, 7 and 8 are reserved
/// and never assigned, so `Panic` sits at 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Panic = 9,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
        }
    }

    /// Levels whose `log` path ends normal control flow
    pub fn is_terminal(&self) -> bool {
        matches!(self, LogLevel::Fatal | LogLevel::Panic)
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Panic => Magenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "PANIC" => Ok(LogLevel::Panic),
            _ => Err(LoggerError::InvalidLevel(format!("'{}'", s))),
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LoggerError;

    fn try_from(code: u8) -> Result<Self, LoggerError> {
        match code {
            0 => Ok(LogLevel::Trace),
            1 => Ok(LogLevel::Debug),
            2 => Ok(LogLevel::Info),
            3 => Ok(LogLevel::Warn),
            4 => Ok(LogLevel::Error),
            5 => Ok(LogLevel::Fatal),
            9 => Ok(LogLevel::Panic),
            6..=8 => Err(LoggerError::InvalidLevel(format!("reserved code {}", code))),
            _ => Err(LoggerError::InvalidLevel(format!("unknown code {}", code))),
        }
    }
}

/// Minimum numeric level an event needs to pass a logger.
///
/// Built from a [`LogLevel`] or from a raw code, so reserved codes can be
/// used as thresholds too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LevelFilter(u8);

impl LevelFilter {
    /// Lets every event through
    pub const ALL: LevelFilter = LevelFilter(0);

    pub const fn new(code: u8) -> Self {
        LevelFilter(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn allows(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.0
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        LevelFilter(level.as_u8())
    }
}

impl From<u8> for LevelFilter {
    fn from(code: u8) -> Self {
        LevelFilter(code)
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match LogLevel::try_from(self.0) {
            Ok(level) => write!(f, "{}", level),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_keep_gap() {
        assert_eq!(LogLevel::Fatal.as_u8(), 5);
        assert_eq!(LogLevel::Panic.as_u8(), 9);
        for code in 6..=8 {
            assert!(LogLevel::try_from(code).is_err());
        }
        assert!(LogLevel::try_from(10).is_err());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" Panic ".parse::<LogLevel>().unwrap(), LogLevel::Panic);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_filter_from_level_and_code() {
        let filter = LevelFilter::from(LogLevel::Warn);
        assert!(!filter.allows(LogLevel::Info));
        assert!(filter.allows(LogLevel::Warn));
        assert!(filter.allows(LogLevel::Panic));

        let reserved = LevelFilter::from(7u8);
        assert!(!reserved.allows(LogLevel::Fatal));
        assert!(reserved.allows(LogLevel::Panic));
        assert_eq!(reserved.to_string(), "7");
        assert_eq!(LevelFilter::from(LogLevel::Error).to_string(), "ERROR");
    }

    #[test]
    fn test_try_from_matches_codes() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::try_from(level.as_u8()).unwrap(), level);
        }
    }

    #[test]
    fn test_const_filter() {
        const ERRORS_ONLY: LevelFilter = LevelFilter::new(4);
        assert_eq!(ERRORS_ONLY, LevelFilter::from(LogLevel::Error));
        assert_eq!(ERRORS_ONLY.code(), 4);
        assert!(!ERRORS_ONLY.allows(LogLevel::Warn));
    }

    #[test]
    fn test_terminal_levels() {
        let terminal: Vec<_> = LogLevel::ALL.iter().filter(|l| l.is_terminal()).collect();
        assert_eq!(terminal, [&LogLevel::Fatal, &LogLevel::Panic]);
    }
}
