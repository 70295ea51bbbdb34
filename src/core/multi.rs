//! Fan-out over several loggers

use super::{
    error::{LoggerError, MultiWriteError, Result},
    event::Event,
    fields::Fields,
    logger::Logger,
};
use crate::sinks::{ConnAddr, Sink};
use std::fmt;
use std::sync::Arc;

/// Forwards every call to each member, in member order.
///
/// Built through [`multi_logger`], which flattens nested fan-outs and drops
/// nil members, so a `MultiLogger` always has at least two members.
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

/// Compose loggers into one.
///
/// Nested fan-outs are flattened and nil loggers skipped. Returns `None` when
/// nothing is left, the surviving logger itself when one is left, and a
/// [`MultiLogger`] otherwise.
///
/// # Example
/// ```
/// use rust_event_logger::prelude::*;
/// use rust_event_logger::{multi_logger, nil_config, new_logger};
///
/// let a = MemorySink::new();
/// let b = MemorySink::new();
/// let first = new_logger(vec![with_out(vec![a.sink()])]);
/// let second = new_logger(vec![with_out(vec![b.sink()])]);
///
/// let nil = new_logger(vec![nil_config()]);
/// assert!(multi_logger(vec![nil.clone()]).is_none());
///
/// let both = multi_logger(vec![first, nil, second]).unwrap();
/// assert_eq!(both.members().unwrap().len(), 2);
///
/// both.info("hello");
/// assert_eq!(a.lines().len(), 1);
/// assert_eq!(b.lines().len(), 1);
/// ```
pub fn multi_logger<I>(loggers: I) -> Option<Arc<dyn Logger>>
where
    I: IntoIterator<Item = Arc<dyn Logger>>,
{
    let mut flat: Vec<Arc<dyn Logger>> = Vec::new();
    for logger in loggers {
        if logger.is_nil() {
            continue;
        }
        match logger.members() {
            Some(members) => flat.extend(members.into_iter().filter(|m| !m.is_nil())),
            None => flat.push(logger),
        }
    }

    match flat.len() {
        0 => None,
        1 => flat.pop(),
        _ => Some(Arc::new(MultiLogger { loggers: flat })),
    }
}

impl MultiLogger {
    pub fn loggers(&self) -> &[Arc<dyn Logger>] {
        &self.loggers
    }

    /// Output each event in turn, stopping at the first error
    pub fn log_all(&self, events: &[Event]) -> Result<usize> {
        let mut total = 0;
        for event in events {
            total += self.log(event)?;
        }
        Ok(total)
    }
}

impl Logger for MultiLogger {
    /// Total bytes written by all members; the first failing member aborts
    /// the fan-out and later members are not called.
    fn output(&self, event: &Event) -> Result<usize> {
        let mut total = 0;
        for logger in &self.loggers {
            total += logger.output(event)?;
        }
        Ok(total)
    }

    /// Every member is attempted. Errors and short writes are collected into
    /// one [`MultiWriteError`].
    fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut failures = MultiWriteError::new();
        for (index, logger) in self.loggers.iter().enumerate() {
            match logger.write(buf) {
                Ok(n) if n < buf.len() => failures.push(LoggerError::short_write(
                    format!("member #{}", index),
                    n,
                    buf.len(),
                )),
                Ok(_) => {}
                Err(e) => failures.push(e),
            }
        }
        failures.into_result()?;
        Ok(buf.len())
    }

    fn set_prefix(&self, prefix: &str) {
        for logger in &self.loggers {
            logger.set_prefix(prefix);
        }
    }

    fn set_sub(&self, sub: &str) {
        for logger in &self.loggers {
            logger.set_sub(sub);
        }
    }

    fn set_fields(&self, fields: Fields) {
        for logger in &self.loggers {
            logger.set_fields(fields.clone());
        }
    }

    /// Prefix of the first member
    fn prefix(&self) -> String {
        self.loggers
            .first()
            .map(|l| l.prefix())
            .unwrap_or_default()
    }

    fn sub(&self) -> String {
        self.loggers.first().map(|l| l.sub()).unwrap_or_default()
    }

    /// True when any member skips exit
    fn is_skip_exit(&self) -> bool {
        self.loggers.iter().any(|l| l.is_skip_exit())
    }

    fn set_writers(&self, sinks: Vec<Sink>) {
        for logger in &self.loggers {
            logger.set_writers(sinks.clone());
        }
    }

    fn add_writers(&self, sinks: Vec<Sink>) {
        for logger in &self.loggers {
            logger.add_writers(sinks.clone());
        }
    }

    fn set_remotes(&self, addrs: Vec<ConnAddr>) {
        for logger in &self.loggers {
            logger.set_remotes(addrs.clone());
        }
    }

    fn add_remotes(&self, addrs: Vec<ConnAddr>) {
        for logger in &self.loggers {
            logger.add_remotes(addrs.clone());
        }
    }

    fn flush(&self) -> Result<()> {
        let mut failures = MultiWriteError::new();
        for logger in &self.loggers {
            if let Err(e) = logger.flush() {
                failures.push(e);
            }
        }
        failures.into_result()
    }

    fn members(&self) -> Option<Vec<Arc<dyn Logger>>> {
        Some(self.loggers.clone())
    }
}

impl fmt::Debug for MultiLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLogger")
            .field("members", &self.loggers.len())
            .finish()
    }
}
