//! Shared byte-writer handle

use super::multi_writer::MultiWriter;
use crate::core::{Logger, Result};
use parking_lot::Mutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Clonable, thread-safe destination for formatted events.
///
/// Every clone writes to the same underlying writer, serialized by the
/// handle's own lock, so one file or socket can back several loggers.
#[derive(Clone)]
pub struct Sink {
    name: Arc<str>,
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::named("writer", writer)
    }

    pub fn named<W: Write + Send + 'static>(name: impl AsRef<str>, writer: W) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// The default console sink
    pub fn stderr() -> Self {
        Self::named("stderr", io::stderr())
    }

    pub fn stdout() -> Self {
        Self::named("stdout", io::stdout())
    }

    /// Append to `path`, creating it if needed
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::named(path.display().to_string(), file))
    }

    /// Multi-writer join: none → stderr, one → that sink, several → a
    /// [`MultiWriter`] over all of them in order.
    pub fn join(mut sinks: Vec<Sink>) -> Self {
        match sinks.len() {
            0 => Self::stderr(),
            1 => sinks.remove(0),
            _ => {
                let name = sinks
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join("+");
                Self::named(name, MultiWriter::new(sinks))
            }
        }
    }

    /// Install a logger's raw write path as a sink
    pub fn from_logger(logger: Arc<dyn Logger>) -> Self {
        Self::named("logger", LoggerWriter { logger })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when both handles share one underlying writer
    pub fn same_as(&self, other: &Sink) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// One `write` call on the underlying writer; may accept fewer bytes
    pub fn write_once(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write(buf)
    }

    /// Write the whole buffer while holding the handle's lock
    pub fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write_all(buf)?;
        Ok(buf.len())
    }

    pub fn flush_sink(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_once(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_sink()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("name", &self.name).finish()
    }
}

struct LoggerWriter {
    logger: Arc<dyn Logger>,
}

impl Write for LoggerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.logger.write(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.logger.flush().map_err(io::Error::from)
    }
}
