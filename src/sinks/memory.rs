//! In-memory capture sink
//!
//! Collects everything written to it, mostly for tests that need to look at
//! what a logger produced.

use super::sink::Sink;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Growable byte buffer shared between clones
///
/// # Example
///
/// ```
/// use rust_event_logger::sinks::MemorySink;
/// use rust_event_logger::{with_out, with_prefix, LoggerBuilder, LoggerExt};
///
/// let memory = MemorySink::new();
/// let logger = LoggerBuilder::from_configs(vec![
///     with_prefix("svc"),
///     with_out(vec![memory.sink()]),
/// ])
/// .build();
///
/// logger.info("ready");
/// assert!(memory.contents().contains("[svc] ready"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
    writes: Arc<AtomicUsize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`Sink`] handle writing into this buffer
    pub fn sink(&self) -> Sink {
        Sink::named("memory", self.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Number of `write` calls received
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
        self.writes.store(0, Ordering::SeqCst);
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.buf.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
