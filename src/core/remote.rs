//! Logger whose destination is a set of remote addresses

use super::{
    error::Result,
    event::Event,
    fields::Fields,
    logger::{Logger, SinkLogger},
};
use crate::sinks::{ConnAddr, NetworkSink, Sink};
use parking_lot::Mutex;
use std::fmt;

/// A [`SinkLogger`] writing over TCP.
///
/// Only remote re-dispatch applies here: `set_remotes`/`add_remotes` change
/// the connections, while plain writers passed to `set_writers` are ignored.
pub struct NetworkLogger {
    inner: SinkLogger,
    remotes: Mutex<Vec<ConnAddr>>,
}

impl NetworkLogger {
    /// Wrap `inner`, replacing its sink with connections to `remotes`
    pub fn new(inner: SinkLogger, remotes: Vec<ConnAddr>) -> Self {
        let logger = Self {
            inner,
            remotes: Mutex::new(Vec::new()),
        };
        logger.set_remotes(remotes);
        logger
    }

    pub fn remotes(&self) -> Vec<ConnAddr> {
        self.remotes.lock().clone()
    }

    /// The wrapped pipeline
    pub fn inner(&self) -> &SinkLogger {
        &self.inner
    }
}

fn network_sink(addrs: &[ConnAddr]) -> Sink {
    let merged = ConnAddr::new(addrs.iter().flat_map(|a| a.addrs().iter().cloned()));
    Sink::named(format!("tcp://{}", merged), NetworkSink::new(&merged))
}

impl Logger for NetworkLogger {
    fn output(&self, event: &Event) -> Result<usize> {
        self.inner.output(event)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        self.inner.write(buf)
    }

    fn set_prefix(&self, prefix: &str) {
        self.inner.set_prefix(prefix);
    }

    fn set_sub(&self, sub: &str) {
        self.inner.set_sub(sub);
    }

    fn set_fields(&self, fields: Fields) {
        self.inner.set_fields(fields);
    }

    fn prefix(&self) -> String {
        self.inner.prefix()
    }

    fn sub(&self) -> String {
        self.inner.sub()
    }

    fn is_skip_exit(&self) -> bool {
        self.inner.is_skip_exit()
    }

    /// No-op for an empty list
    fn set_remotes(&self, addrs: Vec<ConnAddr>) {
        if addrs.is_empty() {
            return;
        }
        let mut remotes = self.remotes.lock();
        self.inner.set_writers(vec![network_sink(&addrs)]);
        *remotes = addrs;
    }

    fn add_remotes(&self, addrs: Vec<ConnAddr>) {
        if addrs.is_empty() {
            return;
        }
        let mut remotes = self.remotes.lock();
        self.inner.add_writers(vec![network_sink(&addrs)]);
        remotes.extend(addrs);
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

impl fmt::Debug for NetworkLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkLogger")
            .field("inner", &self.inner)
            .field("remotes", &*self.remotes.lock())
            .finish()
    }
}
