//! Network sink for remote logging
//!
//! Sends formatted events to one or more remote servers over TCP.
//! Connections are opened on first write and re-established once when a
//! write fails.

use crate::core::{LoggerError, MultiWriteError};
use std::fmt;
use std::io::{self, Write};
use std::net::TcpStream;
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Ordered list of remote `host:port` addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnAddr {
    addrs: Vec<String>,
}

impl ConnAddr {
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addrs: addrs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(addr: impl Into<String>) -> Self {
        Self {
            addrs: vec![addr.into()],
        }
    }

    pub fn addrs(&self) -> &[String] {
        &self.addrs
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

impl fmt::Display for ConnAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addrs.join(","))
    }
}

struct Connection {
    address: String,
    stream: Option<TcpStream>,
}

impl Connection {
    fn connect(&mut self) -> io::Result<&mut TcpStream> {
        if self.stream.is_none() {
            let stream = TcpStream::connect(&self.address)?;
            // Set timeouts to prevent hanging
            stream.set_write_timeout(Some(IO_TIMEOUT))?;
            stream.set_read_timeout(Some(IO_TIMEOUT))?;
            // Enable TCP_NODELAY for low-latency logging
            stream.set_nodelay(true)?;
            self.stream = Some(stream);
        }
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "stream not connected"))
    }

    fn send(&mut self, buf: &[u8], reconnect: bool) -> io::Result<()> {
        let first = self.connect().and_then(|stream| stream.write_all(buf));
        match first {
            Ok(()) => Ok(()),
            Err(e) => {
                // Connection lost
                self.stream = None;
                if !reconnect {
                    return Err(e);
                }
                self.connect()
                    .and_then(|stream| stream.write_all(buf))
                    .map_err(|reconnect_err| {
                        self.stream = None;
                        io::Error::new(
                            reconnect_err.kind(),
                            format!(
                                "failed to send to {} and reconnect: {} (reconnect: {})",
                                self.address, e, reconnect_err
                            ),
                        )
                    })
            }
        }
    }
}

/// TCP writer over a [`ConnAddr`]
///
/// # Example
///
/// ```no_run
/// use rust_event_logger::sinks::{ConnAddr, NetworkSink, Sink};
///
/// let sink = Sink::named("net", NetworkSink::new(&ConnAddr::single("127.0.0.1:8080")));
/// ```
pub struct NetworkSink {
    connections: Vec<Connection>,
    reconnect_on_error: bool,
}

impl NetworkSink {
    pub fn new(addr: &ConnAddr) -> Self {
        Self {
            connections: addr
                .addrs()
                .iter()
                .map(|address| Connection {
                    address: address.clone(),
                    stream: None,
                })
                .collect(),
            reconnect_on_error: true,
        }
    }

    /// Enable or disable automatic reconnection on errors
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.address.as_str()).collect()
    }
}

impl Write for NetworkSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut failures = MultiWriteError::new();
        for connection in &mut self.connections {
            if let Err(e) = connection.send(buf, self.reconnect_on_error) {
                failures.push(LoggerError::io_operation(
                    "sending event",
                    connection.address.clone(),
                    e,
                ));
            }
        }
        failures.into_result().map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for connection in &mut self.connections {
            if let Some(ref mut stream) = connection.stream {
                stream.flush()?;
            }
        }
        Ok(())
    }
}

impl Drop for NetworkSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
