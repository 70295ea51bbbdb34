//! Channel-fed background relay
//!
//! A [`ChanneledLogger`] owns a worker thread that receives events over a
//! bounded channel and forwards each one to a wrapped logger's `log`. Events
//! sent from one thread reach the wrapped logger in send order.

use super::{
    error::{LoggerError, Result},
    event::Event,
    fields::Fields,
    logger::Logger,
    metrics::LoggerMetrics,
};
use crate::sinks::{ConnAddr, Sink};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default event channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// How long `close` and `Drop` wait for the worker to finish
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Background relay in front of another logger.
///
/// # Example
/// ```
/// use rust_event_logger::prelude::*;
/// use rust_event_logger::ChanneledLogger;
///
/// let memory = MemorySink::new();
/// let relay = ChanneledLogger::new(new_logger(vec![with_out(vec![memory.sink()])]));
///
/// let (events, _done) = relay.channels();
/// for i in 0..3 {
///     events.send(Event::new(LogLevel::Info, format!("event {}", i))).unwrap();
/// }
/// relay.close();
///
/// assert_eq!(memory.lines().len(), 3);
/// ```
pub struct ChanneledLogger {
    logger: Arc<dyn Logger>,
    events: Sender<Event>,
    done: Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
}

impl ChanneledLogger {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_capacity(logger, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Relay whose event channel holds at most `capacity` queued events;
    /// senders block while it is full.
    pub fn with_capacity(logger: Arc<dyn Logger>, capacity: usize) -> Self {
        let (events, event_rx) = bounded(capacity);
        let (done, done_rx) = bounded(1);
        let metrics = Arc::new(LoggerMetrics::new());

        let worker_logger = Arc::clone(&logger);
        let worker_metrics = Arc::clone(&metrics);
        let handle = thread::spawn(move || {
            Self::relay_loop(worker_logger, event_rx, done_rx, worker_metrics);
        });

        Self {
            logger,
            events,
            done,
            worker: Mutex::new(Some(handle)),
            metrics,
        }
    }

    fn relay_loop(
        logger: Arc<dyn Logger>,
        events: Receiver<Event>,
        done: Receiver<()>,
        metrics: Arc<LoggerMetrics>,
    ) {
        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => Self::deliver(&*logger, &event, &metrics),
                    // every sender is gone
                    Err(_) => break,
                },
                recv(done) -> _ => {
                    // select! picks randomly between ready channels;
                    // deliver whatever was queued before the stop signal
                    for event in events.try_iter() {
                        Self::deliver(&*logger, &event, &metrics);
                    }
                    break;
                }
            }
        }
    }

    /// Forward one event, isolating the worker from errors and panics
    fn deliver(logger: &dyn Logger, event: &Event, metrics: &LoggerMetrics) {
        metrics.record_relayed();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| logger.log(event)));

        match result {
            Ok(Ok(n)) => {
                metrics.record_written(n);
            }
            Ok(Err(e)) => {
                metrics.record_failed();
                eprintln!("[LOGGER ERROR] Relay failed to deliver event: {}", e);
            }
            Err(panic_info) => {
                metrics.record_failed();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Relay delivery panicked: {}. The relay keeps running.",
                    panic_msg
                );
            }
        }
    }

    /// Producer handles: the event channel and the stop signal.
    ///
    /// Sending on the stop channel ends the worker after it has delivered
    /// the events already queued.
    pub fn channels(&self) -> (Sender<Event>, Sender<()>) {
        (self.events.clone(), self.done.clone())
    }

    /// Queue one event, blocking while the channel is full
    pub fn send(&self, event: Event) -> Result<()> {
        if !self.is_running() {
            return Err(LoggerError::RelayStopped);
        }
        self.events
            .send(event)
            .map_err(|_| LoggerError::ChannelSendError)
    }

    /// Log `events` synchronously through the wrapped logger, bypassing the
    /// channel. Stops at the first error.
    pub fn log_all(&self, events: &[Event]) -> Result<usize> {
        let mut total = 0;
        for event in events {
            total += self.logger.log(event)?;
        }
        Ok(total)
    }

    /// The wrapped logger
    pub fn inner(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Delivery counters of the worker
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the worker and wait up to [`DEFAULT_SHUTDOWN_TIMEOUT`] for it.
    ///
    /// Returns `true` when the worker finished in time.
    pub fn close(&self) -> bool {
        self.close_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
    }

    pub fn close_timeout(&self, timeout: Duration) -> bool {
        // full or disconnected both mean a stop is already under way
        let _ = self.done.try_send(());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Relay worker thread panicked: {:?}", e);
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Relay worker did not finish within {:?} timeout. \
                     Some events may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for ChanneledLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl Logger for ChanneledLogger {
    fn output(&self, event: &Event) -> Result<usize> {
        self.logger.output(event)
    }

    fn log(&self, event: &Event) -> Result<usize> {
        self.logger.log(event)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        self.logger.write(buf)
    }

    fn set_prefix(&self, prefix: &str) {
        self.logger.set_prefix(prefix);
    }

    fn set_sub(&self, sub: &str) {
        self.logger.set_sub(sub);
    }

    fn set_fields(&self, fields: Fields) {
        self.logger.set_fields(fields);
    }

    fn prefix(&self) -> String {
        self.logger.prefix()
    }

    fn sub(&self) -> String {
        self.logger.sub()
    }

    fn is_skip_exit(&self) -> bool {
        self.logger.is_skip_exit()
    }

    fn set_writers(&self, sinks: Vec<Sink>) {
        self.logger.set_writers(sinks);
    }

    fn add_writers(&self, sinks: Vec<Sink>) {
        self.logger.add_writers(sinks);
    }

    fn set_remotes(&self, addrs: Vec<ConnAddr>) {
        self.logger.set_remotes(addrs);
    }

    fn add_remotes(&self, addrs: Vec<ConnAddr>) {
        self.logger.add_remotes(addrs);
    }

    fn flush(&self) -> Result<()> {
        self.logger.flush()
    }
}

impl fmt::Debug for ChanneledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChanneledLogger")
            .field("queued", &self.events.len())
            .field("running", &self.is_running())
            .finish()
    }
}
