//! Process-wide logger
//!
//! Nothing is installed at start-up; the first call to [`global`] without a
//! prior [`init_global`] installs a default stderr logger.

use super::{
    config::LoggerBuilder,
    error::Result,
    event::Event,
    logger::Logger,
};
use parking_lot::{const_rwlock, RwLock};
use std::sync::Arc;

static GLOBAL: RwLock<Option<Arc<dyn Logger>>> = const_rwlock(None);

/// Install `logger` as the process-wide logger, returning the previous one
pub fn init_global(logger: Arc<dyn Logger>) -> Option<Arc<dyn Logger>> {
    GLOBAL.write().replace(logger)
}

/// The process-wide logger, created with defaults on first use
pub fn global() -> Arc<dyn Logger> {
    if let Some(logger) = GLOBAL.read().as_ref() {
        return Arc::clone(logger);
    }
    let mut slot = GLOBAL.write();
    Arc::clone(slot.get_or_insert_with(|| LoggerBuilder::new().build()))
}

/// Remove the process-wide logger after flushing it
pub fn teardown_global() -> Option<Arc<dyn Logger>> {
    let previous = GLOBAL.write().take();
    if let Some(logger) = &previous {
        if let Err(e) = logger.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush global logger: {}", e);
        }
    }
    previous
}

/// `log` through the process-wide logger
pub fn log(event: &Event) -> Result<usize> {
    global().log(event)
}

/// `output` through the process-wide logger
pub fn output(event: &Event) -> Result<usize> {
    global().output(event)
}
