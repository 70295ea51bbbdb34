//! Basic logger usage example
//!
//! Demonstrates building a logger from options, the per-level helpers and
//! level filtering.
//!
//! Run with: cargo run --example basic_usage

use rust_event_logger::prelude::*;
use rust_event_logger::{format_json, info, skip_exit, std_out, warn};

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Basic Usage Example ===\n");

    // Text to stdout; fatal/panic events return instead of ending the demo
    let logger = new_logger(vec![std_out(), with_prefix("demo"), skip_exit()]);

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Formatting flavours:");
    logger.infof(format_args!("{} items processed", 128));
    info!(logger, "listening on port {}", 8080);
    warn!(logger, "retry {} of {}", 3, 5);

    println!("\n3. Filtering at WARN - trace, debug and info won't show:");
    let filtered = new_logger(vec![std_out(), with_filter(LogLevel::Warn), skip_exit()]);
    filtered.debug("Debug message (hidden)");
    filtered.info("Info message (hidden)");
    filtered.warn("Warning message (visible)");

    println!("\n4. Structured events as JSON:");
    let json = new_logger(vec![std_out(), format_json(), with_prefix("api"), with_sub("auth")]);
    json.set_fields(Fields::new().with_field("node", "web-1"));
    json.output(
        &Event::builder()
            .level(LogLevel::Info)
            .message("user logged in")
            .field("user_id", 42)
            .build(),
    )?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
