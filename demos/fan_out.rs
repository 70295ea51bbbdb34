//! Fan-out example
//!
//! Demonstrates composing several loggers into one and installing a logger
//! as another logger's sink.
//!
//! Run with: cargo run --example fan_out

use rust_event_logger::prelude::*;
use rust_event_logger::{format_json, multi_logger, std_out};

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Fan-out Example ===\n");

    let memory = MemorySink::new();
    let console = new_logger(vec![std_out(), with_prefix("console")]);
    let capture = new_logger(vec![
        with_out(vec![memory.sink()]),
        format_json(),
        with_prefix("capture"),
    ]);

    let both = multi_logger(vec![console, capture]).ok_or_else(|| {
        LoggerError::config("fan_out", "no loggers left after composition")
    })?;

    println!("1. One call, every member:");
    both.info("service started");
    both.set_sub("worker");
    both.warn("queue is getting long");

    println!("\n2. Captured by the in-memory member:");
    for line in memory.lines() {
        println!("   {}", line);
    }

    println!("\n3. A logger used as another logger's sink:");
    let downstream = new_logger(vec![std_out(), with_prefix("downstream")]);
    let upstream = new_logger(vec![with_out(vec![Sink::from_logger(downstream)])]);
    upstream.info("forwarded through the raw write path");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
