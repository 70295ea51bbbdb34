//! Channeled logging example
//!
//! Demonstrates feeding a background relay from several producer threads.
//!
//! Run with: cargo run --example channeled_logging

use rust_event_logger::prelude::*;
use rust_event_logger::std_out;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Channeled Logging Example ===\n");

    let relay = ChanneledLogger::with_capacity(
        new_logger(vec![std_out(), with_prefix("relay")]),
        64,
    );

    println!("1. Producers sending over the channel:");
    let producers: Vec<_> = (0..4)
        .map(|id| {
            let (events, _) = relay.channels();
            thread::spawn(move || {
                for i in 0..5 {
                    let event = Event::builder()
                        .level(LogLevel::Info)
                        .sub(format!("producer-{}", id))
                        .message(format!("event {}", i))
                        .build();
                    if events.send(event).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();

    for producer in producers {
        producer
            .join()
            .map_err(|_| LoggerError::other("producer thread panicked"))?;
    }

    println!("\n2. Direct synchronous logging through the relay:");
    relay.log_all(&[Event::new(LogLevel::Warn, "bypassing the channel")])?;

    let finished = relay.close();
    println!(
        "\nRelay stopped: {} ({} events delivered)",
        finished,
        relay.metrics().written_count()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
