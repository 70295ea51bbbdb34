//! Integration tests for the event logger
//!
//! These tests verify:
//! - Level filtering and the one-format-one-write pipeline
//! - Metadata merging between pending fields and events
//! - Fan-out composition, short-circuiting and error aggregation
//! - Channel relay ordering and shutdown
//! - Call stack capture into event metadata
//! - File sinks and log injection prevention

use rust_event_logger::core::{CALL_STACK_KEY, DEFAULT_PREFIX};
use rust_event_logger::prelude::*;
use rust_event_logger::sinks::Out;
use rust_event_logger::{
    add_out, format_json, multi_conf, multi_logger, nil_config, skip_exit, ChanneledLogger,
    Formatter, StackTrace,
};
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Formatter that counts calls and renders `prefix|message`
struct CountingFormatter {
    calls: Arc<AtomicUsize>,
}

impl Formatter for CountingFormatter {
    fn format(&self, event: &Event) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}|{}\n", event.prefix(), event.message()).into_bytes())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn broken_logger() -> Arc<dyn Logger> {
    new_logger(vec![
        with_out(vec![Sink::named("broken", BrokenWriter)]),
        skip_exit(),
    ])
}

fn memory_logger(memory: &MemorySink) -> Arc<dyn Logger> {
    new_logger(vec![with_out(vec![memory.sink()]), skip_exit()])
}

#[test]
fn test_filter_scenario() {
    let memory = MemorySink::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let logger = new_logger(vec![
        with_prefix("svc"),
        with_filter(LogLevel::Warn),
        with_out(vec![memory.sink()]),
        with_format(CountingFormatter {
            calls: Arc::clone(&calls),
        }),
    ]);

    let n = logger
        .output(&Event::new(LogLevel::Info, "x"))
        .expect("Failed to output filtered event");
    assert_eq!(n, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(memory.write_count(), 0);

    let n = logger
        .output(&Event::new(LogLevel::Error, "y"))
        .expect("Failed to output event");
    assert_eq!(n, "svc|y\n".len());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(memory.write_count(), 1);
    assert_eq!(memory.lines(), vec!["svc|y"]);
}

#[test]
fn test_every_level_at_or_above_filter_writes_once() {
    for threshold in LogLevel::ALL {
        let memory = MemorySink::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let logger = LoggerBuilder::new()
            .filter(threshold)
            .out(vec![memory.sink()])
            .formatter(CountingFormatter {
                calls: Arc::clone(&calls),
            })
            .skip_exit(true)
            .build_sink_logger();

        let mut expected = 0;
        for level in LogLevel::ALL {
            logger
                .output(&Event::new(level, "m"))
                .expect("Failed to output event");
            if level >= threshold {
                expected += 1;
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), expected);
        assert_eq!(memory.write_count(), expected);
    }
}

#[test]
fn test_skip_exit_scenario() {
    let memory = MemorySink::new();
    let logger = new_logger(vec![with_out(vec![memory.sink()]), skip_exit()]);

    let n = logger
        .log(&Event::new(LogLevel::Fatal, "fatal but alive"))
        .expect("Failed to log fatal event");
    assert!(n > 0);
    assert!(memory.contents().contains("fatal but alive"));
}

#[test]
fn test_event_keys_win_over_pending_fields() {
    let memory = MemorySink::new();
    let logger = new_logger(vec![with_out(vec![memory.sink()]), format_json()]);

    logger.set_fields(
        Fields::new()
            .with_field("request_id", "from-logger")
            .with_field("host", "web-1"),
    );
    let event = Event::builder()
        .level(LogLevel::Info)
        .message("merged")
        .field("request_id", "from-event")
        .build();
    logger.output(&event).expect("Failed to output event");

    let record: serde_json::Value =
        serde_json::from_str(&memory.lines()[0]).expect("Failed to parse JSON record");
    assert_eq!(record["prefix"], DEFAULT_PREFIX);
    assert_eq!(record["metadata"]["request_id"], "from-event");
    assert_eq!(record["metadata"]["host"], "web-1");
}

#[test]
fn test_multi_logger_construction() {
    let nil = new_logger(vec![nil_config()]);
    assert!(multi_logger(vec![nil.clone()]).is_none());

    let a = memory_logger(&MemorySink::new());
    let same = multi_logger(vec![nil.clone(), a.clone()]).expect("Failed to compose");
    assert!(Arc::ptr_eq(&same, &a));

    let b = memory_logger(&MemorySink::new());
    let c = memory_logger(&MemorySink::new());
    let inner = multi_logger(vec![b.clone(), nil.clone()]).expect("Failed to compose");
    let fan = multi_logger(vec![a.clone(), inner, nil, c.clone()]).expect("Failed to compose");

    let members = fan.members().expect("Fan-out must expose members");
    assert_eq!(members.len(), 3);
    assert!(Arc::ptr_eq(&members[0], &a));
    assert!(Arc::ptr_eq(&members[1], &b));
    assert!(Arc::ptr_eq(&members[2], &c));
}

#[test]
fn test_fan_out_output_short_circuits() {
    let first = MemorySink::new();
    let last = MemorySink::new();
    let fan = multi_logger(vec![memory_logger(&first), broken_logger(), memory_logger(&last)])
        .expect("Failed to compose");

    let err = fan
        .output(&Event::new(LogLevel::Info, "stop at B"))
        .expect_err("Broken member must fail the fan-out");
    assert!(err.to_string().contains("broken"));
    assert_eq!(first.lines().len(), 1);
    assert!(last.is_empty());
}

#[test]
fn test_fan_out_write_aggregates() {
    let memory = MemorySink::new();
    let fan = multi_logger(vec![memory_logger(&memory), broken_logger(), broken_logger()])
        .expect("Failed to compose");

    let err = fan.write(b"raw line\n").expect_err("Broken members must fail");
    match err {
        LoggerError::MultiWrite(failures) => assert_eq!(failures.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    let text = fan.write(b"again\n").unwrap_err().to_string();
    assert!(text.starts_with("2 member write(s) failed"));
    assert_eq!(memory.lines().len(), 2);
}

#[test]
fn test_logger_as_sink_of_another() {
    let memory = MemorySink::new();
    let downstream = new_logger(vec![
        with_prefix("down"),
        with_filter(LogLevel::Warn),
        with_out(vec![memory.sink()]),
        skip_exit(),
    ]);
    let upstream = new_logger(vec![
        with_prefix("up"),
        with_format(JsonFormatter::new()),
        with_out(vec![Sink::from_logger(downstream)]),
        skip_exit(),
    ]);

    let n = upstream
        .output(
            &Event::builder()
                .level(LogLevel::Error)
                .message("disk full")
                .field("mount", "/var")
                .build(),
        )
        .expect("Failed to forward event");
    assert!(n > 0);
    // below the downstream filter once decoded
    upstream.info("chatter");

    let lines = memory.lines();
    assert_eq!(lines.len(), 1, "got {:?}", lines);
    assert!(lines[0].contains("[ERROR] [up] disk full mount=/var"), "got {}", lines[0]);
}

#[test]
fn test_bad_timestamp_pattern_returns_format_error() {
    let memory = MemorySink::new();
    let logger = LoggerBuilder::new()
        .out(vec![memory.sink()])
        .formatter(TextFormatter::new().with_custom_timestamp("%Q"))
        .skip_exit(true)
        .build_sink_logger();

    let err = logger
        .output(&Event::new(LogLevel::Info, "x"))
        .expect_err("Invalid pattern must fail");
    assert!(err.is_format_error(), "got {}", err);
    assert_eq!(memory.write_count(), 0);
    assert_eq!(logger.metrics().failed_count(), 1);
}

#[test]
fn test_set_outs_partitions() {
    let first = MemorySink::new();
    let second = MemorySink::new();
    let logger = memory_logger(&first);

    logger.add_outs(vec![Out::Writer(second.sink())]);
    logger.info("both");
    assert_eq!(first.lines().len(), 1);
    assert_eq!(second.lines().len(), 1);

    logger.set_outs(vec![Out::Writer(second.sink())]);
    logger.info("second");
    assert_eq!(first.lines().len(), 1);
    assert_eq!(second.lines().len(), 2);
}

#[test]
fn test_add_out_option_accumulates() {
    let a = MemorySink::new();
    let b = MemorySink::new();
    let bundle = multi_conf(vec![with_out(vec![a.sink()]), add_out(vec![b.sink()])]);
    let logger = new_logger(vec![bundle]);

    logger.warn("twice");
    assert_eq!(a.lines().len(), 1);
    assert_eq!(b.lines().len(), 1);
}

#[test]
fn test_relay_preserves_order() {
    let memory = MemorySink::new();
    let relay = ChanneledLogger::new(memory_logger(&memory));
    let (events, done) = relay.channels();

    for message in ["e1", "e2", "e3"] {
        events
            .send(Event::new(LogLevel::Info, message))
            .expect("Failed to send event");
    }
    done.send(()).expect("Failed to send done signal");
    assert!(relay.close());

    let lines = memory.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("e1"));
    assert!(lines[1].ends_with("e2"));
    assert!(lines[2].ends_with("e3"));
}

#[test]
fn test_relay_drop_drains_queue() {
    let memory = MemorySink::new();
    {
        let relay = ChanneledLogger::with_capacity(memory_logger(&memory), 16);
        for i in 0..10 {
            relay
                .send(Event::new(LogLevel::Debug, format!("queued {}", i)))
                .expect("Failed to send event");
        }
    }
    assert_eq!(memory.lines().len(), 10);
}

#[test]
fn test_call_stack_metadata() {
    let memory = MemorySink::new();
    let logger = new_logger(vec![with_out(vec![memory.sink()]), format_json()]);

    let event = Event::builder()
        .level(LogLevel::Error)
        .message("with trace")
        .call_stack(false)
        .build();
    logger.output(&event).expect("Failed to output event");

    let record: serde_json::Value =
        serde_json::from_str(&memory.lines()[0]).expect("Failed to parse JSON record");
    let threads = record["metadata"][CALL_STACK_KEY]
        .as_object()
        .expect("call stack must be an object");
    assert_eq!(threads.len(), 1);
    let (key, thread) = threads.iter().next().expect("one thread record");
    assert!(key.starts_with("thread-"));
    assert_eq!(thread["status"], "running");
    assert!(!thread["stack"].as_array().expect("stack list").is_empty());
}

#[test]
fn test_stack_trace_parse() {
    let trace = StackTrace::capture(false);
    let threads = trace.threads();
    assert!(!threads.is_empty());
    assert_eq!(threads[0].status, "running");
    assert!(!threads[0].stack.is_empty());
}

#[test]
fn test_file_sink_and_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("events.log");

    let logger = new_logger(vec![with_out(vec![
        Sink::file(&log_file).expect("Failed to open log file")
    ])]);

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    logger.info(malicious_message);
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
}
