//! Call-stack capture and parsing
//!
//! A capture renders the calling thread's frames into a plain-text dump:
//!
//! ```text
//! thread 4121 [running]:
//! my_crate::handler::serve
//! 	/src/handler.rs:42
//! thread 4122 [sleeping]:
//! ```
//!
//! The dump is then parsed in stages (line split, per-thread records, nested
//! field), each computed at most once.

use super::fields::FieldValue;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Upper bound of a raw dump; anything past it is cut off
pub const STACK_BUFFER_SIZE: usize = 1 << 16;

const UNKNOWN: &str = "<unknown>";

static THREAD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^thread (\d+) \[(.*)\]:$").expect("thread header pattern is valid")
});

/// One frame: the symbol line and its source reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub method: String,
    pub reference: String,
}

/// All frames recorded for one thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub id: u64,
    pub status: String,
    pub stack: Vec<CallFrame>,
}

impl ThreadRecord {
    pub fn key(&self) -> String {
        format!("thread-{}", self.id)
    }

    fn to_field(&self) -> FieldValue {
        let stack = self
            .stack
            .iter()
            .map(|frame| {
                let mut entry = BTreeMap::new();
                entry.insert("method".to_string(), FieldValue::from(frame.method.as_str()));
                entry.insert(
                    "reference".to_string(),
                    FieldValue::from(frame.reference.as_str()),
                );
                FieldValue::Map(entry)
            })
            .collect();

        let mut record = BTreeMap::new();
        record.insert("id".to_string(), FieldValue::from(self.id));
        record.insert("status".to_string(), FieldValue::from(self.status.as_str()));
        record.insert("stack".to_string(), FieldValue::List(stack));
        FieldValue::Map(record)
    }
}

/// A captured stack dump with lazily parsed views
#[derive(Debug)]
pub struct StackTrace {
    raw: Vec<u8>,
    lines: OnceCell<Vec<String>>,
    threads: OnceCell<Vec<ThreadRecord>>,
    field: OnceCell<FieldValue>,
}

impl StackTrace {
    /// Capture the calling thread's stack.
    ///
    /// With `all` set, the remaining threads of the process are appended as
    /// header-only records carrying their scheduler state (Linux only; std
    /// cannot walk another thread's stack).
    pub fn capture(all: bool) -> Self {
        let current = current_thread_id();
        let mut dump = render_current(current);
        if all {
            dump.push_str(&render_others(current));
        }
        Self::from_raw(dump.into_bytes())
    }

    /// Wrap an existing dump; it is truncated to [`STACK_BUFFER_SIZE`]
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        let mut raw = raw.into();
        raw.truncate(STACK_BUFFER_SIZE);
        Self {
            raw,
            lines: OnceCell::new(),
            threads: OnceCell::new(),
            field: OnceCell::new(),
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The dump split on `\n`
    pub fn lines(&self) -> &[String] {
        self.lines.get_or_init(|| {
            self.raw
                .split(|b| *b == b'\n')
                .map(|line| String::from_utf8_lossy(line).into_owned())
                .collect()
        })
    }

    /// Per-thread records in dump order
    pub fn threads(&self) -> &[ThreadRecord] {
        self.threads.get_or_init(|| parse_threads(self.lines()))
    }

    /// Nested map keyed `thread-<id>`
    pub fn to_field(&self) -> &FieldValue {
        self.field.get_or_init(|| {
            FieldValue::Map(
                self.threads()
                    .iter()
                    .map(|record| (record.key(), record.to_field()))
                    .collect(),
            )
        })
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.raw))
    }
}

fn parse_threads(lines: &[String]) -> Vec<ThreadRecord> {
    let mut records = Vec::new();
    let mut current: Option<ThreadRecord> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];

        if let Some(caps) = THREAD_HEADER.captures(line) {
            if let Ok(id) = caps[1].parse::<u64>() {
                if let Some(done) = current.take() {
                    records.push(done);
                }
                current = Some(ThreadRecord {
                    id,
                    status: caps[2].to_string(),
                    stack: Vec::new(),
                });
                i += 1;
                continue;
            }
        }

        if let Some(record) = current.as_mut() {
            if !line.is_empty() && !line.starts_with('\t') {
                if let Some(reference) = lines.get(i + 1).and_then(|n| n.strip_prefix('\t')) {
                    record.stack.push(CallFrame {
                        method: line.clone(),
                        reference: reference.to_string(),
                    });
                    i += 2;
                    continue;
                }
            }
        }

        i += 1;
    }

    // dump ended inside a record
    if let Some(done) = current {
        records.push(done);
    }
    records
}

fn render_current(id: u64) -> String {
    let mut dump = format!("thread {} [running]:\n", id);
    let trace = backtrace::Backtrace::new();

    for frame in trace.frames() {
        if frame.symbols().is_empty() {
            dump.push_str(&format!("{}\n\t{:?}\n", UNKNOWN, frame.ip()));
            continue;
        }
        for symbol in frame.symbols() {
            let method = symbol
                .name()
                .map(|name| name.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string());
            if method.starts_with("backtrace::") {
                continue;
            }
            let reference = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => format!("{}:{}", file.display(), line),
                (Some(file), None) => file.display().to_string(),
                _ => UNKNOWN.to_string(),
            };
            dump.push_str(&method);
            dump.push_str("\n\t");
            dump.push_str(&reference);
            dump.push('\n');
        }
    }
    dump
}

fn current_thread_id() -> u64 {
    os_thread_id().unwrap_or_else(runtime_thread_id)
}

/// Numeric part of `std::thread::ThreadId`'s debug form
fn runtime_thread_id() -> u64 {
    format!("{:?}", std::thread::current().id())
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[cfg(target_os = "linux")]
fn os_thread_id() -> Option<u64> {
    let link = std::fs::read_link("/proc/thread-self").ok()?;
    link.file_name()?.to_str()?.parse().ok()
}

#[cfg(not(target_os = "linux"))]
fn os_thread_id() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn render_others(current: u64) -> String {
    let Ok(entries) = std::fs::read_dir("/proc/self/task") else {
        return String::new();
    };

    let mut tids: Vec<u64> = entries
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse().ok())
        .filter(|tid| *tid != current)
        .collect();
    tids.sort_unstable();

    let mut dump = String::new();
    for tid in tids {
        let status = std::fs::read_to_string(format!("/proc/self/task/{}/stat", tid))
            .map(|stat| scheduler_state(&stat))
            .unwrap_or("unknown");
        dump.push_str(&format!("thread {} [{}]:\n", tid, status));
    }
    dump
}

#[cfg(not(target_os = "linux"))]
fn render_others(_current: u64) -> String {
    String::new()
}

/// State letter of a `/proc/<pid>/task/<tid>/stat` line, which follows the
/// parenthesised command name.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn scheduler_state(stat: &str) -> &'static str {
    let state = stat
        .rfind(')')
        .and_then(|idx| stat[idx + 1..].trim_start().chars().next());
    match state {
        Some('R') => "running",
        Some('S') => "sleeping",
        Some('D') => "disk sleep",
        Some('T') => "stopped",
        Some('t') => "tracing stop",
        Some('Z') => "zombie",
        Some('X') => "dead",
        Some('I') => "idle",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "thread 7 [running]:\n\
main::work\n\
\t/src/main.rs:10\n\
main::main\n\
\t/src/main.rs:3\n\
\n\
thread 9 [sleeping]:\n\
thread 12 [idle]:\n\
std::thread::park\n\
\t/rustc/library/std/src/thread/mod.rs:1000";

    #[test]
    fn test_parse_dump() {
        let trace = StackTrace::from_raw(DUMP);
        let threads = trace.threads();
        assert_eq!(threads.len(), 3);

        assert_eq!(threads[0].id, 7);
        assert_eq!(threads[0].status, "running");
        assert_eq!(
            threads[0].stack,
            vec![
                CallFrame {
                    method: "main::work".into(),
                    reference: "/src/main.rs:10".into()
                },
                CallFrame {
                    method: "main::main".into(),
                    reference: "/src/main.rs:3".into()
                },
            ]
        );

        assert_eq!(threads[1].status, "sleeping");
        assert!(threads[1].stack.is_empty());

        // last record has no trailing newline and is still flushed
        assert_eq!(threads[2].id, 12);
        assert_eq!(threads[2].stack.len(), 1);
    }

    #[test]
    fn test_field_shape() {
        let trace = StackTrace::from_raw(DUMP);
        let field = trace.to_field().as_map().unwrap();
        assert_eq!(field.len(), 3);

        let record = field["thread-7"].as_map().unwrap();
        assert_eq!(record["id"], FieldValue::Int(7));
        assert_eq!(record["status"], FieldValue::from("running"));
        let stack = record["stack"].as_list().unwrap();
        assert_eq!(stack[0].as_map().unwrap()["reference"], FieldValue::from("/src/main.rs:10"));

        let empty = field["thread-9"].as_map().unwrap();
        assert!(empty["stack"].as_list().unwrap().is_empty());
    }

    #[test]
    fn test_stages_are_memoized() {
        let trace = StackTrace::from_raw(DUMP);
        let first = trace.threads().as_ptr();
        let second = trace.threads().as_ptr();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(trace.lines().as_ptr(), trace.lines().as_ptr()));
        assert!(std::ptr::eq(trace.to_field(), trace.to_field()));
    }

    #[test]
    fn test_orphan_method_line_is_skipped() {
        let trace = StackTrace::from_raw("thread 1 [running]:\nlonely\nthread 2 [running]:\n");
        assert_eq!(trace.threads().len(), 2);
        assert!(trace.threads()[0].stack.is_empty());
    }

    #[test]
    fn test_raw_is_truncated() {
        let trace = StackTrace::from_raw(vec![b'x'; STACK_BUFFER_SIZE + 10]);
        assert_eq!(trace.raw().len(), STACK_BUFFER_SIZE);
    }

    #[test]
    fn test_scheduler_state() {
        assert_eq!(scheduler_state("42 (my worker) S 1 2 3"), "sleeping");
        assert_eq!(scheduler_state("42 (a) b) R 1"), "running");
        assert_eq!(scheduler_state("garbage"), "unknown");
    }

    #[test]
    fn test_capture_current_thread() {
        let handle = std::thread::Builder::new()
            .name("stack-probe".into())
            .spawn(|| StackTrace::capture(false).threads().to_vec())
            .unwrap();
        let threads = handle.join().unwrap();

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].status, "running");
        assert!(!threads[0].stack.is_empty());
    }

    #[test]
    fn test_capture_all_keeps_current_first() {
        let trace = StackTrace::capture(true);
        let threads = trace.threads();
        assert!(!threads.is_empty());
        assert_eq!(threads[0].status, "running");
    }
}
