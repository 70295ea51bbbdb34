//! Sequential fan-out over several sinks

use super::sink::Sink;
use crate::core::LoggerError;
use std::io::{self, Write};

/// Writes every buffer to each sink in order.
///
/// Stops at the first failing sink. A sink that accepts fewer bytes than it
/// was handed counts as a failure (`ShortWrite`).
#[derive(Debug, Clone)]
pub struct MultiWriter {
    sinks: Vec<Sink>,
}

impl MultiWriter {
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &self.sinks {
            let n = sink.write_once(buf)?;
            if n != buf.len() {
                return Err(LoggerError::short_write(sink.name(), n, buf.len()).into());
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &self.sinks {
            sink.flush_sink()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    struct HalfWriter;

    impl Write for HalfWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len() / 2)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_all_in_order() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let mut writer = MultiWriter::new(vec![a.sink(), b.sink()]);

        assert_eq!(writer.write(b"abc").unwrap(), 3);
        assert_eq!(a.contents(), "abc");
        assert_eq!(b.contents(), "abc");
    }

    #[test]
    fn test_short_write_stops_the_chain() {
        let after = MemorySink::new();
        let mut writer = MultiWriter::new(vec![Sink::named("half", HalfWriter), after.sink()]);

        let err = writer.write(b"abcd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert!(err.to_string().contains("half"));
        assert_eq!(after.write_count(), 0);
    }
}
