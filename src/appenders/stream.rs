//! Appender writing formatted events to any `Write` sink

use crate::core::{platform_new_line, Appender, LogEvent, LoggerError, Result};
use crate::formatters::Formatter;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Writes one formatted event per line to a stream
///
/// The stream lock is held across payload, line terminator and flush, so
/// lines from concurrent writers never interleave.
///
/// # Example
///
/// ```
/// use rust_log_transport::appenders::StreamAppender;
/// use rust_log_transport::formatters::RawFormatter;
/// use rust_log_transport::prelude::*;
///
/// let formatter: Box<dyn Formatter> = Box::new(RawFormatter::new(FormatterSettings::default()));
/// let mut appender = StreamAppender::new(formatter, Vec::new());
/// appender.append(&LogEvent::new(LogLevel::Info, "ready")).unwrap();
///
/// let written = String::from_utf8(appender.into_inner()).unwrap();
/// assert!(written.starts_with("INFO;"));
/// ```
pub struct StreamAppender<W: Write + Send> {
    name: String,
    formatter: Arc<dyn Formatter>,
    stream: Mutex<W>,
    new_line: &'static str,
}

impl<W: Write + Send> StreamAppender<W> {
    pub fn new(formatter: impl Into<Arc<dyn Formatter>>, stream: W) -> Self {
        Self {
            name: "stream".to_string(),
            formatter: formatter.into(),
            stream: Mutex::new(stream),
            new_line: platform_new_line(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_new_line(mut self, new_line: &'static str) -> Self {
        self.new_line = new_line;
        self
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Format and write one event without going through a logger
    pub fn write_event(&self, event: &LogEvent) -> Result<()> {
        let payload = self.formatter.format(event);

        let mut stream = self.stream.lock();
        stream
            .write_all(payload.as_bytes())
            .and_then(|()| stream.write_all(self.new_line.as_bytes()))
            .and_then(|()| stream.flush())
            .map_err(|e| LoggerError::io_operation("writing event", self.name.clone(), e))
    }

    /// Recover the underlying stream
    pub fn into_inner(self) -> W {
        self.stream.into_inner()
    }
}

impl StreamAppender<File> {
    /// Append to the file at `path`, creating it if needed
    pub fn open(formatter: impl Into<Arc<dyn Formatter>>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;
        Ok(Self::new(formatter, file).with_name(format!("file:{}", path.display())))
    }
}

impl<W: Write + Send> Appender for StreamAppender<W> {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        self.write_event(event)
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FormatterSettings, LogLevel, LogType, StaticResolver};
    use crate::formatters::create_formatter;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn raw() -> Box<dyn Formatter> {
        create_formatter(
            FormatterSettings::default().with_timestamp(false),
            Arc::new(StaticResolver::new(None)),
        )
    }

    #[test]
    fn test_one_line_per_event() {
        let mut appender = StreamAppender::new(raw(), Vec::new()).with_new_line("\n");
        appender.append(&LogEvent::new(LogLevel::Info, "first")).unwrap();
        appender.append(&LogEvent::new(LogLevel::Warn, "second")).unwrap();

        let written = String::from_utf8(appender.into_inner()).unwrap();
        assert_eq!(written, "INFO;first\nWARN;second\n");
    }

    #[test]
    fn test_csv_header_written_once() {
        let formatter = create_formatter(
            FormatterSettings::default()
                .with_log_type(LogType::Csv)
                .with_csv_header(true),
            Arc::new(StaticResolver::new(None)),
        );
        let mut appender = StreamAppender::new(formatter, Vec::new()).with_new_line("\n");
        appender.append(&LogEvent::new(LogLevel::Info, "a")).unwrap();
        appender.append(&LogEvent::new(LogLevel::Info, "b")).unwrap();

        let written = String::from_utf8(appender.into_inner()).unwrap();
        assert_eq!(written.matches("\"Level\"").count(), 1);
    }

    #[test]
    fn test_write_failure_is_returned() {
        let mut appender = StreamAppender::new(raw(), BrokenPipe).with_name("pipe");
        let err = appender
            .append(&LogEvent::new(LogLevel::Error, "lost"))
            .unwrap_err();
        assert!(err.to_string().contains("pipe"));
        assert_eq!(appender.name(), "pipe");
    }
}
