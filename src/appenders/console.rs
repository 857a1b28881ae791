//! Console appender implementation

use super::stream::StreamAppender;
use crate::core::{Appender, FormatterSettings, LogEvent, LogLevel, Result, SystemResolver};
use crate::formatters::{create_formatter, Formatter};
use std::io::{self, Stderr, Stdout};
use std::sync::Arc;

/// Writes to stdout, routing `Error` and `Fatal` to stderr
pub struct ConsoleAppender {
    out: StreamAppender<Stdout>,
    err: StreamAppender<Stderr>,
}

impl ConsoleAppender {
    pub fn new(settings: FormatterSettings) -> Self {
        let formatter = create_formatter(settings, Arc::new(SystemResolver::new()));
        Self::with_formatter(formatter)
    }

    pub fn with_formatter(formatter: impl Into<Arc<dyn Formatter>>) -> Self {
        let formatter: Arc<dyn Formatter> = formatter.into();
        Self {
            out: StreamAppender::new(Arc::clone(&formatter), io::stdout()).with_name("console"),
            err: StreamAppender::new(formatter, io::stderr()).with_name("console"),
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new(FormatterSettings::default())
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        match event.level() {
            LogLevel::Error | LogLevel::Fatal => self.err.write_event(event),
            _ => self.out.write_event(event),
        }
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        self.out.flush()?;
        self.err.flush()
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogType;

    #[test]
    fn test_console_accepts_every_level() {
        let mut appender =
            ConsoleAppender::new(FormatterSettings::default().with_log_type(LogType::Json));
        for level in LogLevel::ALL {
            appender
                .append(&LogEvent::new(level, "console smoke test"))
                .unwrap();
        }
        appender.flush().unwrap();
        assert_eq!(appender.name(), "console");
    }
}
