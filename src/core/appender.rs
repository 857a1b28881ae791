//! Appender trait for log output destinations

use super::{error::Result, log_event::LogEvent};

/// A sink receiving every event the logger accepts
pub trait Appender: Send + Sync {
    fn append(&mut self, event: &LogEvent) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
