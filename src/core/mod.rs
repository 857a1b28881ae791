//! Core logger types and traits

pub mod appender;
pub mod detail;
pub mod error;
pub mod exception;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod resolver;
pub mod settings;
pub mod timestamp;

pub use appender::Appender;
pub use detail::{DetailValue, LogDetail};
pub use error::{LoggerError, Result};
pub use exception::LogException;
pub use log_event::{LogEvent, LogEventBuilder};
pub use log_level::LogLevel;
pub use logger::{EventLogger, Logger, LoggerBuilder, OverflowCallback, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use resolver::{platform_new_line, ResolverFacade, StaticResolver, SystemResolver};
pub use settings::{FormatterSettings, LogType};
pub use timestamp::TimestampFormat;

use std::any::Any;

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
