//! # Rust Log Transport
//!
//! Structured log events, five output formats and network delivery.
//!
//! ## Features
//!
//! - **One event model**: [`LogEvent`] carries level, timestamp, context,
//!   scope, message, template, exception and typed details
//! - **Formatters**: Raw, CSV, JSON, XML and GELF 1.1
//! - **Network writers**: chunked UDP, framed TCP and HTTP, with optional GZIP
//! - **Fire and forget**: logging calls never fail because a collector is down
//! - **Logger facade**: level filter, appender fan-out, optional async queue
//!
//! ```
//! use rust_log_transport::formatters::create_formatter;
//! use rust_log_transport::prelude::*;
//! use std::sync::Arc;
//!
//! let formatter = create_formatter(
//!     FormatterSettings::default().with_log_type(LogType::Gelf),
//!     Arc::new(StaticResolver::new(Some("web-01".to_string()))),
//! );
//! let event = LogEvent::builder(LogLevel::Error)
//!     .context("storage")
//!     .message("disk full")
//!     .detail("code", 42)
//!     .build();
//!
//! let payload = formatter.format(&event);
//! assert!(payload.contains(r#""host":"web-01""#));
//! ```

pub mod appenders;
pub mod core;
pub mod formatters;
pub mod macros;
pub mod network;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, NetworkAppender, StreamAppender};
    pub use crate::core::{
        Appender, DetailValue, FormatterSettings, LogDetail, LogEvent, LogEventBuilder,
        LogException, LogLevel, LogType, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        ResolverFacade, Result, StaticResolver, SystemResolver, TimestampFormat,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::formatters::Formatter;
    pub use crate::network::{NetworkSettings, NetworkWriter, Protocol};
}

pub use appenders::{ConsoleAppender, NetworkAppender, StreamAppender};
pub use core::{
    Appender, DetailValue, EventLogger, FormatterSettings, LogDetail, LogEvent, LogEventBuilder,
    LogException, LogLevel, LogType, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    OverflowCallback, ResolverFacade, Result, StaticResolver, SystemResolver, TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use formatters::{create_formatter, Formatter};
pub use network::{NetworkSettings, NetworkWriter, Protocol, TransportErrorCallback, WriterStats};
