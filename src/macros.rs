//! Logging macros with `format!`-style messages
//!
//! The message is only formatted when the level passes the logger's filter.
//! A leading `error = expr,` attaches that error as the event's exception.
//!
//! # Examples
//!
//! ```
//! use rust_log_transport::prelude::*;
//! use rust_log_transport::{info, error};
//!
//! let logger = Logger::new();
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! let failure = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! error!(logger, error = &failure, "Flush of {} failed", "journal");
//! ```

/// Log a message at an explicit level.
///
/// ```
/// # use rust_log_transport::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_transport::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, error = $err:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log_error(level, format!($($arg)+), $err);
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log(level, format!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message, optionally with the error that caused it.
///
/// ```
/// # use rust_log_transport::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_transport::error;
/// error!(logger, "Failed to connect to database");
/// let cause = std::fmt::Error;
/// error!(logger, error = &cause, "Rendering row {} failed", 7);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
