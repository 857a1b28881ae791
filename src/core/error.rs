//! Error types for the logger system
//!
//! Errors fall into three groups:
//! - configuration errors, returned from constructors and `validate()`
//! - transport errors, returned only from `try_write` style calls and
//!   swallowed by the fire-and-forget `write` path
//! - formatter errors, such as a custom timestamp format chrono rejects;
//!   formatters recover from them with a safe string fallback

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Network level failure while sending a payload
    #[error("Transport error while {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Payload needs more UDP chunks than the protocol allows
    #[error("Payload needs {chunks} chunks, maximum is {max}")]
    ChunkLimitExceeded { chunks: usize, max: usize },

    /// Writer was used after `close()`
    #[error("Writer '{0}' is closed")]
    WriterClosed(String),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a chunk limit error
    pub fn chunk_limit(chunks: usize, max: usize) -> Self {
        LoggerError::ChunkLimitExceeded { chunks, max }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Whether this error is a configuration problem that should fail fast
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::InvalidConfiguration { .. })
    }

    /// Whether this error came from the network layer
    ///
    /// Transport errors never cross the `write` boundary of a network writer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LoggerError::Transport { .. }
                | LoggerError::IoOperation { .. }
                | LoggerError::IoError(_)
                | LoggerError::ChunkLimitExceeded { .. }
                | LoggerError::WriterClosed(_)
        )
    }
}
