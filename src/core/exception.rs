//! Captured error information carried by a log event

use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

/// Snapshot of an error and its `source()` chain
///
/// The snapshot owns plain strings, so events stay `Clone + Send` no matter
/// which error type produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogException {
    #[serde(rename = "type")]
    type_name: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inner: Option<Box<LogException>>,
}

impl LogException {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
            inner: None,
        }
    }

    /// Capture a typed error, its source chain and, when `RUST_BACKTRACE`
    /// enables it, a backtrace of the capture site
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let mut exception = Self::new(short_type_name::<E>(), error.to_string());
        exception.inner = error.source().map(|source| Box::new(Self::from_dyn(source)));

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            exception.stack_trace = Some(backtrace.to_string());
        }
        exception
    }

    /// Capture a type-erased error; the concrete type name is unknown here
    pub fn from_dyn(error: &(dyn Error + 'static)) -> Self {
        let mut exception = Self::new("Error", error.to_string());
        exception.inner = error.source().map(|source| Box::new(Self::from_dyn(source)));
        exception
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    #[must_use]
    pub fn with_inner(mut self, inner: LogException) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    pub fn inner(&self) -> Option<&LogException> {
        self.inner.as_deref()
    }

    /// Full rendering including every stack trace, used for GELF `full_message`
    pub fn to_full_string(&self, new_line: &str) -> String {
        let mut out = String::new();
        let mut current = Some(self);
        let mut first = true;
        while let Some(exception) = current {
            if !first {
                out.push_str(new_line);
                out.push_str("---> ");
            }
            out.push_str(&exception.type_name);
            out.push_str(": ");
            out.push_str(&exception.message);
            if let Some(trace) = &exception.stack_trace {
                out.push_str(new_line);
                out.push_str(trace.trim_end());
            }
            first = false;
            current = exception.inner();
        }
        out
    }
}

impl fmt::Display for LogException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(inner) = &self.inner {
            write!(f, " ---> {}", inner)?;
        }
        Ok(())
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "could not flush buffer")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_from_error_walks_source_chain() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let exception = LogException::from_error(&err);

        assert_eq!(exception.type_name(), "Outer");
        assert_eq!(exception.message(), "could not flush buffer");
        let inner = exception.inner().expect("source captured");
        assert_eq!(inner.message(), "disk full");
        assert!(inner.inner().is_none());
    }

    #[test]
    fn test_display_chains_inner() {
        let exception = LogException::new("Timeout", "no reply")
            .with_inner(LogException::new("Io", "reset by peer"));
        assert_eq!(exception.to_string(), "Timeout: no reply ---> Io: reset by peer");
    }

    #[test]
    fn test_full_string_includes_stack_trace() {
        let exception = LogException::new("Panic", "boom").with_stack_trace("at main.rs:1\n");
        assert_eq!(exception.to_full_string("\n"), "Panic: boom\nat main.rs:1");
    }
}
