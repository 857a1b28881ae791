//! Log event structure
//!
//! A [`LogEvent`] is the immutable record handed to every formatter. It is
//! assembled with [`LogEventBuilder`]; once built there is no way to change
//! it.

use super::detail::{DetailValue, LogDetail};
use super::exception::LogException;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    key: Uuid,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    context: String,
    scope: String,
    message: String,
    template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<LogException>,
    details: Vec<LogDetail>,
}

impl LogEvent {
    /// Create an event with just a level and a message
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::builder(level).message(message).build()
    }

    pub fn builder(level: LogLevel) -> LogEventBuilder {
        LogEventBuilder::new(level)
    }

    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn exception(&self) -> Option<&LogException> {
        self.exception.as_ref()
    }

    pub fn details(&self) -> &[LogDetail] {
        &self.details
    }

    /// An event is worth emitting when it carries a message or an exception
    pub fn is_valid(&self) -> bool {
        !self.message.is_empty() || self.exception.is_some()
    }
}

/// Builder for [`LogEvent`]
///
/// # Example
///
/// ```
/// use rust_log_transport::{LogEvent, LogLevel};
///
/// let event = LogEvent::builder(LogLevel::Error)
///     .context("  storage  ")
///     .message("disk full")
///     .detail("code", 42)
///     .build();
///
/// assert_eq!(event.context(), "storage");
/// assert!(event.is_valid());
/// ```
#[derive(Debug, Clone)]
pub struct LogEventBuilder {
    key: Option<Uuid>,
    level: LogLevel,
    timestamp: Option<DateTime<Utc>>,
    context: Option<String>,
    scope: Option<String>,
    message: Option<String>,
    template: Option<String>,
    exception: Option<LogException>,
    details: Vec<LogDetail>,
}

impl LogEventBuilder {
    pub fn new(level: LogLevel) -> Self {
        Self {
            key: None,
            level,
            timestamp: None,
            context: None,
            scope: None,
            message: None,
            template: None,
            exception: None,
            details: Vec::new(),
        }
    }

    /// Use a fixed key instead of a fresh UUID
    #[must_use]
    pub fn key(mut self, key: Uuid) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the level from a raw number; unknown values become the default level
    #[must_use]
    pub fn raw_level(mut self, level: i32) -> Self {
        self.level = LogLevel::from_raw(level);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn exception(mut self, exception: LogException) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Capture an error value as the event's exception
    #[must_use]
    pub fn error<E: Error + 'static>(mut self, error: &E) -> Self {
        self.exception = Some(LogException::from_error(error));
        self
    }

    /// Append a detail; labels that are blank after trimming are ignored
    #[must_use]
    pub fn detail(mut self, label: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        let label = label.into();
        let label = label.trim();
        if !label.is_empty() {
            self.details.push(LogDetail::new(label, value));
        }
        self
    }

    #[must_use]
    pub fn details<I>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = LogDetail>,
    {
        for detail in details {
            self = self.detail(detail.label, detail.value);
        }
        self
    }

    pub fn build(self) -> LogEvent {
        let exception_message = self
            .exception
            .as_ref()
            .map(|e| e.message().trim().to_string())
            .unwrap_or_default();

        let message = non_blank(self.message).unwrap_or(exception_message);
        let template = non_blank(self.template).unwrap_or_else(|| message.clone());

        LogEvent {
            key: self.key.unwrap_or_else(Uuid::new_v4),
            level: self.level,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            context: trimmed(self.context),
            scope: trimmed(self.scope),
            message,
            template,
            exception: self.exception,
            details: self.details,
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_falls_back_to_exception() {
        let event = LogEvent::builder(LogLevel::Error)
            .message("   ")
            .exception(LogException::new("IoError", "broken pipe"))
            .build();

        assert_eq!(event.message(), "broken pipe");
        assert_eq!(event.template(), "broken pipe");
        assert!(event.is_valid());
    }

    #[test]
    fn test_explicit_template_wins() {
        let event = LogEvent::builder(LogLevel::Info)
            .message("user 42 logged in")
            .template("user {id} logged in")
            .build();

        assert_eq!(event.template(), "user {id} logged in");
    }

    #[test]
    fn test_empty_event_is_invalid() {
        let event = LogEvent::builder(LogLevel::Info).build();
        assert_eq!(event.message(), "");
        assert_eq!(event.context(), "");
        assert_eq!(event.scope(), "");
        assert!(!event.is_valid());
    }

    #[test]
    fn test_context_and_scope_are_trimmed() {
        let event = LogEvent::builder(LogLevel::Info)
            .message("m")
            .context("\t api \n")
            .scope("  ")
            .build();

        assert_eq!(event.context(), "api");
        assert_eq!(event.scope(), "");
    }

    #[test]
    fn test_details_keep_order_and_skip_blank_labels() {
        let event = LogEvent::builder(LogLevel::Debug)
            .message("m")
            .detail("b", 1)
            .detail(" ", 2)
            .detail("a", "x")
            .build();

        let labels: Vec<&str> = event.details().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn test_raw_level_coercion() {
        let event = LogEvent::builder(LogLevel::Error).raw_level(99).message("m").build();
        assert_eq!(event.level(), LogLevel::default());
    }

    #[test]
    fn test_keys_are_unique() {
        let a = LogEvent::new(LogLevel::Info, "a");
        let b = LogEvent::new(LogLevel::Info, "b");
        assert_ne!(a.key(), b.key());
    }
}
