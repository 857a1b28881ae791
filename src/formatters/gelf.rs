//! GELF 1.1 formatter
//!
//! Produces the JSON document expected by Graylog inputs:
//!
//! ```text
//! {"version":"1.1","host":"web-01","short_message":"disk full",
//!  "timestamp":1736332245.123,"level":3,"_code":42}
//! ```

use super::Formatter;
use crate::core::timestamp::unix_seconds;
use crate::core::{DetailValue, FormatterSettings, LogEvent, LogType, ResolverFacade};
use serde_json::{Map, Value};

pub const GELF_VERSION: &str = "1.1";
pub const UNKNOWN_HOST: &str = "unknown";

/// GELF forbids an empty `short_message`
const EMPTY_SHORT_MESSAGE: &str = "-";

#[derive(Debug, Clone)]
pub struct GelfFormatter {
    settings: FormatterSettings,
    host: String,
    new_line: &'static str,
}

impl GelfFormatter {
    /// The host name is resolved once; `"unknown"` is used when resolution fails
    pub fn new(settings: FormatterSettings, resolver: &dyn ResolverFacade) -> Self {
        let host = resolver
            .local_host_name()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| UNKNOWN_HOST.to_string());

        Self {
            settings,
            host,
            new_line: resolver.new_line(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Build the GELF document without serializing it
    pub fn to_value(&self, event: &LogEvent) -> Value {
        let mut gelf = Map::new();

        gelf.insert("version".to_string(), Value::String(GELF_VERSION.to_string()));
        gelf.insert("host".to_string(), Value::String(self.host.clone()));

        let short_message = if event.message().is_empty() {
            EMPTY_SHORT_MESSAGE
        } else {
            event.message()
        };
        gelf.insert(
            "short_message".to_string(),
            Value::String(short_message.to_string()),
        );

        if let Some(exception) = event.exception() {
            gelf.insert(
                "full_message".to_string(),
                Value::String(exception.to_full_string(self.new_line)),
            );
        }

        let timestamp = serde_json::Number::from_f64(unix_seconds(event.timestamp()))
            .map(Value::Number)
            .unwrap_or_else(|| Value::Number(event.timestamp().timestamp().into()));
        gelf.insert("timestamp".to_string(), timestamp);
        gelf.insert(
            "level".to_string(),
            Value::Number(event.level().syslog_severity().into()),
        );

        let mut additional = |name: &str, value: Value| {
            let field = additional_field_name(name);
            gelf.entry(field).or_insert(value);
        };

        additional("key", Value::String(event.key().to_string()));
        if self.settings.show_context && !event.context().is_empty() {
            additional("context", Value::String(event.context().to_string()));
        }
        if self.settings.show_scope && !event.scope().is_empty() {
            additional("scope", Value::String(event.scope().to_string()));
        }
        if event.template() != event.message() {
            additional("template", Value::String(event.template().to_string()));
        }
        if self.settings.show_details {
            for detail in event.details() {
                additional(&detail.label, gelf_value(&detail.value));
            }
        }

        Value::Object(gelf)
    }
}

impl Formatter for GelfFormatter {
    fn format(&self, event: &LogEvent) -> String {
        serde_json::to_string(&self.to_value(event)).unwrap_or_default()
    }

    fn log_type(&self) -> LogType {
        LogType::Gelf
    }
}

/// Map a label to a GELF additional field name
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`, the name gets the
/// mandatory leading underscore, and the reserved `_id` becomes `_id_`.
pub fn additional_field_name(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let field = format!("_{}", sanitized);
    if field == "_id" {
        "_id_".to_string()
    } else {
        field
    }
}

/// GELF additional fields only carry strings and numbers
fn gelf_value(value: &DetailValue) -> Value {
    match value {
        DetailValue::Int(_) | DetailValue::UInt(_) | DetailValue::Float(_) => {
            value.to_json_value()
        }
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogException, LogLevel, StaticResolver};
    use chrono::{TimeZone, Utc};

    fn formatter() -> GelfFormatter {
        GelfFormatter::new(
            FormatterSettings::default(),
            &StaticResolver::new(Some("web-01".to_string())),
        )
    }

    #[test]
    fn test_gelf_required_fields() {
        let when = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().expect("valid datetime")
            + chrono::Duration::milliseconds(123);
        let event = LogEvent::builder(LogLevel::Error)
            .timestamp(when)
            .message("disk full")
            .detail("code", 42)
            .build();

        let parsed: Value = serde_json::from_str(&formatter().format(&event)).expect("valid json");
        assert_eq!(parsed["version"], "1.1");
        assert_eq!(parsed["host"], "web-01");
        assert_eq!(parsed["short_message"], "disk full");
        assert_eq!(parsed["timestamp"], 1736332245.123);
        assert_eq!(parsed["level"], 3);
        assert_eq!(parsed["_code"], 42);
        assert!(parsed.get("full_message").is_none());
        assert!(parsed.get("_template").is_none());
    }

    #[test]
    fn test_gelf_unknown_host_fallback() {
        let formatter = GelfFormatter::new(FormatterSettings::default(), &StaticResolver::default());
        assert_eq!(formatter.host(), UNKNOWN_HOST);
    }

    #[test]
    fn test_gelf_full_message_from_exception() {
        let event = LogEvent::builder(LogLevel::Fatal)
            .exception(LogException::new("Panic", "boom").with_stack_trace("frame 0"))
            .build();
        let parsed = formatter().to_value(&event);
        let new_line = crate::core::resolver::platform_new_line();
        assert_eq!(parsed["short_message"], "boom");
        assert_eq!(parsed["full_message"], format!("Panic: boom{}frame 0", new_line));
        assert_eq!(parsed["level"], 2);
    }

    #[test]
    fn test_gelf_label_sanitizing() {
        assert_eq!(additional_field_name("user id"), "_user_id");
        assert_eq!(additional_field_name("http.status-code"), "_http.status-code");
        assert_eq!(additional_field_name("id"), "_id_");
        assert_eq!(additional_field_name("naïve"), "_na_ve");
    }

    #[test]
    fn test_gelf_duplicate_fields_keep_first() {
        let event = LogEvent::builder(LogLevel::Info)
            .message("m")
            .detail("a b", 1)
            .detail("a_b", 2)
            .detail("id", "x")
            .detail("flag", true)
            .build();
        let parsed = formatter().to_value(&event);
        assert_eq!(parsed["_a_b"], 1);
        assert_eq!(parsed["_id_"], "x");
        assert_eq!(parsed["_flag"], "true");
        assert!(parsed.get("_id").is_none());
    }

    #[test]
    fn test_gelf_empty_message_placeholder() {
        let parsed = formatter().to_value(&LogEvent::builder(LogLevel::Debug).build());
        assert_eq!(parsed["short_message"], "-");
        assert_eq!(parsed["level"], 7);
    }
}
