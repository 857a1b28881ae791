//! JSON formatter

use super::Formatter;
use crate::core::{FormatterSettings, LogEvent, LogType};
use serde_json::{Map, Value};

/// Serializes every event field, with details as `{label, value, type}` objects
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    settings: FormatterSettings,
}

impl JsonFormatter {
    pub fn new(settings: FormatterSettings) -> Self {
        Self { settings }
    }

    /// Build the JSON value without serializing it
    pub fn to_value(&self, event: &LogEvent) -> Value {
        let mut json_obj = Map::new();

        json_obj.insert("key".to_string(), Value::String(event.key().to_string()));
        json_obj.insert(
            "level".to_string(),
            Value::String(event.level().name().to_string()),
        );
        json_obj.insert(
            "timestamp".to_string(),
            self.settings.timestamp_format.to_json_value(event.timestamp()),
        );
        json_obj.insert("context".to_string(), Value::String(event.context().to_string()));
        json_obj.insert("scope".to_string(), Value::String(event.scope().to_string()));
        json_obj.insert("message".to_string(), Value::String(event.message().to_string()));
        json_obj.insert("template".to_string(), Value::String(event.template().to_string()));

        let exception = event
            .exception()
            .map(|e| serde_json::to_value(e).unwrap_or_else(|_| Value::String(e.to_string())))
            .unwrap_or(Value::Null);
        json_obj.insert("exception".to_string(), exception);

        let details = event
            .details()
            .iter()
            .map(|detail| {
                let mut obj = Map::new();
                obj.insert("label".to_string(), Value::String(detail.label.clone()));
                obj.insert("value".to_string(), detail.value.to_json_value());
                obj.insert(
                    "type".to_string(),
                    Value::String(detail.value.type_name().to_string()),
                );
                Value::Object(obj)
            })
            .collect();
        json_obj.insert("details".to_string(), Value::Array(details));

        Value::Object(json_obj)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &LogEvent) -> String {
        // A Value tree with string keys always serializes
        serde_json::to_string(&self.to_value(event)).unwrap_or_default()
    }

    fn log_type(&self) -> LogType {
        LogType::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogException, LogLevel, TimestampFormat};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_json_fields() {
        let when = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().expect("valid datetime");
        let event = LogEvent::builder(LogLevel::Warn)
            .timestamp(when)
            .context("api")
            .message("slow request")
            .detail("latency_ms", 1250)
            .detail("ratio", 0.5)
            .detail("cached", false)
            .detail("at", when)
            .build();

        let output = JsonFormatter::default().format(&event);
        let parsed: Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(parsed["level"], "Warn");
        assert_eq!(parsed["timestamp"], "2025-01-08T10:30:45.000Z");
        assert_eq!(parsed["context"], "api");
        assert_eq!(parsed["scope"], "");
        assert_eq!(parsed["message"], "slow request");
        assert!(parsed["exception"].is_null());
        assert_eq!(parsed["key"], event.key().to_string());

        let details = parsed["details"].as_array().expect("details array");
        assert_eq!(details.len(), 4);
        assert_eq!(details[0]["label"], "latency_ms");
        assert_eq!(details[0]["value"], 1250);
        assert_eq!(details[0]["type"], "Int64");
        assert_eq!(details[1]["value"], 0.5);
        assert_eq!(details[2]["value"], false);
        assert_eq!(details[3]["value"], "2025-01-08T10:30:45.000Z");
        assert_eq!(details[3]["type"], "DateTime");
    }

    #[test]
    fn test_json_exception_and_numeric_timestamp() {
        let event = LogEvent::builder(LogLevel::Error)
            .exception(LogException::new("Timeout", "no reply"))
            .detail("ratio", f64::NAN)
            .build();

        let formatter = JsonFormatter::new(
            FormatterSettings::new().with_timestamp_format(TimestampFormat::UnixMillis),
        );
        let parsed: Value = serde_json::from_str(&formatter.format(&event)).expect("valid json");

        assert!(parsed["timestamp"].is_i64());
        assert_eq!(parsed["message"], "no reply");
        assert_eq!(parsed["exception"]["type"], "Timeout");
        assert_eq!(parsed["exception"]["message"], "no reply");
        assert_eq!(parsed["details"][0]["value"], "NaN");
    }
}
