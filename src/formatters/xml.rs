//! XML formatter

use super::Formatter;
use crate::core::{FormatterSettings, LogEvent, LogException, LogType};
use std::fmt::Write;

/// Writes one element per event, named by `xml_root` (`<LogEvent>` by default)
///
/// Text and attribute values are escaped, and characters XML 1.0 cannot
/// carry (most control characters) are dropped.
#[derive(Debug, Clone, Default)]
pub struct XmlFormatter {
    settings: FormatterSettings,
}

impl XmlFormatter {
    pub fn new(settings: FormatterSettings) -> Self {
        Self { settings }
    }

    fn write_exception(out: &mut String, tag: &str, exception: &LogException) {
        let _ = write!(out, "<{} Type=\"{}\">", tag, escape(exception.type_name()));
        element(out, "Message", exception.message());
        if let Some(trace) = exception.stack_trace() {
            element(out, "StackTrace", trace);
        }
        if let Some(inner) = exception.inner() {
            Self::write_exception(out, "InnerException", inner);
        }
        let _ = write!(out, "</{}>", tag);
    }
}

impl Formatter for XmlFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(256);
        let root = self.settings.xml_root.as_str();
        let _ = write!(out, "<{} Key=\"{}\">", root, event.key());

        element(&mut out, "Level", event.level().name());
        element(
            &mut out,
            "Timestamp",
            &self.settings.timestamp_format.format(event.timestamp()),
        );
        element(&mut out, "Context", event.context());
        element(&mut out, "Scope", event.scope());
        element(&mut out, "Message", event.message());
        element(&mut out, "Template", event.template());

        if let Some(exception) = event.exception() {
            Self::write_exception(&mut out, "Exception", exception);
        }

        if event.details().is_empty() {
            out.push_str("<Details />");
        } else {
            out.push_str("<Details>");
            for detail in event.details() {
                let _ = write!(
                    out,
                    "<Detail Label=\"{}\" Type=\"{}\">{}</Detail>",
                    escape(&detail.label),
                    detail.value.type_name(),
                    escape(&detail.value.to_string())
                );
            }
            out.push_str("</Details>");
        }

        let _ = write!(out, "</{}>", root);
        out
    }

    fn log_type(&self) -> LogType {
        LogType::Xml
    }
}

fn element(out: &mut String, tag: &str, value: &str) {
    if value.is_empty() {
        let _ = write!(out, "<{} />", tag);
    } else {
        let _ = write!(out, "<{}>{}</{}>", tag, escape(value), tag);
    }
}

/// Escape markup characters and drop characters not allowed in XML 1.0
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use uuid::Uuid;

    #[test]
    fn test_xml_document() {
        let event = LogEvent::builder(LogLevel::Error)
            .key(Uuid::nil())
            .message("a < b & \"c\"")
            .detail("code", 42)
            .build();
        let output = XmlFormatter::new(FormatterSettings::new()).format(&event);

        assert!(output.starts_with("<LogEvent Key=\"00000000-0000-0000-0000-000000000000\">"));
        assert!(output.contains("<Level>Error</Level>"));
        assert!(output.contains("<Context />"));
        assert!(output.contains("<Message>a &lt; b &amp; &quot;c&quot;</Message>"));
        assert!(output.contains("<Detail Label=\"code\" Type=\"Int64\">42</Detail>"));
        assert!(output.ends_with("</LogEvent>"));
    }

    #[test]
    fn test_xml_nested_exception() {
        let event = LogEvent::builder(LogLevel::Fatal)
            .exception(
                LogException::new("Outer", "failed").with_inner(LogException::new("Inner", "cause")),
            )
            .build();
        let output = XmlFormatter::default().format(&event);

        assert!(output.contains(
            "<Exception Type=\"Outer\"><Message>failed</Message>\
             <InnerException Type=\"Inner\"><Message>cause</Message></InnerException></Exception>"
        ));
        assert!(output.contains("<Details />"));
    }

    #[test]
    fn test_xml_custom_root() {
        let event = LogEvent::builder(LogLevel::Warn).key(Uuid::nil()).message("low disk").build();
        let output = XmlFormatter::new(FormatterSettings::new().with_xml_root("Entry")).format(&event);

        assert!(output.starts_with("<Entry Key=\"00000000-0000-0000-0000-000000000000\">"));
        assert!(output.ends_with("</Entry>"));
        assert!(!output.contains("LogEvent"));
    }

    #[test]
    fn test_escape_drops_control_characters() {
        assert_eq!(escape("bell\u{7}\ttab"), "bell\ttab");
        assert_eq!(escape("it's"), "it&apos;s");
    }
}
