//! Formatters turning a [`LogEvent`] into a wire-ready string
//!
//! Every formatter is pure: no I/O, no failure. Values that cannot be
//! represented natively in a format degrade to their string form.
//!
//! | Format | Example |
//! |--------|---------|
//! | Raw    | `ERROR;2025-01-08T10:30:45.123Z;storage;disk full;code=42` |
//! | Csv    | `"Error","2025-01-08T10:30:45.123Z","storage","","disk full","","code=42"` |
//! | Json   | `{"key":"…","level":"Error","message":"disk full","details":[…]}` |
//! | Xml    | `<LogEvent><Level>Error</Level>…</LogEvent>` |
//! | Gelf   | `{"version":"1.1","host":"web-01","short_message":"disk full",…}` |

pub mod csv;
pub mod gelf;
pub mod json;
pub mod raw;
pub mod xml;

pub use self::csv::CsvFormatter;
pub use self::gelf::GelfFormatter;
pub use self::json::JsonFormatter;
pub use self::raw::RawFormatter;
pub use self::xml::XmlFormatter;

use crate::core::{FormatterSettings, LogEvent, LogType, ResolverFacade};
use std::sync::Arc;

/// Converts a log event into its textual representation
pub trait Formatter: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;

    fn log_type(&self) -> LogType;
}

type FormatterConstructor = fn(FormatterSettings, &dyn ResolverFacade) -> Box<dyn Formatter>;

fn build_raw(settings: FormatterSettings, _: &dyn ResolverFacade) -> Box<dyn Formatter> {
    Box::new(RawFormatter::new(settings))
}

fn build_csv(settings: FormatterSettings, resolver: &dyn ResolverFacade) -> Box<dyn Formatter> {
    Box::new(CsvFormatter::new(settings, resolver))
}

fn build_json(settings: FormatterSettings, _: &dyn ResolverFacade) -> Box<dyn Formatter> {
    Box::new(JsonFormatter::new(settings))
}

fn build_xml(settings: FormatterSettings, _: &dyn ResolverFacade) -> Box<dyn Formatter> {
    Box::new(XmlFormatter::new(settings))
}

fn build_gelf(settings: FormatterSettings, resolver: &dyn ResolverFacade) -> Box<dyn Formatter> {
    Box::new(GelfFormatter::new(settings, resolver))
}

fn constructor_for(log_type: LogType) -> FormatterConstructor {
    match log_type {
        LogType::Raw => build_raw,
        LogType::Csv => build_csv,
        LogType::Json => build_json,
        LogType::Xml => build_xml,
        LogType::Gelf => build_gelf,
    }
}

/// Build the formatter selected by `settings.log_type`
///
/// # Example
///
/// ```
/// use rust_log_transport::formatters::create_formatter;
/// use rust_log_transport::{FormatterSettings, LogEvent, LogLevel, LogType, StaticResolver};
/// use std::sync::Arc;
///
/// let settings = FormatterSettings::new().with_log_type(LogType::Gelf);
/// let resolver = Arc::new(StaticResolver::new(Some("web-01".to_string())));
/// let formatter = create_formatter(settings, resolver);
///
/// let payload = formatter.format(&LogEvent::new(LogLevel::Warn, "slow query"));
/// assert!(payload.contains("\"host\":\"web-01\""));
/// ```
pub fn create_formatter(
    settings: FormatterSettings,
    resolver: Arc<dyn ResolverFacade>,
) -> Box<dyn Formatter> {
    constructor_for(settings.log_type)(settings, resolver.as_ref())
}

/// Escape line breaks and tabs so a value stays on one line
pub(crate) fn single_line(value: &str) -> String {
    value
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Detail pairs rendered as `label=value` joined by `separator`
pub(crate) fn joined_details(event: &LogEvent, separator: char) -> String {
    event
        .details()
        .iter()
        .map(|detail| detail.to_string())
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, StaticResolver};

    #[test]
    fn test_registry_covers_every_log_type() {
        let resolver: Arc<dyn ResolverFacade> = Arc::new(StaticResolver::default());
        for log_type in [LogType::Raw, LogType::Csv, LogType::Json, LogType::Xml, LogType::Gelf] {
            let settings = FormatterSettings::new().with_log_type(log_type);
            let formatter = create_formatter(settings, Arc::clone(&resolver));
            assert_eq!(formatter.log_type(), log_type);

            let output = formatter.format(&LogEvent::new(LogLevel::Info, "hello"));
            assert!(output.contains("hello"), "{} output: {}", log_type, output);
        }
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\nb\r\tc"), "a\\nb\\r\\tc");
    }
}
