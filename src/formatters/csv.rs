//! CSV formatter

use super::{joined_details, Formatter};
use crate::core::{FormatterSettings, LogEvent, LogType, ResolverFacade};
use std::sync::atomic::{AtomicBool, Ordering};

/// Formats one event as one CSV row
///
/// Every field is quoted and embedded quotes are doubled, so separators and
/// line breaks inside values are safe. Hidden columns are left out entirely;
/// empty columns stay as `""` so rows remain aligned with the header.
///
/// When `csv_header` is enabled the header row is prepended to the first row
/// this formatter instance produces, and never again.
#[derive(Debug)]
pub struct CsvFormatter {
    settings: FormatterSettings,
    new_line: &'static str,
    header_written: AtomicBool,
}

impl CsvFormatter {
    pub fn new(settings: FormatterSettings, resolver: &dyn ResolverFacade) -> Self {
        Self {
            settings,
            new_line: resolver.new_line(),
            header_written: AtomicBool::new(false),
        }
    }

    /// Column names, in output order, for the current settings
    pub fn columns(&self) -> Vec<&'static str> {
        let s = &self.settings;
        [
            ("Level", s.show_level),
            ("Timestamp", s.show_timestamp),
            ("Context", s.show_context),
            ("Scope", s.show_scope),
            ("Message", true),
            ("Exception", s.show_exception),
            ("Details", s.show_details),
        ]
        .into_iter()
        .filter_map(|(name, shown)| shown.then_some(name))
        .collect()
    }

    /// Header row, without trailing newline
    pub fn header(&self) -> String {
        self.join(self.columns().into_iter().map(String::from))
    }

    fn row(&self, event: &LogEvent) -> String {
        let s = &self.settings;
        let mut fields: Vec<String> = Vec::with_capacity(7);

        if s.show_level {
            fields.push(event.level().name().to_string());
        }
        if s.show_timestamp {
            fields.push(s.timestamp_format.format(event.timestamp()));
        }
        if s.show_context {
            fields.push(event.context().to_string());
        }
        if s.show_scope {
            fields.push(event.scope().to_string());
        }
        fields.push(event.message().to_string());
        if s.show_exception {
            fields.push(event.exception().map(|e| e.to_string()).unwrap_or_default());
        }
        if s.show_details {
            fields.push(joined_details(event, s.part_split));
        }

        self.join(fields)
    }

    fn join(&self, fields: impl IntoIterator<Item = String>) -> String {
        fields
            .into_iter()
            .map(|field| quote(&field))
            .collect::<Vec<_>>()
            .join(&self.settings.csv_separator.to_string())
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let row = self.row(event);
        if self.settings.csv_header && !self.header_written.swap(true, Ordering::AcqRel) {
            return format!("{}{}{}", self.header(), self.new_line, row);
        }
        row
    }

    fn log_type(&self) -> LogType {
        LogType::Csv
    }
}

/// Quote a CSV field, doubling embedded quotes
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, StaticResolver};
    use chrono::{TimeZone, Utc};

    fn disk_full() -> LogEvent {
        LogEvent::builder(LogLevel::Error)
            .timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().expect("valid datetime"))
            .message("disk full")
            .detail("code", 42)
            .build()
    }

    fn formatter(settings: FormatterSettings) -> CsvFormatter {
        CsvFormatter::new(settings, &StaticResolver::default())
    }

    #[test]
    fn test_csv_row() {
        let output = formatter(FormatterSettings::default()).format(&disk_full());
        assert_eq!(
            output,
            r#""Error","2025-01-08T10:30:45.000Z","","","disk full","","code=42""#
        );
    }

    #[test]
    fn test_csv_hidden_columns_are_dropped() {
        let settings = FormatterSettings::new()
            .with_context(false)
            .with_scope(false)
            .with_exception(false);
        let output = formatter(settings).format(&disk_full());
        assert_eq!(
            output,
            r#""Error","2025-01-08T10:30:45.000Z","disk full","code=42""#
        );
    }

    #[test]
    fn test_csv_escapes_quotes_and_uses_separator() {
        let event = LogEvent::builder(LogLevel::Info)
            .message(r#"said "hi"; left"#)
            .build();
        let settings = FormatterSettings::new()
            .with_csv_separator(';')
            .with_timestamp(false)
            .with_level(false)
            .with_context(false)
            .with_scope(false)
            .with_exception(false)
            .with_details(false);
        assert_eq!(formatter(settings).format(&event), r#""said ""hi""; left""#);
    }

    #[test]
    fn test_csv_header_written_once() {
        let settings = FormatterSettings::new()
            .with_csv_header(true)
            .with_timestamp(false)
            .with_context(false)
            .with_scope(false)
            .with_exception(false)
            .with_details(false);
        let formatter = CsvFormatter::new(settings, &StaticResolver::default());

        let first = formatter.format(&LogEvent::new(LogLevel::Info, "one"));
        let second = formatter.format(&LogEvent::new(LogLevel::Info, "two"));

        let new_line = crate::core::resolver::platform_new_line();
        assert_eq!(first, format!("\"Level\",\"Message\"{}\"Info\",\"one\"", new_line));
        assert_eq!(second, "\"Info\",\"two\"");
    }
}
