//! Plain text formatter

use super::{single_line, Formatter};
use crate::core::{FormatterSettings, LogEvent, LogType};

/// Joins the event fields with `part_split`, skipping empty or hidden fields
///
/// Line breaks inside values are escaped so that one event is always one line
/// and cannot be mistaken for several entries.
#[derive(Debug, Clone, Default)]
pub struct RawFormatter {
    settings: FormatterSettings,
}

impl RawFormatter {
    pub fn new(settings: FormatterSettings) -> Self {
        Self { settings }
    }
}

impl Formatter for RawFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let settings = &self.settings;
        let mut parts: Vec<String> = Vec::new();

        if settings.show_level {
            parts.push(event.level().to_str().to_string());
        }
        if settings.show_timestamp {
            parts.push(single_line(&settings.timestamp_format.format(event.timestamp())));
        }
        if settings.show_context {
            parts.push(single_line(event.context()));
        }
        if settings.show_scope {
            parts.push(single_line(event.scope()));
        }
        parts.push(single_line(event.message()));
        if settings.show_exception {
            if let Some(exception) = event.exception() {
                parts.push(single_line(&exception.to_string()));
            }
        }
        if settings.show_details {
            parts.extend(
                event
                    .details()
                    .iter()
                    .map(|detail| single_line(&detail.to_string())),
            );
        }

        parts.retain(|part| !part.is_empty());
        parts.join(&settings.part_split.to_string())
    }

    fn log_type(&self) -> LogType {
        LogType::Raw
    }
}
