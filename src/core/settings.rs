//! Formatter settings
//!
//! Plain data with serde support so an external loader can deserialize it.
//! Formatters only ever read it.

use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format selected for a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogType {
    #[default]
    Raw,
    Csv,
    Json,
    Xml,
    Gelf,
}

impl LogType {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogType::Raw => "Raw",
            LogType::Csv => "Csv",
            LogType::Json => "Json",
            LogType::Xml => "Xml",
            LogType::Gelf => "Gelf",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "text" => Ok(LogType::Raw),
            "csv" => Ok(LogType::Csv),
            "json" => Ok(LogType::Json),
            "xml" => Ok(LogType::Xml),
            "gelf" => Ok(LogType::Gelf),
            _ => Err(format!("Invalid log type: '{}'", s)),
        }
    }
}

/// Settings shared by all formatters
///
/// # Examples
///
/// ```
/// use rust_log_transport::{FormatterSettings, LogType, TimestampFormat};
///
/// let settings = FormatterSettings::new()
///     .with_log_type(LogType::Csv)
///     .with_csv_separator(';')
///     .with_csv_header(true)
///     .with_timestamp_format(TimestampFormat::Rfc3339);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    pub log_type: LogType,
    /// Separator between parts of a raw line and between detail pairs
    pub part_split: char,
    pub timestamp_format: TimestampFormat,
    pub show_level: bool,
    pub show_timestamp: bool,
    pub show_context: bool,
    pub show_scope: bool,
    pub show_exception: bool,
    pub show_details: bool,
    pub csv_separator: char,
    /// Emit a header row once, before the first CSV row
    pub csv_header: bool,
    /// Element name wrapping each XML event
    pub xml_root: String,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            log_type: LogType::default(),
            part_split: ';',
            timestamp_format: TimestampFormat::default(),
            show_level: true,
            show_timestamp: true,
            show_context: true,
            show_scope: true,
            show_exception: true,
            show_details: true,
            csv_separator: ',',
            csv_header: false,
            xml_root: "LogEvent".to_string(),
        }
    }
}

impl FormatterSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    #[must_use]
    pub fn with_part_split(mut self, part_split: char) -> Self {
        self.part_split = part_split;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    #[must_use]
    pub fn with_context(mut self, show: bool) -> Self {
        self.show_context = show;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, show: bool) -> Self {
        self.show_scope = show;
        self
    }

    #[must_use]
    pub fn with_exception(mut self, show: bool) -> Self {
        self.show_exception = show;
        self
    }

    #[must_use]
    pub fn with_details(mut self, show: bool) -> Self {
        self.show_details = show;
        self
    }

    #[must_use]
    pub fn with_csv_separator(mut self, separator: char) -> Self {
        self.csv_separator = separator;
        self
    }

    #[must_use]
    pub fn with_csv_header(mut self, enabled: bool) -> Self {
        self.csv_header = enabled;
        self
    }

    #[must_use]
    pub fn with_xml_root(mut self, root: impl Into<String>) -> Self {
        self.xml_root = root.into();
        self
    }
}
