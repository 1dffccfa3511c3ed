//! Record formatters.
//!
//! # Responsibilities
//! - Render a `LogRecord` into one output string per record
//! - Select the encoding (text, JSON, CSV) from a format identifier
//!
//! # Design Decisions
//! - `Formatter` is a trait object so each destination owns its own instance
//! - Timestamps are rendered in UTC through a pre-validated strftime pattern
//! - Unknown format identifiers fall back to text rather than failing

pub mod csv;
pub mod json;
pub mod template;
pub mod text;

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::config::{LogFormat, LogSettings, DEFAULT_DATE_FORMAT};
use crate::record::LogRecord;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use template::MessageTemplate;
pub use text::TextFormatter;

/// Renders a record into a single string (no trailing newline).
pub trait Formatter: Send + Sync + fmt::Debug {
    fn format(&self, record: &LogRecord) -> String;
}

/// A strftime pattern checked once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// Validate `pattern`, falling back to the default pattern if it
    /// contains an unknown specifier.
    pub fn new(pattern: &str) -> Self {
        let invalid = StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
        if invalid {
            tracing::warn!(date_format = %pattern, "Invalid date format, using default");
            return Self::default();
        }
        Self {
            pattern: pattern.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn render(&self, timestamp: &DateTime<Utc>) -> String {
        timestamp.format(&self.pattern).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Select a formatter by identifier (`json`, `csv`, anything else → text).
///
/// The identifier is matched case-insensitively.
pub fn get_formatter(format_id: &str, date_format: &str, message_template: &str) -> Box<dyn Formatter> {
    let date_format = DateFormat::new(date_format);
    match format_id.trim().to_ascii_lowercase().as_str() {
        "json" => Box::new(JsonFormatter::new(date_format)),
        "csv" => Box::new(CsvFormatter::new(date_format)),
        _ => Box::new(TextFormatter::new(date_format, MessageTemplate::parse(message_template))),
    }
}

/// Formatter for validated settings.
pub fn formatter_for(settings: &LogSettings) -> Box<dyn Formatter> {
    let format_id = match settings.format {
        LogFormat::Json => "json",
        LogFormat::Csv => "csv",
        LogFormat::Text => "text",
    };
    get_formatter(format_id, &settings.date_format, &settings.message_template)
}
