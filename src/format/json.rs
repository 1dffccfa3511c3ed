//! Single-line JSON formatter.

use serde::Serialize;

use crate::format::{DateFormat, Formatter};
use crate::record::LogRecord;

/// Wire shape of one JSON log line.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'static str,
    name: &'a str,
    message: &'a str,
    module: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<&'a str>,
}

/// Renders records as one JSON object per line.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    date_format: DateFormat,
}

impl JsonFormatter {
    pub fn new(date_format: DateFormat) -> Self {
        Self { date_format }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let line = JsonLine {
            timestamp: self.date_format.render(&record.timestamp),
            level: record.level.as_str(),
            name: &record.name,
            message: &record.message,
            module: &record.module,
            line: record.line,
            exception: record.exception.as_deref(),
        };
        // Serializing a struct of strings and integers cannot fail.
        serde_json::to_string(&line).unwrap_or_default()
    }
}
