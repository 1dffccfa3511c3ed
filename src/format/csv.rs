//! Delimited (CSV) formatter.

use crate::format::{DateFormat, Formatter};
use crate::record::LogRecord;

/// Renders `"timestamp","level","name","message"`.
///
/// Embedded double quotes are doubled. Exception detail is not written.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    date_format: DateFormat,
}

impl CsvFormatter {
    pub fn new(date_format: DateFormat) -> Self {
        Self { date_format }
    }
}

fn escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

impl Formatter for CsvFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            escape(&self.date_format.render(&record.timestamp)),
            record.level.as_str(),
            escape(&record.name),
            escape(&record.message),
        )
    }
}
