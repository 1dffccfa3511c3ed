//! Human-readable text formatter.

use crate::format::{DateFormat, Formatter, MessageTemplate};
use crate::record::LogRecord;

/// Renders records through a `MessageTemplate`, appending exception
/// detail on the following line(s).
#[derive(Debug, Clone)]
pub struct TextFormatter {
    date_format: DateFormat,
    template: MessageTemplate,
}

impl TextFormatter {
    pub fn new(date_format: DateFormat, template: MessageTemplate) -> Self {
        Self {
            date_format,
            template,
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let timestamp = self.date_format.render(&record.timestamp);
        let mut line = self.template.render(record, &timestamp);
        if let Some(exception) = &record.exception {
            line.push('\n');
            line.push_str(exception);
        }
        line
    }
}
