//! Shared utilities for integration tests.

use applog::destination::{ConsoleStream, SharedBuffer};
use applog::{LogSettings, LoggerRegistry, SettingsLoader};

/// Registry whose console output is captured in a buffer.
#[allow(dead_code)]
pub fn capturing_registry(settings: LogSettings) -> (LoggerRegistry, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let registry = LoggerRegistry::new(settings).with_console(ConsoleStream::Buffer(buffer.clone()));
    (registry, buffer)
}

/// Build settings from `LOG_*` pairs as if they came from the environment.
#[allow(dead_code)]
pub fn settings_from(pairs: &[(&str, &str)]) -> LogSettings {
    SettingsLoader::new()
        .from_pairs(pairs.iter().copied())
        .unwrap()
}

/// Split a CSV line of double-quoted fields.
#[allow(dead_code)]
pub fn csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    while chars.peek().is_some() {
        assert_eq!(chars.next(), Some('"'), "field must start with a quote: {line}");
        let mut field = String::new();
        loop {
            match chars.next() {
                Some('"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                Some('"') => break,
                Some(c) => field.push(c),
                None => panic!("unterminated field: {line}"),
            }
        }
        fields.push(field);
        match chars.next() {
            Some(',') | None => {}
            Some(c) => panic!("unexpected {c:?} after field: {line}"),
        }
    }
    fields
}
