//! Log record passed from a logger to its destinations.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::panic::Location;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::LogLevel;

/// A single log event, fully rendered except for its encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Creation time (UTC). Also drives file rotation.
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Logical logger name.
    pub name: String,
    /// Message with arguments already substituted.
    pub message: String,
    /// Source file stem of the call site.
    pub module: String,
    /// Source line of the call site.
    pub line: u32,
    /// Rendered exception detail, if any.
    pub exception: Option<String>,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(level: LogLevel, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            name: name.into(),
            message: message.into(),
            module: String::new(),
            line: 0,
            exception: None,
        }
    }

    /// Builder-style method for setting the call site.
    pub fn with_location(mut self, location: &Location<'_>) -> Self {
        self.module = module_of(location.file());
        self.line = location.line();
        self
    }

    /// Builder-style method for attaching exception detail.
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Builder-style method for overriding the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// File stem of a source path (`src/http/server.rs` → `server`).
pub fn module_of(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
        .to_string()
}

/// Render an error and its `source()` chain.
pub fn render_exception(error: &(dyn StdError + 'static)) -> String {
    let mut out = format!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\nCaused by: {cause}");
        source = cause.source();
    }
    out
}
