//! Settings schema definitions.
//!
//! `LogSettings` is the validated form. Instances built by
//! `LogSettings::from_raw` (see `validation.rs`) uphold the normalization
//! rules: canonical level, no blank destinations, blank file paths
//! treated as absent.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Default strftime pattern for record timestamps.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default message template for the text formatter.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "{timestamp} | {level:<8} | {name} | {message}";

/// Severity levels, ordered from most permissive to least.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl LogLevel {
    /// All canonical levels, least severe first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::NotSet,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Canonical uppercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::NotSet => "NOTSET",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Numeric severity ordinal (NOTSET=0 … CRITICAL=50).
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse an exact canonical name. Callers fold case first.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width/alignment specs like `{:<8}` apply.
        f.pad(self.as_str())
    }
}

/// Output encodings for rendered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Text,
    Csv,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
            LogFormat::Csv => "csv",
        }
    }

    /// Parse an exact literal (`json`, `text`, `csv`).
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "json" => Some(LogFormat::Json),
            "text" => Some(LogFormat::Text),
            "csv" => Some(LogFormat::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink types a logger can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Console,
    File,
    Syslog,
}

impl DestinationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DestinationKind::Console => "console",
            DestinationKind::File => "file",
            DestinationKind::Syslog => "syslog",
        }
    }

    /// Case-insensitive lookup of a trimmed destination name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "console" => Some(DestinationKind::Console),
            "file" => Some(DestinationKind::File),
            "syslog" => Some(DestinationKind::Syslog),
            _ => None,
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    /// Minimum severity for loggers built from these settings.
    pub level: LogLevel,

    /// Output encoding shared by every destination.
    pub format: LogFormat,

    /// Log file path; `None` disables the file destination.
    pub file: Option<PathBuf>,

    /// Raw rotation interval (e.g. "1d"), parsed lazily.
    pub rotation: Option<String>,

    /// Raw retention (e.g. "7d"), parsed lazily.
    pub retention: Option<String>,

    /// Ordered, de-duplicated destination set.
    pub destinations: Vec<DestinationKind>,

    /// strftime pattern for record timestamps (UTC).
    pub date_format: String,

    /// Template used by the text formatter.
    pub message_template: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            file: None,
            rotation: None,
            retention: None,
            destinations: vec![DestinationKind::Console],
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl LogSettings {
    /// Destinations the assembly should attach, falling back to console
    /// when the configured set is empty.
    pub fn effective_destinations(&self) -> Vec<DestinationKind> {
        if self.destinations.is_empty() {
            vec![DestinationKind::Console]
        } else {
            self.destinations.clone()
        }
    }
}
