//! Error types for settings construction and destination assembly.
//!
//! Parse fallbacks (rotation, retention, destination names) are not
//! errors and never reach these types. Emit-time failures are reported
//! on standard error by the logger and are not represented here either.

use std::io;
use std::path::PathBuf;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by settings loading and logger assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings could not be constructed.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A destination could not be constructed.
    #[error(transparent)]
    Destination(#[from] DestinationError),
}

/// Fatal configuration errors raised while building `LogSettings`.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `level` is not one of the six canonical names.
    #[error("invalid value for `level`: {value:?} (expected one of CRITICAL, ERROR, WARNING, INFO, DEBUG, NOTSET)")]
    InvalidLevel { value: String },

    /// `format` is not one of the supported output formats.
    #[error("invalid value for `format`: {value:?} (expected one of json, text, csv)")]
    InvalidFormat { value: String },

    /// A settings source could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// An env-file could not be parsed.
    #[error("failed to parse env-file {path}: {source}")]
    EnvFile { path: PathBuf, source: dotenvy::Error },

    /// A TOML settings file could not be parsed.
    #[error("failed to parse settings file {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },

    /// Raw key/value input had a shape serde could not decode.
    #[error("malformed settings input: {0}")]
    Decode(String),
}

/// I/O failures raised while constructing a destination.
#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    /// The parent directory of the log file could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    /// The log file could not be opened for append.
    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: PathBuf, source: io::Error },

    /// Neither the local syslog socket nor the fallback transport was usable.
    #[error("syslog unavailable: {0}")]
    SyslogUnavailable(io::Error),
}
