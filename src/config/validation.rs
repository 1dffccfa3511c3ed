//! Settings normalization and validation.
//!
//! # Responsibilities
//! - Decode raw key/value input into `RawLogSettings` (serde, every field optional)
//! - Normalize: uppercase `level`, split `handlers`, blank `file` → absent
//! - Validate the enumerated literals (`level`, `format`)
//!
//! # Design Decisions
//! - Raw fields are `serde_json::Value` so a wrong shape never fails decoding;
//!   the normalizer decides whether to reject or degrade
//! - Only `level` and `format` are fatal; everything else degrades to a default
//! - Unknown keys are ignored (no `deny_unknown_fields`)

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::config::schema::{
    DestinationKind, LogFormat, LogLevel, LogSettings, DEFAULT_DATE_FORMAT,
    DEFAULT_MESSAGE_TEMPLATE,
};
use crate::error::SettingsError;

/// Settings as they arrive from a source, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLogSettings {
    pub level: Option<Value>,
    pub format: Option<Value>,
    pub file: Option<Value>,
    pub rotation: Option<Value>,
    pub retention: Option<Value>,
    #[serde(alias = "destinations")]
    pub handlers: Option<Value>,
    pub date_format: Option<Value>,
    #[serde(alias = "message_template")]
    pub message_format: Option<Value>,
}

impl LogSettings {
    /// Build validated settings from raw input.
    pub fn from_raw(raw: RawLogSettings) -> Result<Self, SettingsError> {
        let defaults = LogSettings::default();

        let level = match raw.level {
            Some(value) => normalize_level(&value)?,
            None => defaults.level,
        };

        let format = match raw.format {
            Some(value) => validate_format(&value)?,
            None => defaults.format,
        };

        let destinations = match raw.handlers {
            Some(value) => normalize_destinations(&value),
            None => defaults.destinations,
        };

        Ok(Self {
            level,
            format,
            file: raw.file.as_ref().and_then(normalize_file),
            rotation: raw.rotation.as_ref().and_then(as_text),
            retention: raw.retention.as_ref().and_then(as_text),
            destinations,
            date_format: raw
                .date_format
                .as_ref()
                .and_then(as_text)
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            message_template: raw
                .message_format
                .as_ref()
                .and_then(as_text)
                .unwrap_or_else(|| DEFAULT_MESSAGE_TEMPLATE.to_string()),
        })
    }
}

/// Uppercase string input, then require a canonical level name.
pub fn normalize_level(value: &Value) -> Result<LogLevel, SettingsError> {
    let candidate = match value {
        Value::String(s) => s.to_uppercase(),
        other => other.to_string(),
    };
    LogLevel::from_canonical(&candidate).ok_or(SettingsError::InvalidLevel { value: candidate })
}

fn validate_format(value: &Value) -> Result<LogFormat, SettingsError> {
    match value {
        Value::String(s) => {
            LogFormat::from_literal(s).ok_or_else(|| SettingsError::InvalidFormat { value: s.clone() })
        }
        other => Err(SettingsError::InvalidFormat {
            value: other.to_string(),
        }),
    }
}

/// Split a comma-separated string (or decode a JSON array string), or take
/// a structured list as-is. Any other shape yields an empty set.
pub fn normalize_destinations(value: &Value) -> Vec<DestinationKind> {
    let names: Vec<String> = match value {
        Value::String(s) => split_handlers(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        match DestinationKind::from_name(&name) {
            Some(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Some(_) => {}
            None => tracing::warn!(destination = %name, "Ignoring unknown log destination"),
        }
    }
    kinds
}

fn split_handlers(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_file(value: &Value) -> Option<PathBuf> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(PathBuf::from(s)),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
