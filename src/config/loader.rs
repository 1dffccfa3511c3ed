//! Settings loading from the environment, env-files and TOML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::schema::LogSettings;
use crate::config::validation::RawLogSettings;
use crate::error::SettingsError;

/// Key prefix for the logging settings group.
pub const ENV_PREFIX: &str = "LOG_";

/// Default env-file consulted when no explicit path is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Loads `LogSettings` from prefixed key/value sources.
///
/// Precedence, lowest first: defaults, env-file, process environment.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    prefix: String,
    env_file: Option<PathBuf>,
}

impl SettingsLoader {
    /// Loader for the `LOG_` group with no env-file.
    pub fn new() -> Self {
        Self {
            prefix: ENV_PREFIX.to_string(),
            env_file: None,
        }
    }

    /// Use a different key prefix (e.g. `AUDIT_LOG_`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Read this env-file before the process environment. A missing file is skipped.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// The env-file this loader reads, if any.
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Load from the env-file (if present) and the process environment.
    pub fn load(&self) -> Result<LogSettings, SettingsError> {
        let mut pairs = Vec::new();
        if let Some(path) = &self.env_file {
            pairs.extend(read_env_file(path)?);
        }
        pairs.extend(
            std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
        );
        self.from_pairs(pairs)
    }

    /// Build settings from raw key/value pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(&self, pairs: I) -> Result<LogSettings, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prefix = self.prefix.to_ascii_lowercase();
        let mut fields = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.as_ref().to_ascii_lowercase();
            if let Some(field) = key.strip_prefix(&prefix) {
                if !field.is_empty() {
                    fields.insert(field.to_string(), Value::String(value.into()));
                }
            }
        }

        let map: Map<String, Value> = fields.into_iter().collect();
        let raw: RawLogSettings = serde_json::from_value(Value::Object(map))
            .map_err(|e| SettingsError::Decode(e.to_string()))?;
        LogSettings::from_raw(raw)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, SettingsError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Env-file not found, skipping");
        return Ok(Vec::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|source| SettingsError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;

    iter.map(|item| {
        item.map_err(|source| SettingsError::EnvFile {
            path: path.to_path_buf(),
            source,
        })
    })
    .collect()
}

/// Load settings from a TOML file.
///
/// Keys are read from a `[log]` table when present, otherwise from the
/// top level. Unlike env input, `handlers` may be a real array here.
pub fn load_settings_file(path: &Path) -> Result<LogSettings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_raw_toml(&content).map_err(|source| SettingsError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    LogSettings::from_raw(raw)
}

fn parse_raw_toml(content: &str) -> Result<RawLogSettings, toml::de::Error> {
    let mut table: toml::Table = toml::from_str(content)?;
    let section = match table.remove("log") {
        Some(toml::Value::Table(log)) => log,
        _ => table,
    };
    toml::Value::Table(section).try_into()
}

/// Where a process gets its logging settings from.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// Env-file and process environment.
    Env(SettingsLoader),
    /// A TOML settings file.
    Toml(PathBuf),
}

impl SettingsSource {
    pub fn load(&self) -> Result<LogSettings, SettingsError> {
        match self {
            SettingsSource::Env(loader) => loader.load(),
            SettingsSource::Toml(path) => load_settings_file(path),
        }
    }

    /// The file whose changes should trigger a reload, if any.
    pub fn watch_path(&self) -> Option<&Path> {
        match self {
            SettingsSource::Env(loader) => loader.env_file(),
            SettingsSource::Toml(path) => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DestinationKind, LogFormat, LogLevel};
    use std::io::Write;

    #[test]
    fn test_prefix_is_case_insensitive() {
        let settings = SettingsLoader::new()
            .from_pairs([("log_level", "warning"), ("LOG_FORMAT", "json"), ("Log_Handlers", "file")])
            .unwrap();
        assert_eq!(settings.level, LogLevel::Warning);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.destinations, vec![DestinationKind::File]);
    }

    #[test]
    fn test_other_groups_do_not_collide() {
        let settings = SettingsLoader::new()
            .from_pairs([("APP_LEVEL", "nonsense"), ("DATABASE_FORMAT", "xml"), ("LOG_LEVEL", "error")])
            .unwrap();
        assert_eq!(settings.level, LogLevel::Error);
        assert_eq!(settings.format, LogFormat::Text);
    }

    #[test]
    fn test_custom_prefix() {
        let settings = SettingsLoader::new()
            .with_prefix("AUDIT_")
            .from_pairs([("AUDIT_LEVEL", "critical"), ("LOG_LEVEL", "debug")])
            .unwrap();
        assert_eq!(settings.level, LogLevel::Critical);
    }

    #[test]
    fn test_later_pairs_win() {
        let settings = SettingsLoader::new()
            .from_pairs([("LOG_LEVEL", "debug"), ("LOG_LEVEL", "error")])
            .unwrap();
        assert_eq!(settings.level, LogLevel::Error);
    }

    #[test]
    fn test_env_file_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "LOG_LEVEL=debug").unwrap();
        writeln!(file, "LOG_FILE=/tmp/app/app.log").unwrap();
        writeln!(file, "APP_NAME=demo").unwrap();

        let pairs = read_env_file(&path).unwrap();
        let settings = SettingsLoader::new().from_pairs(pairs).unwrap();
        assert_eq!(settings.level, LogLevel::Debug);
        assert_eq!(settings.file, Some(PathBuf::from("/tmp/app/app.log")));
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        let pairs = read_env_file(Path::new("/definitely/not/here/.env")).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_toml_log_table_with_list() {
        let raw = parse_raw_toml(
            r#"
            [app]
            name = "demo"

            [log]
            level = "info"
            format = "csv"
            handlers = ["console", "syslog"]
            rotation = "12h"
            "#,
        )
        .unwrap();
        let settings = LogSettings::from_raw(raw).unwrap();
        assert_eq!(settings.format, LogFormat::Csv);
        assert_eq!(
            settings.destinations,
            vec![DestinationKind::Console, DestinationKind::Syslog]
        );
        assert_eq!(settings.rotation.as_deref(), Some("12h"));
    }

    #[test]
    fn test_toml_invalid_level() {
        let raw = parse_raw_toml("level = \"loud\"").unwrap();
        assert!(matches!(
            LogSettings::from_raw(raw),
            Err(SettingsError::InvalidLevel { .. })
        ));
    }
}
