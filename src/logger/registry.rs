//! Process-wide logger registry keyed by name.
//!
//! # Responsibilities
//! - Hand out one shared `Logger` per logical name
//! - Rebuild a logger from the current settings on every `get_logger`
//! - Rebuild every known logger when settings are reloaded
//!
//! # Design Decisions
//! - The registry is an explicit value owned by the application, not a
//!   hidden global; tests create their own
//! - Loggers are never removed; they live as long as the registry
//! - File sinks are cached per path, so loggers writing the same file
//!   share one rotator

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::config::{LogSettings, SettingsLoader, DEFAULT_ENV_FILE};
use crate::destination::{ConsoleStream, FileSinks};
use crate::error::Result;
use crate::logger::Logger;

#[derive(Debug)]
pub struct LoggerRegistry {
    settings: ArcSwap<LogSettings>,
    loggers: DashMap<String, Arc<Logger>>,
    console: ConsoleStream,
    files: FileSinks,
}

impl LoggerRegistry {
    pub fn new(settings: LogSettings) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
            loggers: DashMap::new(),
            console: ConsoleStream::default(),
            files: FileSinks::new(),
        }
    }

    /// Load settings from the process environment and `.env`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(SettingsLoader::new().with_env_file(DEFAULT_ENV_FILE).load()?))
    }

    /// Send console output to `console` instead of stdout.
    pub fn with_console(mut self, console: ConsoleStream) -> Self {
        self.console = console;
        self
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> Arc<LogSettings> {
        self.settings.load_full()
    }

    /// Get the logger for `name`, (re)building it from the current settings.
    ///
    /// Repeated calls return the same logger with exactly one copy of each
    /// configured destination. On error the logger keeps whatever
    /// configuration it had before.
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>> {
        let logger = self
            .loggers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Logger::new(name)))
            .value()
            .clone();

        logger.reconfigure_with(&self.settings.load(), &self.console, &self.files)?;
        Ok(logger)
    }

    /// Look up an existing logger without rebuilding it.
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of every logger handed out so far, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Swap in new settings and rebuild every known logger in place.
    ///
    /// All loggers are attempted; the first failure is returned and the
    /// failing loggers keep their previous configuration.
    pub fn reload(&self, settings: LogSettings) -> Result<()> {
        self.settings.store(Arc::new(settings));
        let settings = self.settings.load();

        let loggers: Vec<Arc<Logger>> = self.loggers.iter().map(|entry| Arc::clone(entry.value())).collect();
        let mut first_error = None;
        for logger in &loggers {
            if let Err(e) = logger.reconfigure_with(&settings, &self.console, &self.files) {
                tracing::warn!(logger = %logger.name(), error = %e, "Failed to rebuild logger, keeping previous destinations");
                first_error.get_or_insert(e);
            }
        }

        self.files.release_unused();

        tracing::info!(loggers = loggers.len(), level = %settings.level, "Logging settings reloaded");
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new(LogSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationKind, LogLevel};
    use crate::destination::SharedBuffer;

    fn registry(settings: LogSettings) -> (LoggerRegistry, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let registry = LoggerRegistry::new(settings).with_console(ConsoleStream::Buffer(buffer.clone()));
        (registry, buffer)
    }

    #[test]
    fn test_same_name_same_logger() {
        let (registry, _) = registry(LogSettings::default());
        let a = registry.get_logger("api").unwrap();
        let b = registry.get_logger("api").unwrap();
        let c = registry.get_logger("db").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.names(), vec!["api", "db"]);
    }

    #[test]
    fn test_repeated_assembly_does_not_duplicate() {
        let (registry, buffer) = registry(LogSettings::default());
        for _ in 0..3 {
            registry.get_logger("api").unwrap();
        }
        let logger = registry.get("api").unwrap();
        assert_eq!(logger.destination_kinds(), vec![DestinationKind::Console]);

        logger.info("one line");
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_reload_rebuilds_existing_loggers() {
        let (registry, buffer) = registry(LogSettings::default());
        let logger = registry.get_logger("api").unwrap();
        logger.debug("hidden");
        assert!(buffer.lines().is_empty());

        registry
            .reload(LogSettings {
                level: LogLevel::Debug,
                ..LogSettings::default()
            })
            .unwrap();
        assert_eq!(registry.settings().level, LogLevel::Debug);

        logger.debug("visible");
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_loggers_share_one_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let (registry, _) = registry(LogSettings {
            file: Some(path),
            destinations: vec![DestinationKind::File],
            ..LogSettings::default()
        });

        registry.get_logger("a").unwrap();
        registry.get_logger("b").unwrap();
        registry.get_logger("a").unwrap();
        assert_eq!(registry.files.len(), 1);

        registry
            .reload(LogSettings {
                file: Some(dir.path().join("other.log")),
                destinations: vec![DestinationKind::File],
                ..LogSettings::default()
            })
            .unwrap();
        assert_eq!(registry.files.len(), 1);
    }
}
