//! Logger assembly and emission.
//!
//! # Responsibilities
//! - Hold a named logger's threshold and ordered destination list
//! - Filter, build, and dispatch records to every destination
//! - Rebuild a logger in place from settings (idempotent reconfiguration)
//!
//! # Design Decisions
//! - Threshold and destinations live behind one `ArcSwap`, so a rebuild
//!   replaces both at once and in-flight emits finish on the old set
//! - A failing destination never stops delivery to the others; the
//!   failure is written to standard error and swallowed
//! - Leveled methods are `#[track_caller]` so records carry the call site

mod macros;
pub mod registry;

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{DestinationKind, LogLevel, LogSettings};
use crate::destination::{build_destinations_with, ConsoleStream, Destination, FileSinks};
use crate::error::DestinationError;
use crate::record::{render_exception, LogRecord};

pub use registry::LoggerRegistry;

#[derive(Debug)]
struct LoggerState {
    level: LogLevel,
    destinations: Vec<Destination>,
}

/// A named logger with a severity threshold and attached destinations.
#[derive(Debug)]
pub struct Logger {
    name: String,
    state: ArcSwap<LoggerState>,
}

impl Logger {
    /// Create a logger with no destinations that accepts every level.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ArcSwap::from_pointee(LoggerState {
                level: LogLevel::NotSet,
                destinations: Vec::new(),
            }),
        }
    }

    /// Create a logger and configure it from `settings`.
    pub fn from_settings(
        name: impl Into<String>,
        settings: &LogSettings,
        console: &ConsoleStream,
    ) -> Result<Self, DestinationError> {
        let logger = Self::new(name);
        logger.reconfigure(settings, console)?;
        Ok(logger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        self.state.load().level
    }

    /// Kinds of the attached destinations, in dispatch order.
    pub fn destination_kinds(&self) -> Vec<DestinationKind> {
        self.state.load().destinations.iter().map(Destination::kind).collect()
    }

    /// True if a record at `level` would be dispatched.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.state.load().level
    }

    /// Replace the threshold and destinations from `settings`.
    ///
    /// Every destination is built before anything is swapped; on error
    /// the logger keeps its previous configuration.
    pub fn reconfigure(&self, settings: &LogSettings, console: &ConsoleStream) -> Result<(), DestinationError> {
        self.reconfigure_with(settings, console, &FileSinks::new())
    }

    /// Like `reconfigure`, taking file sinks from a shared cache.
    pub fn reconfigure_with(
        &self,
        settings: &LogSettings,
        console: &ConsoleStream,
        files: &FileSinks,
    ) -> Result<(), DestinationError> {
        let destinations = build_destinations_with(settings, console, files)?;
        let kinds: Vec<&'static str> = destinations.iter().map(|d| d.kind().as_str()).collect();

        self.state.store(Arc::new(LoggerState {
            level: settings.level,
            destinations,
        }));

        tracing::debug!(
            logger = %self.name,
            level = %settings.level,
            destinations = ?kinds,
            "Logger configured"
        );
        Ok(())
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if self.is_enabled(level) {
            self.dispatch(level, message.to_string(), None, Location::caller());
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.log(LogLevel::Critical, message);
    }

    /// Log at ERROR with `error` and its source chain attached.
    #[track_caller]
    pub fn exception(&self, message: impl fmt::Display, error: &(dyn StdError + 'static)) {
        self.log_error(LogLevel::Error, message, error);
    }

    /// Log at `level` with `error` and its source chain attached.
    #[track_caller]
    pub fn log_error(&self, level: LogLevel, message: impl fmt::Display, error: &(dyn StdError + 'static)) {
        if self.is_enabled(level) {
            self.dispatch(
                level,
                message.to_string(),
                Some(render_exception(error)),
                Location::caller(),
            );
        }
    }

    /// Dispatch an already-built record, bypassing call-site capture.
    pub fn handle(&self, record: &LogRecord) {
        let state = self.state.load();
        if record.level < state.level {
            return;
        }
        for destination in &state.destinations {
            if let Err(e) = destination.handle(record) {
                report_emit_error(destination.kind(), record, &e);
            }
        }
    }

    /// Flush every destination, returning the first failure.
    pub fn flush(&self) -> io::Result<()> {
        let state = self.state.load();
        let mut result = Ok(());
        for destination in &state.destinations {
            if let Err(e) = destination.flush() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn dispatch(&self, level: LogLevel, message: String, exception: Option<String>, location: &Location<'_>) {
        let mut record = LogRecord::new(level, self.name.as_str(), message).with_location(location);
        if let Some(exception) = exception {
            record = record.with_exception(exception);
        }
        self.handle(&record);
    }
}

/// Last-resort report for a destination that failed to write.
fn report_emit_error(kind: DestinationKind, record: &LogRecord, error: &io::Error) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(
        out,
        "--- Logging error ---\n\
         Destination: {kind}\n\
         Error: {error}\n\
         Message: {message:?}\n\
         Logged from {module}, line {line}",
        message = record.message,
        module = record.module,
        line = record.line,
    );
}
