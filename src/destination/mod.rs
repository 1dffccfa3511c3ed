//! Log destinations (handlers).
//!
//! # Data Flow
//! ```text
//! LogRecord
//!     → Destination (owns a Formatter)
//!     → Formatter::format → one rendered line
//!     → Sink::write_line → console / rotating file / syslog
//! ```
//!
//! # Design Decisions
//! - One `Destination` per requested kind, each with its own formatter
//! - Construction is fallible (directories, files, sockets); writing
//!   reports `io::Error` and the logger isolates failures per destination
//! - A file destination without a configured path is skipped, not an error
//! - File sinks come from a `FileSinks` cache so one path has one rotator

pub mod console;
pub mod file;
pub mod syslog;

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::config::{DestinationKind, LogSettings};
use crate::error::DestinationError;
use crate::format::{formatter_for, Formatter};
use crate::policy::{parse_retention, parse_rotation};
use crate::record::LogRecord;

pub use console::{ConsoleSink, ConsoleStream, SharedBuffer};
pub use file::{FileSinks, RotatingFileSink};
pub use syslog::SyslogSink;

/// Output sink for rendered lines.
pub trait Sink: Send + Sync + fmt::Debug {
    /// Write one rendered record. The sink adds its own line terminator.
    fn write_line(&self, line: &str, record: &LogRecord) -> io::Result<()>;

    /// Flush buffered output, if any.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write_line(&self, line: &str, record: &LogRecord) -> io::Result<()> {
        (**self).write_line(line, record)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }
}

/// A sink bound to the formatter that renders records for it.
#[derive(Debug)]
pub struct Destination {
    kind: DestinationKind,
    formatter: Box<dyn Formatter>,
    sink: Box<dyn Sink>,
}

impl Destination {
    pub fn new(kind: DestinationKind, formatter: Box<dyn Formatter>, sink: Box<dyn Sink>) -> Self {
        Self {
            kind,
            formatter,
            sink,
        }
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Render and write a record.
    pub fn handle(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.formatter.format(record);
        self.sink.write_line(&line, record)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Build one destination per configured kind, console going to stdout.
pub fn build_destinations(settings: &LogSettings) -> Result<Vec<Destination>, DestinationError> {
    build_destinations_with(settings, &ConsoleStream::Stdout, &FileSinks::new())
}

/// Build destinations, sending console output to `console` and taking
/// file sinks from `files`.
///
/// An empty destination set falls back to console only.
pub fn build_destinations_with(
    settings: &LogSettings,
    console: &ConsoleStream,
    files: &FileSinks,
) -> Result<Vec<Destination>, DestinationError> {
    let mut destinations = Vec::new();

    for kind in settings.effective_destinations() {
        let sink: Box<dyn Sink> = match kind {
            DestinationKind::Console => Box::new(ConsoleSink::new(console.clone())),
            DestinationKind::File => {
                let Some(path) = &settings.file else {
                    tracing::debug!("File destination requested without a path, skipping");
                    continue;
                };
                let policy = parse_rotation(settings.rotation.as_deref());
                let retention = parse_retention(settings.retention.as_deref());
                Box::new(files.open(path, policy, retention)?)
            }
            DestinationKind::Syslog => Box::new(SyslogSink::connect()?),
        };
        destinations.push(Destination::new(kind, formatter_for(settings), sink));
    }

    Ok(destinations)
}
