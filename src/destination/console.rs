//! Console destination.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::destination::Sink;
use crate::record::LogRecord;

/// Where console output goes.
#[derive(Debug, Clone, Default)]
pub enum ConsoleStream {
    /// The process's standard output.
    #[default]
    Stdout,
    /// An in-memory buffer, for capturing output in tests and tools.
    Buffer(SharedBuffer),
}

/// Clonable in-memory writer; all clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        match self.bytes.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Written output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut bytes) = self.bytes.lock() {
            bytes.clear();
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .bytes
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one line per record to a console stream.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }
}

impl Sink for ConsoleSink {
    fn write_line(&self, line: &str, _record: &LogRecord) -> io::Result<()> {
        let mut out = String::with_capacity(line.len() + 1);
        out.push_str(line);
        out.push('\n');

        // A single write_all keeps the line intact under concurrent callers.
        match &self.stream {
            ConsoleStream::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(out.as_bytes())?;
                stdout.flush()
            }
            ConsoleStream::Buffer(buffer) => buffer.clone().write_all(out.as_bytes()),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match &self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Buffer(_) => Ok(()),
        }
    }
}
