//! Rotating file destination.
//!
//! # Responsibilities
//! - Create the parent directory and open the log file for append
//! - Roll the file over at time boundaries from `RotationPolicy`
//! - Delete the oldest rotated files beyond the retention count
//!
//! # Design Decisions
//! - Rollover is checked against the record timestamp on each write
//! - Rotated files are named `<file>.<suffix>` where the suffix is the
//!   UTC start of the closed period
//! - A retention of 0 keeps every rotated file
//! - Loggers sharing a path share one sink through `FileSinks`
//! - A deleted active file is recreated at the next rollover
//! - Writes are unbuffered so every line is a single append

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::destination::Sink;
use crate::error::DestinationError;
use crate::policy::RotationPolicy;
use crate::record::LogRecord;

#[derive(Debug)]
struct FileState {
    file: File,
    rollover_at: DateTime<Utc>,
}

/// A log file that rotates on time boundaries.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    retention: usize,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    /// Open `path`, creating its parent directory if necessary.
    ///
    /// The first boundary is computed from the existing file's
    /// modification time, or from now for a new file.
    pub fn open(path: &Path, policy: RotationPolicy, retention: usize) -> Result<Self, DestinationError> {
        create_parent(path)?;
        let start = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Self::open_at(path, policy, retention, start)
    }

    /// Open `path` with the rotation period starting at `start`.
    pub fn open_at(
        path: &Path,
        policy: RotationPolicy,
        retention: usize,
        start: DateTime<Utc>,
    ) -> Result<Self, DestinationError> {
        create_parent(path)?;
        let file = open_append(path).map_err(|source| DestinationError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            rotation = %policy,
            retention,
            "Opened log file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            policy,
            retention,
            state: Mutex::new(FileState {
                file,
                rollover_at: policy.next_rollover(start),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next rollover boundary.
    pub fn rollover_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().ok().map(|state| state.rollover_at)
    }

    /// Rotated files currently on disk, oldest first.
    pub fn rotated_files(&self) -> io::Result<Vec<PathBuf>> {
        let dir = parent_dir(&self.path);
        let Some(base) = self.path.file_name().and_then(|name| name.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{base}.");

        let mut rotated = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(suffix) = name.strip_prefix(&prefix) {
                if self.policy.matches_suffix(suffix) {
                    rotated.push(entry.path());
                }
            }
        }
        // Suffixes are zero-padded timestamps, so name order is age order.
        rotated.sort();
        Ok(rotated)
    }

    fn rotated_path(&self, period_start: DateTime<Utc>) -> PathBuf {
        let suffix = period_start.format(self.policy.suffix_format());
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{suffix}"));
        PathBuf::from(name)
    }

    fn rollover(&self, state: &mut FileState, now: DateTime<Utc>) -> io::Result<()> {
        let boundary = state.rollover_at;
        state.rollover_at = self.policy.next_rollover(now);
        state.file.flush()?;

        let rotated = self.rotated_path(self.policy.period_start(boundary));
        let renamed = if self.path.exists() {
            if rotated.exists() {
                fs::remove_file(&rotated)?;
            }
            fs::rename(&self.path, &rotated)
        } else {
            tracing::debug!(path = %self.path.display(), "Active log file is gone, recreating");
            Ok(())
        };
        // Reopen even when the rename failed so later writes reach the path.
        state.file = open_append(&self.path)?;
        renamed?;

        tracing::debug!(rotated = %rotated.display(), "Rotated log file");
        self.prune()
    }

    fn prune(&self) -> io::Result<()> {
        if self.retention == 0 {
            return Ok(());
        }
        let rotated = self.rotated_files()?;
        if rotated.len() > self.retention {
            for old in &rotated[..rotated.len() - self.retention] {
                fs::remove_file(old)?;
            }
        }
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write_line(&self, line: &str, record: &LogRecord) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        let rotated = if record.timestamp >= state.rollover_at {
            self.rollover(&mut state, record.timestamp)
        } else {
            Ok(())
        };

        let mut out = String::with_capacity(line.len() + 1);
        out.push_str(line);
        out.push('\n');
        state.file.write_all(out.as_bytes())?;

        // The line is written even when rotation failed; report the failure after.
        rotated
    }

    fn flush(&self) -> io::Result<()> {
        match self.state.lock() {
            Ok(mut state) => state.file.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Open file sinks keyed by path.
///
/// Loggers that name the same file share one `RotatingFileSink`, so a
/// single rollover state governs the file. A cached sink is reused while
/// its rotation policy and retention match; otherwise it is replaced.
#[derive(Debug, Default)]
pub struct FileSinks {
    sinks: DashMap<PathBuf, Arc<RotatingFileSink>>,
}

impl FileSinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared sink for `path`, opening it on first use.
    pub fn open(
        &self,
        path: &Path,
        policy: RotationPolicy,
        retention: usize,
    ) -> Result<Arc<RotatingFileSink>, DestinationError> {
        create_parent(path)?;
        match self.sinks.entry(sink_key(path)) {
            Entry::Occupied(mut entry) => {
                let cached = entry.get();
                if cached.policy == policy && cached.retention == retention {
                    return Ok(Arc::clone(cached));
                }
                let sink = Arc::new(RotatingFileSink::open(path, policy, retention)?);
                entry.insert(Arc::clone(&sink));
                Ok(sink)
            }
            Entry::Vacant(entry) => {
                let sink = Arc::new(RotatingFileSink::open(path, policy, retention)?);
                entry.insert(Arc::clone(&sink));
                Ok(sink)
            }
        }
    }

    /// Drop cached sinks no destination holds any more.
    pub fn release_unused(&self) {
        self.sinks.retain(|_, sink| Arc::strong_count(sink) > 1);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

/// Absolute path with the directory resolved, so `./app.log` and
/// `app.log` share a key.
fn sink_key(path: &Path) -> PathBuf {
    let resolved = match (parent_dir(path).canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => Some(dir.join(name)),
        _ => None,
    };
    resolved.unwrap_or_else(|| path.to_path_buf())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn create_parent(path: &Path) -> Result<(), DestinationError> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|source| DestinationError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::policy::parse_rotation;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn record_at(ts: DateTime<Utc>) -> LogRecord {
        LogRecord::new(LogLevel::Info, "app", "msg").with_timestamp(ts)
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("app.log");
        let sink = RotatingFileSink::open(&path, RotationPolicy::default(), 7).unwrap();
        sink.write_line("hello", &record_at(Utc::now())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_creation_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let err = RotatingFileSink::open(&blocker.join("app.log"), RotationPolicy::default(), 7).unwrap_err();
        assert!(matches!(err, DestinationError::CreateDirectory { .. }));
    }

    #[test]
    fn test_rolls_over_at_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let start = at("2024-03-01T10:00:00Z");
        let sink = RotatingFileSink::open_at(&path, parse_rotation(Some("1h")), 7, start).unwrap();
        assert_eq!(sink.rollover_at(), Some(at("2024-03-01T11:00:00Z")));

        sink.write_line("before", &record_at(start + Duration::minutes(30))).unwrap();
        sink.write_line("after", &record_at(at("2024-03-01T11:05:00Z"))).unwrap();

        let rotated = dir.path().join("app.log.2024-03-01_10");
        assert_eq!(fs::read_to_string(&rotated).unwrap(), "before\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");
        assert_eq!(sink.rollover_at(), Some(at("2024-03-01T12:05:00Z")));
    }

    #[test]
    fn test_rollover_recreates_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let start = at("2024-03-01T10:00:00Z");
        let sink = RotatingFileSink::open_at(&path, parse_rotation(Some("1h")), 7, start).unwrap();

        sink.write_line("r1", &record_at(start + Duration::minutes(10))).unwrap();
        fs::remove_file(&path).unwrap();

        sink.write_line("r2", &record_at(at("2024-03-01T11:05:00Z"))).unwrap();
        sink.write_line("r3", &record_at(at("2024-03-01T12:05:00Z"))).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "r3\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.2024-03-01_11")).unwrap(),
            "r2\n"
        );
        assert!(!dir.path().join("app.log.2024-03-01_10").exists());
    }

    #[test]
    fn test_shared_sink_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app.log");
        let files = FileSinks::new();
        let hourly = parse_rotation(Some("1h"));

        let first = files.open(&path, hourly, 7).unwrap();
        let same = files.open(&dir.path().join("logs").join(".").join("app.log"), hourly, 7).unwrap();
        assert!(Arc::ptr_eq(&first, &same));
        assert_eq!(files.len(), 1);

        let changed = files.open(&path, hourly, 3).unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        assert!(Arc::ptr_eq(&changed, &files.open(&path, hourly, 3).unwrap()));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_shared_sink_keeps_lines_across_rollover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let start = at("2024-03-01T10:00:00Z");
        let shared = Arc::new(RotatingFileSink::open_at(&path, parse_rotation(Some("1h")), 0, start).unwrap());
        let a: Box<dyn Sink> = Box::new(Arc::clone(&shared));
        let b: Box<dyn Sink> = Box::new(Arc::clone(&shared));

        a.write_line("a1", &record_at(start + Duration::minutes(1))).unwrap();
        b.write_line("b1", &record_at(start + Duration::minutes(2))).unwrap();
        let later = at("2024-03-01T11:01:00Z");
        a.write_line("a2", &record_at(later)).unwrap();
        b.write_line("b2", &record_at(later)).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.2024-03-01_10")).unwrap(),
            "a1\nb1\n"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "a2\nb2\n");
    }

    #[test]
    fn test_retention_deletes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let start = at("2024-03-01T00:00:00Z");
        let sink = RotatingFileSink::open_at(&path, RotationPolicy::default(), 2, start).unwrap();

        for day in 0..5 {
            let ts = start + Duration::days(day) + Duration::hours(1);
            sink.write_line(&format!("day {day}"), &record_at(ts)).unwrap();
        }

        let rotated = sink.rotated_files().unwrap();
        let names: Vec<String> = rotated
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0] < names[1]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "day 4\n");
    }

    #[test]
    fn test_zero_retention_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let start = at("2024-03-01T00:00:00Z");
        let sink = RotatingFileSink::open_at(&path, parse_rotation(Some("1m")), 0, start).unwrap();

        for minute in 0..4 {
            let ts = start + Duration::minutes(minute) + Duration::seconds(30);
            sink.write_line("tick", &record_at(ts)).unwrap();
        }
        assert_eq!(sink.rotated_files().unwrap().len(), 3);
    }

    #[test]
    fn test_unrelated_files_are_not_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(dir.path().join("app.log.backup"), "keep").unwrap();
        fs::write(dir.path().join("other.log.2020-01-01"), "keep").unwrap();

        let start = at("2024-03-01T00:00:00Z");
        let sink = RotatingFileSink::open_at(&path, RotationPolicy::default(), 1, start).unwrap();
        for day in 0..3 {
            sink.write_line("x", &record_at(start + Duration::days(day) + Duration::hours(1)))
                .unwrap();
        }

        assert!(dir.path().join("app.log.backup").exists());
        assert!(dir.path().join("other.log.2020-01-01").exists());
        assert_eq!(sink.rotated_files().unwrap().len(), 1);
    }
}
