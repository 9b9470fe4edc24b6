//! Append-only audit log.
//!
//! Lines have the form `<ctime timestamp> - <event>`. The log is a side
//! channel: it is never served through the tree. Sinks are pluggable so
//! handlers can be tested against [`MemorySink`].

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::clock::Clock;

/// File name of the audit log inside the user's home.
pub const LOG_FILE_NAME: &str = "fakelog";

/// Default audit log location: `$HOME/fakelog`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

/// Format a time the way `ctime` does, e.g. `Mon Oct 19 09:04:05 +02:00 2026`.
pub fn ctime(t: SystemTime) -> String {
    DateTime::<Local>::from(t)
        .format("%a %b %e %H:%M:%S %Z %Y")
        .to_string()
}

/// Destination for finished audit lines.
pub trait AuditSink: Send + Sync {
    /// Append one complete line (including its trailing newline).
    fn append(&self, line: &str) -> io::Result<()>;
}

/// Appends to a file opened once for the process lifetime.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileSink {
    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended so far, without trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .map(|l| l.trim_end_matches('\n').to_string())
            .collect()
    }

    /// Number of lines appended so far.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl AuditSink for MemorySink {
    fn append(&self, line: &str) -> io::Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

/// Timestamps events and hands them to a sink.
///
/// The timestamp is taken under the same lock as the append, so timestamps
/// in the sink never go backwards as long as the clock does not.
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    order: Mutex<()>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink,
            clock,
            order: Mutex::new(()),
        }
    }

    /// Append `<timestamp> - <event>`.
    ///
    /// Sink failures are reported through tracing and otherwise swallowed:
    /// a broken log must not change what clients see.
    pub fn record(&self, event: &str) {
        let _order = self.order.lock();
        let line = format!("{} - {}\n", ctime(self.clock.now()), event);
        if let Err(e) = self.sink.append(&line) {
            tracing::warn!(error = %e, event, "audit append failed");
        }
    }

    /// Append `<timestamp> - <caller> - <action>`.
    pub fn record_access(&self, caller: &str, action: &str) {
        self.record(&format!("{} - {}", caller, action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    struct Broken;

    impl AuditSink for Broken {
        fn append(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_record_format() {
        let sink = Arc::new(MemorySink::new());
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let log = AuditLog::new(sink.clone(), clock.clone());

        log.record_access("glenda", "read the honeypot");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let expected_ts = ctime(clock.now());
        assert_eq!(lines[0], format!("{} - glenda - read the honeypot", expected_ts));
    }

    #[test]
    fn test_ctime_shape() {
        let ts = ctime(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * 400));
        // Weekday, month, day, time, zone, year
        assert!(ts.split_whitespace().count() >= 6, "unexpected ctime: {ts}");
        assert!(ts.ends_with("1971"));
    }

    #[test]
    fn test_broken_sink_is_swallowed() {
        let log = AuditLog::new(Arc::new(Broken), Arc::new(ManualClock::at_unix(0)));
        log.record("still fine");
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        std::fs::write(&path, "existing\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        sink.append("one\n").unwrap();
        sink.append("two\n").unwrap();
        assert_eq!(sink.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing\none\ntwo\n");
    }

    #[test]
    fn test_file_sink_creates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.log");
        let sink = FileSink::open(&path).unwrap();
        sink.append("hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
