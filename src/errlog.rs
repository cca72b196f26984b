//! Append-only error log with console echo.

use chrono::{SecondsFormat, Utc};
use log::{error, warn};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_owned() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Echo `message` to the console and append it, timestamped, to the log
    /// file.  A failed append is reported as a warning and otherwise ignored.
    pub fn record(&self, message: &str) {
        error!("{message}");
        if let Err(e) = self.append(message) {
            warn!("could not append to {}: {e}", self.path.display());
        }
    }

    fn append(&self, message: &str) -> io::Result<()> {
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        writeln!(f, "[{ts}] {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));
        log.record("Pack Error: first");
        log.record("Unpack Error: second");

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Pack Error: first"));
        assert!(lines[1].ends_with("] Unpack Error: second"));
    }

    #[test]
    fn unwritable_log_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened for append
        let log = ErrorLog::new(dir.path());
        log.record("still fine");
    }
}
