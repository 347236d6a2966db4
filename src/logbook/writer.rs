//! Append-only mission log.
//!
//! Each reading becomes one block:
//!
//! ```text
//! [T+5 sec]
//! Internal temperature: 22.41
//! ...
//!
//! ```

use crate::sensor::Reading;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cycle label derived from simulated elapsed time, not the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleTimestamp {
    pub cycle: u64,
    pub period_secs: u64,
}

impl CycleTimestamp {
    /// Timestamp of cycle `cycle` for a loop with the given period.
    pub fn new(cycle: u64, period_secs: u64) -> Self {
        Self { cycle, period_secs }
    }

    /// Simulated seconds since the first cycle.
    pub fn elapsed_secs(&self) -> u64 {
        self.cycle.saturating_mul(self.period_secs)
    }
}

impl fmt::Display for CycleTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T+{} sec", self.elapsed_secs())
    }
}

/// Format one log block for a reading.
pub fn format_entry(timestamp: &CycleTimestamp, reading: &Reading) -> String {
    let mut out = format!("[{timestamp}]\n");
    for (field, value) in reading.iter() {
        out.push_str(&format!("{}: {value:.2}\n", field.label()));
    }
    out.push('\n');
    out
}

/// Mission log errors.
#[derive(Debug)]
pub enum LogError {
    CreateDir(String),
    Open(String),
    Write(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::CreateDir(e) => write!(f, "Could not create log directory: {e}"),
            LogError::Open(e) => write!(f, "Could not open log file: {e}"),
            LogError::Write(e) => write!(f, "Could not write log entry: {e}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Durable text log of every reading.
#[derive(Debug, Clone)]
pub struct MissionLog {
    path: PathBuf,
}

impl MissionLog {
    /// Log appending to the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one reading.
    ///
    /// The file is opened per call so a log that was moved or deleted
    /// between cycles is recreated.
    pub fn append(&self, timestamp: &CycleTimestamp, reading: &Reading) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| LogError::CreateDir(e.to_string()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::Open(e.to_string()))?;

        file.write_all(format_entry(timestamp, reading).as_bytes())
            .map_err(|e| LogError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("mission-computer-log-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(CycleTimestamp::new(0, 5).to_string(), "T+0 sec");
        assert_eq!(CycleTimestamp::new(12, 5).to_string(), "T+60 sec");
    }

    #[test]
    fn test_timestamps_order_by_cycle() {
        assert!(CycleTimestamp::new(1, 5) < CycleTimestamp::new(2, 5));
    }

    #[test]
    fn test_format_entry() {
        let reading = Reading::from_values([22.5, 10.0, 55.25, 600.0, 0.05, 5.5]);
        let entry = format_entry(&CycleTimestamp::new(1, 5), &reading);

        assert_eq!(
            entry,
            "[T+5 sec]\n\
             Internal temperature: 22.50\n\
             External temperature: 10.00\n\
             Internal humidity: 55.25\n\
             External illuminance: 600.00\n\
             Internal CO2: 0.05\n\
             Internal oxygen: 5.50\n\
             \n"
        );
    }

    #[test]
    fn test_append_creates_parent_and_appends() {
        let dir = temp_dir();
        let log = MissionLog::new(dir.join("nested").join("mission.log"));

        log.append(&CycleTimestamp::new(0, 5), &Reading::uniform(1.0)).unwrap();
        log.append(&CycleTimestamp::new(1, 5), &Reading::uniform(2.0)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("[T+0 sec]\n"));
        assert!(content.contains("\n\n[T+5 sec]\n"));
        assert_eq!(content.matches("Internal oxygen").count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_append_to_directory_fails() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();

        let log = MissionLog::new(&dir);
        let result = log.append(&CycleTimestamp::new(0, 5), &Reading::uniform(1.0));
        assert!(matches!(result, Err(LogError::Open(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
