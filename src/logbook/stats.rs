//! Session statistics for the mission computer.
//!
//! Counts what the agent did during a single run. Counters live in memory
//! only and start from zero in every session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Cycles completed
    cycles_completed: AtomicU64,
    /// Readings written to the mission log
    log_records_written: AtomicU64,
    /// Log appends that failed
    log_failures: AtomicU64,
    /// Window averages reported
    averages_reported: AtomicU64,
    /// Unique id of this session
    session_id: Uuid,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl SessionStats {
    /// Start a session with all counters at zero.
    pub fn new() -> Self {
        Self {
            cycles_completed: AtomicU64::new(0),
            log_records_written: AtomicU64::new(0),
            log_failures: AtomicU64::new(0),
            averages_reported: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
        }
    }

    /// Record a completed cycle.
    pub fn record_cycle(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reading appended to the mission log.
    pub fn record_log_written(&self) {
        self.log_records_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed log append.
    pub fn record_log_failure(&self) {
        self.log_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a window average report.
    pub fn record_average(&self) {
        self.averages_reported.fetch_add(1, Ordering::Relaxed);
    }

    /// Unique id of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            log_records_written: self.log_records_written.load(Ordering::Relaxed),
            log_failures: self.log_failures.load(Ordering::Relaxed),
            averages_reported: self.averages_reported.load(Ordering::Relaxed),
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Session: {}\n\
             - Cycles completed: {}\n\
             - Log records written: {}\n\
             - Log write failures: {}\n\
             - Averages reported: {}\n\
             - Session duration: {} seconds",
            stats.session_id,
            stats.cycles_completed,
            stats.log_records_written,
            stats.log_failures,
            stats.averages_reported,
            stats.session_duration_secs
        )
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub cycles_completed: u64,
    pub log_records_written: u64,
    pub log_failures: u64,
    pub averages_reported: u64,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Session stats shared between the controller and the shutdown path.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create session stats for sharing across threads.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let stats = SessionStats::new();

        stats.record_cycle();
        stats.record_cycle();
        stats.record_log_written();
        stats.record_log_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles_completed, 2);
        assert_eq!(snapshot.log_records_written, 1);
        assert_eq!(snapshot.log_failures, 1);
        assert_eq!(snapshot.averages_reported, 0);
    }

    #[test]
    fn test_summary_format() {
        let stats = SessionStats::new();
        let summary = stats.summary();

        assert!(summary.contains("Cycles completed: 0"));
        assert!(summary.contains("Log write failures"));
        assert!(summary.contains(&stats.session_id().to_string()));
    }

    #[test]
    fn test_each_session_counts_from_zero() {
        let earlier = SessionStats::new();
        for _ in 0..100 {
            earlier.record_cycle();
        }

        let current = SessionStats::new();
        current.record_cycle();

        assert_ne!(current.session_id(), earlier.session_id());
        assert_eq!(current.snapshot().cycles_completed, 1);
        assert!(current.summary().contains("Cycles completed: 1\n"));
    }
}
