//! Host snapshot types and the probe traits.
//!
//! Probes never fail: every value that cannot be read degrades to a
//! documented fallback (`"unknown"`, `0` or `0.0`).

use crate::core::record::Record;
use crate::sensor::round2;
use serde::{Deserialize, Serialize};

/// Fallback for text fields the platform cannot provide.
pub const UNKNOWN: &str = "unknown";

/// Static host identity. Does not change while the process runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub os: String,
    pub os_version: String,
    pub cpu_type: String,
    pub cpu_core_count: u64,
    pub memory_total_bytes: u64,
    pub hostname: String,
}

impl SystemSnapshot {
    /// Ordered record in report key order.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("os", self.os.as_str());
        record.insert("os_version", self.os_version.as_str());
        record.insert("cpu_type", self.cpu_type.as_str());
        record.insert("cpu_core_count", self.cpu_core_count);
        record.insert("memory_total_bytes", self.memory_total_bytes);
        record.insert("hostname", self.hostname.as_str());
        record
    }
}

/// Instantaneous utilization, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
}

impl LoadSnapshot {
    /// Ordered record in report key order.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("cpu_usage_percent", self.cpu_usage_percent);
        record.insert("memory_usage_percent", self.memory_usage_percent);
        record
    }
}

/// Source of the static host identity.
pub trait SystemProbe {
    /// Host identity. Implementations compute it once and cache it.
    fn snapshot(&self) -> SystemSnapshot;
}

/// Source of instantaneous utilization.
///
/// Takes `&mut self` because a CPU measurement spans two samples and must
/// not interleave with another measurement on the same probe.
pub trait LoadProbe {
    /// Sample utilization now. Never cached.
    fn snapshot(&mut self) -> LoadSnapshot;
}

/// Operating system name as commonly displayed (`Linux`, `Darwin`, `Windows`).
pub fn os_name() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => UNKNOWN.to_string(),
            }
        }
    }
}

/// Logical core count, or 0 when the platform cannot tell.
pub fn logical_cores() -> u64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u64)
        .unwrap_or(0)
}

/// Host name, or [`UNKNOWN`].
pub fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// CPU usage from two `(idle, total)` counter samples.
///
/// `(1 - Δidle/Δtotal) * 100`, rounded to two decimals. No elapsed ticks
/// means no measurable load.
pub fn cpu_usage_percent(first: (u64, u64), second: (u64, u64)) -> f64 {
    let d_idle = second.0.saturating_sub(first.0);
    let d_total = second.1.saturating_sub(first.1);
    if d_total == 0 {
        return 0.0;
    }
    let usage = (1.0 - d_idle as f64 / d_total as f64) * 100.0;
    round2(usage.clamp(0.0, 100.0))
}

/// Memory usage from total and available byte counts.
pub fn memory_usage_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    round2(used as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_usage() {
        assert_eq!(cpu_usage_percent((100, 200), (150, 300)), 50.0);
        assert_eq!(cpu_usage_percent((100, 200), (100, 300)), 100.0);
        assert_eq!(cpu_usage_percent((100, 200), (100, 200)), 0.0);
    }

    #[test]
    fn test_cpu_usage_handles_counter_reset() {
        assert_eq!(cpu_usage_percent((500, 1000), (10, 20)), 0.0);
    }

    #[test]
    fn test_memory_usage() {
        assert_eq!(memory_usage_percent(1000, 250), 75.0);
        assert_eq!(memory_usage_percent(0, 0), 0.0);
        assert_eq!(memory_usage_percent(100, 200), 0.0);
    }

    #[test]
    fn test_os_name_is_capitalised() {
        let name = os_name();
        assert!(name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_snapshot_records() {
        let load = LoadSnapshot {
            cpu_usage_percent: 12.5,
            memory_usage_percent: 40.0,
        };
        let keys: Vec<String> = load.to_record().keys().map(String::from).collect();
        assert_eq!(keys, vec!["cpu_usage_percent", "memory_usage_percent"]);
    }
}
