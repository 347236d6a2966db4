//! Portable probes backed by `sysinfo`.
//!
//! Used on macOS and Windows. Compiled everywhere `sysinfo` builds so the
//! probes can be exercised on any host.

use crate::probe::types::{
    host_name, logical_cores, memory_usage_percent, os_name, LoadProbe, LoadSnapshot,
    SystemProbe, SystemSnapshot, UNKNOWN,
};
use crate::probe::DEFAULT_SAMPLE_INTERVAL;
use crate::sensor::round2;
use std::sync::OnceLock;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Host identity queried through `sysinfo`, cached after the first query.
#[derive(Debug, Default)]
pub struct SysinfoSystemProbe {
    cached: OnceLock<SystemSnapshot>,
}

impl SysinfoSystemProbe {
    /// Create a probe; the host is queried on first use.
    pub fn new() -> Self {
        Self::default()
    }

    fn query() -> SystemSnapshot {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        let cpu_type = system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let os_version = System::kernel_version()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        SystemSnapshot {
            os: os_name(),
            os_version,
            cpu_type,
            cpu_core_count: logical_cores(),
            memory_total_bytes: system.total_memory(),
            hostname: host_name(),
        }
    }
}

impl SystemProbe for SysinfoSystemProbe {
    fn snapshot(&self) -> SystemSnapshot {
        self.cached.get_or_init(Self::query).clone()
    }
}

/// Utilization sampled through `sysinfo`.
///
/// `sysinfo` needs [`MINIMUM_CPU_UPDATE_INTERVAL`] between the two CPU
/// refreshes, so shorter sample intervals are raised to it.
#[derive(Debug)]
pub struct SysinfoLoadProbe {
    system: System,
    sample_interval: Duration,
}

impl SysinfoLoadProbe {
    /// Create a probe with `sample_interval` between CPU refreshes.
    pub fn new(sample_interval: Duration) -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        Self {
            system,
            sample_interval: sample_interval.max(MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    /// Effective delay between the two CPU refreshes.
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}

impl Default for SysinfoLoadProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl LoadProbe for SysinfoLoadProbe {
    fn snapshot(&mut self) -> LoadSnapshot {
        self.system.refresh_cpu_usage();
        std::thread::sleep(self.sample_interval);
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let cpu = f64::from(self.system.global_cpu_usage());
        let cpu_usage_percent = if cpu.is_finite() {
            round2(cpu.clamp(0.0, 100.0))
        } else {
            0.0
        };

        LoadSnapshot {
            cpu_usage_percent,
            memory_usage_percent: memory_usage_percent(
                self.system.total_memory(),
                self.system.available_memory(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_snapshot_is_cached() {
        let probe = SysinfoSystemProbe::new();
        let first = probe.snapshot();
        assert_eq!(probe.snapshot(), first);
        assert!(!first.cpu_type.is_empty());
        assert!(!first.os_version.is_empty());
    }

    #[test]
    fn test_system_snapshot_reports_memory() {
        let snapshot = SysinfoSystemProbe::new().snapshot();
        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(snapshot.memory_total_bytes > 0);
        } else {
            assert_eq!(snapshot.memory_total_bytes, 0);
        }
    }

    #[test]
    fn test_short_interval_is_raised() {
        let probe = SysinfoLoadProbe::new(Duration::ZERO);
        assert_eq!(probe.sample_interval(), MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[test]
    fn test_load_snapshot_in_range() {
        let mut probe = SysinfoLoadProbe::new(Duration::ZERO);
        let load = probe.snapshot();

        assert!((0.0..=100.0).contains(&load.cpu_usage_percent));
        assert!((0.0..=100.0).contains(&load.memory_usage_percent));
        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(load.memory_usage_percent > 0.0);
        }
    }
}
