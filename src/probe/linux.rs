//! Linux probes backed by procfs.

use crate::probe::DEFAULT_SAMPLE_INTERVAL;
use crate::probe::types::{
    cpu_usage_percent, host_name, logical_cores, memory_usage_percent, os_name, LoadProbe,
    LoadSnapshot, SystemProbe, SystemSnapshot, UNKNOWN,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Host identity read from `/proc`, cached after the first query.
#[derive(Debug)]
pub struct ProcSystemProbe {
    root: PathBuf,
    cached: OnceLock<SystemSnapshot>,
}

impl ProcSystemProbe {
    /// Read from `/proc`.
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Read from an alternative procfs mount.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cached: OnceLock::new(),
        }
    }

    fn query(&self) -> SystemSnapshot {
        let os_version = std::fs::read_to_string(self.root.join("sys/kernel/osrelease"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let cpu_type = std::fs::read_to_string(self.root.join("cpuinfo"))
            .ok()
            .and_then(|s| parse_cpu_model(&s))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let memory_total_bytes = read_meminfo(&self.root)
            .map(|m| m.total_bytes)
            .unwrap_or(0);

        SystemSnapshot {
            os: os_name(),
            os_version,
            cpu_type,
            cpu_core_count: logical_cores(),
            memory_total_bytes,
            hostname: host_name(),
        }
    }
}

impl Default for ProcSystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for ProcSystemProbe {
    fn snapshot(&self) -> SystemSnapshot {
        self.cached.get_or_init(|| self.query()).clone()
    }
}

/// Utilization sampled from `/proc/stat` and `/proc/meminfo`.
#[derive(Debug)]
pub struct ProcLoadProbe {
    root: PathBuf,
    sample_interval: Duration,
}

impl ProcLoadProbe {
    /// Sample `/proc` with `sample_interval` between CPU readings.
    pub fn new(sample_interval: Duration) -> Self {
        Self::with_root("/proc", sample_interval)
    }

    /// Sample an alternative procfs mount.
    pub fn with_root(root: impl Into<PathBuf>, sample_interval: Duration) -> Self {
        Self {
            root: root.into(),
            sample_interval,
        }
    }

    fn read_cpu_counters(&self) -> Option<(u64, u64)> {
        let stat = std::fs::read_to_string(self.root.join("stat")).ok()?;
        parse_cpu_counters(&stat)
    }
}

impl Default for ProcLoadProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl LoadProbe for ProcLoadProbe {
    fn snapshot(&mut self) -> LoadSnapshot {
        let cpu_usage_percent = match self.read_cpu_counters() {
            Some(first) => {
                std::thread::sleep(self.sample_interval);
                self.read_cpu_counters()
                    .map(|second| cpu_usage_percent(first, second))
                    .unwrap_or(0.0)
            }
            None => 0.0,
        };

        let memory_usage_percent = read_meminfo(&self.root)
            .map(|m| memory_usage_percent(m.total_bytes, m.available_bytes))
            .unwrap_or(0.0);

        LoadSnapshot {
            cpu_usage_percent,
            memory_usage_percent,
        }
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat` into `(idle, total)`.
///
/// Idle includes iowait.
pub fn parse_cpu_counters(stat: &str) -> Option<(u64, u64)> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let vals: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|v| v.parse().ok())
        .collect();
    if vals.len() < 4 {
        return None;
    }
    let idle = vals[3] + vals.get(4).copied().unwrap_or(0);
    let total: u64 = vals.iter().sum();
    Some((idle, total))
}

/// Processor descriptor from `/proc/cpuinfo`.
pub fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    // x86 uses "model name", some ARM kernels only provide "Hardware" or "Processor".
    ["model name", "Hardware", "Processor"].iter().find_map(|wanted| {
        cpuinfo.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            let value = value.trim();
            (key.trim() == *wanted && !value.is_empty()).then(|| value.to_string())
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Parse `/proc/meminfo`. Values there are in KiB.
pub fn parse_meminfo(meminfo: &str) -> Option<MemInfo> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find(|l| l.starts_with(name))
            .and_then(|l| l.split_whitespace().nth(1)?.parse::<u64>().ok())
    };

    let total_kb = field("MemTotal:")?;
    // MemAvailable is missing on kernels older than 3.14.
    let available_kb = field("MemAvailable:")
        .or_else(|| {
            let free = field("MemFree:")?;
            Some(free + field("Buffers:").unwrap_or(0) + field("Cached:").unwrap_or(0))
        })
        .unwrap_or(0);

    Some(MemInfo {
        total_bytes: total_kb * 1024,
        available_bytes: available_kb * 1024,
    })
}

fn read_meminfo(root: &Path) -> Option<MemInfo> {
    let content = std::fs::read_to_string(root.join("meminfo")).ok()?;
    parse_meminfo(&content)
}
