//! Fallback probes for platforms with neither procfs nor `sysinfo` support.
//!
//! These report what the standard library can tell portably and the
//! documented fallback values for everything else.

use crate::probe::types::{
    host_name, logical_cores, os_name, LoadProbe, LoadSnapshot, SystemProbe, SystemSnapshot,
    UNKNOWN,
};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FallbackSystemProbe {
    cached: OnceLock<SystemSnapshot>,
}

impl FallbackSystemProbe {
    /// Create the fallback probe.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemProbe for FallbackSystemProbe {
    fn snapshot(&self) -> SystemSnapshot {
        self.cached
            .get_or_init(|| SystemSnapshot {
                os: os_name(),
                os_version: UNKNOWN.to_string(),
                cpu_type: UNKNOWN.to_string(),
                cpu_core_count: logical_cores(),
                memory_total_bytes: 0,
                hostname: host_name(),
            })
            .clone()
    }
}

/// Load probe that always reports no load.
#[derive(Debug, Default)]
pub struct FallbackLoadProbe;

impl FallbackLoadProbe {
    /// Accepts a sample interval for signature parity with other platforms.
    pub fn new(_sample_interval: Duration) -> Self {
        Self
    }
}

impl LoadProbe for FallbackLoadProbe {
    fn snapshot(&mut self) -> LoadSnapshot {
        LoadSnapshot::default()
    }
}
