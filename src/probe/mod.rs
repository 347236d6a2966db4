//! Host probes for the mission computer.
//!
//! This module provides platform-specific implementations for reading the
//! host identity and its current load: procfs on Linux, `sysinfo` on macOS
//! and Windows. Other platforms get the fallback probes, which honour the
//! same never-fail contract.

pub mod portable;
pub mod types;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub mod noop;

use std::time::Duration;

/// Default delay between the two CPU counter samples of a load snapshot.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

// Re-export commonly used types
pub use portable::{SysinfoLoadProbe, SysinfoSystemProbe};
pub use types::{LoadProbe, LoadSnapshot, SystemProbe, SystemSnapshot, UNKNOWN};

#[cfg(target_os = "linux")]
pub use linux::{ProcLoadProbe, ProcSystemProbe};

/// Platform-selected system probe
#[cfg(target_os = "linux")]
pub type HostSystemProbe = ProcSystemProbe;

/// Platform-selected load probe
#[cfg(target_os = "linux")]
pub type HostLoadProbe = ProcLoadProbe;

/// Platform-selected system probe
#[cfg(any(target_os = "macos", target_os = "windows"))]
pub type HostSystemProbe = SysinfoSystemProbe;

/// Platform-selected load probe
#[cfg(any(target_os = "macos", target_os = "windows"))]
pub type HostLoadProbe = SysinfoLoadProbe;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub use noop::{FallbackLoadProbe, FallbackSystemProbe};

/// Platform-selected system probe
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub type HostSystemProbe = FallbackSystemProbe;

/// Platform-selected load probe
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub type HostLoadProbe = FallbackLoadProbe;
