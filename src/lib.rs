//! Mission Computer - telemetry agent for a simulated habitat.
//!
//! The agent produces a synthetic environmental reading every few seconds,
//! keeps a bounded history for rolling averages, reports host identity and
//! load, and appends every reading to a flat text log.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Mission Computer                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Sensor    │──▶│   History   │──▶│  Reporter   │         │
//! │  │ (synthetic) │   │ (60 slots)  │   │ (console)   │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │         │                                   ▲                │
//! │         ▼                                   │                │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │ Mission Log │   │   Probes    │──▶│  Settings   │         │
//! │  │  (append)   │   │ (sys/load)  │   │  (filter)   │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mission_computer::core::{CycleOptions, LoopController, Reporter, ShutdownSignal};
//! use mission_computer::logbook::{create_shared_stats, MissionLog};
//! use mission_computer::settings::SettingsStore;
//!
//! let settings = SettingsStore::new("setting.txt").load();
//! let mut controller = LoopController::new(
//!     CycleOptions::default(),
//!     MissionLog::new("mars_mission_log.txt"),
//!     Reporter::default(),
//!     settings,
//!     create_shared_stats(),
//!     std::io::stdout(),
//! );
//!
//! // Runs until the signal is cancelled, e.g. from a Ctrl+C handler.
//! let signal = ShutdownSignal::new();
//! controller.start(&signal).expect("controller already used");
//! ```

pub mod config;
pub mod core;
pub mod logbook;
pub mod probe;
pub mod sensor;
pub mod settings;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{HistoryWindow, LoopController, Record, ReportFormat, Reporter, ShutdownSignal};
pub use logbook::{CycleTimestamp, MissionLog, SessionStats};
pub use probe::{HostLoadProbe, HostSystemProbe, LoadProbe, LoadSnapshot, SystemProbe, SystemSnapshot};
pub use sensor::{Reading, ReadingGenerator, SensorField};
pub use settings::{filter_and_order, Settings, SettingsStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup banner shown by the `start` command.
pub const BANNER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                    MARS BASE MISSION COMPUTER                    ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Habitat readings are synthetic and logged every cycle.          ║
║  A window average is reported every five minutes by default.     ║
║                                                                  ║
║  Edit the settings file to choose which fields are reported.     ║
║  Press Ctrl+C to stop.                                           ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
