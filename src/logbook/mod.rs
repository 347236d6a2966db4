//! Mission logbook.
//!
//! The durable record of the agent's work: the append-only mission log of
//! every reading, and the session statistics kept alongside it.

pub mod stats;
pub mod writer;

// Re-export commonly used types
pub use stats::{create_shared_stats, SessionStats, SharedSessionStats, StatsSnapshot};
pub use writer::{format_entry, CycleTimestamp, LogError, MissionLog};
