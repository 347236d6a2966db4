//! Habitat sensor for the mission computer.
//!
//! The sensor is simulated: readings are synthetic but always fall inside
//! the ranges a real habitat would report.

pub mod generator;
pub mod types;

// Re-export commonly used types
pub use generator::ReadingGenerator;
pub use types::{round2, Reading, SensorField, FIELD_PREFIX};
