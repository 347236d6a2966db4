//! Core functionality for the mission computer.
//!
//! This module contains:
//! - The ordered record type every report is built from
//! - The bounded history window and its averages
//! - Console rendering of records
//! - The cycle loop controller

pub mod controller;
pub mod history;
pub mod record;
pub mod report;

// Re-export commonly used types
pub use controller::{
    ControllerError, ControllerState, CycleOptions, CycleOutcome, LoopController, ShutdownSignal,
    DEFAULT_AVERAGE_EVERY, DEFAULT_CYCLE_PERIOD,
};
pub use history::{HistoryWindow, DEFAULT_WINDOW_CAPACITY};
pub use record::{combine, FieldValue, Record};
pub use report::{ReportFormat, Reporter};
