//! The mission computer's cycle loop.
//!
//! Every cycle generates a reading, appends it to the mission log, pushes it
//! into the history window and prints it. Every `average_every` cycles the
//! window average is printed as well. Between cycles the loop waits one
//! period; cancellation is only observed at that boundary, never mid-cycle.

use crate::core::history::{HistoryWindow, DEFAULT_WINDOW_CAPACITY};
use crate::core::record::Record;
use crate::core::report::Reporter;
use crate::logbook::{CycleTimestamp, MissionLog, SharedSessionStats};
use crate::sensor::{Reading, ReadingGenerator};
use crate::settings::Settings;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default delay between cycles.
pub const DEFAULT_CYCLE_PERIOD: Duration = Duration::from_secs(5);

/// Default number of cycles between average reports (five minutes).
pub const DEFAULT_AVERAGE_EVERY: u64 = 60;

const AVERAGE_RULE: &str = "------------------";

/// Cancellation token shared between the loop and a signal handler.
///
/// Cancelling also wakes a loop that is waiting out its period, so shutdown
/// does not have to wait for the full delay.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl ShutdownSignal {
    /// Create a token that is not yet cancelled.
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Request shutdown. Safe to call from a signal handler, more than once.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
    }

    /// Whether shutdown was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout`. Returns true if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.is_cancelled()
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Stopped,
}

/// Timing and sizing of the cycle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOptions {
    /// Delay between cycles
    pub period: Duration,
    /// Cycles between average reports
    pub average_every: u64,
    /// Readings kept in the history window
    pub window_capacity: usize,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            period: DEFAULT_CYCLE_PERIOD,
            average_every: DEFAULT_AVERAGE_EVERY,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

/// What a single cycle produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub timestamp: CycleTimestamp,
    pub reading: Reading,
    /// Whether the reading reached the mission log
    pub logged: bool,
    /// Window average, on cycles that report one
    pub average: Option<Record>,
}

/// Controller errors.
#[derive(Debug, PartialEq, Eq)]
pub enum ControllerError {
    /// `start` called on a controller that already ran or is running
    NotIdle(ControllerState),
    /// The controller was cancelled and cannot run more cycles
    Stopped,
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::NotIdle(state) => {
                write!(f, "Controller cannot start from state {state:?}")
            }
            ControllerError::Stopped => write!(f, "Controller is stopped"),
        }
    }
}

impl std::error::Error for ControllerError {}

/// Drives the fixed-period cycle and owns all per-run state.
pub struct LoopController<W: Write> {
    state: ControllerState,
    options: CycleOptions,
    generator: ReadingGenerator,
    history: HistoryWindow,
    log: MissionLog,
    reporter: Reporter,
    settings: Settings,
    stats: SharedSessionStats,
    out: W,
    cycle: u64,
}

impl<W: Write> LoopController<W> {
    /// Create an idle controller writing reports to `out`.
    pub fn new(
        options: CycleOptions,
        log: MissionLog,
        reporter: Reporter,
        settings: Settings,
        stats: SharedSessionStats,
        out: W,
    ) -> Self {
        let average_every = options.average_every.max(1);
        Self {
            state: ControllerState::Idle,
            options: CycleOptions {
                average_every,
                ..options
            },
            generator: ReadingGenerator::new(),
            history: HistoryWindow::with_capacity(options.window_capacity),
            log,
            reporter,
            settings,
            stats,
            out,
            cycle: 0,
        }
    }

    /// Replace the reading generator, e.g. with a seeded one.
    pub fn with_generator(mut self, generator: ReadingGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Readings kept for the window average.
    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// The console sink reports are written to.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Replace the active settings, e.g. after an explicit reload.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Run cycles until `signal` is cancelled.
    ///
    /// Returns the number of cycles run by this controller.
    pub fn start(&mut self, signal: &ShutdownSignal) -> Result<u64, ControllerError> {
        if self.state != ControllerState::Idle {
            return Err(ControllerError::NotIdle(self.state));
        }
        self.state = ControllerState::Running;
        info!(
            period_secs = self.options.period.as_secs_f64(),
            average_every = self.options.average_every,
            window = self.history.capacity(),
            log = %self.log.path().display(),
            "Cycle loop started"
        );

        while !signal.is_cancelled() {
            self.run_cycle()?;
            if signal.wait(self.options.period) {
                break;
            }
        }

        self.state = ControllerState::Stopped;
        info!(cycles = self.cycle, "Cycle loop stopped");
        Ok(self.cycle)
    }

    /// Run exactly one cycle.
    ///
    /// A failed log append is reported and does not fail the cycle.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, ControllerError> {
        if self.state == ControllerState::Stopped {
            return Err(ControllerError::Stopped);
        }

        let timestamp = CycleTimestamp::new(self.cycle, self.options.period.as_secs());
        let reading = self.generator.generate();

        let logged = match self.log.append(&timestamp, &reading) {
            Ok(()) => {
                self.stats.record_log_written();
                true
            }
            Err(e) => {
                warn!(%timestamp, "Mission log append failed: {e}");
                self.stats.record_log_failure();
                false
            }
        };

        self.history.append(reading);

        let current = self.settings.apply(&reading.to_record());
        self.emit("", &current, None);

        self.cycle += 1;

        let average = if self.cycle % self.options.average_every == 0 {
            let average = self.settings.apply(&self.history.average());
            let span_secs = self.history.len() as u64 * self.options.period.as_secs();
            let title = format!(
                "\nWindow average ({} readings, {} sec):\n{AVERAGE_RULE}",
                self.history.len(),
                span_secs
            );
            self.emit(&title, &average, Some(AVERAGE_RULE));
            self.stats.record_average();
            Some(average)
        } else {
            None
        };

        self.stats.record_cycle();
        debug!(%timestamp, logged, "Cycle complete");

        Ok(CycleOutcome {
            timestamp,
            reading,
            logged,
            average,
        })
    }

    fn emit(&mut self, title: &str, record: &Record, footer: Option<&str>) {
        let mut block = self.reporter.render(title, record);
        if let Some(footer) = footer {
            block.push_str(footer);
            block.push_str("\n\n");
        }

        let result = self
            .out
            .write_all(block.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Could not write report: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportFormat;
    use crate::logbook::create_shared_stats;
    use crate::sensor::SensorField;
    use std::path::PathBuf;

    fn temp_log() -> (PathBuf, MissionLog) {
        let dir = std::env::temp_dir().join(format!("mission-computer-ctl-{}", uuid::Uuid::new_v4()));
        let log = MissionLog::new(dir.join("mission.log"));
        (dir, log)
    }

    fn controller(options: CycleOptions, log: MissionLog) -> LoopController<Vec<u8>> {
        LoopController::new(
            options,
            log,
            Reporter::default(),
            Settings::default(),
            create_shared_stats(),
            Vec::new(),
        )
        .with_generator(ReadingGenerator::seeded(3))
    }

    #[test]
    fn test_cycle_logs_and_reports() {
        let (dir, log) = temp_log();
        let mut ctl = controller(CycleOptions::default(), log.clone());

        let outcome = ctl.run_cycle().unwrap();
        assert!(outcome.logged);
        assert!(outcome.average.is_none());
        assert_eq!(outcome.timestamp.to_string(), "T+0 sec");
        assert_eq!(ctl.history().len(), 1);

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("[T+0 sec]\n"));

        let printed = String::from_utf8(ctl.output().clone()).unwrap();
        assert!(printed.contains("\"mars_base_internal_temperature\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_average_every_k_cycles() {
        let (dir, log) = temp_log();
        let options = CycleOptions {
            period: Duration::from_secs(5),
            average_every: 3,
            window_capacity: 2,
        };
        let mut ctl = controller(options, log);

        let mut readings = Vec::new();
        let mut averages = Vec::new();
        for _ in 0..3 {
            let outcome = ctl.run_cycle().unwrap();
            readings.push(outcome.reading);
            averages.push(outcome.average);
        }

        assert!(averages[0].is_none());
        assert!(averages[1].is_none());
        let average = averages[2].as_ref().unwrap();

        // Window capacity 2: only the last two readings count.
        let field = SensorField::ExternalIlluminance;
        let expected = (readings[1].get(field) + readings[2].get(field)) / 2.0;
        let actual = average.get(field.key()).and_then(|v| v.as_f64()).unwrap();
        assert!((actual - expected).abs() < 1e-9);

        let printed = String::from_utf8(ctl.output().clone()).unwrap();
        assert!(printed.contains("Window average (2 readings, 10 sec):"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_settings_filter_cycle_report() {
        let (dir, log) = temp_log();
        let mut ctl = controller(CycleOptions::default(), log);
        ctl.set_settings(Settings::from_keys(["mars_base_internal_oxygen"]));

        ctl.run_cycle().unwrap();

        let printed = String::from_utf8(ctl.output().clone()).unwrap();
        assert!(printed.contains("\"mars_base_internal_oxygen\""));
        assert!(!printed.contains("\"mars_base_internal_temperature\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_cycle_report_is_parseable() {
        let (dir, log) = temp_log();
        let mut ctl = LoopController::new(
            CycleOptions::default(),
            log,
            Reporter::new(ReportFormat::Json),
            Settings::default(),
            create_shared_stats(),
            Vec::new(),
        )
        .with_generator(ReadingGenerator::seeded(7));

        let outcome = ctl.run_cycle().unwrap();

        let printed = String::from_utf8(ctl.output().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&printed).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), SensorField::ALL.len());
        for field in SensorField::ALL {
            let reported = object[field.key()].as_f64().unwrap();
            assert!((reported - outcome.reading.get(field)).abs() < 1e-9);
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_log_failure_does_not_stop_cycles() {
        let (dir, _) = temp_log();
        std::fs::create_dir_all(&dir).unwrap();
        // The log path is a directory, so every append fails.
        let stats = create_shared_stats();
        let mut ctl = LoopController::new(
            CycleOptions::default(),
            MissionLog::new(&dir),
            Reporter::default(),
            Settings::default(),
            stats.clone(),
            Vec::new(),
        );

        let first = ctl.run_cycle().unwrap();
        let second = ctl.run_cycle().unwrap();
        assert!(!first.logged);
        assert!(!second.logged);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles_completed, 2);
        assert_eq!(snapshot.log_failures, 2);
        assert_eq!(ctl.history().len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cancelled_before_start_runs_no_cycles() {
        let (_, log) = temp_log();
        let mut ctl = controller(CycleOptions::default(), log);
        let signal = ShutdownSignal::new();
        signal.cancel();

        assert_eq!(ctl.start(&signal), Ok(0));
        assert_eq!(ctl.state(), ControllerState::Stopped);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let (_, log) = temp_log();
        let mut ctl = controller(CycleOptions::default(), log);
        let signal = ShutdownSignal::new();
        signal.cancel();
        ctl.start(&signal).unwrap();

        assert_eq!(
            ctl.start(&ShutdownSignal::new()),
            Err(ControllerError::NotIdle(ControllerState::Stopped))
        );
        assert!(matches!(ctl.run_cycle(), Err(ControllerError::Stopped)));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let (dir, log) = temp_log();
        let options = CycleOptions {
            period: Duration::from_millis(10),
            ..CycleOptions::default()
        };
        let mut ctl = controller(options, log);
        let signal = ShutdownSignal::new();

        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });

        let cycles = ctl.start(&signal).unwrap();
        handle.join().unwrap();

        assert!(cycles >= 1);
        assert_eq!(ctl.state(), ControllerState::Stopped);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_wait_wakes_on_cancel() {
        let signal = ShutdownSignal::new();
        assert!(!signal.wait(Duration::from_millis(1)));

        signal.cancel();
        let started = std::time::Instant::now();
        assert!(signal.wait(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
