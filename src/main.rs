//! Mission Computer CLI
//!
//! Telemetry agent for a simulated habitat.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mission_computer::{
    config::Config,
    core::{combine, LoopController, Record, ReportFormat, Reporter, ShutdownSignal},
    logbook::{create_shared_stats, MissionLog},
    probe::{HostLoadProbe, HostSystemProbe, LoadProbe, SystemProbe},
    sensor::ReadingGenerator,
    settings::SettingsStore,
    BANNER, VERSION,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mission-computer")]
#[command(version = VERSION)]
#[command(about = "Mission computer telemetry agent for the Mars base", long_about = None)]
struct Cli {
    /// Mission log path (overrides the configuration)
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Settings file path (overrides the configuration)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Console report format (text or json)
    #[arg(long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reading cycle
    Start {
        /// Seconds between cycles
        #[arg(long)]
        period: Option<u64>,

        /// Cycles between window average reports
        #[arg(long)]
        average_every: Option<u64>,

        /// Readings kept in the history window
        #[arg(long)]
        window: Option<usize>,

        /// Skip the system, load and filtered reports printed before the loop
        #[arg(long)]
        no_startup_report: bool,
    },

    /// Show host system information
    Info,

    /// Show current host load
    Load,

    /// Show the settings-filtered combined report once
    Report,

    /// Show active report settings
    Settings {
        /// Write the default settings file, replacing any existing one
        #[arg(long)]
        init: bool,
    },

    /// Show configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = effective_config(&cli);

    match cli.command {
        Commands::Start {
            period,
            average_every,
            window,
            no_startup_report,
        } => {
            let mut config = config;
            if let Some(secs) = period {
                config.cycle_period = Duration::from_secs(secs);
            }
            if let Some(n) = average_every {
                config.average_every = n;
            }
            if let Some(n) = window {
                config.window_capacity = n;
            }
            cmd_start(&config, !no_startup_report)
        }
        Commands::Info => {
            cmd_info(&config);
            Ok(())
        }
        Commands::Load => {
            cmd_load(&config);
            Ok(())
        }
        Commands::Report => {
            cmd_report(&config);
            Ok(())
        }
        Commands::Settings { init } => cmd_settings(&config, init),
        Commands::Config { save } => cmd_config(&config, save),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration file values with command-line overrides applied.
fn effective_config(cli: &Cli) -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Could not load configuration, using defaults: {e}");
            Config::default()
        }
    };

    if let Some(ref path) = cli.log {
        config.log_path = path.clone();
    }
    if let Some(ref path) = cli.settings {
        config.settings_path = path.clone();
    }
    if let Some(ref format) = cli.format {
        config.report_format = ReportFormat::from_name(format);
    }
    config
}

fn cmd_start(config: &Config, startup_report: bool) -> anyhow::Result<()> {
    println!("Mission Computer v{VERSION}");
    println!("{BANNER}");

    let reporter = Reporter::new(config.report_format);
    let store = SettingsStore::new(&config.settings_path);
    let settings = store.load();

    if startup_report {
        let system = HostSystemProbe::new().snapshot().to_record();
        let load = HostLoadProbe::new(config.load_sample_interval)
            .snapshot()
            .to_record();

        print_block(&reporter, "Mission computer system info:", &system);
        print_block(&reporter, "Mission computer load:", &load);

        let combined = combine([system, load]);
        print_block(
            &reporter,
            "Filtered mission computer info:",
            &settings.apply(&combined),
        );
    }

    info!(
        log = %config.log_path.display(),
        settings = %store.path().display(),
        active_keys = settings.len(),
        "Starting mission computer"
    );

    let stats = create_shared_stats();
    println!("Session ID: {}", stats.session_id());
    println!("Printing environment readings... press Ctrl+C to stop.");
    println!();

    // Set up Ctrl+C handler
    let signal = ShutdownSignal::new();
    let handler_signal = signal.clone();
    ctrlc::set_handler(move || handler_signal.cancel())
        .context("Error setting Ctrl+C handler")?;

    let mut controller = LoopController::new(
        config.cycle_options(),
        MissionLog::new(&config.log_path),
        reporter,
        settings,
        stats.clone(),
        std::io::stdout(),
    );

    controller.start(&signal)?;

    println!();
    println!("System stopped.");

    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_info(config: &Config) {
    let reporter = Reporter::new(config.report_format);
    let system = HostSystemProbe::new().snapshot();
    print_block(&reporter, "Mission computer system info:", &system.to_record());
}

fn cmd_load(config: &Config) {
    let reporter = Reporter::new(config.report_format);
    let load = HostLoadProbe::new(config.load_sample_interval).snapshot();
    print_block(&reporter, "Mission computer load:", &load.to_record());
}

fn cmd_report(config: &Config) {
    let reporter = Reporter::new(config.report_format);
    let settings = SettingsStore::new(&config.settings_path).load();

    let reading = ReadingGenerator::new().generate().to_record();
    let system = HostSystemProbe::new().snapshot().to_record();
    let load = HostLoadProbe::new(config.load_sample_interval)
        .snapshot()
        .to_record();

    let combined = combine([reading, system, load]);
    print_block(
        &reporter,
        "Filtered mission computer report:",
        &settings.apply(&combined),
    );
}

fn cmd_settings(config: &Config, init: bool) -> anyhow::Result<()> {
    let store = SettingsStore::new(&config.settings_path);

    if init {
        store
            .write_default()
            .with_context(|| format!("Could not write {}", store.path().display()))?;
        println!("Wrote default settings to {:?}", store.path());
        return Ok(());
    }

    let settings = store.load();
    println!("Settings file: {:?}", store.path());
    println!();
    if settings.is_empty() {
        println!("No active keys: every field is reported.");
    } else {
        println!("Active keys ({}):", settings.len());
        for key in settings.keys() {
            println!("  {key}");
        }
    }
    Ok(())
}

fn cmd_config(config: &Config, save: bool) -> anyhow::Result<()> {
    if save {
        config.save().context("Could not save configuration")?;
        println!("Saved configuration to {:?}", Config::config_path());
        return Ok(());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_block(reporter: &Reporter, title: &str, record: &Record) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = reporter.emit(&mut stdout, title, record) {
        warn!("Could not write report: {e}");
    }
    let _ = writeln!(stdout);
}
