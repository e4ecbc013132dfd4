mod alerts;
mod config;
mod feed;
mod notify;
mod replay;
mod service;
mod ticker;
mod tone;
mod web;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::alerts::{
    evaluate, AlertClass, AlertLedger, AlertSettings, MinElevation, SettingsError, SettingsStore,
    WarningLead,
};
use crate::config::Config;
use crate::replay::ReplayWindow;
use crate::tone::{ToneKind, ToneSpec};

#[derive(Parser)]
#[command(name = "pass-alert")]
#[command(about = "Audible and desktop alerts for upcoming satellite passes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alert service
    Run {
        #[arg(short, long, default_value = "pass-alert.yaml")]
        config: String,
    },
    /// Replay alert evaluation over a pass file with a synthetic clock
    Check {
        /// YAML or JSON pass list
        #[arg(short, long)]
        passes: PathBuf,
        /// First evaluation instant (RFC 3339)
        #[arg(long)]
        from: String,
        /// Last evaluation instant (RFC 3339 or T+<duration> relative to --from)
        #[arg(long, default_value = "T+1h")]
        to: String,
        /// Time between evaluation cycles
        #[arg(long, default_value = "1s")]
        step: String,
        /// Settings file; defaults are used when omitted
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
    /// Play a test tone through the configured audio player (silent while
    /// alerts are disabled in the settings file)
    Tone {
        #[arg(value_enum)]
        kind: ToneKind,
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show or change persisted alert settings
    Settings {
        #[arg(short, long, default_value = "alert-settings.yaml")]
        file: PathBuf,
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        high_priority_only: Option<bool>,
        /// 15, 30 or 60 degrees
        #[arg(long)]
        min_elevation: Option<u32>,
        /// 1, 2, 5 or 10 minutes
        #[arg(long)]
        warning_minutes: Option<u32>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(&config),
        Commands::Check {
            passes,
            from,
            to,
            step,
            settings,
        } => check(&passes, &from, &to, &step, settings),
        Commands::Tone { kind, config } => tone(kind, config.as_deref()),
        Commands::Settings { file, action } => settings(file, action),
    }
}

fn run(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(service::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Service failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn check(
    passes_path: &Path,
    from: &str,
    to: &str,
    step: &str,
    settings_path: Option<PathBuf>,
) -> ExitCode {
    let passes = match feed::load_passes(passes_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error reading passes: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let settings = match settings_path {
        Some(path) => match SettingsStore::new(path).load() {
            Ok(s) => *s,
            Err(e) => {
                eprintln!("Error reading settings: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AlertSettings::default(),
    };

    let window = match ReplayWindow::parse(from, to, step) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Invalid time range: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Replaying {} passes from {} to {} every {}",
        passes.len(),
        window.start,
        window.end,
        window.step
    );

    let mut ledger = AlertLedger::new();
    let mut fired = 0;
    for now in window.instants() {
        for event in evaluate(now, &passes, Some(&settings), &mut ledger) {
            fired += 1;
            match event.class {
                AlertClass::Warning => println!(
                    "  {} warning  {} in {} min ({}° max elevation)",
                    now,
                    event.pass.name,
                    event.minutes_until_aos(),
                    event.pass.max_elevation
                ),
                AlertClass::Active => println!(
                    "  {} active   {} rose {}s ago ({}° max elevation)",
                    now,
                    event.pass.name,
                    -event.time_until_aos().num_seconds(),
                    event.pass.max_elevation
                ),
            }
        }
    }

    println!("{} alerts fired, {} ledger entries retained", fired, ledger.len());
    ExitCode::SUCCESS
}

fn tone(kind: ToneKind, config_path: Option<&str>) -> ExitCode {
    let config = match config_path.map(Config::from_file).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match alerts_enabled(&config.alerts.settings_file) {
        Ok(true) => {}
        Ok(false) => {
            println!(
                "Alerts are disabled in {}, not playing",
                config.alerts.settings_file.display()
            );
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error reading settings: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let player = service::tone_player(&config.audio);
    if !player.has_backend() {
        eprintln!("No audio player configured");
        return ExitCode::FAILURE;
    }

    let spec = ToneSpec::for_kind(kind);
    println!(
        "Playing {} tone: {} Hz for {:.2}s",
        kind,
        spec.base_hz,
        spec.duration.as_secs_f64()
    );

    match player.play(kind) {
        Some(handle) => {
            // Wait for the player, otherwise the process exits mid-tone
            let _ = handle.join();
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

/// Test tones follow the same master switch as real alerts.
fn alerts_enabled(settings_file: &Path) -> Result<bool, SettingsError> {
    let settings = SettingsStore::new(settings_file.to_path_buf()).load()?;
    Ok(settings.enabled)
}

fn settings(path: PathBuf, action: SettingsAction) -> ExitCode {
    let store = SettingsStore::new(path);
    if let Err(e) = store.load() {
        eprintln!("Error reading settings: {}", e);
        return ExitCode::FAILURE;
    }

    if let SettingsAction::Set {
        enabled,
        high_priority_only,
        min_elevation,
        warning_minutes,
    } = action
    {
        let min_elevation = min_elevation.map(MinElevation::try_from).transpose();
        let warning_lead = warning_minutes.map(WarningLead::try_from).transpose();
        let (min_elevation, warning_lead) = match (min_elevation, warning_lead) {
            (Ok(e), Ok(w)) => (e, w),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };

        let updated = store.update(|s| {
            if let Some(v) = enabled {
                s.enabled = v;
            }
            if let Some(v) = high_priority_only {
                s.high_priority_only = v;
            }
            if let Some(v) = min_elevation {
                s.min_elevation = v;
            }
            if let Some(v) = warning_lead {
                s.pre_pass_warning_minutes = v;
            }
        });
        if let Err(e) = updated {
            eprintln!("Error saving settings: {}", e);
            return ExitCode::FAILURE;
        }
        if let Some(path) = store.path() {
            println!("Saved to {}", path.display());
        }
    }

    match store.snapshot() {
        Some(s) => {
            print_settings(&s);
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

fn print_settings(s: &AlertSettings) {
    println!("enabled:            {}", s.enabled);
    println!("high_priority_only: {}", s.high_priority_only);
    println!(
        "min_elevation:      {}° ({})",
        u32::from(s.min_elevation),
        s.min_elevation.label()
    );
    println!(
        "pre_pass_warning:   {} min",
        s.pre_pass_warning_minutes.minutes()
    );
}
