//! Command-line access to RTMHA parameter records
//!
//! Prints catalog defaults and the field table, validates and edits
//! persisted session records, and follows a record file while it changes.
//!
//! The band count comes from `--bands`, then `RTMHA_NUM_BANDS`, then the
//! ten-band default. Session files default to `$RTMHA_PARAMS_DIR/session.json`.

use clap::{Parser, Subcommand, ValueEnum};
use rtmha_params::{
    FIELDS, FieldKind, Format, ParamWatcher, ParameterRecord, SharedParameters, WatchEvent,
    defaults, store,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rtmha_params")]
#[command(about = "Inspect and edit RTMHA hearing-aid parameter records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Band count of the active filterbank
    #[arg(short, long, global = true)]
    bands: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default record
    Defaults {
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// List every record field with its kind and bounds
    Fields,

    /// Write a default record to a session file
    Init {
        /// Session file (.json, .yaml or .yml)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Check a session file and report MPO inconsistencies
    Validate {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Update one field of a session file
    ///
    /// VALUE is parsed as JSON (e.g. 12.5, 1, true, "[0,1,2]");
    /// anything that is not valid JSON is taken as a string.
    Set {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "FIELD")]
        field: String,

        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Follow a session file and print every reload until interrupted
    Watch {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

fn resolve_bands(cli_bands: Option<usize>) -> Result<usize, Box<dyn Error>> {
    match cli_bands {
        Some(0) => Err("--bands must be positive".into()),
        Some(n) => Ok(n),
        None => Ok(rtmha_env::get_num_bands(defaults::global::NUM_BANDS)?),
    }
}

fn resolve_file(file: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    match file {
        Some(path) => Ok(path),
        None => Ok(rtmha_env::get_session_file()?),
    }
}

fn describe_kind(kind: FieldKind) -> String {
    match kind {
        FieldKind::Selector(selector) => format!("selector {:?}", selector.codes()),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Names of the fields whose values differ between two records
fn changed_fields(before: &ParameterRecord, after: &ParameterRecord) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|spec| before.get(spec.name) != after.get(spec.name))
        .map(|spec| spec.name)
        .collect()
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let bands = resolve_bands(cli.bands)?;

    match cli.command {
        Commands::Defaults { format } => {
            let record = ParameterRecord::new(bands)?;
            println!("{}", Format::from(format).encode(&record)?);
        }

        Commands::Fields => {
            for spec in FIELDS.iter() {
                let range = match spec.range {
                    Some((min, max)) => format!("[{}, {}]", min, max),
                    None => String::new(),
                };
                println!(
                    "{:<24} {:<28} {:<16} {}",
                    spec.name,
                    describe_kind(spec.kind),
                    range,
                    spec.description
                );
            }
        }

        Commands::Init { file, force } => {
            let path = resolve_file(file)?;
            if path.exists() && !force {
                return Err(format!("{:?} already exists (use --force to overwrite)", path).into());
            }
            store::save(&path, &ParameterRecord::new(bands)?)?;
            println!("Wrote default {}-band record to {:?}", bands, path);
        }

        Commands::Validate { file } => {
            let path = resolve_file(file)?;
            let record = store::load(&path, bands)?;
            let violations = record.mpo_violations();
            if violations.is_empty() {
                println!("✓ {:?} is a valid {}-band record", path, bands);
            } else {
                println!(
                    "✓ {:?} is a valid {}-band record, but bands {:?} exceed the global MPO ({} dB SPL)",
                    path, bands, violations, record.global_mpo
                );
            }
            let signals = record.pending_signals();
            if !signals.is_empty() {
                println!("  pending signals: {}", signals.names().join(", "));
            }
            for (unit, enabled, algorithm) in [
                ("AFC", record.afc, record.afc_type),
                ("Beamformer", record.bf, record.bf_type),
            ] {
                if enabled && !algorithm.adapts() {
                    println!("  {} is on but {} does not adapt its filter", unit, algorithm);
                }
            }
        }

        Commands::Set { file, field, value } => {
            let json = serde_json::from_str::<serde_json::Value>(&value)
                .unwrap_or(serde_json::Value::String(value));
            let record = store::update_field(&file, bands, &field, &json)?;
            if let Some(current) = record.get(&field) {
                println!("{} = {}", field, current);
            }
        }

        Commands::Watch { file } => {
            let path = resolve_file(file)?;
            let initial = if path.exists() {
                store::load(&path, bands)?
            } else {
                ParameterRecord::new(bands)?
            };
            let shared = SharedParameters::new(initial)?;
            let mut watcher = ParamWatcher::spawn(path.clone(), shared.clone())?;

            let running = Arc::new(AtomicBool::new(true));
            let running_handler = Arc::clone(&running);
            ctrlc::set_handler(move || {
                running_handler.store(false, Ordering::SeqCst);
            })?;

            println!("Watching {:?} ({} bands), Ctrl-C to stop", path, bands);
            let mut previous = shared.snapshot();
            while running.load(Ordering::SeqCst) {
                match watcher.recv_timeout(Duration::from_millis(200)) {
                    Some(WatchEvent::Reloaded { generation, .. }) => {
                        let current = shared.snapshot();
                        let changed = changed_fields(&previous, &current);
                        println!("[{}] reloaded, changed: {}", generation, changed.join(", "));
                        previous = current;
                    }
                    Some(WatchEvent::Rejected { reason, .. }) => {
                        println!("rejected: {}", reason);
                    }
                    None => {}
                }
            }
            watcher.shutdown();
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
