//! `applog` command-line front end.
//!
//! # Commands
//! - `show`: resolve settings and print them as JSON
//! - `emit`: assemble a logger and emit one record
//! - `watch`: assemble a logger and rebuild it whenever the settings file
//!   changes, until Ctrl-C
//!
//! Settings come from the env-file and process environment (`LOG_*`),
//! or from a TOML file when `--config` is given. The tool's own
//! diagnostics go to stderr through `tracing`, filtered by `RUST_LOG`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use applog::config::{SettingsLoader, SettingsSource, SettingsWatcher, DEFAULT_ENV_FILE};
use applog::policy::{parse_retention, parse_rotation, RotationPolicy};
use applog::{DestinationKind, LogLevel, LogSettings, LoggerRegistry};

#[derive(Parser)]
#[command(name = "applog")]
#[command(about = "Resolve logging settings and drive configured loggers", long_about = None)]
struct Cli {
    /// Env-file read before the process environment.
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// TOML settings file; replaces the env sources when given.
    #[arg(long, global = true, env = "APPLOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved settings as JSON
    Show,
    /// Emit one record through a configured logger
    Emit {
        /// Logger name
        #[arg(long, default_value = "applog")]
        name: String,
        /// Record level (case-insensitive)
        #[arg(long, default_value = "info")]
        level: String,
        /// Message text
        message: String,
    },
    /// Keep a logger configured from the settings file until Ctrl-C
    Watch {
        /// Logger name
        #[arg(long, default_value = "applog")]
        name: String,
    },
}

/// Settings plus the values derived from them at assembly time.
#[derive(Serialize)]
struct Resolved<'a> {
    #[serde(flatten)]
    settings: &'a LogSettings,
    rotation_policy: RotationPolicy,
    retention_count: usize,
    effective_destinations: Vec<DestinationKind>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "applog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let source = match cli.config {
        Some(path) => SettingsSource::Toml(path),
        None => SettingsSource::Env(SettingsLoader::new().with_env_file(cli.env_file)),
    };
    let settings = source.load()?;

    match cli.command {
        Commands::Show => {
            let resolved = Resolved {
                settings: &settings,
                rotation_policy: parse_rotation(settings.rotation.as_deref()),
                retention_count: parse_retention(settings.retention.as_deref()),
                effective_destinations: settings.effective_destinations(),
            };
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Commands::Emit { name, level, message } => {
            let level = LogLevel::from_canonical(&level.to_ascii_uppercase())
                .ok_or_else(|| format!("unknown level: {level}"))?;
            let registry = LoggerRegistry::new(settings);
            let logger = registry.get_logger(&name)?;
            logger.log(level, &message);
            logger.flush()?;
        }
        Commands::Watch { name } => {
            let watch_path = source
                .watch_path()
                .map(|path| path.to_path_buf())
                .ok_or("no settings file to watch")?;

            let registry = LoggerRegistry::new(settings);
            let logger = registry.get_logger(&name)?;
            logger.info(format_args!("watching {}", watch_path.display()));

            let (watcher, mut updates) = SettingsWatcher::new(&watch_path, source.clone());
            let _handle = watcher.run()?;

            loop {
                tokio::select! {
                    Some(settings) = updates.recv() => {
                        if let Err(e) = registry.reload(settings) {
                            tracing::error!(error = %e, "Reload failed");
                        }
                        logger.info("logging settings reloaded");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
            logger.flush()?;
        }
    }

    Ok(())
}
