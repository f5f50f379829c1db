//! # ASIC HAL Binary
//!
//! Runs the boundary monitor and the command servicer against one ASIC
//! transport until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Simulation transport; /etc/asic/asic.toml if present, else defaults
//! asic_hal
//!
//! # Explicit configuration file, verbose logging
//! asic_hal --config /etc/asic/asic.toml -v
//!
//! # Smoke run: stop after 5 monitor cycles, JSON logs
//! asic_hal --cycles 5 --json
//! ```

use asic_common::config::{ConfigLoader, LogLevel};
use asic_common::device::config::AsicConfig;
use asic_common::device::consts::DEFAULT_CONFIG_PATH;
use asic_hal::runtime::AsicRuntime;
use asic_hal::servicer::command_channel;
use asic_hal::transport_registry::TransportRegistry;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// ASIC HAL - axis boundary monitor and command servicer
#[derive(Parser, Debug)]
#[command(name = "asic_hal")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Serializes ASIC access between the boundary monitor and the command servicer")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file (asic.toml). Without it the default
    /// path is used if it exists, built-in defaults otherwise.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Register transport to use
    #[arg(short, long, default_value = "simulation")]
    transport: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Stop after the monitor has run this many cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("ASIC HAL startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path =
        resolve_config_path(args.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH));
    let config = match &config_path {
        Some(path) => AsicConfig::load(path),
        None => Ok(AsicConfig::default()),
    };
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("ASIC HAL v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = config?;
    match &config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file found, using defaults"),
    }

    let registry = TransportRegistry::with_builtin();
    info!("Available transports: {:?}", registry.names().collect::<Vec<_>>());
    let transport = registry.create_transport(&args.transport, &config)?;

    // No external producer is attached yet; the client keeps the channel open.
    let (_client, source) = command_channel();

    let mut runtime = AsicRuntime::new(config, transport, source)?;
    if let Some(cycles) = args.cycles {
        runtime = runtime.with_cycle_limit(cycles);
    }

    let shutdown = runtime.shutdown_signal();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        shutdown.trigger();
    })?;

    let report = runtime.start()?.wait();
    info!("Final statistics: {}", serde_json::to_string(&report)?);

    info!("ASIC HAL shutdown complete");
    Ok(())
}

/// An explicit path always wins; otherwise the default path, if it exists.
fn resolve_config_path(explicit: Option<&Path>, default: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if default.is_file() => Some(default.to_path_buf()),
        None => None,
    }
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.as_directive().parse().unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn explicit_config_path_wins_even_if_missing() {
        let explicit = Path::new("/nonexistent/asic.toml");
        let default = NamedTempFile::new().unwrap();
        assert_eq!(
            resolve_config_path(Some(explicit), default.path()),
            Some(explicit.to_path_buf())
        );
    }

    #[test]
    fn default_config_path_used_only_when_present() {
        let default = NamedTempFile::new().unwrap();
        assert_eq!(
            resolve_config_path(None, default.path()),
            Some(default.path().to_path_buf())
        );
        assert_eq!(resolve_config_path(None, Path::new("/nonexistent/asic.toml")), None);
    }
}
