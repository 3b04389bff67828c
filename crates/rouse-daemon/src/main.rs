//! Rouse Daemon - Main entry point
//!
//! Serves the wake and preset playback API, or runs a single wake and exits.

mod api;
mod config;
mod server;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use rouse_wake::WakeRequest;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "rouse")]
#[command(about = "Wake a media renderer and start a folder playing on it")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "rouse.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Wake the target of the named preset and exit
    #[arg(long, value_name = "PRESET")]
    wake: Option<String>,

    /// With --wake, only probe the target without sending a wake packet
    #[arg(long, requires = "wake")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Rouse v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    let state = state::AppState::new(config.clone());

    if let Some(name) = args.wake {
        let preset = config
            .preset(&name)
            .with_context(|| format!("preset '{name}' not found in {}", args.config.display()))?;
        let target = preset
            .target
            .as_ref()
            .with_context(|| format!("preset '{name}' has no target device"))?;

        let request = WakeRequest {
            broadcast: target.broadcast,
            port: config.wake.port,
            pre_delay: config.wake.pre_delay(),
            schedule: config.wake.schedule(),
            dry_run: args.dry_run,
            ..WakeRequest::new(target.ip, target.mac)
        };
        let outcome = state.coordinator.wake(&request).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);

        if !outcome.is_awake() {
            std::process::exit(1);
        }
    } else {
        server::run(state, &config.daemon.bind, config.daemon.tls.as_ref()).await?;
    }

    Ok(())
}
