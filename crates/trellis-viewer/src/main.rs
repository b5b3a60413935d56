//! Trellis Viewer - Main entry point
//!
//! Loads configuration and a site feed, probes for a GPU, and runs either
//! the 3D twin or the textual fallback alert listing.

mod app;
mod capability;
mod config;
mod fallback;
mod feed;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "trellis-viewer")]
#[command(about = "Interactive 3D structural-health twin viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a site feed file (JSON); overrides the config's feed path
    #[arg(short, long)]
    feed: Option<PathBuf>,

    /// Skip the GPU probe and show the textual alert listing
    #[arg(long)]
    force_fallback: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

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

    info!("Trellis viewer v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(args.config.as_deref())?;
    let feed_path = args.feed.clone().or_else(|| config.feed.clone());
    let feed = match feed_path {
        Some(path) => feed::load_feed(&path)?,
        None => {
            info!("No feed configured, using the built-in demo site");
            feed::demo_feed()
        }
    };

    if args.force_fallback {
        fallback::run_fallback(&feed);
        return Ok(());
    }

    match capability::probe_render_support() {
        Ok(()) => app::run_viewer(config, feed),
        Err(err) => {
            // Recoverable: surface the alerts as text instead of a scene
            warn!(error = %err, "3D rendering unavailable, switching to text fallback");
            fallback::run_fallback(&feed);
            Ok(())
        }
    }
}
