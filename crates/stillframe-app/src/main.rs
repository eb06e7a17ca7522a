//! Stillframe - extract still frames from a video
//!
//! Usage:
//!   stillframe extract <VIDEO> [OPTIONS]   Plan, transform and export frames
//!   stillframe probe <VIDEO>               Show duration and resolution

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod extract;
mod probe;

#[derive(Parser)]
#[command(
    name = "stillframe",
    about = "Extract still frames from a video with background and watermark removal",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract frames to a directory
    Extract(Box<extract::ExtractArgs>),

    /// Show media information
    Probe {
        /// Path to the video file
        path: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Stillframe starting...");
    stillframe_media::init();

    match cli.command {
        Commands::Extract(args) => extract::run(*args).await,
        Commands::Probe { path } => probe::run(path),
    }
}
