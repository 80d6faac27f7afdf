//! Icetrack CLI — Command-line interface for penguin track mapping.
//!
//! Usage:
//!   icetrack info [TRACKS]     Summarize a GPS track dataset
//!   icetrack check             Verify the configured inputs
//!   icetrack plot [OPTIONS]    Render the static foraging map
//!   icetrack animate [OPTIONS] Render the looping track animation

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use icetrack_common::config::AppConfig;

mod commands;

use commands::MapArgs;

#[derive(Parser)]
#[command(
    name = "icetrack",
    about = "Emperor penguin foraging tracks over Antarctic raster basemaps",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a GPS track dataset
    Info {
        /// Tracks CSV path (defaults to the configured dataset)
        tracks: Option<PathBuf>,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify that the configured inputs are usable
    Check,

    /// Render the static foraging map
    Plot {
        #[command(flatten)]
        map: MapArgs,

        /// Figure title
        #[arg(long)]
        title: Option<String>,
    },

    /// Render the looping track animation
    Animate {
        #[command(flatten)]
        map: MapArgs,

        /// Hours of track time per frame
        #[arg(long)]
        step_hours: Option<f64>,

        /// Playback delay per frame in milliseconds
        #[arg(long)]
        frame_ms: Option<u32>,

        /// Draw only the last N hours of each track per frame
        #[arg(long, value_name = "HOURS")]
        trail_hours: Option<f64>,

        /// Play the GIF once instead of looping
        #[arg(long)]
        no_loop: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    icetrack_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Info { tracks, json } => commands::info::run(&config, tracks, json),
        Commands::Check => commands::check::run(&config),
        Commands::Plot { map, title } => commands::plot::run(&config, map, title),
        Commands::Animate {
            map,
            step_hours,
            frame_ms,
            trail_hours,
            no_loop,
        } => commands::animate::run(&config, map, step_hours, frame_ms, trail_hours, no_loop),
    }
}
