//! PoseHue CLI: run the frame-analysis pipeline on images and recorded sessions.
//!
//! Usage:
//!   posehue analyze <IMAGE> --space <SPACE>     Analyze a single frame
//!   posehue replay <SESSION> --space <SPACE>    Replay a recorded tick stream
//!   posehue config show|init|validate           Manage configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use posehue_common::config::{AppConfig, LoggingConfig};
use posehue_frame_model::CoordinateSpace;

mod commands;

use commands::DetectionOverrides;

#[derive(Parser)]
#[command(
    name = "posehue",
    about = "Find colored objects near tracked pose joints",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis cycle on an image
    Analyze {
        /// Image file (any format the `image` crate decodes)
        image: PathBuf,

        /// Output coordinate space: capture | mirrored
        #[arg(long)]
        space: CoordinateSpace,

        /// JSON landmark file (joint-name object or raw 33-point array)
        #[arg(long)]
        landmarks: Option<PathBuf>,

        /// Print the cycle output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: DetectionOverrides,
    },

    /// Replay a recorded session through the throttled scheduler
    Replay {
        /// Session JSONL file
        session: PathBuf,

        /// Output coordinate space: capture | mirrored
        #[arg(long)]
        space: CoordinateSpace,

        /// Pace ticks by their timestamps instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Print each completed cycle as a JSON line
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: DetectionOverrides,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration to the standard location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check a configuration file
    Validate {
        /// File to check (defaults to the standard location)
        path: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `config validate` reports a broken file itself instead of failing here.
    let config = match &cli.command {
        Commands::Config {
            action: ConfigAction::Validate { .. },
        } => AppConfig::default(),
        _ => load_config(cli.config.as_ref())?,
    };

    // Initialize logging
    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    posehue_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            image,
            space,
            landmarks,
            json,
            overrides,
        } => {
            let detection = overrides.apply(config.detection)?;
            commands::analyze::run(image, space, landmarks, json, detection)
        }
        Commands::Replay {
            session,
            space,
            realtime,
            json,
            overrides,
        } => {
            let detection = overrides.apply(config.detection)?;
            commands::replay::run(session, space, realtime, json, detection).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, cli.config.as_deref()),
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Validate { path } => commands::config::validate(path.or(cli.config)),
        },
    }
}
