//! mtcam command-line entry point.

mod cli;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mtcam::config::{expand_path, load_settings};

#[derive(Parser)]
#[command(name = "mtcam", version, about = "Mountain camera scrape logs and timelapses")]
struct Cli {
    /// Root URL of the camera service
    #[arg(long, env = "MTCAM_URL", global = true)]
    url: Option<String>,

    /// Write logs to this file (the terminal UI is otherwise silent)
    #[arg(long, env = "MTCAM_LOG_FILE", global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal viewer (default)
    Tui,
    /// List mountains and their cameras
    Mountains,
    /// Print the scrape log and statistics for a camera
    Scrapes {
        #[command(flatten)]
        selection: Selection,
        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the timelapse of successful scrapes
    Timelapse {
        #[command(flatten)]
        selection: Selection,
        /// Frames per second
        #[arg(long)]
        fps: Option<f64>,
        /// Stop after this many passes over the frames
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Download the weather plot for a mountain as an HTML page
    Weather {
        #[command(flatten)]
        selection: Selection,
        /// Output file
        #[arg(long, short)]
        out: Option<String>,
    },
}

/// Which camera and dates to query.
#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Mountain id (default: first)
    #[arg(long, short)]
    pub mountain: Option<u32>,
    /// Camera id (default: the mountain's first)
    #[arg(long, short)]
    pub cam: Option<u32>,
    /// Start date, YYYY-MM-DD (default: today)
    #[arg(long, short)]
    pub start: Option<String>,
    /// End date, YYYY-MM-DD
    #[arg(long, short)]
    pub end: Option<String>,
    /// Interpret dates in the mountain's timezone
    #[arg(long)]
    pub local_time: bool,
}

fn init_logging(interactive: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let default_filter = if interactive { "mtcam=debug" } else { "mtcam=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_file {
        Some(path) => {
            let path: PathBuf = expand_path(path);
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        // Anything written to the terminal would tear the UI.
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    init_logging(matches!(command, Commands::Tui), cli.log_file.as_deref())?;

    let mut settings = load_settings().await;
    if let Some(url) = cli.url {
        settings.base_url = url;
    }

    match command {
        Commands::Tui => mtcam::tui::run(&settings).await,
        Commands::Mountains => cli::mountains(&settings).await,
        Commands::Scrapes { selection, json } => cli::scrapes(&settings, &selection, json).await,
        Commands::Timelapse {
            selection,
            fps,
            cycles,
        } => {
            if let Some(fps) = fps {
                settings.frames_per_second = fps;
            }
            cli::timelapse(&settings, &selection, cycles).await
        }
        Commands::Weather { selection, out } => {
            if let Some(out) = out {
                settings.weather_output = expand_path(&out);
            }
            cli::weather(&settings, &selection).await
        }
    }
}
