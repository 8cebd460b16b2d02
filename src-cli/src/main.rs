//! listkit command line front end.
//!
//! One subcommand per pipeline stage. Human edits happen between stages on
//! the CSV files each stage writes.

mod commands;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use listkit::{default_config_path, load_config, Config};

#[derive(Parser, Debug)]
#[command(name = "listkit")]
#[command(about = "Export, enrich and bulk-update a shop catalog")]
#[command(version)]
struct Cli {
    /// Config file; defaults to the platform config directory
    #[arg(short, long, global = true, env = "LISTKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `credentials.shop_id`
    #[arg(long, global = true, env = "LISTKIT_SHOP_ID")]
    shop_id: Option<String>,

    /// Overrides `credentials.user_name`
    #[arg(long, global = true)]
    user_name: Option<String>,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Print the stage report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every active listing to template_listingsData.csv
    Export,
    /// Fill keyword result columns through the research site
    Enrich {
        /// Keyword research CSV
        input: PathBuf,
    },
    /// Patch listing titles and tags from an edited template
    UpdateTitles {
        /// Edited template CSV
        input: PathBuf,
    },
    /// Upload ranked images per listing from mockup folders
    UploadImages {
        /// Edited template CSV with a Mockups Folder column
        input: PathBuf,
        /// Root folder holding one mockup folder per listing
        #[arg(long)]
        image_root: Option<PathBuf>,
        /// Also upload the first .mp4 found in each folder
        #[arg(long)]
        videos: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                info!("Using config file: {}", path.display());
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = resolve_config(cli.config)?;
    if let Some(shop_id) = cli.shop_id {
        config.credentials.shop_id = Some(shop_id);
    }
    if let Some(user_name) = cli.user_name {
        config.credentials.user_name = Some(user_name);
    }

    info!("Starting listkit v{}", env!("CARGO_PKG_VERSION"));
    let output = commands::Output { json: cli.json };

    match cli.command {
        Command::Export => commands::export::run(&config, &output).await,
        Command::Enrich { input } => commands::enrich::run(&config, &input, &output).await,
        Command::UpdateTitles { input } => commands::titles::run(&config, &input, &output).await,
        Command::UploadImages {
            input,
            image_root,
            videos,
        } => {
            if let Some(root) = image_root {
                config.paths.image_root = root.to_string_lossy().into_owned();
            }
            if videos {
                config.images.upload_videos = true;
            }
            commands::images::run(&config, &input, &output).await
        }
    }
}
