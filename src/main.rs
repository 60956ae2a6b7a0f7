use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bookdeck::{
    app::App,
    config::{Config, ConfigLoader, ConfigValidator},
    data::HttpBookSource,
    model::Region,
};

#[derive(Parser)]
#[command(name = "bookdeck")]
#[command(about = "A terminal browser for generated book catalogs", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate config and exit (don't run TUI)
    #[arg(long)]
    validate: bool,

    /// Override the configured catalog endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Initial generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Initial region (en or fr)
    #[arg(long)]
    region: Option<Region>,

    /// Initial minimum review count per book
    #[arg(long)]
    reviews: Option<u64>,

    /// Directory books.csv is written to
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Append diagnostics to this file (honors RUST_LOG)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load config
    let mut config = match &cli.config {
        Some(path) => match ConfigLoader::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("✗ Failed to load config: {}", e);
                eprintln!("\nError details: {:?}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // CLI flags win over the config file
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(seed) = cli.seed {
        config.defaults.seed = seed;
    }
    if let Some(region) = cli.region {
        config.defaults.region = region;
    }
    if let Some(reviews) = cli.reviews {
        config.defaults.reviews = reviews;
    }
    if let Some(export_dir) = cli.export_dir {
        config.export_dir = export_dir;
    }

    // Validate config
    if let Err(e) = ConfigValidator::validate(&config) {
        eprintln!("✗ Config validation failed: {}", e);
        eprintln!("\nFull error chain:");
        for cause in e.chain() {
            eprintln!("  - {}", cause);
        }
        std::process::exit(1);
    }

    // If validate-only mode, exit here
    if cli.validate {
        println!("✓ Configuration is valid!");
        return Ok(());
    }

    if let Some(log_path) = &cli.log_file {
        init_logging(log_path)?;
    }

    let timeout = config
        .timeout_duration()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid timeout: {}", e))?;
    let source = Arc::new(HttpBookSource::new(config.endpoint.clone()).with_timeout(timeout));

    // Run TUI
    let terminal = ratatui::init();
    let app = App::new(&config, source);
    let result = app
        .run(terminal)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{}", e));
    ratatui::restore();
    result
}

fn init_logging(path: &Path) -> color_eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
