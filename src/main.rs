mod ai;
mod app;
mod config;
mod contexts;
mod domain;
mod infrastructure;
mod messaging;
mod page;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use infrastructure::{directories, logging, shutdown};
use page::{MemoryDocument, SnapshotNode};

/// Scores an X profile page as engage, maybe, or rage bait.
#[derive(Debug, Parser)]
#[command(name = "detect-ragebait", version, about)]
struct Args {
    /// JSON snapshot of the page's document tree.
    #[arg(long)]
    page: PathBuf,

    /// Location the snapshot was taken from.
    #[arg(long)]
    url: String,

    /// Dotenv-style settings file.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load_config(&args.env_file)?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let document = load_document(&args.page)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app =
        app::RagebaitApp::initialize(config, paths, shutdown, document.into_shared(), args.url)
            .await?;
    app.run().await
}

fn load_document(path: &Path) -> Result<MemoryDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read page snapshot {}", path.display()))?;
    let snapshot: SnapshotNode = serde_json::from_str(&raw)
        .with_context(|| format!("invalid page snapshot {}", path.display()))?;
    Ok(MemoryDocument::from_snapshot(&snapshot))
}
