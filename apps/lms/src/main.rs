mod commands;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::LmsClient;
use storage::SqliteLocalStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "lms", version, about = "Terminal front end for the LMS API")]
struct Args {
    /// Config file; `./lms.toml` is read when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    storage_url: Option<String>,
    /// Where the session database lives.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.storage_url {
        settings.storage_url = v;
    }
    if let Some(v) = args.data_dir {
        settings.data_dir = v;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(api_url = %settings.api_url, data_dir = %settings.data_dir.display(), "settings loaded");

    let database_url = settings.session_database_url();
    let store = SqliteLocalStore::new(&database_url)
        .await
        .with_context(|| format!("failed to open session store at {database_url}"))?;
    let client = LmsClient::connect(&settings.api_url, &settings.storage_url, Arc::new(store))
        .await
        .context("failed to restore session")?;

    commands::run(&client, args.command).await
}
