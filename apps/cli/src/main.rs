mod adapter;
mod cli;
mod config;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cloudput_api::Client;
use cloudput_upload::{StorageClient, UploadError, Uploader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::adapter::ApiAdapter;
use crate::cli::{Cli, Command, PutArgs};
use crate::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,cloudput=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Put(args) => put(&config, args).await,
    }
}

async fn put(config: &Config, args: PutArgs) -> anyhow::Result<()> {
    if args.sources.is_empty() {
        return Err(UploadError::NoOperands.into());
    }
    if args.force {
        debug!("--force has no effect, uploads always overwrite");
    }

    let client = Client::new(config.access_token()?)
        .context("failed to create API client")?
        .with_content_url(config.content_url.clone());
    let storage: Arc<dyn StorageClient> = Arc::new(ApiAdapter::new(client));

    let mut uploader = Uploader::new(storage);
    let events = uploader
        .take_events()
        .context("upload events already taken")?;
    let printer = tokio::spawn(progress::render(events));

    let report = uploader.put(args.sources, args.destination).await;
    // Closes the event channel so the printer drains and exits.
    drop(uploader);
    let _ = printer.await;
    let report = report?;

    // The progress bars only mark failures; the cause is printed here once.
    if !report.is_success() {
        for (source, err) in report.failed() {
            eprintln!("{}: {err}", source.display());
        }
    }
    let committed = report.into_result()?;
    info!(files = committed.len(), "all uploads completed");
    Ok(())
}
