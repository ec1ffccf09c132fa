// src/main.rs

//! showcase-crawler: Creative-AI Media Sample Harvester CLI
//!
//! Harvests prompt/media/thumbnail samples from the configured showcase
//! sites, re-hosts the media on object storage, and appends one row per
//! sample to durable per-site and aggregate logs.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use showcase_crawler::error::Result;
use showcase_crawler::fetch::MediaFetcher;
use showcase_crawler::logging;
use showcase_crawler::models::Config;
use showcase_crawler::pipeline::{run_sites, RunContext};
use showcase_crawler::sink::RecordSink;
use showcase_crawler::storage::{ArtifactRelocator, LocalBackend, S3Backend, StorageBackend};
use showcase_crawler::utils::http::ReqwestHttpSource;

#[derive(Parser, Debug)]
#[command(
    name = "showcase-crawler",
    version,
    about = "Creative-AI media sample harvester"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest samples from the configured sites
    Crawl {
        /// Site names to crawl, or "all"
        #[arg(long, num_args = 1.., default_value = "all")]
        sites: Vec<String>,

        /// Override the output directory
        #[arg(short, long)]
        output: Option<String>,

        /// Relocate artifacts into a local directory instead of S3
        #[arg(long)]
        local_store: Option<String>,

        /// Skip the CSV sheet export at the end of the run
        #[arg(long)]
        no_export: bool,
    },
    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Validate => {
            config.validate()?;
            info!("Configuration OK: {} sites", config.sites.len());
        }
        Command::Crawl {
            sites,
            output,
            local_store,
            no_export,
        } => {
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            config.validate()?;

            let backend: Arc<dyn StorageBackend> = match &local_store {
                Some(dir) => Arc::new(LocalBackend::new(dir)),
                None => Arc::new(S3Backend::from_env(&config.storage.bucket).await?),
            };
            let relocator = ArtifactRelocator::new(backend, &config.storage);
            let fetcher = MediaFetcher::new(&config.crawler)?;
            let http = ReqwestHttpSource::from_config(&config.crawler)?;
            let sink = RecordSink::new(PathBuf::from(&config.output.dir))?;

            let ctx = RunContext {
                config: &config,
                http: &http,
                page: None,
                fetcher: &fetcher,
                relocator: &relocator,
                sink: &sink,
            };

            let summary = run_sites(&ctx, &sites).await?;

            if !no_export {
                let sheet_dir = PathBuf::from(&config.output.dir).join("sheets");
                sink.export_sheets(&sheet_dir)?;
            }

            for site in &summary.sites {
                info!("  {}: {}/{}", site.site, site.produced, site.target);
            }
            info!(
                "Total: {} rows in {}s",
                summary.total_rows,
                (summary.finished_at - summary.started_at).num_seconds()
            );
        }
    }

    Ok(())
}
