use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use saloon_core::config::Config;
use saloon_indexer::{ReindexJob, SearchService};
use saloon_store::SqliteContentStore;
use saloon_text::{IndexOptions, TantivyIndexStore};

/// Keeps the forum search index up to date.
#[derive(Debug, Parser)]
#[command(name = "saloon-indexd", version)]
struct Args {
    /// Reindex once and exit instead of running the scheduler.
    #[arg(long)]
    once: bool,

    /// Override `store.database_url`.
    #[arg(long, env = "SALOON_DATABASE_URL")]
    database_url: Option<String>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    saloon_cli::init_logging(args.verbose, args.quiet);

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    if let Some(url) = args.database_url {
        settings.store.database_url = url;
    }
    settings.validate()?;

    let store = Arc::new(SqliteContentStore::connect(&settings.store.database_url, settings.store.max_connections).await?);

    if args.once {
        let index = TantivyIndexStore::open(settings.index.resolved_path(), &IndexOptions::from(&settings.index))?;
        let report = ReindexJob::new(store, Arc::new(index)).with_prune(settings.index.prune_stale).run().await?;
        println!(
            "Indexed {} documents ({} topics, {} replies) in {:.2?}",
            report.documents, report.topics, report.replies, report.elapsed
        );
        return Ok(());
    }

    let service = SearchService::start(&settings, store)?;
    info!(
        index = %settings.index.resolved_path().display(),
        interval_secs = settings.scheduler.interval_secs,
        "waiting for ctrl-c"
    );
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, shutting down");
    }
    service.shutdown().await?;
    Ok(())
}
