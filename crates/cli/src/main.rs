mod metrics;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipcurator_core::{
    load_config, validate_config, Curator, MetadataFetcher, SanitizedConfig, Searcher,
    YouTubeClient,
};

/// Curate short-form videos for a keyword.
#[derive(Debug, Parser)]
#[command(name = "curate", version)]
struct Args {
    /// Search keyword (several words are joined with spaces).
    #[arg(required = true)]
    keyword: Vec<String>,

    /// Configuration file.
    #[arg(long, env = "CURATOR_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Override the target number of videos.
    #[arg(long)]
    target: Option<u32>,

    /// Override the search page budget.
    #[arg(long)]
    max_pages: Option<u32>,

    /// Print the full run as JSON instead of the summary.
    #[arg(long)]
    json: bool,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let keyword = args.keyword.join(" ");

    // Load configuration
    info!("Loading configuration from {:?}", args.config);
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(target) = args.target {
        config.pagination.target_results = target;
    }
    if let Some(max_pages) = args.max_pages {
        config.pagination.max_pages = max_pages;
    }
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    let sanitized = SanitizedConfig::from(&config);
    info!(
        config = %serde_json::to_string(&sanitized).unwrap_or_default(),
        "Effective configuration"
    );

    // Create providers
    let youtube = Arc::new(
        YouTubeClient::new(config.youtube.clone()).context("Failed to create YouTube client")?,
    );
    let searcher: Arc<dyn Searcher> = youtube.clone();
    let fetcher: Arc<dyn MetadataFetcher> = youtube;
    let curator = Curator::new(config.orchestrator.clone(), searcher, fetcher);

    // Cancel the run on Ctrl+C; the partial result is still reported.
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_signal(cancel.clone()));

    let run = curator
        .curate_with_cancel(&keyword, &config.filter, &config.pagination, &cancel)
        .await
        .context("Curation rejected")?;
    watcher.abort();

    if run.ended_abnormally() {
        warn!(stop_reason = %run.stop_reason, "Run ended early, results are partial");
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&run).context("Failed to serialize run")?
        );
    } else {
        println!("{}", run.report());
        for (rank, video) in run.videos.iter().enumerate() {
            println!(
                "{:>3}. [{}] {} ({}s, {} views, {:.2}%) https://youtu.be/{}",
                rank + 1,
                video.quality_grade,
                video.title,
                video.duration_seconds,
                video.view_count,
                video.engagement_rate * 100.0,
                video.video_id
            );
        }
    }

    if args.metrics {
        print!("{}", metrics::encode_metrics()?);
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel the run.
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, cancelling run");
    cancel.cancel();
}
