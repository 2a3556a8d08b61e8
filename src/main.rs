//! Watch Ledger
//!
//! Runs one scrape cycle: loads stored price history, fetches the live
//! catalog, reconciles it, persists the result and writes the day's summary.
//! Meant to be scheduled (cron, systemd timer) once or a few times a day.

use tracing::{error, info};
use watch_ledger::config::{AppConfig, LogFormat, StoreBackend};
use watch_ledger::database::Database;
use watch_ledger::error::{AppError, AppResult};
use watch_ledger::repositories::{
    HistoryStore, JsonHistoryRepository, PgHistoryRepository, PortfolioRepository,
};
use watch_ledger::services::{
    CycleSummary, HttpSnapshotFetcher, JsonReportWriter, TracingReportSink, Tracker,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Watch ledger starting");
    info!("Catalog: {}{}", config.fetch.base_url, config.fetch.listing_path);
    info!("Store backend: {:?}", config.store.backend);

    let client = HttpSnapshotFetcher::build_client(&config.fetch)?;
    let fetcher = HttpSnapshotFetcher::new(client, config.fetch.clone());

    let summary = match config.store.backend {
        StoreBackend::Json => {
            let store = JsonHistoryRepository::new(&config.store.history_file);
            info!("History file: {}", store.path().display());
            run(&config, fetcher, store).await
        }
        StoreBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".to_string()))?;

            info!("Connecting to database...");
            let database = Database::connect(db_config).await.map_err(|e| {
                error!("Failed to prepare database: {}", e);
                AppError::Database(e)
            })?;

            let store = PgHistoryRepository::new(database.pool().clone());
            let result = run(&config, fetcher, store).await;
            database.close().await;
            result
        }
    };

    match summary {
        Ok(summary) => {
            info!(
                "Cycle {} done: {} listings ({} dropped, {} failed pages), {} new, {} repriced, {} sold, {} tracked",
                summary.run_id,
                summary.fetched,
                summary.dropped,
                summary.failed_pages,
                summary.report.additions.len(),
                summary.report.price_changes.len(),
                summary.report.sold.len(),
                summary.tracked
            );
            Ok(())
        }
        Err(e) => {
            error!("Cycle failed: {}", e);
            Err(e)
        }
    }
}

async fn run<S>(config: &AppConfig, fetcher: HttpSnapshotFetcher, store: S) -> AppResult<CycleSummary>
where
    S: HistoryStore + Sync,
{
    let portfolio = PortfolioRepository::new(&config.store.portfolio_file);
    let sink = (
        TracingReportSink,
        config.store.report_dir.as_ref().map(JsonReportWriter::new),
    );

    let tracker = Tracker::new(fetcher, store, portfolio, sink)
        .with_concurrency(config.fetch.concurrency);

    tracker.run_cycle(chrono::Local::now().naive_local()).await
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("watch_ledger={},sqlx=warn", config.log_level).into()
    });

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
