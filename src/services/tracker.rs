use crate::config::MAX_FETCH_CONCURRENCY;
use crate::error::AppResult;
use crate::models::{ChangeReport, DailyStats};
use crate::repositories::{HistoryStore, PortfolioRepository};
use crate::services::report::ReportSink;
use crate::services::snapshot::{collect_snapshot, SnapshotFetcher};
use crate::services::{aggregator, reconciler};
use chrono::NaiveDateTime;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of one scrape cycle
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub run_id: Uuid,
    pub fetched: usize,
    pub dropped: usize,
    pub failed_pages: usize,
    pub tracked: usize,
    pub saved: bool,
    pub report: ChangeReport,
    pub stats: DailyStats,
}

/// Runs scrape cycles against one fetcher, history store and report sink
pub struct Tracker<F, S, R> {
    fetcher: F,
    store: S,
    portfolio: PortfolioRepository,
    sink: R,
    concurrency: usize,
}

impl<F, S, R> Tracker<F, S, R>
where
    F: SnapshotFetcher + Sync,
    S: HistoryStore + Sync,
    R: ReportSink + Sync,
{
    pub fn new(fetcher: F, store: S, portfolio: PortfolioRepository, sink: R) -> Self {
        Self {
            fetcher,
            store,
            portfolio,
            sink,
            concurrency: 1,
        }
    }

    /// Set how many listing pages are fetched at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_FETCH_CONCURRENCY);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load, fetch, reconcile, persist, summarize and publish.
    ///
    /// The ledger is written back only if the pass changed it. Any store
    /// failure or integrity violation ends the cycle with an error.
    pub async fn run_cycle(&self, now: NaiveDateTime) -> AppResult<CycleSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("cycle", %run_id);
        self.run_cycle_inner(run_id, now).instrument(span).await
    }

    async fn run_cycle_inner(&self, run_id: Uuid, now: NaiveDateTime) -> AppResult<CycleSummary> {
        let mut ledger = self.store.load().await?;
        info!("Loaded {} tracked watches", ledger.len());

        let snapshot = collect_snapshot(&self.fetcher, self.concurrency, now).await;
        let fetched = snapshot.seeds.len();

        let report = reconciler::reconcile(&mut ledger, snapshot.seeds, now)?;

        let saved = !report.is_empty();
        if saved {
            self.store.save(&ledger).await?;
            info!("Saved {} watches ({} changes)", ledger.len(), report.event_count());
        } else {
            info!("No changes, history left as is");
        }

        let stats = aggregator::summarize(&ledger, now.date())?;
        self.portfolio.record(&stats).await?;
        self.sink.publish(&report, &ledger, &stats).await?;

        Ok(CycleSummary {
            run_id,
            fetched,
            dropped: snapshot.dropped,
            failed_pages: snapshot.failed_pages,
            tracked: ledger.len(),
            saved,
            report,
            stats,
        })
    }
}
