//! Report consumers.
//!
//! Sinks receive the change report, the updated ledger and the day's
//! statistics. Formatting of any kind happens here or further downstream.

use crate::error::StoreError;
use crate::models::{ChangeReport, DailyStats, WatchLedger};
use crate::repositories::write_replacing;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use tracing::info;

pub trait ReportSink {
    fn publish(
        &self,
        report: &ChangeReport,
        ledger: &WatchLedger,
        stats: &DailyStats,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Emits the report as structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    async fn publish(
        &self,
        report: &ChangeReport,
        ledger: &WatchLedger,
        stats: &DailyStats,
    ) -> Result<(), StoreError> {
        for added in &report.additions {
            info!(
                inventory = %added.inventory_id,
                title = added.title.as_deref().unwrap_or(""),
                price = %added.price,
                "New watch"
            );
        }
        for change in &report.price_changes {
            info!(
                inventory = %change.inventory_id,
                title = change.title.as_deref().unwrap_or(""),
                old_price = %change.old_price,
                new_price = %change.new_price,
                "Price changed"
            );
        }
        for sale in &report.sold {
            info!(
                inventory = %sale.inventory_id,
                title = sale.title.as_deref().unwrap_or(""),
                sold_at = %sale.sold_at_price,
                "Watch sold"
            );
        }

        info!(
            date = %stats.date,
            tracked = ledger.len(),
            for_sale = stats.for_sale_count,
            for_sale_value = %stats.for_sale_value,
            sold = stats.sold_count,
            sold_value = %stats.sold_value,
            added = stats.added_count,
            added_value = %stats.added_value,
            "Daily summary"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct DailyReport<'a> {
    tracked: usize,
    changes: &'a ChangeReport,
    daily: &'a DailyStats,
}

/// Writes `report-YYYY-MM-DD.json` into a directory for downstream renderers
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn report_path(&self, stats: &DailyStats) -> PathBuf {
        self.dir
            .join(format!("report-{}.json", stats.date.format("%Y-%m-%d")))
    }
}

impl ReportSink for JsonReportWriter {
    async fn publish(
        &self,
        report: &ChangeReport,
        ledger: &WatchLedger,
        stats: &DailyStats,
    ) -> Result<(), StoreError> {
        let body = DailyReport {
            tracked: ledger.len(),
            changes: report,
            daily: stats,
        };
        let bytes = serde_json::to_vec_pretty(&body)?;
        write_replacing(&self.report_path(stats), &bytes).await
    }
}

/// An absent sink publishes nothing
impl<S: ReportSink + Sync> ReportSink for Option<S> {
    async fn publish(
        &self,
        report: &ChangeReport,
        ledger: &WatchLedger,
        stats: &DailyStats,
    ) -> Result<(), StoreError> {
        match self {
            Some(sink) => sink.publish(report, ledger, stats).await,
            None => Ok(()),
        }
    }
}

/// Publish to both sinks, first one first
impl<A: ReportSink + Sync, B: ReportSink + Sync> ReportSink for (A, B) {
    async fn publish(
        &self,
        report: &ChangeReport,
        ledger: &WatchLedger,
        stats: &DailyStats,
    ) -> Result<(), StoreError> {
        self.0.publish(report, ledger, stats).await?;
        self.1.publish(report, ledger, stats).await
    }
}
