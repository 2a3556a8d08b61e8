use crate::error::StoreError;
use crate::models::{DailyStats, PortfolioHistory};
use crate::repositories::{read_if_exists, write_replacing};
use std::path::PathBuf;
use tracing::debug;

/// Day-by-day portfolio snapshots kept in a JSON file
pub struct PortfolioRepository {
    path: PathBuf,
}

impl PortfolioRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the history; a missing file is an empty history
    pub async fn load(&self) -> Result<PortfolioHistory, StoreError> {
        match read_if_exists(&self.path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(PortfolioHistory::new()),
        }
    }

    pub async fn save(&self, history: &PortfolioHistory) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(history)?;
        write_replacing(&self.path, &bytes).await
    }

    /// Record `stats` under its date, replacing that day's earlier entry
    pub async fn record(&self, stats: &DailyStats) -> Result<PortfolioHistory, StoreError> {
        let mut history = self.load().await?;
        history.record(stats.date, stats.snapshot());
        self.save(&history).await?;
        debug!(
            "Recorded portfolio snapshot for {} ({} days on file)",
            stats.date,
            history.len()
        );
        Ok(history)
    }
}
