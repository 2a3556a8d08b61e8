use crate::error::StoreError;
use crate::models::{WatchLedger, WatchRecord};
use crate::repositories::{read_if_exists, write_replacing, HistoryStore};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// History store backed by a single JSON file.
///
/// The file is an array of records in the `Inventory` / `PriceHistory`
/// layout, so existing history files load unchanged.
pub struct JsonHistoryRepository {
    path: PathBuf,
}

impl JsonHistoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryRepository {
    async fn load(&self) -> Result<WatchLedger, StoreError> {
        let Some(bytes) = read_if_exists(&self.path).await? else {
            info!("No history at {}, starting empty", self.path.display());
            return Ok(WatchLedger::new());
        };

        let records: Vec<WatchRecord> = serde_json::from_slice(&bytes)?;
        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(WatchLedger::from_records(records))
    }

    async fn save(&self, ledger: &WatchLedger) -> Result<(), StoreError> {
        let records: Vec<&WatchRecord> = ledger.records().collect();
        let bytes = serde_json::to_vec_pretty(&records)?;
        write_replacing(&self.path, &bytes).await?;
        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
