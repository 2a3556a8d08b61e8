pub mod json_history_repository;
pub mod pg_history_repository;
pub mod portfolio_repository;

// Re-export all repositories for convenient access
pub use json_history_repository::JsonHistoryRepository;
pub use pg_history_repository::PgHistoryRepository;
pub use portfolio_repository::PortfolioRepository;

use crate::error::StoreError;
use crate::models::WatchLedger;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Durable storage for the whole ledger.
///
/// `save` must keep every price point, in order, and must not turn the sold
/// sentinel into a number or null. Failures are returned, never retried here.
pub trait HistoryStore {
    fn load(&self) -> impl Future<Output = Result<WatchLedger, StoreError>> + Send;

    fn save(&self, ledger: &WatchLedger) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Replace `path` with `bytes` via a sibling temp file and rename
pub(crate) async fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Read a file, `None` if it does not exist yet
pub(crate) async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
