//! Collecting a snapshot of the live catalog.
//!
//! A [`SnapshotFetcher`] produces raw listings one page at a time; an empty
//! page ends pagination. [`collect_snapshot`] drives it a window of pages at a
//! time and normalizes what comes back.

use crate::config::{FetchConfig, MAX_FETCH_CONCURRENCY};
use crate::error::FetchError;
use crate::models::{RawListing, WatchSeed};
use crate::services::normalizer;
use chrono::NaiveDateTime;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::{debug, info, warn};

/// Source of raw listings, one page per call.
///
/// Pages are numbered from 1. An empty vector means there are no more pages.
/// Implementations return zero or one listing per catalog entry, never a
/// partially fetched one.
pub trait SnapshotFetcher {
    fn fetch_batch(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Vec<RawListing>, FetchError>> + Send;
}

/// Fetches listing pages as JSON over HTTP.
///
/// The client is passed in so a single connection pool can be shared and its
/// lifetime is owned by the caller.
pub struct HttpSnapshotFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpSnapshotFetcher {
    pub fn new(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// Build a client with the configured timeout and user agent
    pub fn build_client(config: &FetchConfig) -> Result<Client, FetchError> {
        Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)
    }
}

impl SnapshotFetcher for HttpSnapshotFetcher {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<RawListing>, FetchError> {
        let url = self.config.page_url(page);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http { page, source })?;

        // Past the last page
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let body = response
            .error_for_status()
            .map_err(|source| FetchError::Http { page, source })?
            .bytes()
            .await
            .map_err(|source| FetchError::Http { page, source })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            page,
            message: e.to_string(),
        })
    }
}

/// Normalized listings from one pass over the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub seeds: Vec<WatchSeed>,
    /// Listings rejected by the normalizer (no inventory id)
    pub dropped: usize,
    /// Pages whose fetch failed; pagination stops at the first one
    pub failed_pages: usize,
    /// Non-empty pages collected
    pub pages: u32,
}

/// Fetch pages `concurrency` at a time until an empty or failed page.
///
/// `concurrency` is clamped to `1..=MAX_FETCH_CONCURRENCY`. Results are
/// consumed in page order, so pages after the first empty or
/// failed one are discarded even if they arrived.
pub async fn collect_snapshot<F: SnapshotFetcher>(
    fetcher: &F,
    concurrency: usize,
    observed_at: NaiveDateTime,
) -> Snapshot {
    let window = concurrency.clamp(1, MAX_FETCH_CONCURRENCY) as u32;
    let mut snapshot = Snapshot::default();
    let mut next_page = 1u32;

    'pages: loop {
        let pages: Vec<u32> = (next_page..next_page.saturating_add(window)).collect();
        if pages.is_empty() {
            break;
        }
        let results = join_all(pages.iter().map(|&page| fetcher.fetch_batch(page))).await;

        for (page, result) in pages.into_iter().zip(results) {
            match result {
                Ok(listings) if listings.is_empty() => {
                    debug!("Page {} is empty, end of catalog", page);
                    break 'pages;
                }
                Ok(listings) => {
                    snapshot.pages += 1;
                    for raw in &listings {
                        match normalizer::normalize(raw, observed_at) {
                            Ok(seed) => snapshot.seeds.push(seed),
                            Err(e) => {
                                warn!("Dropping listing on page {}: {}", page, e);
                                snapshot.dropped += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Stopping at page {}: {}", page, e);
                    snapshot.failed_pages += 1;
                    break 'pages;
                }
            }
        }

        next_page = next_page.saturating_add(window);
    }

    info!(
        "Collected {} listings from {} pages ({} dropped, {} failed pages)",
        snapshot.seeds.len(),
        snapshot.pages,
        snapshot.dropped,
        snapshot.failed_pages
    );

    snapshot
}
