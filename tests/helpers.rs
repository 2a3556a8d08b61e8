#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use watch_ledger::error::FetchError;
use watch_ledger::models::*;
use watch_ledger::services::SnapshotFetcher;

/// March 2024 at the given day and hour
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

pub fn usd(amount: i64) -> Price {
    Price::Amount(Decimal::new(amount, 0))
}

pub fn titled(title: &str) -> WatchDetails {
    WatchDetails {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

pub fn branded(brand: &str, model: Option<&str>) -> WatchDetails {
    WatchDetails {
        title: Some(format!("{} {}", brand, model.unwrap_or("Watch"))),
        brand: Some(brand.to_string()),
        model: model.map(str::to_string),
        ..Default::default()
    }
}

/// A normalized listing with a generated title
pub fn seed(inventory_id: &str, price: Price, observed_at: NaiveDateTime) -> WatchSeed {
    WatchSeed::new(
        inventory_id,
        titled(&format!("Watch {}", inventory_id)),
        PricePoint::new(observed_at, price),
    )
}

pub fn record(inventory_id: &str, details: WatchDetails, points: &[(NaiveDateTime, Price)]) -> WatchRecord {
    let history = points
        .iter()
        .map(|(observed_at, price)| PricePoint::new(*observed_at, *price))
        .collect();
    WatchRecord::from_parts(inventory_id, details, history)
}

pub fn history(ledger: &WatchLedger, inventory_id: &str) -> Vec<Price> {
    ledger
        .get(inventory_id)
        .map(|r| r.price_history().iter().map(|p| p.price).collect())
        .unwrap_or_default()
}

pub fn listing(inventory: &str, price: &str) -> RawListing {
    RawListing {
        inventory: Some(inventory.to_string()),
        title: Some(format!("vintage watch {}", inventory)),
        year: Some("1970".to_string()),
        brand: Some("rolex".to_string()),
        model: Some("submariner".to_string()),
        reference: Some("5513".to_string()),
        serial: Some("N/A".to_string()),
        price: Some(price.to_string()),
    }
}

/// Serves fixed pages from memory, optionally failing one of them
pub struct StaticFetcher {
    pages: Vec<Vec<RawListing>>,
    failing_page: Option<u32>,
    calls: AtomicU32,
}

impl StaticFetcher {
    pub fn new(pages: Vec<Vec<RawListing>>) -> Self {
        Self {
            pages,
            failing_page: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotFetcher for StaticFetcher {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<RawListing>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_page == Some(page) {
            return Err(FetchError::Decode {
                page,
                message: "unexpected end of input".to_string(),
            });
        }
        let index = page.saturating_sub(1) as usize;
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Scratch directory removed on drop
pub struct TestDir {
    dir: tempfile::TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("watch-ledger-")
            .tempdir()
            .expect("Failed to create test directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
