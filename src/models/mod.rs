//! Domain models for the watch ledger.
//!
//! This module contains the tracked records, their price histories, and the
//! reports derived from reconciling fresh snapshots against them.

pub mod ledger;
pub mod listing;
pub mod price;
pub mod report;
pub mod stats;
pub mod watch;

// Re-export all models for convenient access
pub use ledger::WatchLedger;
pub use listing::RawListing;
pub use price::{Price, PricePoint, SOLD_SENTINEL};
pub use report::{ChangeReport, NewAddition, PriceChange, SaleEvent};
pub use stats::{DailyStats, PortfolioHistory, PortfolioSnapshot};
pub use watch::{WatchDetails, WatchRecord, WatchSeed};
