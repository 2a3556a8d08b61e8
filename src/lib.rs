//! Watch Ledger Library
//!
//! Tracks retailer listings over time: normalizes scraped listings, merges
//! each snapshot into an append-only price history, and summarizes the day.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, DataIntegrityError};
pub use models::{Price, PricePoint, WatchLedger, WatchRecord, WatchSeed};
pub use services::{reconcile, summarize};
