//! Inventory-wide figures derived from price histories.

use crate::models::{Price, WatchLedger, WatchRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Last numeric ask: the latest price, or the price just before a sale
pub fn final_price(record: &WatchRecord) -> Option<Decimal> {
    let latest = record.latest()?;
    match latest.price {
        Price::Sold => record.previous()?.price.amount(),
        other => other.amount(),
    }
}

/// Whole days between first sighting and the sold observation
pub fn days_to_sell(record: &WatchRecord) -> Option<i64> {
    if !record.is_sold() || record.previous().is_none() {
        return None;
    }
    let first = record.first()?;
    let sold = record.latest()?;
    let days = (sold.observed_at - first.observed_at).num_days();
    (days >= 0).then_some(days)
}

/// Counts and values for one group of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub total: usize,
    pub for_sale: usize,
    pub sold: usize,
    /// Latest price could not be determined
    pub unpriced: usize,
    pub for_sale_value: Decimal,
}

impl GroupStats {
    fn add(&mut self, record: &WatchRecord) {
        self.total += 1;
        match record.latest_price() {
            Some(Price::Amount(amount)) => {
                self.for_sale += 1;
                self.for_sale_value += amount;
            }
            Some(Price::Sold) => self.sold += 1,
            Some(Price::Unknown) | None => self.unpriced += 1,
        }
    }

    /// Mean asking price of records for sale, zero when none are
    pub fn average_price(&self) -> Decimal {
        if self.for_sale == 0 {
            Decimal::ZERO
        } else {
            self.for_sale_value / Decimal::from(self.for_sale)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStatistics {
    /// Keyed by model; `None` collects records without one
    pub by_model: BTreeMap<Option<String>, GroupStats>,
    pub overall: GroupStats,
}

/// Per-model and overall inventory counts
pub fn model_statistics(ledger: &WatchLedger) -> ModelStatistics {
    let mut stats = ModelStatistics::default();
    for record in ledger {
        stats
            .by_model
            .entry(record.details.model.clone())
            .or_default()
            .add(record);
        stats.overall.add(record);
    }
    stats
}

/// Mean final price per brand, highest first
pub fn average_final_price_by_brand(ledger: &WatchLedger) -> Vec<(String, Decimal)> {
    let mut sums: BTreeMap<&str, (Decimal, u32)> = BTreeMap::new();
    for record in ledger {
        let (Some(brand), Some(price)) = (record.details.brand.as_deref(), final_price(record)) else {
            continue;
        };
        let entry = sums.entry(brand).or_insert((Decimal::ZERO, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let mut averages: Vec<(String, Decimal)> = sums
        .into_iter()
        .map(|(brand, (sum, count))| (brand.to_string(), sum / Decimal::from(count)))
        .collect();
    averages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    averages
}

/// Days-to-sell for every sold record, shortest first
pub fn time_to_sell_distribution(ledger: &WatchLedger) -> Vec<i64> {
    let mut days: Vec<i64> = ledger.records().filter_map(days_to_sell).collect();
    days.sort_unstable();
    days
}
