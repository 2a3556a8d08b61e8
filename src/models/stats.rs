//! Daily portfolio statistics and their history across days.

use crate::models::{NewAddition, PriceChange, SaleEvent};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one day's activity, recomputed from stored history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub additions: Vec<NewAddition>,
    pub price_changes: Vec<PriceChange>,
    pub sold: Vec<SaleEvent>,
    /// Additions whose first price is numeric
    pub added_count: usize,
    pub added_value: Decimal,
    /// Sales whose prior ask is numeric
    pub sold_count: usize,
    pub sold_value: Decimal,
    /// Every record whose latest price is not sold
    pub for_sale_count: usize,
    /// Sum of numeric latest prices among records for sale
    pub for_sale_value: Decimal,
}

impl DailyStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            additions: Vec::new(),
            price_changes: Vec::new(),
            sold: Vec::new(),
            added_count: 0,
            added_value: Decimal::ZERO,
            sold_count: 0,
            sold_value: Decimal::ZERO,
            for_sale_count: 0,
            for_sale_value: Decimal::ZERO,
        }
    }

    /// Totals only, as kept in the portfolio history
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            for_sale_count: self.for_sale_count,
            sold_count: self.sold_count,
            added_count: self.added_count,
            for_sale_value: self.for_sale_value,
            sold_value: self.sold_value,
            added_value: self.added_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub for_sale_count: usize,
    pub sold_count: usize,
    pub added_count: usize,
    pub for_sale_value: Decimal,
    pub sold_value: Decimal,
    pub added_value: Decimal,
}

/// Portfolio snapshots keyed by day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioHistory {
    entries: BTreeMap<NaiveDate, PortfolioSnapshot>,
}

impl PortfolioHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a day's snapshot, replacing any earlier one for that day
    pub fn record(&mut self, date: NaiveDate, snapshot: PortfolioSnapshot) {
        self.entries.insert(date, snapshot);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&PortfolioSnapshot> {
        self.entries.get(&date)
    }

    pub fn latest(&self) -> Option<(NaiveDate, &PortfolioSnapshot)> {
        self.entries.iter().next_back().map(|(d, s)| (*d, s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total for-sale value per day, oldest first
    pub fn for_sale_series(&self) -> Vec<(NaiveDate, Decimal)> {
        self.entries
            .iter()
            .map(|(date, snapshot)| (*date, snapshot.for_sale_value))
            .collect()
    }
}
