//! Change events produced by a reconciliation pass.

use crate::models::Price;
use serde::{Deserialize, Serialize};

/// An inventory id seen for the first time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddition {
    pub inventory_id: String,
    pub title: Option<String>,
    pub price: Price,
}

/// The asking price moved (including to or from unknown)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub inventory_id: String,
    pub title: Option<String>,
    pub old_price: Price,
    pub new_price: Price,
}

/// An item flipped to the sold sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub inventory_id: String,
    pub title: Option<String>,
    /// Last known ask before the sale
    pub sold_at_price: Price,
}

/// Everything a single reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub additions: Vec<NewAddition>,
    pub price_changes: Vec<PriceChange>,
    pub sold: Vec<SaleEvent>,
    /// Known records whose price matched the stored one
    pub unchanged: usize,
    /// Later occurrences of an inventory id already seen in the same batch
    pub duplicates: usize,
}

impl ChangeReport {
    /// Check whether the pass appended anything
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.price_changes.is_empty() && self.sold.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.additions.len() + self.price_changes.len() + self.sold.len()
    }
}
