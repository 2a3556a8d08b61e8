use crate::models::{Price, PricePoint};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Descriptive fields of a listing. Immutable once a record exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatchDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

/// A freshly normalized listing carrying exactly one observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSeed {
    pub inventory_id: String,
    pub details: WatchDetails,
    pub observation: PricePoint,
}

impl WatchSeed {
    pub fn new(inventory_id: impl Into<String>, details: WatchDetails, observation: PricePoint) -> Self {
        Self {
            inventory_id: inventory_id.into(),
            details,
            observation,
        }
    }

    pub fn price(&self) -> Price {
        self.observation.price
    }
}

/// Watch record model: one tracked item and its append-only price history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    #[serde(rename = "Inventory")]
    pub inventory_id: String,
    #[serde(flatten)]
    pub details: WatchDetails,
    #[serde(rename = "PriceHistory", default)]
    price_history: Vec<PricePoint>,
}

impl WatchRecord {
    /// Create a record on first sighting of its inventory id
    pub fn first_sighting(seed: WatchSeed) -> Self {
        Self {
            inventory_id: seed.inventory_id,
            details: seed.details,
            price_history: vec![seed.observation],
        }
    }

    /// Rebuild a record from stored parts.
    ///
    /// The history is taken as-is; an empty history is representable here so
    /// the reconciliation pass can report it as an integrity violation.
    pub fn from_parts(
        inventory_id: impl Into<String>,
        details: WatchDetails,
        price_history: Vec<PricePoint>,
    ) -> Self {
        Self {
            inventory_id: inventory_id.into(),
            details,
            price_history,
        }
    }

    pub fn price_history(&self) -> &[PricePoint] {
        &self.price_history
    }

    pub fn title(&self) -> Option<&str> {
        self.details.title.as_deref()
    }

    /// Most recent observation
    pub fn latest(&self) -> Option<&PricePoint> {
        self.price_history.last()
    }

    /// Observation immediately before the latest one
    pub fn previous(&self) -> Option<&PricePoint> {
        let len = self.price_history.len();
        if len < 2 {
            return None;
        }
        self.price_history.get(len - 2)
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.price_history.first()
    }

    pub fn latest_price(&self) -> Option<Price> {
        self.latest().map(|p| p.price)
    }

    /// Check if the latest observation is the sold sentinel
    pub fn is_sold(&self) -> bool {
        self.latest_price().map_or(false, |p| p.is_sold())
    }

    /// Append an observation unless it repeats the latest price.
    ///
    /// The timestamp is clamped to the latest observation so the history
    /// stays ordered. Returns whether a point was appended.
    pub(crate) fn append(&mut self, observed_at: NaiveDateTime, price: Price) -> bool {
        let observed_at = match self.latest() {
            Some(last) if last.price == price => return false,
            Some(last) => observed_at.max(last.observed_at),
            None => observed_at,
        };
        self.price_history.push(PricePoint::new(observed_at, price));
        true
    }
}
