use crate::models::WatchRecord;
use std::collections::btree_map::{self, BTreeMap};
use tracing::warn;

/// Keyed collection of every tracked watch, keyed by inventory id.
///
/// Records can be added and their histories extended, but nothing is ever
/// removed: disappearing from the live site is not a deletion signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchLedger {
    records: BTreeMap<String, WatchRecord>,
}

impl WatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from stored records. A later record with the same
    /// inventory id replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = WatchRecord>) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            let key = record.inventory_id.clone();
            if map.insert(key, record).is_some() {
                warn!("Duplicate stored record, keeping the last one");
            }
        }
        Self { records: map }
    }

    pub fn get(&self, inventory_id: &str) -> Option<&WatchRecord> {
        self.records.get(inventory_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in inventory id order
    pub fn records(&self) -> btree_map::Values<'_, String, WatchRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<WatchRecord> {
        self.records.into_values().collect()
    }

    pub(crate) fn get_mut(&mut self, inventory_id: &str) -> Option<&mut WatchRecord> {
        self.records.get_mut(inventory_id)
    }

    pub(crate) fn insert(&mut self, record: WatchRecord) {
        self.records.insert(record.inventory_id.clone(), record);
    }
}

impl<'a> IntoIterator for &'a WatchLedger {
    type Item = &'a WatchRecord;
    type IntoIter = btree_map::Values<'a, String, WatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
