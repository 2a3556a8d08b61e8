//! Merges a fresh snapshot into stored price history.
//!
//! The pass is pure: no I/O, no clock reads. History is only ever appended
//! to, and a point is appended only when the price differs from the latest
//! stored one, so running the same batch twice changes nothing.

use crate::error::DataIntegrityError;
use crate::models::{
    ChangeReport, NewAddition, Price, PriceChange, SaleEvent, WatchLedger, WatchRecord, WatchSeed,
};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// What a single fresh observation means for a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Sold { last_ask: Price },
    Repriced { from: Price, to: Price },
}

/// Classify moving from `last` to `next`
pub fn classify(last: Price, next: Price) -> Transition {
    if last == next {
        Transition::Unchanged
    } else if next.is_sold() {
        Transition::Sold { last_ask: last }
    } else {
        Transition::Repriced { from: last, to: next }
    }
}

/// Reconcile `batch` into `ledger`, appending points stamped `observed_at`.
///
/// New inventory ids are inserted with their single observation. Stored
/// records absent from the batch are left alone. If any stored record the
/// batch touches has an empty history the ledger is not modified at all.
pub fn reconcile(
    ledger: &mut WatchLedger,
    batch: Vec<WatchSeed>,
    observed_at: NaiveDateTime,
) -> Result<ChangeReport, DataIntegrityError> {
    check_integrity(ledger, &batch)?;

    let mut report = ChangeReport::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(batch.len());

    for seed in batch {
        if !seen.insert(seed.inventory_id.clone()) {
            warn!(
                "Inventory {} appears more than once in the batch, skipping repeat",
                seed.inventory_id
            );
            report.duplicates += 1;
            continue;
        }

        match ledger.get_mut(&seed.inventory_id) {
            Some(existing) => apply_observation(existing, &seed, observed_at, &mut report)?,
            None => {
                debug!("New watch {} at {}", seed.inventory_id, seed.price());
                report.additions.push(NewAddition {
                    inventory_id: seed.inventory_id.clone(),
                    title: seed.details.title.clone(),
                    price: seed.price(),
                });
                ledger.insert(WatchRecord::first_sighting(seed));
            }
        }
    }

    info!(
        "Reconciled batch: {} new, {} price changes, {} sold, {} unchanged",
        report.additions.len(),
        report.price_changes.len(),
        report.sold.len(),
        report.unchanged
    );

    Ok(report)
}

fn apply_observation(
    existing: &mut WatchRecord,
    seed: &WatchSeed,
    observed_at: NaiveDateTime,
    report: &mut ChangeReport,
) -> Result<(), DataIntegrityError> {
    let last = existing
        .latest_price()
        .ok_or_else(|| DataIntegrityError {
            inventory_id: existing.inventory_id.clone(),
        })?;
    let next = seed.price();

    let transition = classify(last, next);
    if transition == Transition::Unchanged {
        report.unchanged += 1;
        return Ok(());
    }

    existing.append(observed_at, next);
    let inventory_id = existing.inventory_id.clone();
    let title = existing.details.title.clone();

    match transition {
        Transition::Sold { last_ask } => {
            debug!("Watch {} sold, last ask {}", inventory_id, last_ask);
            report.sold.push(SaleEvent {
                inventory_id,
                title,
                sold_at_price: last_ask,
            });
        }
        Transition::Repriced { from, to } => {
            debug!("Watch {} price {} -> {}", inventory_id, from, to);
            report.price_changes.push(PriceChange {
                inventory_id,
                title,
                old_price: from,
                new_price: to,
            });
        }
        Transition::Unchanged => {}
    }

    Ok(())
}

/// Every stored record the batch will touch must have a history
fn check_integrity(ledger: &WatchLedger, batch: &[WatchSeed]) -> Result<(), DataIntegrityError> {
    for seed in batch {
        if let Some(existing) = ledger.get(&seed.inventory_id) {
            if existing.price_history().is_empty() {
                return Err(DataIntegrityError {
                    inventory_id: existing.inventory_id.clone(),
                });
            }
        }
    }
    Ok(())
}
