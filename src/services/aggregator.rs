//! Daily statistics recomputed from stored history.

use crate::error::DataIntegrityError;
use crate::models::{DailyStats, NewAddition, PriceChange, SaleEvent, WatchLedger};
use crate::services::reconciler::{classify, Transition};
use chrono::NaiveDate;
use tracing::debug;

/// Summarize the activity recorded on `as_of`.
///
/// Records whose latest observation falls on that day are classified the same
/// way a reconciliation pass would have classified them. For-sale totals cover
/// every record whose latest price is not sold, whatever its date. Reads only,
/// so repeated calls on the same ledger give the same result.
pub fn summarize(ledger: &WatchLedger, as_of: NaiveDate) -> Result<DailyStats, DataIntegrityError> {
    let mut stats = DailyStats::empty(as_of);

    for record in ledger {
        let latest = record.latest().ok_or_else(|| DataIntegrityError {
            inventory_id: record.inventory_id.clone(),
        })?;

        if latest.observed_at.date() == as_of {
            match record.previous() {
                None => {
                    if let Some(amount) = latest.price.amount() {
                        stats.added_count += 1;
                        stats.added_value += amount;
                    }
                    stats.additions.push(NewAddition {
                        inventory_id: record.inventory_id.clone(),
                        title: record.details.title.clone(),
                        price: latest.price,
                    });
                }
                Some(previous) => match classify(previous.price, latest.price) {
                    Transition::Sold { last_ask } => {
                        if let Some(amount) = last_ask.amount() {
                            stats.sold_count += 1;
                            stats.sold_value += amount;
                        }
                        stats.sold.push(SaleEvent {
                            inventory_id: record.inventory_id.clone(),
                            title: record.details.title.clone(),
                            sold_at_price: last_ask,
                        });
                    }
                    Transition::Repriced { from, to } => {
                        stats.price_changes.push(PriceChange {
                            inventory_id: record.inventory_id.clone(),
                            title: record.details.title.clone(),
                            old_price: from,
                            new_price: to,
                        });
                    }
                    // Consecutive equal points are never stored
                    Transition::Unchanged => {}
                },
            }
        }

        if !latest.price.is_sold() {
            stats.for_sale_count += 1;
            if let Some(amount) = latest.price.amount() {
                stats.for_sale_value += amount;
            }
        }
    }

    debug!(
        "Summary for {}: {} added, {} repriced, {} sold, {} for sale",
        as_of,
        stats.additions.len(),
        stats.price_changes.len(),
        stats.sold.len(),
        stats.for_sale_count
    );

    Ok(stats)
}
