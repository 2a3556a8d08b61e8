use crate::error::StoreError;
use crate::models::{Price, PricePoint, WatchDetails, WatchLedger, WatchRecord};
use crate::repositories::HistoryStore;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, FromRow)]
struct WatchRow {
    inventory: String,
    title: Option<String>,
    year: Option<i32>,
    brand: Option<String>,
    model: Option<String>,
    reference: Option<String>,
    serial: Option<String>,
}

#[derive(Debug, FromRow)]
struct PricePointRow {
    inventory: String,
    observed_at: NaiveDateTime,
    price_kind: String,
    amount: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct StoredCount {
    inventory: String,
    points: i64,
}

/// History store over the `watches` / `price_history` tables
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    /// Create a new PgHistoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Price history of one watch, oldest first
    pub async fn find_history(&self, inventory: &str) -> Result<Vec<PricePoint>, StoreError> {
        let rows = sqlx::query_as::<_, PricePointRow>(
            r#"
            SELECT inventory, observed_at, price_kind, amount
            FROM price_history
            WHERE inventory = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(inventory)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(to_point).collect()
    }
}

fn to_point(row: PricePointRow) -> Result<PricePoint, StoreError> {
    let price = Price::from_kind(&row.price_kind, row.amount)
        .map_err(|e| StoreError::Corrupt(format!("{} ({})", e, row.inventory)))?;
    Ok(PricePoint::new(row.observed_at, price))
}

/// Join watch rows with their price rows.
///
/// Price rows for an inventory id with no watch row are an error.
fn assemble(watches: Vec<WatchRow>, points: Vec<PricePointRow>) -> Result<WatchLedger, StoreError> {
    let mut histories: HashMap<String, Vec<PricePoint>> = HashMap::new();
    for row in points {
        let inventory = row.inventory.clone();
        histories.entry(inventory).or_default().push(to_point(row)?);
    }

    let mut records = Vec::with_capacity(watches.len());
    for row in watches {
        let history = histories.remove(&row.inventory).unwrap_or_default();
        let details = WatchDetails {
            title: row.title,
            year: row.year,
            brand: row.brand,
            model: row.model,
            reference: row.reference,
            serial: row.serial,
        };
        records.push(WatchRecord::from_parts(row.inventory, details, history));
    }

    if let Some(orphan) = histories.keys().min() {
        return Err(StoreError::Corrupt(format!(
            "price history for {} has no watch row ({} orphaned ids)",
            orphan,
            histories.len()
        )));
    }

    Ok(WatchLedger::from_records(records))
}

impl HistoryStore for PgHistoryRepository {
    async fn load(&self) -> Result<WatchLedger, StoreError> {
        let watches = sqlx::query_as::<_, WatchRow>(
            r#"
            SELECT inventory, title, year, brand, model, reference, serial
            FROM watches
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let points = sqlx::query_as::<_, PricePointRow>(
            r#"
            SELECT inventory, observed_at, price_kind, amount
            FROM price_history
            ORDER BY inventory, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let ledger = assemble(watches, points)?;
        debug!("Loaded {} watches from database", ledger.len());
        Ok(ledger)
    }

    /// Upsert details and insert only the points not stored yet
    async fn save(&self, ledger: &WatchLedger) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let counts = sqlx::query_as::<_, StoredCount>(
            r#"
            SELECT inventory, COUNT(*) AS points
            FROM price_history
            GROUP BY inventory
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;
        let stored: HashMap<String, usize> = counts
            .into_iter()
            .map(|c| (c.inventory, c.points.max(0) as usize))
            .collect();

        let mut appended = 0usize;
        for record in ledger.records() {
            let details = &record.details;
            sqlx::query(
                r#"
                INSERT INTO watches (inventory, title, year, brand, model, reference, serial)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (inventory) DO UPDATE
                SET title = EXCLUDED.title,
                    year = EXCLUDED.year,
                    brand = EXCLUDED.brand,
                    model = EXCLUDED.model,
                    reference = EXCLUDED.reference,
                    serial = EXCLUDED.serial
                "#,
            )
            .bind(&record.inventory_id)
            .bind(&details.title)
            .bind(details.year)
            .bind(&details.brand)
            .bind(&details.model)
            .bind(&details.reference)
            .bind(&details.serial)
            .execute(&mut *tx)
            .await?;

            let already = stored.get(&record.inventory_id).copied().unwrap_or(0);
            let history = record.price_history();
            if already > history.len() {
                return Err(StoreError::Corrupt(format!(
                    "database holds {} points for {} but the ledger has {}",
                    already,
                    record.inventory_id,
                    history.len()
                )));
            }

            for (seq, point) in history.iter().enumerate().skip(already) {
                sqlx::query(
                    r#"
                    INSERT INTO price_history (inventory, seq, observed_at, price_kind, amount)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(&record.inventory_id)
                .bind(seq as i32)
                .bind(point.observed_at)
                .bind(point.price.kind())
                .bind(point.price.amount())
                .execute(&mut *tx)
                .await?;
                appended += 1;
            }
        }

        tx.commit().await?;
        debug!(
            "Saved {} watches to database ({} new price points)",
            ledger.len(),
            appended
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn watch(inventory: &str) -> WatchRow {
        WatchRow {
            inventory: inventory.to_string(),
            title: Some("Submariner".to_string()),
            year: Some(1968),
            brand: Some("Rolex".to_string()),
            model: None,
            reference: None,
            serial: None,
        }
    }

    fn point(inventory: &str, day: u32, kind: &str, amount: Option<i64>) -> PricePointRow {
        PricePointRow {
            inventory: inventory.to_string(),
            observed_at: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            price_kind: kind.to_string(),
            amount: amount.map(|a| Decimal::new(a, 0)),
        }
    }

    #[test]
    fn test_assemble_joins_rows_in_order() {
        let ledger = assemble(
            vec![watch("/w/1"), watch("/w/2")],
            vec![
                point("/w/1", 1, "amount", Some(1000)),
                point("/w/1", 2, "sold", None),
                point("/w/2", 1, "unknown", None),
            ],
        )
        .unwrap();

        assert_eq!(ledger.len(), 2);
        let prices: Vec<Price> = ledger
            .get("/w/1")
            .unwrap()
            .price_history()
            .iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![Price::Amount(Decimal::new(1000, 0)), Price::Sold]);
        assert_eq!(ledger.get("/w/2").unwrap().latest_price(), Some(Price::Unknown));
    }

    #[test]
    fn test_assemble_rejects_orphaned_points() {
        let result = assemble(
            vec![watch("/w/1")],
            vec![
                point("/w/1", 1, "amount", Some(1000)),
                point("/w/ghost", 1, "amount", Some(500)),
            ],
        );

        match result {
            Err(StoreError::Corrupt(message)) => assert!(message.contains("/w/ghost")),
            other => panic!("expected corrupt store error, got {:?}", other.map(|l| l.len())),
        }
    }

    #[test]
    fn test_assemble_rejects_bad_price_kind() {
        let result = assemble(vec![watch("/w/1")], vec![point("/w/1", 1, "amount", None)]);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
