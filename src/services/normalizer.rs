//! Turns raw listing text into typed watch seeds.
//!
//! Nothing in here fails on bad text: an unparseable year or price becomes
//! `None` / [`Price::Unknown`]. The only rejected input is a listing with no
//! inventory id, since it cannot be joined against stored history.

use crate::error::NormalizeError;
use crate::models::{Price, PricePoint, RawListing, WatchDetails, WatchSeed};
use chrono::NaiveDateTime;

/// Placeholder the site uses for an empty detail cell
const NOT_AVAILABLE: &str = "N/A";

/// Normalize one raw listing observed at `observed_at`
pub fn normalize(raw: &RawListing, observed_at: NaiveDateTime) -> Result<WatchSeed, NormalizeError> {
    let inventory_id = present(raw.inventory.as_deref())
        .ok_or(NormalizeError::MissingInventoryId)?
        .to_string();

    let details = WatchDetails {
        title: present(raw.title.as_deref()).map(title_case),
        year: raw.year.as_deref().and_then(parse_year),
        brand: present(raw.brand.as_deref()).map(capitalize),
        model: present(raw.model.as_deref()).map(capitalize),
        reference: present(raw.reference.as_deref()).map(str::to_string),
        serial: present(raw.serial.as_deref()).map(str::to_string),
    };

    let price = parse_price(raw.price.as_deref().unwrap_or(NOT_AVAILABLE));

    Ok(WatchSeed::new(
        inventory_id,
        details,
        PricePoint::new(observed_at, price),
    ))
}

/// Trimmed text, or `None` when missing, blank or "N/A"
fn present(raw: Option<&str>) -> Option<&str> {
    let text = raw?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(text)
    }
}

/// Year only when the text is all digits
pub fn parse_year(raw: &str) -> Option<i32> {
    let text = raw.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Price from display text such as "$12,500" or "Sold"
pub fn parse_price(raw: &str) -> Price {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    Price::from_clean_text(&cleaned)
}

/// Upper-case the first character, leave the rest as written
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title case: each run of letters starts upper-case, the rest is lower-case
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
