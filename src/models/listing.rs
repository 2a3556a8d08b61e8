use serde::{Deserialize, Serialize};

/// Field set extracted from one listing, before any normalization.
///
/// Every field is raw text as shown on the site and may be missing or "N/A".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawListing {
    /// Detail page path; the stable inventory id
    #[serde(alias = "Inventory", alias = "inventory_id")]
    pub inventory: Option<String>,
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Year")]
    pub year: Option<String>,
    #[serde(alias = "Brand")]
    pub brand: Option<String>,
    #[serde(alias = "Model")]
    pub model: Option<String>,
    #[serde(alias = "Reference")]
    pub reference: Option<String>,
    #[serde(alias = "Serial")]
    pub serial: Option<String>,
    #[serde(alias = "Price")]
    pub price: Option<String>,
}
