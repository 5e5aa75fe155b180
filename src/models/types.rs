//! Type definitions for Shelf-Eye
//! Core data structures shared by the store, the orchestrator and the API

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::models::errors::AppResult;

/// Textual layout of the reference shelf, as described by the model.
///
/// Derived data: written by the layout extractor and overwritten wholesale
/// on every re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLayout {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub extracted_layout: String,
}

impl ReferenceLayout {
    pub fn new(extracted_layout: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            extracted_layout: extracted_layout.into(),
        }
    }
}

/// Accepts RFC 3339 as well as offset-less ISO-8601 (read as UTC), so layout
/// files written by older deployments keep loading.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Coarse two-valued verdict derived from the model's report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Perfect,
    Issues,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Perfect => "perfect",
            ComplianceStatus::Issues => "issues",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ComplianceStatus::Perfect => "✅",
            ComplianceStatus::Issues => "⚠️",
        }
    }
}

/// Outcome of one audit request. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    pub analysis: String,
    pub compliance_status: ComplianceStatus,
    pub has_reference: bool,
}

/// Size label -> price
pub type SizePrices = BTreeMap<String, f64>;

/// Read-only price list published alongside the reference shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardPrices {
    pub standard_prices: BTreeMap<String, SizePrices>,
    pub currency: String,
}

impl Default for StandardPrices {
    fn default() -> Self {
        let table: [(&str, [f64; 3]); 5] = [
            ("Coca-Cola", [2.99, 3.99, 4.99]),
            ("Pepsi", [2.99, 3.99, 4.99]),
            ("Sprite", [2.79, 3.79, 4.79]),
            ("Mountain Dew", [2.99, 3.99, 4.99]),
            ("Fanta", [2.79, 3.79, 4.79]),
        ];

        let standard_prices = table
            .into_iter()
            .map(|(name, prices)| {
                let sizes = ["500ml", "1L", "1.5L"]
                    .into_iter()
                    .zip(prices)
                    .map(|(size, price)| (size.to_string(), price))
                    .collect();
                (name.to_string(), sizes)
            })
            .collect();

        Self {
            standard_prices,
            currency: "USD".to_string(),
        }
    }
}

impl StandardPrices {
    /// Load the price list from `path`, falling back to the built-in table
    /// when the file does not exist.
    pub fn load(path: &Path) -> AppResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let prices: Self = serde_json::from_str(&raw)?;
                info!(
                    "💲 Loaded {} standard prices from {}",
                    prices.standard_prices.len(),
                    path.display()
                );
                Ok(prices)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`StandardPrices::load`], but a broken file is logged and replaced
    /// by the default table.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("⚠️ Ignoring standard prices at {}: {}", path.display(), e.detail());
            Self::default()
        })
    }

    pub fn price_of(&self, product: &str, size: &str) -> Option<f64> {
        self.standard_prices.get(product)?.get(size).copied()
    }
}
