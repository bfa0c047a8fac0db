//! Tolerant intermediate types between the extractors and the normalizer.
//!
//! Every extractor, whatever its dialect, produces [`RawShop`] values; the
//! normalizer in [`crate::normalize`] owns the conversion to the canonical
//! [`shoptext_core::Shop`] records. Fields here are permissive on purpose:
//! ids accept strings or numbers, `tags` accepts the legacy `shoptags`
//! spelling, and packages stay as uninterpreted JSON so one malformed
//! package cannot sink its whole shop during deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use shoptext_core::Price;

/// A shop as an extractor saw it, before validation or id assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawShop {
    #[serde(default, deserialize_with = "de_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_id")]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "shoptags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub slogan: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    /// Kept as raw JSON; validated per-package by the normalizer.
    #[serde(default)]
    pub packages: Vec<Value>,
}

/// A package as an extractor saw it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPackage {
    #[serde(default, deserialize_with = "de_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_id")]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub stars: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image1: Option<String>,
    #[serde(default)]
    pub image2: Option<String>,
    #[serde(default)]
    pub image3: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

/// Accepts a string or numeric id; anything else is treated as absent
/// rather than failing the whole record.
fn de_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Fallback counter for synthetic ids, threaded explicitly through one
/// parse call. Never a process-wide singleton: two parses of the same text
/// must mint the same ids.
#[derive(Debug, Default)]
pub struct IdFactory {
    shops: u32,
    packages: u32,
}

impl IdFactory {
    pub fn next_shop_id(&mut self) -> String {
        let id = format!("shop_auto_{}", self.shops);
        self.shops += 1;
        id
    }

    pub fn next_package_id(&mut self) -> String {
        let id = format!("pkg_auto_{}", self.packages);
        self.packages += 1;
        id
    }
}
