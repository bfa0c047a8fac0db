//! Canonical shop/package records produced by the extraction pipeline.
//!
//! ## Sentinel names
//!
//! The pipeline never rejects a record for a missing name outright; instead
//! it substitutes one of the sentinel names below and lets the ghost filter
//! decide later whether the record was real data or misparsed prose. The
//! exact strings matter: the meaningfulness check and the ghost filter
//! compare against them literally.

use serde::{Deserialize, Serialize};

/// Name given to a shop that arrived without one.
pub const UNNAMED_SHOP: &str = "Unnamed Shop";
/// Name given to the synthetic shop that carries tag-less fallback packages.
pub const DEFAULT_SHOP: &str = "Default Shop";
/// Prefix for a default shop named after its first package.
pub const DEFAULT_SHOP_PREFIX: &str = "Default Shop · ";
/// Base name for packages that arrived without one.
pub const AUTO_PACKAGE: &str = "Package";
/// Price sentinel for packages whose price could not be interpreted.
pub const PRICE_UNPARSED: &str = "N/A";
/// Slogan used when a shop has neither an explicit slogan nor tags.
pub const DEFAULT_SLOGAN: &str = "Quality service";
/// Theme used when a shop has neither an explicit theme nor tags.
pub const DEFAULT_THEME: &str = "Default";

/// A parsed commercial entity with a name and zero or more packages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    /// Stable identifier: explicit source id, or a deterministic hash
    /// (see [`crate::ids`]). Never random.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Display strapline; derived from `tags` when not explicit.
    pub slogan: String,
    /// Display theme; derived from the first tag when not explicit.
    pub theme: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Shop {
    /// Returns `true` when the shop carries one of the sentinel names
    /// substituted for missing data.
    #[must_use]
    pub fn has_sentinel_name(&self) -> bool {
        self.name == UNNAMED_SHOP
            || self.name == DEFAULT_SHOP
            || self.name.starts_with(DEFAULT_SHOP_PREFIX)
    }

    /// A ghost shop has no real name and only auto-named packages, the
    /// typical residue of keyword hits inside ordinary narrative text.
    /// A sentinel-named shop with no packages at all also counts.
    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.has_sentinel_name() && self.packages.iter().all(Package::has_auto_name)
    }

    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

/// An offering/product line belonging to one shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Deterministic: explicit source id, else a hash of
    /// `shop_id|name|price`.
    pub id: String,
    /// Back-reference to the owning shop; always resolvable within the
    /// same result set after normalization.
    pub shop_id: String,
    pub shop_name: String,
    pub name: String,
    #[serde(default)]
    pub price: Price,
    /// Rating, clamped to [`STARS_MIN`](crate::schema::STARS_MIN)..=[`STARS_MAX`](crate::schema::STARS_MAX).
    #[serde(default)]
    pub stars: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image1: String,
    #[serde(default)]
    pub image2: String,
    #[serde(default)]
    pub image3: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

impl Package {
    /// Returns `true` when the name looks auto-generated (`"Package"` or
    /// `"Package <n>"`), i.e. assigned by the parser rather than the source.
    #[must_use]
    pub fn has_auto_name(&self) -> bool {
        is_auto_package_name(&self.name)
    }
}

/// Auto-generated names are the bare base or the base followed by a counter.
/// `"Package Deluxe"` is a real name and must not match.
#[must_use]
pub fn is_auto_package_name(name: &str) -> bool {
    if name == AUTO_PACKAGE {
        return true;
    }
    name.strip_prefix(AUTO_PACKAGE)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// A package price: either a parsed amount or the literal text the source
/// supplied (most commonly the [`PRICE_UNPARSED`] sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(PRICE_UNPARSED.to_string())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Amount(v) => write!(f, "{v}"),
            Price::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Price {
    /// String basis used for deterministic package-id hashing. Mirrors the
    /// dedup key convention: a zero amount and an empty text both hash as
    /// the empty string.
    #[must_use]
    pub fn id_basis(&self) -> String {
        match self {
            Price::Amount(v) if *v == 0.0 => String::new(),
            Price::Amount(v) => format!("{v}"),
            Price::Text(s) => s.clone(),
        }
    }
}

/// Final pipeline output: shops plus the flattened union of their packages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopData {
    pub shops: Vec<Shop>,
    pub packages: Vec<Package>,
}

impl ShopData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shops.is_empty() && self.packages.is_empty()
    }
}

/// Flattens every shop's packages into one list, re-stamping the owning
/// shop's id and name on each package.
#[must_use]
pub fn flatten_packages(shops: &[Shop]) -> Vec<Package> {
    shops
        .iter()
        .flat_map(|shop| {
            shop.packages.iter().map(|pkg| {
                let mut pkg = pkg.clone();
                pkg.shop_id = shop.id.clone();
                pkg.shop_name = shop.name.clone();
                pkg
            })
        })
        .collect()
}
