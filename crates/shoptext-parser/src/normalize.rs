//! Canonicalization of extractor output.
//!
//! Extractors hand over shape-heterogeneous graphs: a bare array of shops,
//! an object with a `shops` key, a single shop object, or shops nested
//! inside a `shops`-keyed wrapper one level down. The shape is resolved
//! once, here, and every record then flows through the same validation and
//! id-assignment path regardless of which dialect produced it.

use std::collections::HashSet;

use serde_json::Value;

use shoptext_core::{
    flatten_packages, package_hash_id, schema, shop_hash_id, Package, SchemaError, Shop, ShopData,
    DEFAULT_SHOP_PREFIX, DEFAULT_SLOGAN, DEFAULT_THEME, UNNAMED_SHOP,
};

use crate::types::{RawPackage, RawShop};

/// Resolves the top-level shape of a parsed graph into raw shop records.
/// Non-object entries and entries whose deserialization fails are skipped
/// with a log line; they never abort the batch.
#[must_use]
pub fn shops_from_value(value: &Value) -> Vec<RawShop> {
    let mut candidates: Vec<&Value> = Vec::new();
    match value {
        Value::Array(items) => candidates.extend(items.iter()),
        Value::Object(map) => match map.get("shops") {
            Some(Value::Array(items)) => candidates.extend(items.iter()),
            Some(single @ Value::Object(_)) => candidates.push(single),
            _ => candidates.push(value),
        },
        _ => {}
    }

    let mut raw_shops = Vec::new();
    for candidate in candidates {
        // A wrapper that itself carries a `shops` array is flattened one
        // level; deeper nesting is not a shape the sources produce.
        if let Value::Object(map) = candidate {
            if let Some(Value::Array(nested)) = map.get("shops") {
                for inner in nested {
                    push_raw_shop(&mut raw_shops, inner);
                }
                continue;
            }
        }
        push_raw_shop(&mut raw_shops, candidate);
    }
    raw_shops
}

fn push_raw_shop(out: &mut Vec<RawShop>, value: &Value) {
    if !value.is_object() {
        tracing::debug!(found = value_kind(value), "skipping non-object shop entry");
        return;
    }
    match serde_json::from_value::<RawShop>(value.clone()) {
        Ok(shop) => out.push(shop),
        Err(error) => {
            tracing::warn!(%error, "skipping malformed shop entry");
        }
    }
}

/// Converts raw shops into the canonical result set: per-shop sanitation,
/// per-package validation, deduplication, and the flattened package union.
#[must_use]
pub fn finalize(raw_shops: Vec<RawShop>) -> ShopData {
    let mut shops: Vec<Shop> = Vec::new();
    let mut seen_shop_keys: HashSet<String> = HashSet::new();

    for raw in raw_shops {
        let shop = sanitize_shop(&raw);
        let key = shop_dedupe_key(&raw, &shop);
        if seen_shop_keys.insert(key) {
            shops.push(shop);
        }
    }

    let mut seen_pkg_ids: HashSet<String> = HashSet::new();
    let packages = flatten_packages(&shops)
        .into_iter()
        .filter(|pkg| seen_pkg_ids.insert(pkg.id.clone()))
        .collect();

    let data = ShopData { shops, packages };
    tracing::debug!(
        shops = data.shops.len(),
        packages = data.packages.len(),
        "normalized result set"
    );
    data
}

/// Dedup key: the source-provided `shop_id` first, then name, then the
/// derived id. Parser-minted ids live in the `id` field and deliberately
/// do not count: two same-named shops from a tag dialect are duplicates
/// even though each got its own synthetic id.
fn shop_dedupe_key(raw: &RawShop, shop: &Shop) -> String {
    if let Some(explicit) = raw.shop_id.as_deref() {
        return format!("id:{explicit}");
    }
    if !shop.name.is_empty() {
        return format!("name:{}", shop.name);
    }
    format!("auto:{}", shop.id)
}

fn sanitize_shop(raw: &RawShop) -> Shop {
    let first_package_name = raw
        .packages
        .first()
        .and_then(|pkg| pkg.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| match first_package_name {
            Some(pkg_name) => format!("{DEFAULT_SHOP_PREFIX}{pkg_name}"),
            None => UNNAMED_SHOP.to_string(),
        });

    let id = derive_shop_id(raw);

    let tags = raw.tags.clone();
    let slogan = raw
        .slogan
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            if tags.is_empty() {
                DEFAULT_SLOGAN.to_string()
            } else {
                tags.join(" / ")
            }
        });
    let theme = raw
        .theme
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            tags.first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_THEME.to_string())
        });

    let packages = raw
        .packages
        .iter()
        .filter_map(|value| match package_from_value(value, &id, &name) {
            Ok(pkg) => Some(pkg),
            Err(error) => {
                tracing::warn!(shop = %name, %error, "dropping invalid package");
                None
            }
        })
        .collect();

    Shop {
        id,
        name,
        address: raw.address.clone(),
        city: raw.city.clone(),
        tags,
        slogan,
        theme,
        packages,
    }
}

/// Deterministic shop id: explicit source id wins, then the field-basis
/// hash, then a hash of the whole serialized record so even anonymous
/// shops get stable ids.
fn derive_shop_id(raw: &RawShop) -> String {
    if let Some(explicit) = raw.id.as_deref().or(raw.shop_id.as_deref()) {
        return explicit.to_string();
    }
    let fallback_json = serde_json::to_string(raw).unwrap_or_default();
    shop_hash_id(
        raw.name.as_deref(),
        raw.address.as_deref(),
        raw.city.as_deref(),
        &fallback_json,
    )
}

/// Validates one raw package value against the schema.
///
/// # Errors
///
/// Returns [`SchemaError`] when the value is not an object, fails tolerant
/// deserialization, or lacks a usable name. The caller drops the package
/// and keeps the batch.
pub fn package_from_value(
    value: &Value,
    shop_id: &str,
    shop_name: &str,
) -> Result<Package, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::NotAnObject {
            found: value_kind(value),
        });
    }
    let raw: RawPackage =
        serde_json::from_value(value.clone()).map_err(|e| SchemaError::Malformed {
            reason: e.to_string(),
        })?;
    sanitize_package(raw, shop_id, shop_name)
}

pub(crate) fn sanitize_package(
    raw: RawPackage,
    shop_id: &str,
    shop_name: &str,
) -> Result<Package, SchemaError> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| SchemaError::MissingPackageName {
            shop_id: shop_id.to_string(),
        })?;

    let price = raw.price.unwrap_or_default();
    let id = raw
        .id
        .clone()
        .unwrap_or_else(|| package_hash_id(shop_id, &name, &price.id_basis()));

    Ok(Package {
        id,
        shop_id: shop_id.to_string(),
        shop_name: shop_name.to_string(),
        name,
        price,
        stars: schema::clamp_stars(raw.stars.unwrap_or(0.0)),
        tags: raw.tags,
        icon: raw.icon,
        image1: raw.image1.unwrap_or_default(),
        image2: raw.image2.unwrap_or_default(),
        image3: raw.image3.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        content: raw.content,
        reviews: raw.reviews,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convenience used by several extractors: resolve a parsed graph straight
/// into raw shops, returning `None` when nothing shop-like was found.
#[must_use]
pub fn non_empty_shops_from_value(value: &Value) -> Option<Vec<RawShop>> {
    let shops = shops_from_value(value);
    if shops.is_empty() {
        None
    } else {
        Some(shops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shoptext_core::Price;

    fn finalize_value(value: Value) -> ShopData {
        finalize(shops_from_value(&value))
    }

    #[test]
    fn object_with_shops_key() {
        let data = finalize_value(json!({
            "shops": [{"name": "A", "packages": [{"name": "P1", "price": 50}]}]
        }));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.shops[0].name, "A");
        assert_eq!(data.packages.len(), 1);
        assert_eq!(data.packages[0].name, "P1");
        assert_eq!(data.packages[0].price, Price::Amount(50.0));
    }

    #[test]
    fn bare_array_of_shops() {
        let data = finalize_value(json!([{"name": "A"}, {"name": "B"}]));
        assert_eq!(data.shops.len(), 2);
    }

    #[test]
    fn single_shop_object() {
        let data = finalize_value(json!({"name": "Solo", "packages": []}));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.shops[0].name, "Solo");
    }

    #[test]
    fn shops_object_rather_than_array() {
        let data = finalize_value(json!({"shops": {"name": "Wrapped"}}));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.shops[0].name, "Wrapped");
    }

    #[test]
    fn nested_shops_flattened_one_level() {
        let data = finalize_value(json!({
            "shops": [{"shops": [{"name": "Inner1"}, {"name": "Inner2"}]}]
        }));
        assert_eq!(data.shops.len(), 2);
        assert_eq!(data.shops[0].name, "Inner1");
    }

    #[test]
    fn non_object_entries_skipped() {
        let data = finalize_value(json!(["noise", 42, {"name": "Real"}]));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.shops[0].name, "Real");
    }

    #[test]
    fn bad_package_does_not_sink_shop() {
        let data = finalize_value(json!({
            "shops": [{
                "name": "A",
                "packages": [
                    {"name": "Good", "price": 10},
                    {"price": 99},
                    {"name": "AlsoGood", "tags": [1, 2]},
                    "not even an object"
                ]
            }]
        }));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.packages.len(), 1);
        assert_eq!(data.packages[0].name, "Good");
    }

    #[test]
    fn stars_clamped_to_schema_bounds() {
        let data = finalize_value(json!({
            "shops": [{"name": "A", "packages": [{"name": "P", "stars": 7}]}]
        }));
        assert_eq!(data.packages[0].stars, 5.0);
    }

    #[test]
    fn missing_name_defaults_to_sentinel() {
        let data = finalize_value(json!({"shops": [{"address": "1 Main St"}]}));
        assert_eq!(data.shops[0].name, UNNAMED_SHOP);
    }

    #[test]
    fn missing_name_borrows_first_package_name() {
        let data = finalize_value(json!({
            "shops": [{"packages": [{"name": "Combo"}]}]
        }));
        assert_eq!(data.shops[0].name, "Default Shop · Combo");
    }

    #[test]
    fn slogan_and_theme_derived_from_tags() {
        let data = finalize_value(json!({
            "shops": [{"name": "A", "shoptags": ["cozy", "night"]}]
        }));
        assert_eq!(data.shops[0].slogan, "cozy / night");
        assert_eq!(data.shops[0].theme, "cozy");
    }

    #[test]
    fn slogan_and_theme_default_without_tags() {
        let data = finalize_value(json!({"shops": [{"name": "A"}]}));
        assert_eq!(data.shops[0].slogan, DEFAULT_SLOGAN);
        assert_eq!(data.shops[0].theme, DEFAULT_THEME);
    }

    #[test]
    fn explicit_id_wins_over_hash() {
        let data = finalize_value(json!({"shops": [{"id": "custom_7", "name": "A"}]}));
        assert_eq!(data.shops[0].id, "custom_7");
    }

    #[test]
    fn derived_ids_are_deterministic() {
        let value = json!({"shops": [{"name": "A", "packages": [{"name": "P", "price": 5}]}]});
        let first = finalize_value(value.clone());
        let second = finalize_value(value);
        assert_eq!(first.shops[0].id, second.shops[0].id);
        assert_eq!(first.packages[0].id, second.packages[0].id);
    }

    #[test]
    fn duplicate_shops_dedupe_by_explicit_id_first_seen_wins() {
        let data = finalize_value(json!({
            "shops": [
                {"shop_id": "s1", "name": "First"},
                {"shop_id": "s1", "name": "Second"}
            ]
        }));
        assert_eq!(data.shops.len(), 1);
        assert_eq!(data.shops[0].name, "First");
    }

    #[test]
    fn duplicate_shops_dedupe_by_name() {
        let data = finalize_value(json!([{"name": "Same"}, {"name": "Same"}]));
        assert_eq!(data.shops.len(), 1);
    }

    #[test]
    fn packages_restamped_with_owner_and_deduped() {
        let data = finalize_value(json!({
            "shops": [{
                "name": "A",
                "packages": [
                    {"id": "p1", "name": "X"},
                    {"id": "p1", "name": "X duplicate"}
                ]
            }]
        }));
        assert_eq!(data.packages.len(), 1);
        assert_eq!(data.packages[0].shop_name, "A");
        assert_eq!(data.packages[0].shop_id, data.shops[0].id);
    }

    #[test]
    fn numeric_ids_coerced_to_strings() {
        let data = finalize_value(json!({
            "shops": [{"shop_id": 3, "name": "A", "packages": [{"id": 9, "name": "P"}]}]
        }));
        assert_eq!(data.shops[0].id, "3");
        assert_eq!(data.packages[0].id, "9");
    }
}
