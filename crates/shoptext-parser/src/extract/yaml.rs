//! YAML dialect. Two modes:
//!
//! - `[shop]`-delimited sections parsed independently, so one malformed
//!   section cannot abort the whole batch; a section that YAML rejects
//!   falls back to a flat regex extractor for `key: value` fields and
//!   `- name:`-delimited package lists.
//! - No tags: a single whole-text YAML parse.

use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;
use crate::extract::tags::{self, PACKAGE_OPEN, SHOP_CLOSE, SHOP_OPEN};
use crate::normalize;
use crate::preprocess::strip_wrapping_quotes;
use crate::types::{IdFactory, RawPackage, RawShop};

/// Textual features that make the YAML strategy worth attempting.
pub(crate) fn has_yaml_features(text: &str) -> bool {
    text.contains("shops:") || text.contains("- name:")
}

pub(crate) fn attempt(text: &str, ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    if !(has_yaml_features(text) || text.contains(SHOP_OPEN)) {
        return None;
    }

    if text.contains(SHOP_OPEN) {
        let mut combined: Vec<RawShop> = Vec::new();
        let mut auto_names = 1u32;
        for section in text.split(SHOP_OPEN).skip(1) {
            let clean = section.split(SHOP_CLOSE).next().unwrap_or(section).trim();
            if clean.is_empty() {
                continue;
            }

            // A section with [package] delimiters is the tag dialect, not
            // YAML; route it through the tag parser so its tags do not
            // break the YAML reader.
            if clean.contains(PACKAGE_OPEN) {
                let wrapped = format!("{SHOP_OPEN}\n{clean}\n{SHOP_CLOSE}");
                let via_tags = tags::parse_tagged(&wrapped, ids, &mut auto_names);
                if !via_tags.is_empty() {
                    combined.extend(via_tags);
                    continue;
                }
            }

            match parse_yaml_value(clean) {
                Ok(value) => {
                    if looks_like_shop(&value) {
                        combined.extend(normalize::shops_from_value(&value));
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "YAML section failed; trying regex fallback");
                    if let Some(shop) = parse_shop_by_regex(clean) {
                        combined.push(shop);
                    }
                }
            }
        }
        if !combined.is_empty() {
            return Some(combined);
        }
    }

    let value = match parse_yaml_value(text) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(%error, "whole-text YAML parse failed");
            return None;
        }
    };
    normalize::non_empty_shops_from_value(&value)
}

/// Parses YAML into `serde_json::Value` so the normalizer sees one graph
/// type regardless of dialect.
fn parse_yaml_value(text: &str) -> Result<Value, ParseError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(serde_json::to_value(yaml)?)
}

/// Minimal validity check on a parsed section: a shop carries at least a
/// name, a package list, or an explicit id.
fn looks_like_shop(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        map.contains_key("name") || map.contains_key("packages") || map.contains_key("shop_id")
    })
}

/// Regex fallback for YAML-ish sections with format blemishes: flat
/// `key: value` lines plus a `packages:` list split on `- name:`.
fn parse_shop_by_regex(section: &str) -> Option<RawShop> {
    let mut shop = RawShop::default();

    let id_re = Regex::new(r"(?m)^\s*shop_id:\s*(.+)$").expect("valid shop_id regex");
    if let Some(caps) = id_re.captures(section) {
        shop.shop_id = Some(caps[1].trim().to_string());
    }

    // The first `name:` in the section is the shop's; package names sit
    // below `packages:` and are consumed by the splitter instead.
    let name_re = Regex::new(r"(?m)^\s*name:\s*(.+)$").expect("valid name regex");
    if let Some(caps) = name_re.captures(section) {
        shop.name = Some(strip_wrapping_quotes(caps[1].trim()).to_string());
    }

    if shop.shop_id.is_none() && shop.name.is_none() {
        return None;
    }

    if let Some(start) = section.find("packages:") {
        let packages_text = &section[start..];
        let splitter = Regex::new(r"(?m)^\s*-\s*name:").expect("valid package split regex");
        let mut bodies = splitter.split(packages_text);
        bodies.next(); // prefix before the first package
        for body in bodies {
            shop.packages
                .push(serde_json::to_value(parse_package_by_regex(body)).unwrap_or(Value::Null));
        }
    }

    Some(shop)
}

fn parse_package_by_regex(body: &str) -> RawPackage {
    // The splitter consumed the `- name:` prefix; the first line is the name.
    let (first_line, _) = body.split_once('\n').unwrap_or((body, ""));
    let mut pkg = RawPackage {
        name: Some(strip_wrapping_quotes(first_line.trim()).to_string()),
        ..RawPackage::default()
    };

    let field = |key: &str| -> Option<String> {
        let re = Regex::new(&format!(r"(?m)^\s*{key}:\s*(.+)$")).expect("valid field regex");
        re.captures(body)
            .map(|caps| strip_wrapping_quotes(caps[1].trim()).to_string())
    };

    if let Some(price) = field("price") {
        pkg.price = Some(match price.parse::<f64>() {
            Ok(amount) => shoptext_core::Price::Amount(amount),
            Err(_) => shoptext_core::Price::Text(price),
        });
    }
    pkg.stars = Some(field("stars").and_then(|s| s.parse().ok()).unwrap_or(0.0));
    pkg.icon = field("icon");
    pkg.description = field("description");
    pkg.image1 = field("image1");
    pkg.image2 = field("image2");
    pkg.image3 = field("image3");

    pkg.tags = list_field(body, "tags");
    pkg.content = list_field(body, "content");
    pkg.reviews = list_field(body, "reviews");
    pkg
}

/// Collects `- item` lines directly following `key:` until the first
/// non-list line.
fn list_field(body: &str, key: &str) -> Vec<String> {
    let Some(start) = body.find(&format!("{key}:")) else {
        return Vec::new();
    };
    let mut items = Vec::new();
    for line in body[start..].lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('-') {
            items.push(strip_wrapping_quotes(rest.trim()).to_string());
        } else {
            break;
        }
    }
    items
}
