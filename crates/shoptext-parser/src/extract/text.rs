//! Last-resort plain-text dialect. Reuses the tag parser (with an implicit
//! shop/package wrapper when no tags exist), then degrades further: treat
//! the whole text as one loose package, and finally scan only for
//! `content`/`reviews` bullet blocks. Texts with none of that and no
//! explicit tags produce nothing; ordinary narrative must not turn into
//! phantom shops.

use regex::Regex;
use serde_json::Value;

use shoptext_core::{AUTO_PACKAGE, DEFAULT_SHOP};

use crate::extract::fields::PackageCollector;
use crate::extract::tags::{self, SHOP_OPEN};
use crate::preprocess::strip_wrapping_quotes;
use crate::types::{IdFactory, RawPackage, RawShop};

pub(crate) fn attempt(text: &str, ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    let mut auto_names = 1u32;
    let mut shops = tags::parse_tagged(text, ids, &mut auto_names);

    let has_packages = shops.iter().any(|shop| !shop.packages.is_empty());
    if !has_packages {
        let mut fallback = shops.first().cloned().unwrap_or_else(|| RawShop {
            id: Some(ids.next_shop_id()),
            name: Some(DEFAULT_SHOP.to_string()),
            ..RawShop::default()
        });

        if let Some(pkg) = loose_package(text, ids) {
            fallback
                .packages
                .push(serde_json::to_value(pkg).unwrap_or(Value::Null));
            shops = vec![fallback];
        } else if let Some(pkg) = content_bullets_only(text, ids) {
            fallback
                .packages
                .push(serde_json::to_value(pkg).unwrap_or(Value::Null));
            shops = vec![fallback];
        } else if !text.contains(SHOP_OPEN) {
            // No packages, no explicit markers: this is narrative, not data.
            shops.clear();
        }
    }

    if shops.is_empty() {
        None
    } else {
        Some(shops)
    }
}

/// Treats the entire text as one package body.
fn loose_package(text: &str, ids: &mut IdFactory) -> Option<RawPackage> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let package_id = ids.next_package_id();
    let mut collector = PackageCollector::new();
    for line in &lines {
        collector.feed_line(line);
    }
    let mut pkg = collector.finish(|| AUTO_PACKAGE.to_string());
    if pkg.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return None;
    }
    pkg.id = Some(package_id);
    Some(pkg)
}

/// Narrower still: collect only `content`/`reviews` bullet blocks. Plain
/// lines inside a block count too (multi-line items without bullet
/// prefixes); any other `key:` line closes the block.
fn content_bullets_only(text: &str, ids: &mut IdFactory) -> Option<RawPackage> {
    #[derive(Clone, Copy, PartialEq)]
    enum Block {
        None,
        Content,
        Reviews,
    }

    let content_re = Regex::new(r"(?i)^content\b").expect("valid content header regex");
    let reviews_re = Regex::new(r"(?i)^reviews?\b").expect("valid reviews header regex");
    let key_re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*[:：]").expect("valid key line regex");
    let bullet_re = Regex::new(r"^[-*?·－]\s*(.*)$").expect("valid bullet line regex");

    let mut block = Block::None;
    let mut content: Vec<String> = Vec::new();
    let mut reviews: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim) {
        if content_re.is_match(line) {
            block = Block::Content;
            continue;
        }
        if reviews_re.is_match(line) {
            block = Block::Reviews;
            continue;
        }
        if block == Block::None {
            continue;
        }
        if key_re.is_match(line) {
            block = Block::None;
            continue;
        }
        let item = if let Some(caps) = bullet_re.captures(line) {
            strip_wrapping_quotes(caps[1].trim()).trim().to_string()
        } else {
            strip_wrapping_quotes(line).trim().to_string()
        };
        if item.is_empty() {
            continue;
        }
        match block {
            Block::Content => content.push(item),
            Block::Reviews => reviews.push(item),
            Block::None => {}
        }
    }

    if content.is_empty() && reviews.is_empty() {
        return None;
    }

    Some(RawPackage {
        id: Some(ids.next_package_id()),
        name: Some(AUTO_PACKAGE.to_string()),
        content,
        reviews,
        ..RawPackage::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoptext_core::UNNAMED_SHOP;

    fn run(text: &str) -> Option<Vec<RawShop>> {
        let mut ids = IdFactory::default();
        attempt(text, &mut ids)
    }

    fn first_package(shop: &RawShop) -> RawPackage {
        serde_json::from_value(shop.packages[0].clone()).expect("package value deserializes")
    }

    #[test]
    fn keyed_lines_without_tags_become_one_package() {
        let text = "name: Street Combo\nprice: 25\ncontent:\n- grilled skewers\n- cold tea";
        let shops = run(text).expect("loose package applies");
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name.as_deref(), Some(UNNAMED_SHOP));
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some("Street Combo"));
        assert_eq!(pkg.content, vec!["grilled skewers", "cold tea"]);
    }

    #[test]
    fn pure_narrative_yields_nothing() {
        assert!(run("The market was closed. She walked home in the rain.").is_none());
    }

    #[test]
    fn content_header_with_extra_words_recovered_by_bullet_scan() {
        // "content included:" is not a known field key, so the package
        // collector ignores the block; only the bullet-only scan sees it.
        let text = concat!(
            "The stall listed what came with the order.\n",
            "content included:\n",
            "- two skewers\n",
            "- one soup\n",
            "reviews so far:\n",
            "- \"best in the alley\"\n",
        );
        let shops = run(text).expect("bullet fallback applies");
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some(AUTO_PACKAGE));
        assert_eq!(pkg.content, vec!["two skewers", "one soup"]);
        assert_eq!(pkg.reviews, vec!["best in the alley"]);
    }

    #[test]
    fn key_line_closes_bullet_block() {
        let text = "content:\n- item\nprice: 9\n- stray bullet\n";
        let shops = run(text).expect("applies");
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.content, vec!["item"]);
    }

    #[test]
    fn package_less_tagged_shop_absorbs_its_own_header_as_package() {
        // Known quirk of the loose fallback: the whole text, including the
        // shop's own `name:` line, is re-read as a package body, so the
        // synthesized package inherits the shop's name. Kept as-is; in the
        // full chain the tag strategy accepts such text before this one.
        let shops = run("[shop]\nname: Lone Shop\n").expect("shop kept");
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name.as_deref(), Some("Lone Shop"));
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some("Lone Shop"));
    }

    #[test]
    fn plain_bullets_without_headers_yield_nothing() {
        assert!(run("- just a list\n- of things\n").is_none());
    }

    #[test]
    fn whole_text_package_price_parsed() {
        let text = "name: Solo Set\nprice: 42\nstars: 6\n";
        let shops = run(text).expect("applies");
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.price, Some(shoptext_core::Price::Amount(42.0)));
        // Clamping happens at normalization, not collection.
        assert_eq!(pkg.stars, Some(6.0));
    }
}
