//! Bracket-tag dialect: explicit `[shop]` / `[package]` delimited sections.
//!
//! Shop sections end at `[/shop]` or, when the close tag never arrived
//! (truncated output), at the next `[shop]`. The open-ended form can
//! swallow trailing unrelated prose into the last shop's fields; that is a
//! known limitation of the dialect, kept rather than second-guessed.

use regex::Regex;
use serde_json::Value;

use shoptext_core::{AUTO_PACKAGE, UNNAMED_SHOP};

use crate::extract::fields::PackageCollector;
use crate::preprocess::{split_array_values, strip_wrapping_quotes};
use crate::types::{IdFactory, RawPackage, RawShop};

pub(crate) const SHOP_OPEN: &str = "[shop]";
pub(crate) const SHOP_CLOSE: &str = "[/shop]";
pub(crate) const PACKAGE_OPEN: &str = "[package]";
pub(crate) const PACKAGE_CLOSE: &str = "[/package]";

pub(crate) fn attempt(text: &str, ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    if !text.contains(SHOP_OPEN) {
        return None;
    }
    // A `packages:` list without any [package] delimiter is the YAML shape
    // wearing shop tags; leave it for the YAML strategy.
    if !text.contains(PACKAGE_OPEN) && text.contains("packages:") {
        return None;
    }
    let mut auto_names = 1u32;
    let shops = parse_tagged(text, ids, &mut auto_names);
    if shops.is_empty() {
        None
    } else {
        Some(shops)
    }
}

/// Parses tag-delimited text into raw shops. Texts without any `[shop]`
/// tag are wrapped as a single implicit shop/package block (the plain-text
/// fallback reuses this path).
pub(crate) fn parse_tagged(
    text: &str,
    ids: &mut IdFactory,
    auto_name_counter: &mut u32,
) -> Vec<RawShop> {
    let implicit;
    let source = if text.contains(SHOP_OPEN) {
        text
    } else {
        implicit = format!("{SHOP_OPEN}\n{PACKAGE_OPEN}\n{text}");
        &implicit
    };

    let mut shops = Vec::new();
    for section in source.split(SHOP_OPEN).skip(1) {
        // Close tag wins; otherwise the split already bounded the section
        // at the next open tag (or end of text).
        let section = section.split(SHOP_CLOSE).next().unwrap_or(section);
        shops.push(parse_shop_section(section, ids, auto_name_counter));
    }
    shops
}

fn parse_shop_section(section: &str, ids: &mut IdFactory, auto_name_counter: &mut u32) -> RawShop {
    let mut parts = section.split(PACKAGE_OPEN);
    let header = parts.next().unwrap_or_default();
    let header_lines: Vec<&str> = header
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut shop = RawShop {
        name: Some(UNNAMED_SHOP.to_string()),
        ..RawShop::default()
    };

    let name_re = Regex::new(r"(?i)^name[:：]").expect("valid shop name regex");
    if let Some(line) = header_lines.iter().find(|line| name_re.is_match(line)) {
        let raw_name = name_re.replace(line, "").trim().to_string();
        // Guard against a [package] tag glued onto the same line.
        let name = match raw_name.find(PACKAGE_OPEN) {
            Some(idx) => raw_name[..idx].trim().to_string(),
            None => raw_name,
        };
        if !name.is_empty() {
            shop.name = Some(name);
        }
    }

    let id_re = Regex::new(r"(?i)^(id|shop_id)[:：]").expect("valid shop id regex");
    if let Some(line) = header_lines.iter().find(|line| id_re.is_match(line)) {
        let value = id_re.replace(line, "").trim().to_string();
        if !value.is_empty() {
            shop.id = Some(value);
        }
    }

    collect_shop_tags(&header_lines, &mut shop);

    if shop.id.is_none() {
        shop.id = Some(ids.next_shop_id());
    }

    for package_section in parts {
        let body = package_section
            .split(PACKAGE_CLOSE)
            .next()
            .unwrap_or(package_section);
        if let Some(pkg) = parse_package_section(body, ids, auto_name_counter) {
            shop.packages
                .push(serde_json::to_value(pkg).unwrap_or(Value::Null));
        }
    }

    shop
}

/// Shop tag lists arrive either inline (`shoptags: a, b`) or as a header
/// key followed by bullet lines. A second pass without bullet requirements
/// runs when the first collected nothing, mirroring how tolerant the
/// sources need us to be about list formatting.
fn collect_shop_tags(header_lines: &[&str], shop: &mut RawShop) {
    let tags_re = Regex::new(r"(?i)^(shoptags|tags)[:：]").expect("valid shop tags regex");
    let Some(start) = header_lines.iter().position(|line| tags_re.is_match(line)) else {
        return;
    };

    let first_value = tags_re.replace(header_lines[start], "").trim().to_string();
    if !first_value.is_empty() {
        shop.tags.extend(split_array_values(&first_value));
    }

    let bullet_re = Regex::new(r"^[-*?·－]\s*").expect("valid tag bullet regex");
    for line in &header_lines[start + 1..] {
        if bullet_re.is_match(line) {
            shop.tags.push(bullet_re.replace(line, "").trim().to_string());
        } else if line.starts_with('\'') || line.starts_with('"') {
            shop.tags
                .push(strip_wrapping_quotes(line).trim().to_string());
        } else if line.contains(':') || line.contains('：') {
            break;
        } else if !line.is_empty() {
            shop.tags.extend(split_array_values(line));
        }
    }

    if shop.tags.is_empty() {
        for line in &header_lines[start + 1..] {
            if line.contains(':') {
                break;
            }
            let value = strip_wrapping_quotes(line).trim().to_string();
            if !value.is_empty() {
                shop.tags.push(value);
            }
        }
    }
}

fn parse_package_section(
    body: &str,
    ids: &mut IdFactory,
    auto_name_counter: &mut u32,
) -> Option<RawPackage> {
    let lines: Vec<&str> = body
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
    let mut pkg = collector.finish(|| {
        let name = format!("{AUTO_PACKAGE} {auto_name_counter}");
        *auto_name_counter += 1;
        name
    });

    if pkg.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return None;
    }
    pkg.id = Some(package_id);
    Some(pkg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoptext_core::Price;

    fn run(text: &str) -> Vec<RawShop> {
        let mut ids = IdFactory::default();
        attempt(text, &mut ids).unwrap_or_default()
    }

    fn first_package(shop: &RawShop) -> RawPackage {
        serde_json::from_value(shop.packages[0].clone()).expect("package value deserializes")
    }

    #[test]
    fn basic_shop_and_package() {
        let shops = run("[shop]\nname: TestShop\n[package]\nname: Combo1\nprice: 100\n");
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name.as_deref(), Some("TestShop"));
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some("Combo1"));
        assert_eq!(pkg.price, Some(Price::Amount(100.0)));
    }

    #[test]
    fn inapplicable_without_shop_tag() {
        let mut ids = IdFactory::default();
        assert!(attempt("name: NotTagged", &mut ids).is_none());
    }

    #[test]
    fn unterminated_shop_bounded_by_next_open_tag() {
        let shops = run("[shop]\nname: First\n[shop]\nname: Second\n[/shop]");
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].name.as_deref(), Some("First"));
        assert_eq!(shops[1].name.as_deref(), Some("Second"));
    }

    #[test]
    fn close_tag_cuts_trailing_prose() {
        let shops = run("[shop]\nname: A\n[/shop]\nThe rest of the story continues here.");
        assert_eq!(shops.len(), 1);
        assert!(shops[0].packages.is_empty());
    }

    #[test]
    fn multiple_packages_per_shop() {
        let shops = run(concat!(
            "[shop]\nname: A\n",
            "[package]\nname: P1\nprice: 10\n[/package]\n",
            "[package]\nname: P2\nprice: 20\n",
        ));
        assert_eq!(shops[0].packages.len(), 2);
    }

    #[test]
    fn explicit_shop_id_kept_missing_id_minted() {
        let shops = run("[shop]\nid: s-77\nname: A\n[shop]\nname: B\n");
        assert_eq!(shops[0].id.as_deref(), Some("s-77"));
        assert_eq!(shops[1].id.as_deref(), Some("shop_auto_0"));
    }

    #[test]
    fn shoptags_inline_and_bulleted() {
        let shops = run("[shop]\nname: A\nshoptags: cozy, warm\n- quiet\n'late night'\n");
        assert_eq!(shops[0].tags, vec!["cozy", "warm", "quiet", "late night"]);
    }

    #[test]
    fn shoptag_collection_stops_at_next_key() {
        let shops = run("[shop]\nname: A\nshoptags:\n- cozy\naddress: 1 Main St\n- stray\n");
        assert_eq!(shops[0].tags, vec!["cozy"]);
    }

    #[test]
    fn name_line_with_glued_package_tag() {
        let shops = run("[shop]\nname: TestShop [package]\nname: P1\nprice: 5\n");
        assert_eq!(shops[0].name.as_deref(), Some("TestShop"));
    }

    #[test]
    fn nameless_package_with_content_gets_auto_name() {
        let shops = run("[shop]\nname: A\n[package]\ncontent:\n- thing one\n");
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some("Package 1"));
    }

    #[test]
    fn nameless_package_without_lists_dropped() {
        let shops = run("[shop]\nname: A\n[package]\ndescription: only prose\n");
        assert!(shops[0].packages.is_empty());
    }

    #[test]
    fn auto_name_counter_spans_shops() {
        let shops = run(concat!(
            "[shop]\nname: A\n[package]\ncontent:\n- x\n",
            "[shop]\nname: B\n[package]\ncontent:\n- y\n",
        ));
        let first = first_package(&shops[0]);
        let second = first_package(&shops[1]);
        assert_eq!(first.name.as_deref(), Some("Package 1"));
        assert_eq!(second.name.as_deref(), Some("Package 2"));
    }

    #[test]
    fn yaml_shaped_sections_left_for_yaml_strategy() {
        let mut ids = IdFactory::default();
        let text = "[shop]\nname: A\npackages:\n  - name: P1\n    price: 10\n";
        assert!(attempt(text, &mut ids).is_none());
    }

    #[test]
    fn package_close_tag_cuts_following_lines() {
        let shops = run("[shop]\nname: A\n[package]\nname: P1\n[/package]\nstray: line\n");
        let pkg = first_package(&shops[0]);
        assert_eq!(pkg.name.as_deref(), Some("P1"));
    }
}
