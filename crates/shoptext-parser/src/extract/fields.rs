//! `key: value` field collection shared by the tag and plain-text dialects.
//!
//! A package body is a run of lines. Known scalar keys assign directly;
//! known array keys (`tags`, `content`, `reviews`) switch the collector
//! into collecting mode, consuming bullet-style lines until the next known
//! key. Lines that match nothing continue the nearest open field: arrays
//! absorb them as items, multi-line scalars (description, image URLs)
//! absorb them as continuations.

use shoptext_core::Price;

use crate::preprocess::{normalize_bullet, split_array_values, strip_wrapping_quotes};
use crate::types::RawPackage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayField {
    Tags,
    Content,
    Reviews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarField {
    Description,
    Image1,
    Image2,
    Image3,
}

/// Incremental package builder fed one trimmed line at a time.
#[derive(Debug, Default)]
pub(crate) struct PackageCollector {
    pkg: RawPackage,
    current_array: Option<ArrayField>,
    current_scalar: Option<ScalarField>,
}

impl PackageCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn feed_line(&mut self, line: &str) {
        if let Some((key, value)) = split_key_value(line) {
            let key = key.trim().to_lowercase();
            let value = value.trim();
            match key.as_str() {
                "name" => {
                    self.pkg.name = Some(value.to_string());
                    self.close_fields();
                }
                "price" => {
                    self.pkg.price = Some(parse_price(value));
                    self.close_fields();
                }
                "stars" => {
                    self.pkg.stars = Some(value.parse::<f64>().unwrap_or(0.0));
                    self.close_fields();
                }
                "icon" => {
                    self.pkg.icon = Some(value.to_string());
                    self.close_fields();
                }
                "description" => {
                    self.pkg.description = Some(value.to_string());
                    self.open_scalar(ScalarField::Description);
                }
                "image1" => {
                    self.pkg.image1 = Some(value.to_string());
                    self.open_scalar(ScalarField::Image1);
                }
                "image2" => {
                    self.pkg.image2 = Some(value.to_string());
                    self.open_scalar(ScalarField::Image2);
                }
                "image3" => {
                    self.pkg.image3 = Some(value.to_string());
                    self.open_scalar(ScalarField::Image3);
                }
                "tags" | "content" | "reviews" => {
                    let field = array_field(&key);
                    self.current_array = Some(field);
                    self.current_scalar = None;
                    if !value.is_empty() {
                        let items = if let Some(rest) = value.strip_prefix('-') {
                            vec![rest.trim().to_string()]
                        } else {
                            split_array_values(value)
                        };
                        for item in items {
                            let cleaned = strip_wrapping_quotes(item.trim()).trim().to_string();
                            if !cleaned.is_empty() {
                                self.push_array_item(field, cleaned);
                            }
                        }
                    }
                    return;
                }
                // Unknown key lines fall through to the open-field logic
                // below, same as keyless lines.
                _ => {
                    self.continue_open_field(line);
                }
            }
            return;
        }

        let lowered = line.trim().to_lowercase();
        if matches!(lowered.as_str(), "tags" | "content" | "reviews") {
            self.current_array = Some(array_field(&lowered));
            self.current_scalar = None;
            return;
        }

        self.continue_open_field(line);
    }

    /// Finishes collection. When the package gathered list data but never a
    /// name, `auto_name` supplies one; a package with no name at all is
    /// discarded by the caller (its `name` stays `None`/empty).
    pub(crate) fn finish(mut self, auto_name: impl FnOnce() -> String) -> RawPackage {
        let unnamed = self
            .pkg
            .name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty());
        if unnamed && self.has_list_data() {
            self.pkg.name = Some(auto_name());
        }
        self.pkg
    }

    fn has_list_data(&self) -> bool {
        !self.pkg.content.is_empty() || !self.pkg.reviews.is_empty() || !self.pkg.tags.is_empty()
    }

    fn continue_open_field(&mut self, line: &str) {
        if let Some(field) = self.current_array {
            let item = normalize_bullet(line);
            if !item.is_empty() {
                self.push_array_item(field, item);
            }
        } else if let Some(field) = self.current_scalar {
            let slot = match field {
                ScalarField::Description => &mut self.pkg.description,
                ScalarField::Image1 => &mut self.pkg.image1,
                ScalarField::Image2 => &mut self.pkg.image2,
                ScalarField::Image3 => &mut self.pkg.image3,
            };
            let current = slot.get_or_insert_with(String::new);
            current.push('\n');
            current.push_str(line);
        }
    }

    fn push_array_item(&mut self, field: ArrayField, item: String) {
        match field {
            ArrayField::Tags => self.pkg.tags.push(item),
            ArrayField::Content => self.pkg.content.push(item),
            ArrayField::Reviews => self.pkg.reviews.push(item),
        }
    }

    fn open_scalar(&mut self, field: ScalarField) {
        self.current_array = None;
        self.current_scalar = Some(field);
    }

    fn close_fields(&mut self) {
        self.current_array = None;
        self.current_scalar = None;
    }
}

fn array_field(key: &str) -> ArrayField {
    match key {
        "tags" => ArrayField::Tags,
        "content" => ArrayField::Content,
        _ => ArrayField::Reviews,
    }
}

/// Splits a line at its first ASCII or full-width colon.
pub(crate) fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let idx = line.find([':', '：'])?;
    if idx == 0 {
        return None;
    }
    let key = &line[..idx];
    let sep_len = if line[idx..].starts_with('：') { 3 } else { 1 };
    Some((key, &line[idx + sep_len..]))
}

/// Price strings that parse as numbers become amounts so the text dialect
/// normalizes identically to the JSON dialect; anything else is carried as
/// literal text.
fn parse_price(value: &str) -> Price {
    match value.trim().parse::<f64>() {
        Ok(amount) => Price::Amount(amount),
        Err(_) => Price::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(lines: &[&str]) -> RawPackage {
        let mut collector = PackageCollector::new();
        for line in lines {
            collector.feed_line(line);
        }
        collector.finish(|| "Package 1".to_string())
    }

    #[test]
    fn scalar_fields_assigned() {
        let pkg = collect(&["name: Combo1", "price: 100", "stars: 4.5", "icon: star"]);
        assert_eq!(pkg.name.as_deref(), Some("Combo1"));
        assert_eq!(pkg.price, Some(Price::Amount(100.0)));
        assert_eq!(pkg.stars, Some(4.5));
        assert_eq!(pkg.icon.as_deref(), Some("star"));
    }

    #[test]
    fn non_numeric_price_kept_as_text() {
        let pkg = collect(&["name: Combo1", "price: negotiable"]);
        assert_eq!(pkg.price, Some(Price::Text("negotiable".to_string())));
    }

    #[test]
    fn unparseable_stars_default_to_zero() {
        let pkg = collect(&["name: X", "stars: many"]);
        assert_eq!(pkg.stars, Some(0.0));
    }

    #[test]
    fn full_width_colon_accepted() {
        let pkg = collect(&["name： Combo1"]);
        assert_eq!(pkg.name.as_deref(), Some("Combo1"));
    }

    #[test]
    fn inline_array_value_split() {
        let pkg = collect(&["tags: cozy, warm, quiet"]);
        assert_eq!(pkg.tags, vec!["cozy", "warm", "quiet"]);
    }

    #[test]
    fn array_collects_bullets_until_next_key() {
        let pkg = collect(&[
            "content:",
            "- first item",
            "* second item",
            "price: 10",
            "- not content anymore",
        ]);
        assert_eq!(pkg.content, vec!["first item", "second item"]);
        assert_eq!(pkg.price, Some(Price::Amount(10.0)));
    }

    #[test]
    fn bare_keyword_line_opens_collection() {
        let pkg = collect(&["reviews", "- loved it", "\"would return\""]);
        assert_eq!(pkg.reviews, vec!["loved it", "would return"]);
    }

    #[test]
    fn unknown_key_line_feeds_open_array() {
        let pkg = collect(&["content:", "note: comes with tea"]);
        assert_eq!(pkg.content, vec!["note: comes with tea"]);
    }

    #[test]
    fn description_accumulates_continuation_lines() {
        let pkg = collect(&["description: A quiet corner", "with window seats", "and lanterns"]);
        assert_eq!(
            pkg.description.as_deref(),
            Some("A quiet corner\nwith window seats\nand lanterns")
        );
    }

    #[test]
    fn scalar_continuation_closed_by_new_key() {
        let pkg = collect(&["description: Short", "name: Combo1", "stray line"]);
        assert_eq!(pkg.description.as_deref(), Some("Short"));
        assert_eq!(pkg.name.as_deref(), Some("Combo1"));
    }

    #[test]
    fn auto_name_applied_when_lists_present() {
        let pkg = collect(&["content:", "- something"]);
        assert_eq!(pkg.name.as_deref(), Some("Package 1"));
    }

    #[test]
    fn no_auto_name_without_list_data() {
        let pkg = collect(&["description: just words"]);
        assert!(pkg.name.is_none());
    }

    #[test]
    fn leading_dash_inline_value_is_single_item() {
        let pkg = collect(&["content: - one item, with a comma"]);
        assert_eq!(pkg.content, vec!["one item, with a comma"]);
    }

    #[test]
    fn split_key_value_basics() {
        assert_eq!(split_key_value("a: b"), Some(("a", " b")));
        assert_eq!(split_key_value("a：b"), Some(("a", "b")));
        assert_eq!(split_key_value("no colon here"), None);
        assert_eq!(split_key_value(": leading"), None);
    }
}
