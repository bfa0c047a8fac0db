//! JS-template dialect: `const whatever = { … };` assignments, or a bare
//! top-level object literal, possibly commented, comma-ridden, and cut off
//! mid-array. The truncation-tolerant balancer makes this the strategy
//! that rescues most mid-object LLM cutoffs.

use regex::Regex;

use crate::braces::{balance_braces, find_matching_brace};
use crate::literal::{parse_loose_literal, strip_comments, strip_trailing_commas};
use crate::normalize;
use crate::types::{IdFactory, RawShop};

/// Returns the object-literal slice: the braces after a `const x =`
/// assignment when present, else the first top-level `{…}` span. An
/// unterminated object extends to end-of-text for the balancer to repair.
pub(crate) fn locate(text: &str) -> Option<String> {
    let source = text.trim();

    let assign = Regex::new(r"const\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=").expect("valid assign regex");
    if let Some(found) = assign.find(source) {
        if let Some(rel) = source[found.end()..].find('{') {
            let start = found.end() + rel;
            return Some(match find_matching_brace(source, start) {
                Some(end) => source[start..=end].to_string(),
                None => source[start..].to_string(),
            });
        }
    }

    let start = source.find('{')?;
    Some(match find_matching_brace(source, start) {
        Some(end) => source[start..=end].to_string(),
        None => source[start..].to_string(),
    })
}

pub(crate) fn attempt(text: &str, _ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    let object = locate(text)?;
    let cleaned = strip_trailing_commas(&strip_comments(&object));
    let balanced = balance_braces(cleaned.trim());

    let value = match serde_json::from_str::<serde_json::Value>(&balanced) {
        Ok(value) => value,
        Err(strict_error) => match parse_loose_literal(&balanced) {
            Some(value) => value,
            None => {
                tracing::debug!(%strict_error, "template chunk failed strict and loose parses");
                return None;
            }
        },
    };
    normalize::non_empty_shops_from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Option<Vec<RawShop>> {
        let mut ids = IdFactory::default();
        attempt(text, &mut ids)
    }

    #[test]
    fn const_assignment_with_comments_and_trailing_commas() {
        let text = concat!(
            "const template = {\n",
            "  // the shop list\n",
            "  shops: [\n",
            "    { name: 'A', /* primary */ packages: [ { name: 'P1', price: 50, }, ], },\n",
            "  ],\n",
            "};\n",
            "export default template;\n",
        );
        let shops = run(text).expect("template strategy applies");
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name.as_deref(), Some("A"));
        assert_eq!(shops[0].packages.len(), 1);
    }

    #[test]
    fn bare_object_literal_without_assignment() {
        let shops = run(r#"{"shops": [{"name": "B"}]}"#).expect("applies");
        assert_eq!(shops[0].name.as_deref(), Some("B"));
    }

    #[test]
    fn truncated_json_repaired() {
        let text = r#"{"shops":[{"name":"A","packages":[{"name":"P1","price":50}]}"#;
        let shops = run(text).expect("balancer repairs truncation");
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].packages.len(), 1);
    }

    #[test]
    fn no_brace_is_inapplicable() {
        assert!(run("just words, no objects").is_none());
    }

    #[test]
    fn prose_with_stray_braces_fails_quietly() {
        assert!(run("she whispered {dramatically} and left").is_none());
    }
}
