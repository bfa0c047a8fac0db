//! Strict-JSON dialect: the payload is real JSON, possibly wrapped in a
//! Markdown code fence or preceded by a line of prose.

use regex::Regex;

use crate::normalize;
use crate::types::{IdFactory, RawShop};

pub(crate) fn attempt(text: &str, _ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    let mut source = text.trim().to_string();

    let fence = Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid code fence regex");
    if let Some(caps) = fence.captures(&source) {
        source = caps[1].trim().to_string();
    }

    // Skip a prose prefix up to the first brace; bracket-led arrays must
    // already start clean.
    if !source.starts_with('{') && !source.starts_with('[') {
        if let Some(idx) = source.find('{') {
            source = source[idx..].to_string();
        }
    }

    if !(source.starts_with('{') || source.starts_with('[')) {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(&source) {
        Ok(value) => normalize::non_empty_shops_from_value(&value),
        Err(error) => {
            tracing::debug!(%error, "strict JSON parse failed");
            None
        }
    }
}
