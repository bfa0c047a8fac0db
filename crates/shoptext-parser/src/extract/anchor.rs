//! JSON-anchor dialect: the host prompt asks the model to label canonical
//! output with a fixed phrase. When the phrase is present, the first brace
//! after it opens the payload. It is the most explicit signal any dialect has,
//! which is why this strategy runs first.

use crate::braces::find_matching_brace;
use crate::normalize;
use crate::types::{IdFactory, RawShop};

/// Exact anchor phrase; must match the host prompt bit-for-bit.
pub(crate) const JSON_ANCHOR: &str = "json normalized format";

/// Returns the balanced `{…}` chunk following the anchor phrase, if any.
pub(crate) fn locate(text: &str) -> Option<String> {
    let anchor = text.find(JSON_ANCHOR)?;
    let after = &text[anchor..];
    let brace = after.find('{')?;
    let content = &text[anchor + brace..];
    let end = find_matching_brace(content, 0)?;
    Some(content[..=end].to_string())
}

pub(crate) fn attempt(text: &str, _ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    let chunk = locate(text)?;
    // Models writing CJK prose tend to emit full-width commas inside
    // otherwise valid JSON.
    let ascii_commas = chunk.replace('，', ",");
    match serde_json::from_str::<serde_json::Value>(&ascii_commas) {
        Ok(value) => normalize::non_empty_shops_from_value(&value),
        Err(error) => {
            tracing::warn!(%error, "anchored chunk failed strict JSON parse");
            None
        }
    }
}
