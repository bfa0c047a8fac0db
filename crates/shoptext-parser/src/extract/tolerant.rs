//! Largest-parsable-chunk scanner: the salvage strategy for JSON embedded
//! in prose or cut off mid-stream. Candidate start positions pair with a
//! bounded set of candidate end positions scanned backward from the tail;
//! each slice gets a strict parse, a comment-stripped parse, and a loose
//! literal parse, in that order. The candidate caps keep worst-case work
//! linear in practice; an unbounded scan goes quadratic on large inputs.

use regex::Regex;

use crate::literal::{parse_loose_literal, strip_comments, strip_trailing_commas};
use crate::normalize;
use crate::types::{IdFactory, RawShop};

/// Cap on closing-`}` candidates per start position.
const MAX_BRACE_CANDIDATES: usize = 20;
/// Cap on total end candidates (braces plus brackets) per start position.
const MAX_END_CANDIDATES: usize = 40;

pub(crate) fn attempt(text: &str, _ids: &mut IdFactory) -> Option<Vec<RawShop>> {
    let src = text.trim();

    let mut starts: Vec<usize> = Vec::new();
    // A `"shops"` key marks the most promising object; its enclosing brace
    // goes first.
    let shops_key = Regex::new(r#"["']?shops["']?\s*:"#).expect("valid shops key regex");
    if let Some(found) = shops_key.find(src) {
        if let Some(brace) = src[..found.start()].rfind('{') {
            starts.push(brace);
        }
    }
    for idx in [src.find('{'), src.find('[')].into_iter().flatten() {
        if !starts.contains(&idx) {
            starts.push(idx);
        }
    }

    for start in starts {
        let ends = end_candidates(src, start);
        for end in ends {
            let slice = &src[start..=end];
            if let Some(shops) = parse_slice(slice) {
                return Some(shops);
            }
        }
    }
    None
}

/// Closing positions scanned backward from the end of text: up to
/// [`MAX_BRACE_CANDIDATES`] braces, then brackets up to the total cap,
/// merged most-recent-first.
fn end_candidates(src: &str, start: usize) -> Vec<usize> {
    let mut ends: Vec<usize> = Vec::new();

    let mut cursor = src.len();
    while let Some(pos) = src[..cursor].rfind('}') {
        if pos < start || ends.len() >= MAX_BRACE_CANDIDATES {
            break;
        }
        ends.push(pos);
        cursor = pos;
    }

    let mut cursor = src.len();
    while let Some(pos) = src[..cursor].rfind(']') {
        if pos < start || ends.len() >= MAX_END_CANDIDATES {
            break;
        }
        ends.push(pos);
        cursor = pos;
    }

    ends.sort_unstable_by(|a, b| b.cmp(a));
    ends.dedup();
    ends
}

fn parse_slice(slice: &str) -> Option<Vec<RawShop>> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(slice) {
        if let Some(shops) = normalize::non_empty_shops_from_value(&value) {
            return Some(shops);
        }
    }

    let cleaned = strip_trailing_commas(&strip_comments(slice));
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        if let Some(shops) = normalize::non_empty_shops_from_value(&value) {
            return Some(shops);
        }
    }

    if let Some(value) = parse_loose_literal(slice) {
        if let Some(shops) = normalize::non_empty_shops_from_value(&value) {
            return Some(shops);
        }
    }
    None
}
