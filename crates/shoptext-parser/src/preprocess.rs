//! Host-marker stripping and line normalization ahead of any strategy.
//!
//! The host wraps UI-bound message sections in pseudo-tags and appends a
//! recommended-tags block; neither carries shop data, but both confuse the
//! structural extractors. Removal is total rather than range-based so data
//! survives whether it sits inside or outside the markers. Pure functions,
//! no failure modes: unmatched or absent markers leave the text unchanged.

use regex::Regex;

/// Removes UI-surface boundary markers and recommended-tag markers.
#[must_use]
pub fn strip_surface_markers(text: &str) -> String {
    let surface = Regex::new(r"\[/?app_screen_(?:start|end)[^\]]*\]")
        .expect("valid surface marker regex");
    let recommended =
        Regex::new(r"\[/?recommended_tags[^\]]*\]").expect("valid recommended tags regex");
    let without_surface = surface.replace_all(text, "");
    recommended.replace_all(&without_surface, "").into_owned()
}

/// Rewrites `[shop]`-family tag lines that carry surrounding whitespace
/// (e.g. `"  [package] "`) to the exact `[tag]` form the extractors match.
#[must_use]
pub fn normalize_bracket_tags(text: &str) -> String {
    let tag_line =
        Regex::new(r"(?m)^\s*\[(/?shop|/?package)\]\s*$").expect("valid bracket tag regex");
    tag_line.replace_all(text, "[$1]").into_owned()
}

/// Full preprocessing pass: marker removal, then tag-line normalization.
#[must_use]
pub fn clean(text: &str) -> String {
    normalize_bracket_tags(&strip_surface_markers(text))
}

/// Strips common bullet prefixes (`-`, `*`, `·`, `•`, dashes, enumeration
/// digits/dots/parens) and unwraps surrounding quotes from a collected line.
#[must_use]
pub(crate) fn normalize_bullet(line: &str) -> String {
    let prefix = Regex::new(r"^\s*[-*?·•‧‒–—‐−－\d()（）.、]+").expect("valid bullet prefix regex");
    let stripped = prefix.replace(line, "");
    strip_wrapping_quotes(stripped.trim()).trim().to_string()
}

/// Splits an inline array value on the separators LLM output actually uses
/// (ASCII and full-width comma, slash, enumeration comma, pipe), trimming
/// quotes from each element.
#[must_use]
pub(crate) fn split_array_values(value: &str) -> Vec<String> {
    value
        .split(|c| matches!(c, ',' | '，' | '/' | '、' | '|'))
        .map(|part| strip_wrapping_quotes(part.trim()).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Removes a single leading and/or trailing quote character.
#[must_use]
pub(crate) fn strip_wrapping_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .or_else(|| value.strip_prefix('\''))
        .unwrap_or(value);
    value
        .strip_suffix('"')
        .or_else(|| value.strip_suffix('\''))
        .unwrap_or(value)
}
