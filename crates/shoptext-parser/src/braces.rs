//! String-aware brace matching and truncation repair.
//!
//! Several extractors need to isolate an object literal from surrounding
//! prose. Counting braces naively desynchronizes on string-embedded braces
//! (`{"note": "use {curly} style"}`), so every extractor goes through this
//! module instead of rolling its own scan. All scanning is byte-based:
//! quotes, braces, and backslashes are ASCII, and multi-byte UTF-8 units
//! can never alias them.

/// Returns the byte index of the `}` matching the `{` at `start`, treating
/// characters inside single- or double-quoted spans (honoring backslash
/// escapes) as inert. Returns `None` if the input ends before the brace
/// closes, or if `start` does not point at `{`.
#[must_use]
pub fn find_matching_brace(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        if b == b'\\' {
            escaped = true;
            continue;
        }
        if let Some(quote) = in_string {
            if b == quote {
                in_string = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => in_string = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Best-effort repair for truncated object text: appends the minimum
/// closers (`}` / `]`, and a closing quote when the text ends mid-string)
/// needed to reach net-zero nesting depth. Never removes characters;
/// already-balanced input is returned as-is.
#[must_use]
pub fn balance_braces(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for &b in bytes {
        if escaped {
            escaped = false;
            continue;
        }
        if b == b'\\' {
            escaped = true;
            continue;
        }
        if let Some(quote) = in_string {
            if b == quote {
                in_string = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => in_string = Some(b),
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                // Pop only the matching opener; a stray closer is left for
                // the downstream parser to reject.
                if stack.last() == Some(&b) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    if in_string.is_none() && stack.is_empty() {
        return s.to_string();
    }

    let mut repaired = String::with_capacity(s.len() + stack.len() + 1);
    repaired.push_str(s);
    if let Some(quote) = in_string {
        repaired.push(quote as char);
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer as char);
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_simple_object() {
        assert_eq!(find_matching_brace("{}", 0), Some(1));
        assert_eq!(find_matching_brace("{\"a\":1}", 0), Some(6));
    }

    #[test]
    fn matches_nested_object() {
        let s = "{\"a\":{\"b\":2}}";
        assert_eq!(find_matching_brace(s, 0), Some(s.len() - 1));
    }

    #[test]
    fn braces_inside_strings_are_inert() {
        let s = r#"{"note": "use {curly} style"}"#;
        assert_eq!(find_matching_brace(s, 0), Some(s.len() - 1));
        let single = r#"{'note': 'a } inside'}"#;
        assert_eq!(find_matching_brace(single, 0), Some(single.len() - 1));
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let s = r#"{"note": "say \"}\" loudly"}"#;
        assert_eq!(find_matching_brace(s, 0), Some(s.len() - 1));
    }

    #[test]
    fn unbalanced_returns_none() {
        assert_eq!(find_matching_brace("{\"a\":1", 0), None);
    }

    #[test]
    fn start_not_a_brace_returns_none() {
        assert_eq!(find_matching_brace("abc{}", 0), None);
    }

    #[test]
    fn inner_object_from_offset() {
        let s = "{\"a\":{\"b\":2}}";
        assert_eq!(find_matching_brace(s, 5), Some(11));
    }

    #[test]
    fn balance_returns_balanced_input_unchanged() {
        let s = "{\"a\": [1, 2]}";
        assert_eq!(balance_braces(s), s);
    }

    #[test]
    fn balance_appends_single_brace() {
        assert_eq!(balance_braces("{\"a\": 1"), "{\"a\": 1}");
    }

    #[test]
    fn balance_closes_brackets_in_nesting_order() {
        let truncated = r#"{"shops":[{"name":"A","packages":[{"name":"P1","price":50}]}"#;
        let repaired = balance_braces(truncated);
        assert_eq!(
            repaired,
            r#"{"shops":[{"name":"A","packages":[{"name":"P1","price":50}]}]}"#
        );
        serde_json::from_str::<serde_json::Value>(&repaired).expect("repaired JSON parses");
    }

    #[test]
    fn balance_closes_dangling_string() {
        let truncated = r#"{"name": "Moonli"#;
        let repaired = balance_braces(truncated);
        serde_json::from_str::<serde_json::Value>(&repaired).expect("repaired JSON parses");
    }

    #[test]
    fn balance_ignores_braces_inside_strings() {
        let s = r#"{"note": "open { here"#;
        let repaired = balance_braces(s);
        assert_eq!(repaired, r#"{"note": "open { here"}"#);
    }

    #[test]
    fn balance_never_removes_stray_closers() {
        let s = "{]}";
        assert_eq!(balance_braces(s), "{]}");
    }
}
