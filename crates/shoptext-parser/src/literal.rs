//! Loose JS-object-literal parsing without code evaluation.
//!
//! LLM "JSON" routinely ships with unquoted keys, single-quoted strings,
//! trailing commas, `//`/`/* */` comments, and occasionally the bare-brace
//! string shorthand (`icon: {sparkles}`). Sanitizing such text and handing
//! it to a JS evaluator would open a trust boundary we do not want; a
//! small recursive-descent parser over the same grammar accepts strictly
//! less (expressions never execute) and needs no keyword denylist. Anything outside the literal grammar (identifiers in
//! value position, operators, calls) fails the parse, which the caller
//! treats like any other dialect failure.
//!
//! Also hosts the string-aware comment/trailing-comma strippers used to
//! upgrade near-JSON to strict JSON before `serde_json` sees it.

use serde_json::{Map, Number, Value};

/// Parses a loose object/array literal into a [`Value`]. Returns `None` on
/// anything outside the literal grammar, including trailing junk.
#[must_use]
pub fn parse_loose_literal(input: &str) -> Option<Value> {
    let mut cursor = Cursor::new(input);
    cursor.skip_trivia();
    let value = cursor.parse_value()?;
    cursor.skip_trivia();
    if cursor.at_end() {
        Some(value)
    } else {
        None
    }
}

/// Removes `//` and `/* */` comments outside string literals.
#[must_use]
pub fn strip_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_string {
            // Copy whole UTF-8 sequences; escape/quote bytes are ASCII and
            // can never alias a multi-byte unit.
            let ch_len = utf8_len(b);
            out.push_str(&input[i..i + ch_len]);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            i += ch_len;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_string = Some(b);
                out.push(b as char);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            _ => {
                let ch_len = utf8_len(b);
                out.push_str(&input[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    out
}

/// Removes commas that directly precede `}` or `]` (ignoring whitespace),
/// outside string literals.
#[must_use]
pub fn strip_trailing_commas(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_string {
            let ch_len = utf8_len(b);
            out.push_str(&input[i..i + ch_len]);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            i += ch_len;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_string = Some(b);
                out.push(b as char);
                i += 1;
            }
            b',' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if matches!(bytes.get(j), Some(b'}') | Some(b']')) {
                    i += 1; // drop the comma, keep the whitespace run
                } else {
                    out.push(',');
                    i += 1;
                }
            }
            _ => {
                let ch_len = utf8_len(b);
                out.push_str(&input[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    out
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skips whitespace and both comment forms.
    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'/') && self.bytes.get(self.pos + 1) == Some(&b'/') {
                while self.peek().is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            } else if self.peek() == Some(b'/') && self.bytes.get(self.pos + 1) == Some(&b'*') {
                self.pos += 2;
                while self.pos < self.bytes.len()
                    && !(self.bytes[self.pos] == b'*'
                        && self.bytes.get(self.pos + 1) == Some(&b'/'))
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
            } else {
                return;
            }
        }
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_trivia();
        match self.peek()? {
            b'{' => self.parse_object_or_bare_string(),
            b'[' => self.parse_array(),
            b'"' | b'\'' => self.parse_string().map(Value::String),
            b'-' | b'+' | b'0'..=b'9' | b'.' => self.parse_number(),
            _ => self.parse_keyword(),
        }
    }

    /// In value position, `{plain words}` with no colon or nesting is the
    /// bare-brace string shorthand; everything else is a real object.
    fn parse_object_or_bare_string(&mut self) -> Option<Value> {
        if let Some(text) = self.try_bare_brace_string() {
            return Some(Value::String(text));
        }
        self.parse_object()
    }

    fn try_bare_brace_string(&mut self) -> Option<String> {
        debug_assert_eq!(self.peek(), Some(b'{'));
        let mut j = self.pos + 1;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'}' => {
                    let inner = self.src[self.pos + 1..j].trim();
                    if inner.is_empty() || inner.starts_with('"') || inner.starts_with('\'') {
                        return None;
                    }
                    self.pos = j + 1;
                    return Some(inner.to_string());
                }
                b':' | b'{' => return None,
                _ => j += 1,
            }
        }
        None
    }

    fn parse_object(&mut self) -> Option<Value> {
        debug_assert_eq!(self.peek(), Some(b'{'));
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek()? {
                b'}' => {
                    self.pos += 1;
                    return Some(Value::Object(map));
                }
                b',' => {
                    self.pos += 1;
                }
                _ => {
                    let key = self.parse_key()?;
                    self.skip_trivia();
                    if self.bump()? != b':' {
                        return None;
                    }
                    let value = self.parse_value()?;
                    map.insert(key, value);
                }
            }
        }
    }

    fn parse_key(&mut self) -> Option<String> {
        match self.peek()? {
            b'"' | b'\'' => self.parse_string(),
            b => {
                if !(b.is_ascii_alphanumeric() || b == b'_' || b == b'$') {
                    return None;
                }
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
                {
                    self.pos += 1;
                }
                Some(self.src[start..self.pos].to_string())
            }
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        debug_assert_eq!(self.peek(), Some(b'['));
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek()? {
                b']' => {
                    self.pos += 1;
                    return Some(Value::Array(items));
                }
                b',' => {
                    self.pos += 1;
                }
                _ => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            let b = self.bump()?;
            if b == quote {
                return Some(out);
            }
            if b == b'\\' {
                match self.bump()? {
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    b'b' => out.push('\u{8}'),
                    b'f' => out.push('\u{c}'),
                    b'u' => {
                        let hex = self.src.get(self.pos..self.pos + 4)?;
                        let code = u32::from_str_radix(hex, 16).ok()?;
                        out.push(char::from_u32(code)?);
                        self.pos += 4;
                    }
                    other => out.push(other as char),
                }
            } else if b < 0x80 {
                out.push(b as char);
            } else {
                let ch_len = utf8_len(b);
                out.push_str(self.src.get(self.pos - 1..self.pos - 1 + ch_len)?);
                self.pos += ch_len - 1;
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            self.pos += 1;
        }
        let text = self.src[start..self.pos].trim_start_matches('+');
        let parsed: f64 = text.parse().ok()?;
        Number::from_f64(parsed).map(Value::Number)
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "null" | "undefined" => Some(Value::Null),
            // A bare identifier in value position is code, not data.
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_strict_json() {
        let v = parse_loose_literal(r#"{"name": "A", "price": 50}"#).expect("parses");
        assert_eq!(v, json!({"name": "A", "price": 50.0}));
    }

    #[test]
    fn parses_unquoted_keys_and_single_quotes() {
        let v = parse_loose_literal("{name: 'Moonlight', tags: ['tea', 'late']}").expect("parses");
        assert_eq!(v["name"], "Moonlight");
        assert_eq!(v["tags"][1], "late");
    }

    #[test]
    fn parses_trailing_commas() {
        let v = parse_loose_literal("{a: 1, b: [2, 3,],}").expect("parses");
        assert_eq!(v["b"], json!([2.0, 3.0]));
    }

    #[test]
    fn parses_comments() {
        let v = parse_loose_literal(
            "{\n  // shop name\n  name: \"A\", /* price in credits */ price: 9\n}",
        )
        .expect("parses");
        assert_eq!(v["name"], "A");
        assert_eq!(v["price"], 9.0);
    }

    #[test]
    fn bare_brace_shorthand_becomes_string() {
        let v = parse_loose_literal("{icon: {sparkles}}").expect("parses");
        assert_eq!(v["icon"], "sparkles");
    }

    #[test]
    fn bare_brace_with_colon_is_an_object() {
        let v = parse_loose_literal("{inner: {a: 1}}").expect("parses");
        assert_eq!(v["inner"]["a"], 1.0);
    }

    #[test]
    fn bare_identifier_value_fails() {
        assert!(parse_loose_literal("{name: hello}").is_none());
    }

    #[test]
    fn function_like_input_fails() {
        assert!(parse_loose_literal("{run: function() { return 1 }}").is_none());
        assert!(parse_loose_literal("{f: () => 1}").is_none());
    }

    #[test]
    fn trailing_junk_fails() {
        assert!(parse_loose_literal("{a: 1}; doEvil()").is_none());
    }

    #[test]
    fn escapes_in_strings() {
        let v = parse_loose_literal(r#"{s: 'line\none', q: "he said \"hi\""}"#).expect("parses");
        assert_eq!(v["s"], "line\none");
        assert_eq!(v["q"], "he said \"hi\"");
    }

    #[test]
    fn unicode_escape_and_raw_unicode() {
        let v = parse_loose_literal(r#"{a: "é", b: "茶屋"}"#).expect("parses");
        assert_eq!(v["a"], "é");
        assert_eq!(v["b"], "茶屋");
    }

    #[test]
    fn null_and_undefined_map_to_null() {
        let v = parse_loose_literal("{a: null, b: undefined}").expect("parses");
        assert!(v["a"].is_null());
        assert!(v["b"].is_null());
    }

    #[test]
    fn strip_comments_preserves_strings() {
        let s = r#"{"url": "https://example.com/a", "n": 1} // tail"#;
        let out = strip_comments(s);
        assert!(out.contains("https://example.com/a"));
        assert!(!out.contains("tail"));
    }

    #[test]
    fn strip_comments_block_form() {
        assert_eq!(strip_comments("a /* b */ c"), "a  c");
    }

    #[test]
    fn strip_comments_preserves_multibyte_strings() {
        let s = "{\"name\": \"茶屋 // not a comment\"} // tail";
        let out = strip_comments(s);
        assert!(out.contains("茶屋 // not a comment"));
        assert!(!out.contains("tail"));
    }

    #[test]
    fn strip_trailing_commas_outside_strings_only() {
        let s = r#"{"a": "x,}", "b": [1, 2,],}"#;
        let out = strip_trailing_commas(s);
        assert_eq!(out, r#"{"a": "x,}", "b": [1, 2]}"#);
    }
}
