//! Lexical helpers for scanning manifest source text.
//!
//! These work on characters, not tokens: they know about string literals and
//! comments so that parentheses inside either never affect nesting.

/// Replace `//` and `/* */` comments with spaces, keeping byte offsets stable.
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = literal_end(bytes, i) {
            out.extend_from_slice(&bytes[i..end]);
            i = end;
            continue;
        }

        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out.push(b' ');
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                // Swift block comments nest.
                let mut depth = 0usize;
                while i < bytes.len() {
                    if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                        depth += 1;
                        out.extend_from_slice(b"  ");
                        i += 2;
                    } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        depth -= 1;
                        out.extend_from_slice(b"  ");
                        i += 2;
                        if depth == 0 {
                            break;
                        }
                    } else {
                        out.push(if bytes[i] == b'\n' { b'\n' } else { b' ' });
                        i += 1;
                    }
                }
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }

    into_string(out)
}

/// Given the offset of an opening `(`, return the offset just past its
/// matching `)`. `None` when the text ends first.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(end) = literal_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Blank out everything nested deeper than the outermost bracket level of
/// `block`, so field lookups only see the block's own arguments.
pub fn top_level_only(block: &str) -> String {
    let bytes = block.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = literal_end(bytes, i) {
            if depth <= 1 {
                out.extend_from_slice(&bytes[i..end]);
            } else {
                out.resize(out.len() + (end - i), b' ');
            }
            i = end;
            continue;
        }
        let b = bytes[i];
        if matches!(b, b'(' | b'[') {
            depth += 1;
        }
        out.push(if depth <= 1 { b } else { b' ' });
        if matches!(b, b')' | b']') {
            depth = depth.saturating_sub(1);
        }
        i += 1;
    }

    into_string(out)
}

/// If a string literal opens at `start`, the offset just past its closing
/// delimiter (or the end of input when it never closes).
///
/// Handles `"..."` with backslash escapes, `"""` blocks, and raw strings
/// such as `#"..."#` where only the quote followed by the same number of
/// `#` closes the literal.
fn literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let hashes = bytes[start..].iter().take_while(|&&b| b == b'#').count();
    let quote = start + hashes;
    if bytes.get(quote) != Some(&b'"') {
        return None;
    }
    let quotes = if bytes[quote..].starts_with(b"\"\"\"") { 3 } else { 1 };
    let mut closer = vec![b'"'; quotes];
    closer.extend(std::iter::repeat_n(b'#', hashes));

    let mut i = quote + quotes;
    while i < bytes.len() {
        if hashes == 0 && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(&closer) {
            return Some(i + closer.len());
        }
        i += 1;
    }
    Some(bytes.len())
}

// Only whole literals or single bytes are ever replaced, so no multi-byte
// sequence is split.
fn into_string(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments_outside_strings() {
        let src = "a // x(\nb /* (c) /* d */ */ \"// kept\"";
        let out = strip_comments(src);
        assert_eq!(out.len(), src.len());
        assert!(out.starts_with("a "));
        assert!(!out.contains("x("));
        assert!(!out.contains("(c)"));
        assert!(out.contains("\"// kept\""));
    }

    #[test]
    fn matching_paren_ignores_parens_in_strings() {
        let text = "f(a, \")\", g(b))tail";
        let end = matching_paren(text, 1).unwrap();
        assert_eq!(&text[end..], "tail");
        assert_eq!(matching_paren("f(a", 1), None);
    }

    #[test]
    fn top_level_only_hides_nested_arguments() {
        let block = r#"(name: "A", dependencies: [.product(name: "B")])"#;
        let flat = top_level_only(block);
        assert!(flat.contains("name: \"A\""));
        assert!(!flat.contains("\"B\""));
    }

    #[test]
    fn raw_strings_hide_quotes_and_parens() {
        let text = r##"f(#"a")"b"#, g())tail"##;
        let end = matching_paren(text, 1).expect("closes");
        assert_eq!(&text[end..], "tail");

        let stripped = strip_comments(r##"x #"// not a comment"# y // gone"##);
        assert!(stripped.contains("// not a comment"));
        assert!(!stripped.contains("gone"));

        let flat = top_level_only(r###"(name: "A", flags: [##"])"#"##], other: "B")"###);
        assert!(flat.contains("name: \"A\""));
        assert!(flat.contains("other: \"B\""));
        assert!(!flat.contains("])"));
    }

    #[test]
    fn hash_directives_are_not_literals() {
        let text = "f(#if os(macOS) \"x\" #endif)tail";
        let end = matching_paren(text, 1).expect("closes");
        assert_eq!(&text[end..], "tail");
    }

    #[test]
    fn multiline_literals_span_lines() {
        let text = "f(\"\"\"\n) \" (\n\"\"\")tail";
        let end = matching_paren(text, 1).expect("closes");
        assert_eq!(&text[end..], "tail");
    }

    #[test]
    fn unterminated_raw_string_never_closes() {
        assert_eq!(matching_paren(r##"f(#"open)"##, 1), None);
    }
}
