//! Escaping of stray markup delimiters in question prose
//!
//! Prose may contain bare comparison symbols (`a < b`) next to inline tags
//! that must reach the generated item untouched (`<b>bold</b>`). A `<` opens
//! a tag only when followed by an alphanumeric character or one of `! ? /`;
//! any other `<`, and any `>` outside a tag, becomes an entity. A `&` that
//! does not start a predefined entity or character reference becomes `&amp;`.
//!
//! A `>` inside a quoted attribute value of a real tag closes the tag early.
//! That case is not handled.

use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&(?:amp|lt|gt|quot|apos|#[0-9]+|#x[0-9A-Fa-f]+);").unwrap());

fn starts_reference(rest: &str) -> bool {
    REFERENCE.is_match(rest)
}

/// Escape stray markup delimiters in `text`, passing absent text through
pub fn escape(text: Option<&str>) -> Option<String> {
    text.map(escape_str)
}

/// Escape stray `<`, `>` and `&` in `text`
pub fn escape_str(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '<' => {
                let opens_tag = chars.peek().is_some_and(|&(_, next)| {
                    next.is_alphanumeric() || matches!(next, '!' | '?' | '/')
                });
                if opens_tag {
                    in_tag = true;
                    result.push('<');
                } else {
                    result.push_str("&lt;");
                }
            }
            '>' if in_tag => {
                in_tag = false;
                result.push('>');
            }
            '>' => result.push_str("&gt;"),
            '&' if starts_reference(&text[index..]) => result.push('&'),
            '&' => result.push_str("&amp;"),
            other => result.push(other),
        }
    }
    result
}

/// Escape only stray `&`, leaving any markup in `text` as it is
pub fn escape_ampersands(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        if c == '&' && !starts_reference(&text[index..]) {
            result.push_str("&amp;");
        } else {
            result.push(c);
        }
    }
    result
}
