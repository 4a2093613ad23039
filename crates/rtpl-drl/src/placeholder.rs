//! Scanner for `@{name}` placeholders in free-form text.
//!
//! A placeholder opens with `@{`, carries a name of at least one character
//! and closes at the first `}` after that character. Names never span a line
//! break; an opener without a matching close is plain text.

use std::ops::Range;

const OPEN: &str = "@{";
const CLOSE: char = '}';

/// A placeholder occurrence: its name and the byte span of the whole `@{..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    pub span: Range<usize>,
}

/// All placeholders in `text`, left to right, without overlap.
pub fn find_all(text: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(OPEN) {
        let start = cursor + offset;
        let name_start = start + OPEN.len();
        match closing_brace(text, name_start) {
            Some(name_end) => {
                found.push(Placeholder {
                    name: &text[name_start..name_end],
                    span: start..name_end + CLOSE.len_utf8(),
                });
                cursor = name_end + CLOSE.len_utf8();
            }
            // `@` is one byte, so the next char boundary follows it.
            None => cursor = start + 1,
        }
    }
    found
}

/// The placeholder that starts exactly at the beginning of `text`, if any.
pub fn leading(text: &str) -> Option<Placeholder<'_>> {
    if !text.starts_with(OPEN) {
        return None;
    }
    let name_end = closing_brace(text, OPEN.len())?;
    Some(Placeholder {
        name: &text[OPEN.len()..name_end],
        span: 0..name_end + CLOSE.len_utf8(),
    })
}

/// Placeholder names in order of appearance, repeats included.
pub fn names(text: &str) -> Vec<&str> {
    find_all(text)
        .into_iter()
        .map(|placeholder| placeholder.name)
        .collect()
}

/// Replace every placeholder with the value `resolve` returns for its name.
///
/// All or nothing: if any name resolves to `None` the whole substitution
/// yields `None`. Values are inserted verbatim.
pub fn substitute_all<F>(text: &str, mut resolve: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for placeholder in find_all(text) {
        let value = resolve(placeholder.name)?;
        out.push_str(&text[last..placeholder.span.start]);
        out.push_str(&value);
        last = placeholder.span.end;
    }
    out.push_str(&text[last..]);
    Some(out)
}

fn closing_brace(text: &str, name_start: usize) -> Option<usize> {
    let mut chars = text[name_start..].char_indices();
    let (_, first) = chars.next()?;
    if is_line_break(first) {
        return None;
    }
    for (idx, ch) in chars {
        if ch == CLOSE {
            return Some(name_start + idx);
        }
        if is_line_break(ch) {
            return None;
        }
    }
    None
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}
