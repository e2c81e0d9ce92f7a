//! LIKE pattern normalisation.
//!
//! Native trees declare their own wildcard, single-character and escape
//! characters per node. Delegates only ever see the canonical form.

pub const WILDCARD: char = '*';
pub const SINGLE_CHAR: char = '?';
pub const ESCAPE: char = '\\';

/// Rewrites `pattern` from the node's special characters to `*`, `?` and `\`.
pub fn normalize_like_pattern(
    pattern: &str,
    wildcard: char,
    single_char: char,
    escape: char,
) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c == escape {
            // A trailing escape escapes itself.
            let escaped = chars.next().unwrap_or(escape);
            push_literal(&mut out, escaped);
        } else if c == wildcard {
            out.push(WILDCARD);
        } else if c == single_char {
            out.push(SINGLE_CHAR);
        } else {
            push_literal(&mut out, c);
        }
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == WILDCARD || c == SINGLE_CHAR || c == ESCAPE {
        out.push(ESCAPE);
    }
    out.push(c);
}

/// Whether a canonical pattern matches every value.
pub fn is_match_all(pattern: &str) -> bool {
    !pattern.is_empty() && pattern.chars().all(|c| c == WILDCARD)
}
