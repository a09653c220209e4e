// Licensed under the MIT license. See LICENSE for details.

//! Quoting of arbitrary strings according to POSIX/bash shell rules.
//!
//! [`quote`] picks the cheapest quoting style that round-trips a string back
//! to a single field when re-parsed:
//!
//! - If the string needs no quoting at all, it is returned unchanged.
//! - Otherwise, if it contains no single quote, it is wrapped in single
//!   quotes.
//! - Otherwise, it is wrapped in double quotes, with `"`, `` ` ``, `$`, and
//!   `\` backslash-escaped.
//!
//! Characters that force quoting: shell metacharacters (`;&|()<>`),
//! whitespace, `$` `` ` `` `\` `"` `'`, `=` `*` `?`, a leading `#` or `~`,
//! and a `{` that precedes a `}` or a `[` that precedes a `]` (both could
//! otherwise be mistaken for brace/bracket expansions).

use std::borrow::Cow::{self, Borrowed, Owned};

/// Quotes `s` so that it expands back to exactly `s` as a single field.
///
/// Returns `Borrowed(s)` when no quoting is needed.
///
/// ```
/// # use std::borrow::Cow::{Borrowed, Owned};
/// # use wsh_quote::quote;
/// assert_eq!(quote("foo"), Borrowed("foo"));
/// assert_eq!(quote(""), Owned::<str>("''".to_owned()));
/// assert_eq!(quote("$foo"), Owned::<str>("'$foo'".to_owned()));
/// ```
pub fn quote(s: &str) -> Cow<'_, str> {
    if !s.is_empty() && !needs_quoting(s) {
        return Borrowed(s);
    }

    if !s.contains('\'') {
        return Owned(format!("'{s}'"));
    }

    let mut out = String::with_capacity(s.len() + 8);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Owned(out)
}

fn needs_quoting(s: &str) -> bool {
    if s.chars().any(char_needs_quoting) {
        return true;
    }
    if matches!(s.chars().next(), Some('#' | '~')) {
        return true;
    }
    if let Some(i) = s.find('{') {
        if s[i + 1..].contains('}') {
            return true;
        }
    }
    if let Some(i) = s.find('[') {
        if s[i + 1..].contains(']') {
            return true;
        }
    }
    false
}

fn char_needs_quoting(c: char) -> bool {
    match c {
        ';' | '&' | '|' | '(' | ')' | '<' | '>' => true,
        '$' | '`' | '\\' | '"' | '\'' | '=' | '*' | '?' => true,
        _ => c.is_whitespace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_passthrough() {
        for s in ["a", "z", "_", "!#%+,-./:@^~foo", "x}", "x]"] {
            assert_eq!(quote(s), Borrowed(s));
        }
    }

    #[test]
    fn single_quoted() {
        assert_eq!(quote(""), Owned::<str>("''".into()));
        assert_eq!(quote(" "), Owned::<str>("' '".into()));
        assert_eq!(quote("{a}"), Owned::<str>("'{a}'".into()));
        assert_eq!(quote("[a]"), Owned::<str>("'[a]'".into()));
    }

    #[test]
    fn double_quoted_when_containing_single_quote() {
        assert_eq!(quote("'"), Owned::<str>("\"'\"".into()));
        assert_eq!(quote("'$foo'"), Owned::<str>("\"'\\$foo'\"".into()));
    }
}
