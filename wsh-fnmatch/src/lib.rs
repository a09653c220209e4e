// Licensed under the MIT license. See LICENSE for details.

//! Globbing / `case` pattern matching shared by pathname expansion and
//! `case` statements (`spec.md` §4.3 step 7, §4.6 `case`, §9).
//!
//! Supported syntax:
//!
//! - any single character (`?`), any character sequence (`*`)
//! - bracket expressions (`[...]`) with character literals, ranges
//!   (`a-z`), complement (`[!...]` / `[^...]`), POSIX character classes
//!   (`[:alpha:]`), and `[.x.]`/`[=x=]` falling back to matching their
//!   literal spelling (no locale support)
//! - extended-glob groups when enabled: `?(...)`, `*(...)`, `+(...)`,
//!   `@(...)`, `!(...)`
//!
//! Matching is done directly against the parsed pattern tree rather than by
//! compiling to a backtracking-free regex engine, since `!(...)` has no
//! direct translation without lookaround (see `matcher` module docs).

mod ast;
mod matcher;
mod parse;

pub use ast::{Bracket, BracketItem, CharClass, GroupKind};
pub use parse::Config;

use ast::Atoms;

/// A single character of a pattern, tagged with whether it came from a
/// quoted part of the source word.
///
/// A `Literal` character is matched verbatim even if it would otherwise be
/// a pattern metacharacter (`*`, `?`, `[`, `(`, `|`, `)`, `!`, `@`, `+`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PatternChar {
    Normal(char),
    Literal(char),
}

/// Error parsing a pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unterminated bracket expression")]
    UnterminatedBracket,
    #[error("invalid character range in bracket expression")]
    InvalidRange,
    #[error("unknown character class")]
    UnknownClass,
    #[error("unterminated extended-glob group")]
    UnterminatedGroup,
}

/// A compiled pattern, ready to be matched against candidate strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pattern {
    atoms: Atoms,
    case_insensitive: bool,
}

impl Pattern {
    /// Parses `pattern` (as a plain, unquoted string — every character is
    /// significant to the pattern syntax) with the given `config`.
    pub fn parse(pattern: &str, config: Config) -> Result<Self, Error> {
        Self::parse_chars(pattern.chars().map(PatternChar::Normal), config, false)
    }

    /// Parses a sequence of [`PatternChar`]s, as produced by the caller
    /// from a [`Word`](https://docs.rs/wsh-syntax)'s parts, preserving
    /// which source characters were quoted.
    pub fn parse_chars<I>(chars: I, config: Config, case_insensitive: bool) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        I::IntoIter: Clone,
    {
        let atoms = parse::parse(chars, config)?;
        Ok(Pattern {
            atoms,
            case_insensitive,
        })
    }

    /// Returns whether `candidate` matches this pattern in its entirety.
    pub fn is_match(&self, candidate: &str) -> bool {
        let text: Vec<char> = candidate.chars().collect();
        matcher::is_match(&self.atoms, &text, self.case_insensitive)
    }

    /// Returns true if the pattern, read literally, starts with a dot —
    /// used by callers implementing `dotglob`/`globskipdots` to decide
    /// whether a pattern should be allowed to match a leading-dot entry
    /// even when the option is off (an explicit leading `.` in the pattern
    /// always may match a dotfile).
    pub fn literal_leading_dot(&self) -> bool {
        matches!(self.atoms.first(), Some(ast::Atom::Literal('.')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, candidate: &str) -> bool {
        Pattern::parse(pattern, Config::default())
            .unwrap()
            .is_match(candidate)
    }

    fn m_ext(pattern: &str, candidate: &str) -> bool {
        Pattern::parse(
            pattern,
            Config {
                extended_glob: true,
            },
        )
        .unwrap()
        .is_match(candidate)
    }

    #[test]
    fn literal() {
        assert!(m("abc", "abc"));
        assert!(!m("abc", "abd"));
    }

    #[test]
    fn any_char_and_string() {
        assert!(m("a?c", "abc"));
        assert!(!m("a?c", "ac"));
        assert!(m("a*c", "abbbc"));
        assert!(m("a*c", "ac"));
        assert!(m("*", ""));
    }

    #[test]
    fn bracket() {
        assert!(m("[abc]", "b"));
        assert!(!m("[abc]", "d"));
        assert!(m("[!abc]", "d"));
        assert!(m("[a-z]", "m"));
        assert!(m("[[:digit:]]", "5"));
        assert!(!m("[[:digit:]]", "x"));
    }

    #[test]
    fn case_insensitive() {
        let p = Pattern::parse_chars(
            "ABC".chars().map(PatternChar::Normal),
            Config::default(),
            true,
        )
        .unwrap();
        assert!(p.is_match("abc"));
    }

    #[test]
    fn literal_chars_bypass_meta() {
        let chars = vec![
            PatternChar::Normal('a'),
            PatternChar::Literal('*'),
            PatternChar::Normal('b'),
        ];
        let p = Pattern::parse_chars(chars, Config::default(), false).unwrap();
        assert!(p.is_match("a*b"));
        assert!(!p.is_match("axxb"));
    }

    #[test]
    fn extglob_groups() {
        assert!(m_ext("?(abc)", ""));
        assert!(m_ext("?(abc)", "abc"));
        assert!(!m_ext("?(abc)", "abcabc"));
        assert!(m_ext("*(ab)", "ababab"));
        assert!(m_ext("+(ab)", "ab"));
        assert!(!m_ext("+(ab)", ""));
        assert!(m_ext("@(foo|bar)", "bar"));
        assert!(!m_ext("@(foo|bar)", "baz"));
        assert!(m_ext("!(foo)", "bar"));
        assert!(!m_ext("!(foo)", "foo"));
    }

    #[test]
    fn without_extglob_metachars_are_literal() {
        assert!(m("a+b", "a+b"));
        assert!(m("a@b", "a@b"));
    }
}
