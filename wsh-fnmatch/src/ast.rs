// Licensed under the MIT license. See LICENSE for details.

//! Abstract syntax tree for globbing / `case` patterns.

use std::ops::RangeInclusive;

/// Named POSIX character class recognized inside a bracket expression
/// (`[:alpha:]` and friends).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CharClass {
    Alpha,
    Digit,
    Alnum,
    Upper,
    Lower,
    Space,
    Blank,
    Punct,
    Cntrl,
    Graph,
    Print,
    Xdigit,
}

impl CharClass {
    pub(crate) fn by_name(name: &str) -> Option<Self> {
        Some(match name {
            "alpha" => Self::Alpha,
            "digit" => Self::Digit,
            "alnum" => Self::Alnum,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "space" => Self::Space,
            "blank" => Self::Blank,
            "punct" => Self::Punct,
            "cntrl" => Self::Cntrl,
            "graph" => Self::Graph,
            "print" => Self::Print,
            "xdigit" => Self::Xdigit,
            _ => return None,
        })
    }

    pub(crate) fn contains(self, c: char) -> bool {
        match self {
            Self::Alpha => c.is_alphabetic(),
            Self::Digit => c.is_ascii_digit(),
            Self::Alnum => c.is_alphanumeric(),
            Self::Upper => c.is_uppercase(),
            Self::Lower => c.is_lowercase(),
            Self::Space => c.is_whitespace(),
            Self::Blank => c == ' ' || c == '\t',
            Self::Punct => c.is_ascii_punctuation(),
            Self::Cntrl => c.is_control(),
            Self::Graph => !c.is_whitespace() && !c.is_control() && c != '\u{0}',
            Self::Print => !c.is_control(),
            Self::Xdigit => c.is_ascii_hexdigit(),
        }
    }
}

/// A single element of a bracket expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    Char(char),
    Range(RangeInclusive<char>),
    Class(CharClass),
}

/// A `[...]` bracket expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression started with `!` or `^`.
    pub negated: bool,
    pub items: Vec<BracketItem>,
}

/// Extended-glob group introducer (`spec.md` §4.3 step 7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupKind {
    /// `?(...)`: zero or one occurrence.
    ZeroOrOne,
    /// `*(...)`: zero or more occurrences.
    ZeroOrMore,
    /// `+(...)`: one or more occurrences.
    OneOrMore,
    /// `@(...)`: exactly one of the alternatives.
    ExactlyOne,
    /// `!(...)`: anything that does not match any alternative.
    Negated,
}

/// A pattern is a sequence of atoms.
pub type Atoms = Vec<Atom>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// A character that must match literally (verbatim text, or a quoted
    /// source character that lost its special meaning).
    Literal(char),
    /// `?`: any single character.
    AnyChar,
    /// `*`: any sequence of characters, including none.
    AnyString,
    /// A bracket expression.
    Bracket(Bracket),
    /// An extended-glob group with one or more `|`-separated alternatives.
    Group {
        kind: GroupKind,
        alternatives: Vec<Atoms>,
    },
}
