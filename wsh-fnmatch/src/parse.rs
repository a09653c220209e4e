// Licensed under the MIT license. See LICENSE for details.

//! Pattern parser: turns a stream of [`PatternChar`]s into an [`Atoms`] tree.

use crate::ast::{Atom, Atoms, Bracket, BracketItem, CharClass, GroupKind};
use crate::{Error, PatternChar};
use std::iter::Peekable;

/// Parser configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Whether `?()`, `*()`, `+()`, `@()`, `!()` groups are recognized.
    pub extended_glob: bool,
}

struct Parser<I: Iterator<Item = PatternChar> + Clone> {
    chars: Peekable<I>,
    config: Config,
}

/// Parses `chars` into a pattern [`Atoms`] tree.
pub fn parse<I>(chars: I, config: Config) -> Result<Atoms, Error>
where
    I: IntoIterator<Item = PatternChar>,
    I::IntoIter: Clone,
{
    let mut parser = Parser {
        chars: chars.into_iter().peekable(),
        config,
    };
    let atoms = parser.parse_atoms(false)?;
    Ok(atoms)
}

impl<I: Iterator<Item = PatternChar> + Clone> Parser<I> {
    /// Parses atoms until end of input, or until an unquoted `)` if
    /// `in_group` is true (the `)` itself is NOT consumed).
    fn parse_atoms(&mut self, in_group: bool) -> Result<Atoms, Error> {
        let mut atoms = Vec::new();
        loop {
            match self.chars.peek() {
                None => break,
                Some(PatternChar::Normal(')')) | Some(PatternChar::Normal('|')) if in_group => {
                    break;
                }
                _ => {}
            }
            atoms.push(self.parse_one()?);
        }
        Ok(atoms)
    }

    fn group_kind(c: char) -> Option<GroupKind> {
        Some(match c {
            '?' => GroupKind::ZeroOrOne,
            '*' => GroupKind::ZeroOrMore,
            '+' => GroupKind::OneOrMore,
            '@' => GroupKind::ExactlyOne,
            '!' => GroupKind::Negated,
            _ => return None,
        })
    }

    fn parse_one(&mut self) -> Result<Atom, Error> {
        let pc = self.chars.next().expect("checked by caller");
        let c = match pc {
            PatternChar::Literal(c) => return Ok(Atom::Literal(c)),
            PatternChar::Normal(c) => c,
        };

        if self.config.extended_glob {
            if let Some(kind) = Self::group_kind(c) {
                if matches!(self.chars.peek(), Some(PatternChar::Normal('('))) {
                    self.chars.next();
                    return self.parse_group(kind);
                }
            }
        }

        match c {
            '?' => Ok(Atom::AnyChar),
            '*' => Ok(Atom::AnyString),
            '[' => self.parse_bracket(),
            other => Ok(Atom::Literal(other)),
        }
    }

    fn parse_group(&mut self, kind: GroupKind) -> Result<Atom, Error> {
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_atoms(true)?);
            match self.chars.next() {
                Some(PatternChar::Normal('|')) => continue,
                Some(PatternChar::Normal(')')) => break,
                _ => return Err(Error::UnterminatedGroup),
            }
        }
        Ok(Atom::Group { kind, alternatives })
    }

    fn parse_bracket(&mut self) -> Result<Atom, Error> {
        let negated = match self.chars.peek() {
            Some(PatternChar::Normal('!')) | Some(PatternChar::Normal('^')) => {
                self.chars.next();
                true
            }
            _ => false,
        };

        let mut items = Vec::new();
        let mut first = true;
        loop {
            let next = self.chars.peek().copied();
            match next {
                None => return Err(Error::UnterminatedBracket),
                Some(PatternChar::Normal(']')) if !first => {
                    self.chars.next();
                    break;
                }
                _ => {}
            }
            first = false;

            if matches!(next, Some(PatternChar::Normal('['))) {
                if let Some(item) = self.try_parse_class_like()? {
                    items.push(item);
                    continue;
                }
            }

            let lo = self.next_bracket_char()?;
            if matches!(self.chars.peek(), Some(PatternChar::Normal('-')))
                && !matches!(self.peek_after_dash(), Some(']') | None)
            {
                self.chars.next(); // consume '-'
                let hi = self.next_bracket_char()?;
                if hi < lo {
                    return Err(Error::InvalidRange);
                }
                items.push(BracketItem::Range(lo..=hi));
            } else {
                items.push(BracketItem::Char(lo));
            }
        }

        Ok(Atom::Bracket(Bracket { negated, items }))
    }

    /// Peeks at the character that would follow a `-` without consuming
    /// anything (used to decide whether `-` starts a range or is literal).
    fn peek_after_dash(&mut self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next(); // the '-' itself
        clone.next().map(|pc| match pc {
            PatternChar::Normal(c) | PatternChar::Literal(c) => c,
        })
    }

    fn next_bracket_char(&mut self) -> Result<char, Error> {
        match self.chars.next() {
            Some(PatternChar::Normal(c)) | Some(PatternChar::Literal(c)) => Ok(c),
            None => Err(Error::UnterminatedBracket),
        }
    }

    /// Tries to parse `[:class:]`, `[.symbol.]`, or `[=equiv=]`. Returns
    /// `Ok(None)` if the lookahead is a plain `[` character instead.
    fn try_parse_class_like(&mut self) -> Result<Option<BracketItem>, Error> {
        let mut clone = self.chars.clone();
        let Some(PatternChar::Normal('[')) = clone.next() else {
            return Ok(None);
        };
        let delim = match clone.next() {
            Some(PatternChar::Normal(d @ (':' | '.' | '='))) => d,
            _ => return Ok(None),
        };
        let mut name = String::new();
        loop {
            match clone.next() {
                Some(PatternChar::Normal(c)) if c == delim => {
                    if matches!(clone.next(), Some(PatternChar::Normal(']'))) {
                        break;
                    } else {
                        return Ok(None);
                    }
                }
                Some(PatternChar::Normal(c)) | Some(PatternChar::Literal(c)) => name.push(c),
                None => return Err(Error::UnterminatedBracket),
            }
        }
        self.chars = clone;
        match delim {
            ':' => {
                let class = CharClass::by_name(&name).ok_or(Error::UnknownClass)?;
                Ok(Some(BracketItem::Class(class)))
            }
            // Collating symbols and equivalence classes are not
            // locale-aware in this implementation: they match only the
            // literal character sequence they spell out, same as the
            // POSIX "C" locale fallback.
            _ => {
                if name.chars().count() == 1 {
                    Ok(Some(BracketItem::Char(name.chars().next().unwrap())))
                } else {
                    Err(Error::UnknownClass)
                }
            }
        }
    }
}
