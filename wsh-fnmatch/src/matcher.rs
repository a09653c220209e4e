// Licensed under the MIT license. See LICENSE for details.

//! Backtracking matcher over the pattern [`Atoms`] tree.
//!
//! A regular-expression engine without backreferences or lookaround cannot
//! express the `!(pattern-list)` extended-glob form, so this crate matches
//! directly against the AST (as `spec.md` §9 allows: "implementers may
//! instead build a purpose-built NFA — the contract is set-equality of
//! matches").

use crate::ast::{Atom, Atoms, Bracket, BracketItem};

pub fn is_match(atoms: &[Atom], text: &[char], case_insensitive: bool) -> bool {
    match_seq(atoms, text, case_insensitive)
}

fn chars_eq(a: char, b: char, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.to_lowercase().eq(b.to_lowercase())
    } else {
        a == b
    }
}

fn bracket_matches(bracket: &Bracket, c: char, case_insensitive: bool) -> bool {
    let hit = bracket.items.iter().any(|item| match item {
        BracketItem::Char(x) => chars_eq(*x, c, case_insensitive),
        BracketItem::Range(range) => {
            if case_insensitive {
                range.contains(&c)
                    || c.to_lowercase().any(|lc| range.contains(&lc))
                    || c.to_uppercase().any(|uc| range.contains(&uc))
            } else {
                range.contains(&c)
            }
        }
        BracketItem::Class(class) => class.contains(c),
    });
    hit != bracket.negated
}

/// Matches `atoms` against the whole of `text` (i.e. `atoms` must consume
/// `text` exactly, from start to end).
fn match_seq(atoms: &[Atom], text: &[char], ci: bool) -> bool {
    let Some((first, rest_atoms)) = atoms.split_first() else {
        return text.is_empty();
    };

    match first {
        Atom::Literal(c) => match text.split_first() {
            Some((t, rest_text)) if chars_eq(*c, *t, ci) => match_seq(rest_atoms, rest_text, ci),
            _ => false,
        },
        Atom::AnyChar => match text.split_first() {
            Some((_, rest_text)) => match_seq(rest_atoms, rest_text, ci),
            None => false,
        },
        Atom::Bracket(bracket) => match text.split_first() {
            Some((t, rest_text)) if bracket_matches(bracket, *t, ci) => {
                match_seq(rest_atoms, rest_text, ci)
            }
            _ => false,
        },
        Atom::AnyString => (0..=text.len()).any(|i| match_seq(rest_atoms, &text[i..], ci)),
        Atom::Group { kind, alternatives } => {
            match_group(*kind, alternatives, rest_atoms, text, ci)
        }
    }
}

fn alt_matches_prefix(alt: &Atoms, text: &[char], len: usize, ci: bool) -> bool {
    len <= text.len() && match_seq(alt, &text[..len], ci)
}

fn match_group(
    kind: crate::ast::GroupKind,
    alternatives: &[Atoms],
    rest_atoms: &[Atom],
    text: &[char],
    ci: bool,
) -> bool {
    use crate::ast::GroupKind::*;
    match kind {
        ZeroOrOne => {
            if match_seq(rest_atoms, text, ci) {
                return true;
            }
            (0..=text.len()).any(|len| {
                alternatives
                    .iter()
                    .any(|alt| alt_matches_prefix(alt, text, len, ci))
                    && match_seq(rest_atoms, &text[len..], ci)
            })
        }
        ExactlyOne => (0..=text.len()).any(|len| {
            alternatives
                .iter()
                .any(|alt| alt_matches_prefix(alt, text, len, ci))
                && match_seq(rest_atoms, &text[len..], ci)
        }),
        ZeroOrMore => match_repeat(alternatives, 0, rest_atoms, text, ci),
        OneOrMore => match_repeat(alternatives, 1, rest_atoms, text, ci),
        Negated => (0..=text.len()).any(|len| {
            !alternatives
                .iter()
                .any(|alt| alt_matches_prefix(alt, text, len, ci))
                && match_seq(rest_atoms, &text[len..], ci)
        }),
    }
}

/// Matches zero-or-more (if `min == 0`) or one-or-more (if `min == 1`)
/// repetitions of any alternative, followed by `rest_atoms`.
///
/// Each repetition is required to consume at least one character, which
/// guarantees termination for patterns whose alternatives can match the
/// empty string (e.g. `*(x?)`).
fn match_repeat(
    alternatives: &[Atoms],
    min: usize,
    rest_atoms: &[Atom],
    text: &[char],
    ci: bool,
) -> bool {
    fn go(
        alternatives: &[Atoms],
        count: usize,
        min: usize,
        rest_atoms: &[Atom],
        text: &[char],
        ci: bool,
    ) -> bool {
        if count >= min && match_seq(rest_atoms, text, ci) {
            return true;
        }
        for alt in alternatives {
            for len in 1..=text.len() {
                if match_seq(alt, &text[..len], ci)
                    && go(alternatives, count + 1, min, rest_atoms, &text[len..], ci)
                {
                    return true;
                }
            }
        }
        false
    }
    go(alternatives, 0, min, rest_atoms, text, ci)
}
