// Licensed under the MIT license. See LICENSE for details.

//! Recursive-descent parser, from script down to individual words
//! (`spec.md` §4.1–4.2).
//!
//! This combines lexing and parsing in a single left-to-right scan over the
//! whole source string rather than a separate token-stream pass: the shell
//! grammar is context-sensitive enough (heredoc bodies captured from
//! following lines, command substitutions nested to arbitrary depth, `[[ ]]`
//! switching word-terminator rules) that a clean token/parse split buys
//! little. [`Parser`] exposes the char-level scanning primitives used by
//! [`lex`], [`word`], [`command`], [`compound_command`], and [`cond`].

mod command;
mod compound_command;
mod cond;
mod lex;
mod word;

use crate::source::{LineTracker, Location};
use crate::syntax::Script;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ErrorCause {
    #[error("unterminated single-quoted string")]
    UnterminatedSingleQuote,
    #[error("unterminated double-quoted string")]
    UnterminatedDoubleQuote,
    #[error("unterminated `{0}`")]
    UnterminatedSubstitution(&'static str),
    #[error("{0}")]
    Nested(Box<Error>),
    #[error("unterminated here-document delimited by `{0}`")]
    UnterminatedHeredoc(String),
    #[error("unknown operator")]
    UnknownOperator,
    #[error("expected a word")]
    ExpectedWord,
    #[error("expected keyword `{0}`")]
    ExpectedKeyword(&'static str),
    #[error("expected `{0}`")]
    ExpectedToken(&'static str),
    #[error("empty command")]
    EmptyCommand,
    #[error("invalid assignment")]
    InvalidAssignment,
    #[error("invalid arithmetic expression: {0}")]
    Arithmetic(#[from] wsh_arith::ParseError),
    #[error("invalid redirection")]
    InvalidRedirection,
    #[error("`case` pattern list must end with `)`")]
    InvalidCasePattern,
    #[error("unexpected end of input")]
    UnexpectedEof,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

pub type PResult<T> = Result<T, Error>;

/// Parses a complete script. All [`Location`]s in the returned tree are
/// byte ranges into `src`.
pub fn parse(src: &str) -> PResult<Script> {
    let mut parser = Parser::new(src);
    let script = parser.script(&[])?;
    parser.skip_blanks_and_newlines();
    if let Some(c) = parser.peek_char() {
        return Err(parser.error_at(parser.pos, ErrorCause::UnknownOperator, (c as u8) as usize));
    }
    Ok(script)
}

/// Parses `src` the way the inside of a double-quoted word is scanned:
/// backslash escapes of `\`/`$`/`` ` ``, `$`-expansions, and backquoted
/// command substitutions are recognized, but there is no closing quote to
/// wait for. Used for here-document bodies whose delimiter was unquoted
/// (`spec.md` §4.1 "heredocs with an unquoted delimiter expand like a
/// double-quoted body").
pub fn parse_text(src: &str) -> PResult<Vec<crate::syntax::TextUnit>> {
    let mut parser = Parser::new(src);
    parser.text_to_eof()
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
    tracker_pos: usize,
    tracker: LineTracker,
    /// Alias expansions currently "in flight", to guard against unbounded
    /// recursive re-expansion (`spec.md` §4.1).
    pub(crate) alias_guard: Vec<String>,
    /// Here-document bodies declared on the current logical line, captured
    /// once the terminating newline is reached (`spec.md` §4.1).
    pending_heredocs: Vec<lex::PendingHeredoc>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            src,
            chars: src.char_indices().peekable(),
            pos: 0,
            tracker_pos: 0,
            tracker: LineTracker::new(),
            alias_guard: Vec::new(),
            pending_heredocs: Vec::new(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.pos = i + c.len_utf8();
        Some(c)
    }

    fn eof(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Advances the line tracker up to (not including) the current byte
    /// position, so [`Self::position`] reflects `self.pos`.
    fn sync_tracker(&mut self) {
        for c in self.src[self.tracker_pos..self.pos].chars() {
            self.tracker.advance(c);
        }
        self.tracker_pos = self.pos;
    }

    fn position(&mut self) -> crate::source::Position {
        self.sync_tracker();
        self.tracker.position()
    }

    fn location_from(&mut self, start: usize) -> Location {
        let start_pos = {
            let saved = self.pos;
            self.pos = start;
            self.tracker_pos = self.tracker_pos.min(start);
            let p = self.position();
            self.pos = saved;
            p
        };
        Location {
            range: start..self.pos,
            start: start_pos,
        }
    }

    fn error_at(&mut self, start: usize, cause: ErrorCause, end: usize) -> Error {
        let _ = end;
        Error {
            cause,
            location: self.location_from(start),
        }
    }

    fn error_here(&mut self, cause: ErrorCause) -> Error {
        let pos = self.pos;
        self.error_at(pos, cause, pos)
    }

    fn is_blank(c: char) -> bool {
        c == ' ' || c == '\t'
    }

    /// Consumes blanks and backslash-newline line continuations.
    fn skip_blanks(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if Self::is_blank(c) => {
                    self.bump();
                }
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek_char(), None | Some('\n')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_blanks_and_newlines(&mut self) {
        loop {
            self.skip_blanks();
            if matches!(self.peek_char(), Some('\n')) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Saves enough state to backtrack a failed speculative parse (used for
    /// assignment/function-name lookahead, which share a prefix with plain
    /// words).
    fn checkpoint(&self) -> (usize, Peekable<CharIndices<'a>>) {
        (self.pos, self.chars.clone())
    }

    fn restore(&mut self, checkpoint: (usize, Peekable<CharIndices<'a>>)) {
        self.pos = checkpoint.0;
        self.chars = checkpoint.1;
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }

    fn slice_from(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }
}
