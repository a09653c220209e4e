// Licensed under the MIT license. See LICENSE for details.

//! Source positions attached to AST nodes and tokens.
//!
//! Unlike a full source-management layer that tracks included files and
//! alias-expansion history, the sandboxed interpreter only ever parses a
//! single in-memory script, so a [`Location`] is just a byte range plus the
//! 1-based line/column of its start, cheap to copy and to report in
//! diagnostics (`spec.md` §7).

use std::fmt;
use std::ops::Range;

/// A 1-based line and column within the source text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The span of source text that produced an AST node or token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    pub range: Range<usize>,
    pub start: Position,
}

impl Location {
    pub fn dummy() -> Self {
        Location {
            range: 0..0,
            start: Position { line: 1, column: 1 },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Tracks line/column while scanning a source string left to right.
pub struct LineTracker {
    line: u32,
    column: u32,
}

impl LineTracker {
    pub fn new() -> Self {
        LineTracker { line: 1, column: 1 }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}
