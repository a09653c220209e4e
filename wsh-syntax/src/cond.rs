// Licensed under the MIT license. See LICENSE for details.

//! The `[[ ]]` conditional-expression AST (`spec.md` §3, §4.5).
//!
//! Only the shape is parsed here; evaluating file tests, string/numeric
//! comparisons, and `=~` regex matching is `wsh-semantics`'s job.

use crate::syntax::Word;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CondExpr {
    Not(Box<CondExpr>),
    And(Box<CondExpr>, Box<CondExpr>),
    Or(Box<CondExpr>, Box<CondExpr>),
    Unary(UnaryTest, Word),
    Binary(Word, BinaryTest, Word),
    /// A bare word, true iff it expands to a non-empty string.
    Word(Word),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryTest {
    /// `-e`
    Exists,
    /// `-f`
    RegularFile,
    /// `-d`
    Directory,
    /// `-L`/`-h`
    Symlink,
    /// `-r`
    Readable,
    /// `-w`
    Writable,
    /// `-x`
    Executable,
    /// `-s`
    NonEmptyFile,
    /// `-b`
    BlockSpecial,
    /// `-c`
    CharSpecial,
    /// `-p`
    Pipe,
    /// `-S`
    Socket,
    /// `-N`
    ModifiedSinceRead,
    /// `-u`
    SetUid,
    /// `-g`
    SetGid,
    /// `-k`
    Sticky,
    /// `-t`, always false in this environment
    Terminal,
    /// `-z`
    StringEmpty,
    /// `-n`
    StringNonEmpty,
    /// `-o`: named shell option is set
    OptionSet,
    /// `-v`: variable is set
    VariableSet,
    /// `-R`: variable is a nameref
    NameRef,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryTest {
    /// `-nt`
    NewerThan,
    /// `-ot`
    OlderThan,
    /// `-ef`
    SameFile,
    /// `=`/`==`: pattern match in `[[ ]]`
    Eq,
    /// `!=`: pattern match in `[[ ]]`
    Ne,
    /// `<`: lexicographic
    Lt,
    /// `>`: lexicographic
    Gt,
    /// `=~`: extended regular expression match
    RegexMatch,
    /// `-eq`
    NumEq,
    /// `-ne`
    NumNe,
    /// `-lt`
    NumLt,
    /// `-le`
    NumLe,
    /// `-gt`
    NumGt,
    /// `-ge`
    NumGe,
}
