// Licensed under the MIT license. See LICENSE for details.

//! Lexer, parser, and abstract syntax tree for the sandboxed shell
//! interpreter (`spec.md` §3–4).
//!
//! [`parse`] is the only entry point most callers need: it turns a whole
//! script's source text into a [`syntax::Script`]. The tree it returns still
//! carries unexpanded words, arithmetic expressions (from [`wsh_arith`]),
//! and `[[ ]]` conditional expressions ([`cond::CondExpr`]) — expanding and
//! evaluating any of that is `wsh-semantics`'s job, not this crate's.

pub mod cond;
mod parser;
pub mod source;
pub mod syntax;

pub use parser::{parse, parse_text, Error, ErrorCause, PResult};
