// Licensed under the MIT license. See LICENSE for details.

//! Arithmetic expression parsing and evaluation for `$(( ))`, `((...))`,
//! array subscripts, and `let`/`declare -i` assignments (`spec.md` §4.4).
//!
//! Parsing and evaluation are deliberately separate passes: [`ast::parse`]
//! turns source text into an [`ast::Expr`] with no [`env::Env`] in scope, so
//! malformed expressions fail before anything is assigned; [`eval::eval`]
//! then walks the tree against a caller-supplied [`env::Env`], performing
//! assignments as it goes.

pub mod ast;
pub mod env;
pub mod eval;
mod token;

pub use ast::{parse, Error as ParseError};
pub use env::Env;
pub use eval::{eval, EvalError};
