//! Shared fatal-error type for the expansion pipeline and condition
//! evaluator (`spec.md` §7 "Error handling design").
//!
//! Most expansion problems are *not* represented here: an unset variable
//! read without `nounset`, a no-match glob without `failglob`, and a failed
//! command substitution all recover silently per `spec.md` §4.3/§7 (to an
//! empty field, the literal pattern, or whatever was captured,
//! respectively) — callers never see an [`Error`] for those. This type is
//! only for the cases `spec.md` calls fatal: `${x:?msg}`, a `nounset`
//! violation, a malformed arithmetic expression, and `failglob`.

use thiserror::Error;
use wsh_syntax::source::Location;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExpansionError {
    #[error("{name}: parameter not set")]
    NounsetViolation { name: String, location: Location },
    #[error("{name}: {message}")]
    RequiredSubstitution {
        name: String,
        message: String,
        location: Location,
    },
    #[error("{message}")]
    Arithmetic { message: String, location: Location },
    #[error("no match: {pattern}")]
    FailGlob { pattern: String, location: Location },
}

impl ExpansionError {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            ExpansionError::NounsetViolation { location, .. }
            | ExpansionError::RequiredSubstitution { location, .. }
            | ExpansionError::Arithmetic { location, .. }
            | ExpansionError::FailGlob { location, .. } => location,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExpansionError>;
