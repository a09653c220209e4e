// Licensed under the MIT license. See LICENSE for details.

//! Variable access abstraction, so this crate never depends on `wsh-env`.

/// Interface the evaluator uses to read and write variables and array
/// elements. `wsh-semantics` implements this over the interpreter's
/// variable store.
pub trait Env {
    type Error: std::fmt::Display;

    /// Returns the value of a scalar variable, or an array's element 0 if
    /// the variable is an array and no index was written, as bash does.
    /// `Ok(None)` means the variable is unset, which evaluates to 0 per
    /// `spec.md` §4.4.
    fn get_variable(&self, name: &str) -> Result<Option<String>, Self::Error>;

    /// Returns the value of `name[index]`. `Ok(None)` means unset.
    fn get_element(&self, name: &str, index: i64) -> Result<Option<String>, Self::Error>;

    fn assign_variable(&mut self, name: &str, value: i64) -> Result<(), Self::Error>;

    fn assign_element(&mut self, name: &str, index: i64, value: i64) -> Result<(), Self::Error>;
}
