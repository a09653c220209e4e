//! Shell function table (`spec.md` "Interpreter state — function table").
//!
//! Unlike the teacher, whose function bodies are `async fn`-executed trait
//! objects, this interpreter's executor is synchronous (`SPEC_FULL.md` §5),
//! so a function's body is simply a shared, immutable handle on the AST node
//! the `function` keyword parsed.

use std::collections::HashMap;
use std::rc::Rc;
use wsh_syntax::source::Location;
use wsh_syntax::syntax::CompoundCommand;

/// A defined function: name, body, and provenance/read-only bookkeeping.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    /// Shared with the AST node that defined it — defining a function only
    /// clones this `Rc`, not the command tree.
    pub body: Rc<CompoundCommand>,
    pub origin: Location,
    pub read_only_location: Option<Location>,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>, body: Rc<CompoundCommand>, origin: Location) -> Self {
        Function {
            name: name.into(),
            body,
            origin,
            read_only_location: None,
        }
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// Error returned when (re)defining or removing a read-only function.
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot modify read-only function `{name}`")]
pub struct FunctionReadOnlyError {
    pub name: String,
    pub read_only_location: Location,
}

/// name → [`Function`] table.
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    functions: HashMap<String, Function>,
}

impl FunctionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Defines (or redefines) a function. Fails without modifying the table
    /// if a function of the same name is already read-only.
    pub fn define(&mut self, function: Function) -> Result<(), FunctionReadOnlyError> {
        if let Some(existing) = self.functions.get(&function.name) {
            if let Some(read_only_location) = &existing.read_only_location {
                return Err(FunctionReadOnlyError {
                    name: function.name,
                    read_only_location: read_only_location.clone(),
                });
            }
        }
        self.functions.insert(function.name.clone(), function);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Option<Function>, FunctionReadOnlyError> {
        if let Some(existing) = self.functions.get(name) {
            if let Some(read_only_location) = &existing.read_only_location {
                return Err(FunctionReadOnlyError {
                    name: name.to_string(),
                    read_only_location: read_only_location.clone(),
                });
            }
        }
        Ok(self.functions.remove(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }
}
