//! Shell variables: scope stack, attributes, values (`spec.md` "Interpreter
//! state" / "Variable store").
//!
//! A [`Variable`] is a named, possibly-attributed cell. Cells live in a stack
//! of [`Context`]s; the first context (the *base context*) is always
//! present, function calls push a [`Context::Regular`] frame that also holds
//! that call's positional parameters, and builtins that make temporary
//! assignments (e.g. `FOO=bar some_builtin`) push a [`Context::Volatile`]
//! frame that is popped (discarding its assignments) once the command
//! returns.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;
use wsh_syntax::source::Location;

/// Value of a variable: a scalar string or an indexed array of strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

impl Value {
    #[must_use]
    pub fn scalar<S: Into<String>>(value: S) -> Self {
        Value::Scalar(value.into())
    }

    #[must_use]
    pub fn array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    /// Renders the value the way `$name` expands a scalar or the way `"${a[*]}"`
    /// joins an array with the first character of `IFS` (joining with a plain
    /// space here; splitting on `IFS` is `wsh-semantics`'s job, not this
    /// crate's).
    #[must_use]
    pub fn as_scalar(&self) -> Cow<'_, str> {
        match self {
            Value::Scalar(s) => Cow::Borrowed(s),
            Value::Array(a) => Cow::Owned(a.join(" ")),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_owned())
    }
}

/// Case-conversion attribute applied on assignment (`declare -u`/`-l`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseTransform {
    Upper,
    Lower,
}

/// A shell variable cell: its value plus POSIX/bash attributes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// `None` if declared (`declare -i foo`) but never assigned.
    pub value: Option<Value>,
    pub last_assigned_location: Option<Location>,
    pub is_exported: bool,
    pub read_only_location: Option<Location>,
    pub is_integer: bool,
    pub case_transform: Option<CaseTransform>,
    /// Name this variable refers to, if it is a `declare -n` nameref.
    pub nameref_target: Option<String>,
}

impl Variable {
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(Value::scalar(value)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn new_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variable {
            value: Some(Value::array(values)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }

    #[must_use]
    pub fn export(mut self) -> Self {
        self.is_exported = true;
        self
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }

    /// Assigns a new value, applying `case_transform` if set. Fails if the
    /// variable is read-only.
    pub fn assign(&mut self, value: Value, location: Option<Location>) -> Result<(), ReadOnlyError> {
        if let Some(read_only_location) = &self.read_only_location {
            return Err(ReadOnlyError {
                read_only_location: read_only_location.clone(),
            });
        }
        self.value = Some(self.transform(value));
        self.last_assigned_location = location;
        Ok(())
    }

    fn transform(&self, value: Value) -> Value {
        match (self.case_transform, value) {
            (Some(CaseTransform::Upper), Value::Scalar(s)) => Value::Scalar(s.to_uppercase()),
            (Some(CaseTransform::Lower), Value::Scalar(s)) => Value::Scalar(s.to_lowercase()),
            (Some(CaseTransform::Upper), Value::Array(a)) => {
                Value::Array(a.into_iter().map(|s| s.to_uppercase()).collect())
            }
            (Some(CaseTransform::Lower), Value::Array(a)) => {
                Value::Array(a.into_iter().map(|s| s.to_lowercase()).collect())
            }
            (None, value) => value,
        }
    }
}

/// Error returned when assigning to or unsetting a read-only variable.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot assign to read-only variable")]
pub struct ReadOnlyError {
    pub read_only_location: Location,
}

/// Positional parameters of a function or the top-level script (`$1`, `$2`, …).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    pub values: Vec<String>,
}

/// The kind of frame a [`Context`] represents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Context {
    /// A function-call frame; may carry its own positional parameters.
    Regular { positional_params: PositionalParams },
    /// A temporary-assignment frame (`FOO=bar cmd`), discarded on pop.
    Volatile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Regular {
            positional_params: PositionalParams::default(),
        }
    }
}

/// Which frame an assignment or lookup should target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The base (outermost) context — `declare -g`.
    Global,
    /// The innermost context — plain assignment, `local`.
    Local,
    /// The innermost context, understood to be volatile.
    Volatile,
}

/// `variable: None` is a tombstone left by a dynamic `unset` inside a nested
/// context: it masks any cell an outer context holds for the same name until
/// this context pops, without disturbing that outer cell.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Cell {
    variable: Option<Variable>,
    context_index: usize,
}

/// Scoped variable store: a stack of [`Context`]s over a flat name → cell-stack
/// map (cheaper lookup than one `HashMap` per context).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    all: HashMap<String, Vec<Cell>>,
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all: HashMap::new(),
            contexts: vec![Context::default()],
        }
    }
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push_context(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Pops the innermost context, discarding every variable defined in it.
    ///
    /// # Panics
    /// Panics if called on the base context (the stack must never become
    /// empty).
    pub fn pop_context(&mut self) {
        assert!(self.contexts.len() > 1, "cannot pop the base context");
        let popped_index = self.contexts.len() - 1;
        self.contexts.pop();
        self.all.retain(|_, cells| {
            cells.retain(|cell| cell.context_index != popped_index);
            !cells.is_empty()
        });
    }

    #[must_use]
    pub fn context_depth(&self) -> usize {
        self.contexts.len()
    }

    /// Returns the innermost visible variable with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.all.get(name).and_then(|cells| cells.last()).and_then(|cell| cell.variable.as_ref())
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.all.get_mut(name).and_then(|cells| cells.last_mut()).and_then(|cell| cell.variable.as_mut())
    }

    /// Returns a mutable reference to the variable in the context selected by
    /// `scope`, creating an empty one there if none exists yet in that frame
    /// (or reviving a dynamic-unset tombstone left there).
    pub fn get_or_new(&mut self, name: &str, scope: Scope) -> &mut Variable {
        let context_index = match scope {
            Scope::Global => 0,
            Scope::Local | Scope::Volatile => self.contexts.len() - 1,
        };
        let cells = self.all.entry(name.to_string()).or_default();
        match cells.iter().position(|cell| cell.context_index == context_index) {
            Some(pos) if cells[pos].variable.is_some() => {}
            Some(pos) => cells[pos].variable = Some(Variable::default()),
            None => {
                cells.push(Cell {
                    variable: Some(Variable::default()),
                    context_index,
                });
                cells.sort_by_key(|cell| cell.context_index);
            }
        }
        cells
            .iter_mut()
            .find(|cell| cell.context_index == context_index)
            .and_then(|cell| cell.variable.as_mut())
            .expect("just inserted")
    }

    /// Removes the innermost visible cell with the given name. If that cell
    /// belongs to an outer context than the current one, this leaves a
    /// tombstone in the current context instead of touching the outer cell,
    /// so the outer value reappears once this context pops (bash's dynamic
    /// scoping of `unset`). Returns an error (without removing anything) if
    /// the visible cell is read-only.
    pub fn unset(&mut self, name: &str) -> Result<Option<Variable>, ReadOnlyError> {
        let current_context = self.contexts.len() - 1;
        let Entry::Occupied(mut entry) = self.all.entry(name.to_string()) else {
            return Ok(None);
        };
        let cells = entry.get_mut();
        let Some(visible) = cells.last() else {
            entry.remove();
            return Ok(None);
        };
        let Some(visible_variable) = visible.variable.as_ref() else {
            return Ok(None);
        };
        if let Some(read_only_location) = &visible_variable.read_only_location {
            return Err(ReadOnlyError {
                read_only_location: read_only_location.clone(),
            });
        }
        let removed = if visible.context_index == current_context {
            cells.last_mut().and_then(|cell| cell.variable.take())
        } else {
            cells.push(Cell {
                variable: None,
                context_index: current_context,
            });
            None
        };
        Ok(removed)
    }

    /// Iterates over every name visible from the innermost context, along
    /// with its innermost cell. Names masked by a dynamic-unset tombstone are
    /// skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.all.iter().filter_map(|(name, cells)| {
            cells.last().and_then(|cell| cell.variable.as_ref()).map(|variable| (name.as_str(), variable))
        })
    }

    #[must_use]
    pub fn positional_params(&self) -> &[String] {
        for context in self.contexts.iter().rev() {
            if let Context::Regular { positional_params } = context {
                return &positional_params.values;
            }
        }
        &[]
    }

    pub fn set_positional_params(&mut self, values: Vec<String>) {
        for context in self.contexts.iter_mut().rev() {
            if let Context::Regular { positional_params } = context {
                positional_params.values = values;
                return;
            }
        }
    }
}

/// Name of the `IFS` variable and its default value.
pub const IFS: &str = "IFS";
pub const IFS_INITIAL_VALUE: &str = " \t\n";
/// Name of the `HOME` variable.
pub const HOME: &str = "HOME";
/// Name of the `PATH` variable.
pub const PATH: &str = "PATH";
/// Name of the `PWD` variable, kept in sync with the virtual filesystem's
/// current directory by `cd`.
pub const PWD: &str = "PWD";
pub const OLDPWD: &str = "OLDPWD";
/// `getopts` state variables.
pub const OPTIND: &str = "OPTIND";
pub const OPTARG: &str = "OPTARG";
pub const OPTERR: &str = "OPTERR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_assignment_is_visible_through_a_local_context() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign(Value::scalar("outer"), None).unwrap();
        set.push_context(Context::default());
        assert_eq!(set.get("x").unwrap().value, Some(Value::scalar("outer")));
    }

    #[test]
    fn local_assignment_shadows_and_is_discarded_on_pop() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign(Value::scalar("outer"), None).unwrap();
        set.push_context(Context::default());
        set.get_or_new("x", Scope::Local).assign(Value::scalar("inner"), None).unwrap();
        assert_eq!(set.get("x").unwrap().value, Some(Value::scalar("inner")));
        set.pop_context();
        assert_eq!(set.get("x").unwrap().value, Some(Value::scalar("outer")));
    }

    #[test]
    fn read_only_variable_rejects_assignment_and_unset() {
        let mut set = VariableSet::new();
        let location = Location::dummy();
        set.get_or_new("x", Scope::Global)
            .assign(Value::scalar("v"), None)
            .unwrap();
        set.get_mut("x").unwrap().read_only_location = Some(location);
        assert!(set.get_or_new("x", Scope::Global).assign(Value::scalar("other"), None).is_err());
        assert!(set.unset("x").is_err());
    }

    #[test]
    fn positional_params_are_per_regular_context() {
        let mut set = VariableSet::new();
        set.set_positional_params(vec!["a".to_string()]);
        set.push_context(Context::default());
        set.set_positional_params(vec!["b".to_string(), "c".to_string()]);
        assert_eq!(set.positional_params(), ["b", "c"]);
        set.pop_context();
        assert_eq!(set.positional_params(), ["a"]);
    }

    #[test]
    fn dynamic_unset_masks_an_outer_cell_until_the_context_pops() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign(Value::scalar("outer"), None).unwrap();
        set.push_context(Context::default());
        set.get_or_new("x", Scope::Local).assign(Value::scalar("inner"), None).unwrap();
        set.unset("x").unwrap();
        assert!(set.get("x").is_none());
        set.pop_context();
        assert_eq!(set.get("x").unwrap().value, Some(Value::scalar("outer")));
    }

    #[test]
    fn upper_case_transform_applies_on_assignment() {
        let mut set = VariableSet::new();
        let var = set.get_or_new("x", Scope::Global);
        var.case_transform = Some(CaseTransform::Upper);
        var.assign(Value::scalar("abc"), None).unwrap();
        assert_eq!(set.get("x").unwrap().value, Some(Value::scalar("ABC")));
    }
}
