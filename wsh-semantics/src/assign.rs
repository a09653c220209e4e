//! Applying a value to a variable (`spec.md` §3 "Interpreter state" /
//! §4.6 "Functions": "Local variables declared with `local`/`declare`
//! without `-g` live in the frame; readonly cells cannot be overridden").
//!
//! Plain assignment (`X=Y`, `$(( x = 1 ))`, a `for` loop's binding) updates
//! whatever cell is already visible for that name — bash's ordinary
//! assignments are dynamically scoped, reaching through function frames to
//! whatever outer cell exists, and only `local`/`declare` force a
//! frame-local cell. [`assign_scalar`]/[`assign_array`] model that; the
//! `local`/`declare` builtins instead call `VariableSet::get_or_new` with
//! `Scope::Local` directly.

use wsh_env::variable::{ReadOnlyError, Scope, Value, VariableSet};

pub fn assign_scalar(variables: &mut VariableSet, name: &str, value: String) -> Result<(), ReadOnlyError> {
    assign_value(variables, name, Value::Scalar(value))
}

pub fn assign_array(variables: &mut VariableSet, name: &str, values: Vec<String>) -> Result<(), ReadOnlyError> {
    assign_value(variables, name, Value::Array(values))
}

pub fn assign_value(variables: &mut VariableSet, name: &str, value: Value) -> Result<(), ReadOnlyError> {
    if let Some(variable) = variables.get_mut(name) {
        variable.assign(value, None)
    } else {
        variables.get_or_new(name, Scope::Global).assign(value, None)
    }
}

/// Appends to an existing scalar/array (`name+=value`), or behaves like a
/// plain assignment if `name` is not yet set.
pub fn append_scalar(variables: &mut VariableSet, name: &str, value: &str) -> Result<(), ReadOnlyError> {
    let combined = match variables.get(name).and_then(|v| v.value.as_ref()) {
        Some(Value::Scalar(existing)) => format!("{existing}{value}"),
        Some(Value::Array(existing)) => {
            let mut a = existing.clone();
            if let Some(last) = a.last_mut() {
                last.push_str(value);
            } else {
                a.push(value.to_string());
            }
            return assign_array(variables, name, a);
        }
        None => value.to_string(),
    };
    assign_scalar(variables, name, combined)
}

pub fn append_array(variables: &mut VariableSet, name: &str, values: Vec<String>) -> Result<(), ReadOnlyError> {
    let mut combined = match variables.get(name).and_then(|v| v.value.as_ref()) {
        Some(Value::Array(existing)) => existing.clone(),
        Some(Value::Scalar(existing)) => vec![existing.clone()],
        None => vec![],
    };
    combined.extend(values);
    assign_array(variables, name, combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_syntax::source::Location;

    #[test]
    fn plain_assignment_reaches_through_a_nested_context() {
        let mut variables = VariableSet::new();
        assign_scalar(&mut variables, "x", "outer".to_string()).unwrap();
        variables.push_context(wsh_env::variable::Context::default());
        assign_scalar(&mut variables, "x", "inner".to_string()).unwrap();
        variables.pop_context();
        assert_eq!(variables.get("x").unwrap().value, Some(Value::scalar("inner")));
    }

    #[test]
    fn append_scalar_concatenates() {
        let mut variables = VariableSet::new();
        assign_scalar(&mut variables, "x", "a".to_string()).unwrap();
        append_scalar(&mut variables, "x", "b").unwrap();
        assert_eq!(variables.get("x").unwrap().value, Some(Value::scalar("ab")));
    }

    #[test]
    fn assignment_to_read_only_fails() {
        let mut variables = VariableSet::new();
        assign_scalar(&mut variables, "x", "a".to_string()).unwrap();
        variables.get_mut("x").unwrap().read_only_location = Some(Location::dummy());
        assert!(assign_scalar(&mut variables, "x", "b".to_string()).is_err());
    }
}
