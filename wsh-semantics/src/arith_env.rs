//! Adapter letting `wsh-arith` read and write shell variables (`spec.md`
//! §4.4 "Arithmetic evaluator"; shared by `$(( ))`, `(( ))`, `for ((;;))`,
//! and the `${a[i]}` index word).
//!
//! Plain assignment inside an arithmetic expression follows the same
//! dynamically-scoped rule as everywhere else in the interpreter — see
//! [`crate::assign`].

use crate::assign::assign_value;
use std::fmt;
use wsh_env::variable::Value;
use wsh_env::Env;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArithError(pub String);

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Borrows `env` for the duration of one `wsh_arith::eval` call.
pub struct ArithEnv<'a> {
    pub env: &'a mut Env,
}

impl wsh_arith::Env for ArithEnv<'_> {
    type Error = ArithError;

    fn get_variable(&self, name: &str) -> Result<Option<String>, Self::Error> {
        Ok(self
            .env
            .variables
            .get(name)
            .and_then(|v| v.value.as_ref())
            .map(|v| v.as_scalar().into_owned()))
    }

    fn get_element(&self, name: &str, index: i64) -> Result<Option<String>, Self::Error> {
        let Some(variable) = self.env.variables.get(name) else {
            return Ok(None);
        };
        match &variable.value {
            Some(Value::Array(a)) => Ok(normalize_index(index, a.len()).and_then(|i| a.get(i).cloned())),
            Some(Value::Scalar(s)) if index == 0 => Ok(Some(s.clone())),
            _ => Ok(None),
        }
    }

    fn assign_variable(&mut self, name: &str, value: i64) -> Result<(), Self::Error> {
        assign_value(&mut self.env.variables, name, Value::scalar(value.to_string())).map_err(|e| ArithError(e.to_string()))
    }

    fn assign_element(&mut self, name: &str, index: i64, value: i64) -> Result<(), Self::Error> {
        let mut array = match self.env.variables.get(name).and_then(|v| v.value.clone()) {
            Some(Value::Array(a)) => a,
            Some(Value::Scalar(s)) => vec![s],
            None => vec![],
        };
        let idx = normalize_index(index, array.len()).unwrap_or(0);
        if idx >= array.len() {
            array.resize(idx + 1, String::new());
        }
        array[idx] = value.to_string();
        assign_value(&mut self.env.variables, name, Value::Array(array)).map_err(|e| ArithError(e.to_string()))
    }
}

/// Negative indices count from the end, like bash's indexed arrays.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    (resolved >= 0).then_some(resolved as usize)
}

/// Parses and evaluates a complete arithmetic expression against `env`,
/// mapping both stages into [`crate::error::ExpansionError::Arithmetic`].
pub fn eval_arith_str(src: &str, env: &mut Env, location: &wsh_syntax::source::Location) -> crate::error::Result<i64> {
    let expr = wsh_arith::parse(src).map_err(|e| crate::error::ExpansionError::Arithmetic {
        message: e.to_string(),
        location: location.clone(),
    })?;
    eval_arith(&expr, env, location)
}

pub fn eval_arith(expr: &wsh_arith::ast::Expr, env: &mut Env, location: &wsh_syntax::source::Location) -> crate::error::Result<i64> {
    let mut adapter = ArithEnv { env };
    wsh_arith::eval(expr, &mut adapter).map_err(|e| crate::error::ExpansionError::Arithmetic {
        message: e.to_string(),
        location: location.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_syntax::source::Location;
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn assignment_through_arithmetic_is_visible_afterward() {
        let mut env = env();
        let value = eval_arith_str("x = 2 + 3", &mut env, &Location::dummy()).unwrap();
        assert_eq!(value, 5);
        assert_eq!(env.variables.get("x").unwrap().value, Some(Value::scalar("5")));
    }

    #[test]
    fn unset_variable_reads_as_zero() {
        let mut env = env();
        assert_eq!(eval_arith_str("y + 1", &mut env, &Location::dummy()).unwrap(), 1);
    }

    #[test]
    fn division_by_zero_is_reported() {
        let mut env = env();
        assert!(eval_arith_str("1 / 0", &mut env, &Location::dummy()).is_err());
    }

    #[test]
    fn array_element_assignment_negative_index() {
        let mut env = env();
        eval_arith_str("a[0] = 1", &mut env, &Location::dummy()).unwrap();
        eval_arith_str("a[1] = 2", &mut env, &Location::dummy()).unwrap();
        assert_eq!(eval_arith_str("a[-1]", &mut env, &Location::dummy()).unwrap(), 2);
    }
}
