//! `readonly` — marks variables read-only, optionally assigning them first
//! (`spec.md` §4.7). `readonly -p` lists read-only variables.

use crate::common::usage_error;
use wsh_env::variable::{Scope, Value};
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;
use wsh_quote::quote;
use wsh_syntax::source::Location;

#[derive(Clone, Copy, Debug)]
pub struct Readonly;

impl SpecialCommand for Readonly {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);

        if flags.contains(&'p') || operands.is_empty() {
            let mut stdout = String::new();
            let mut names: Vec<_> = env.variables.iter().filter(|(_, v)| v.is_read_only()).map(|(n, v)| (n.to_string(), v.clone())).collect();
            names.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, variable) in names {
                match &variable.value {
                    Some(Value::Scalar(s)) => stdout.push_str(&format!("readonly {name}={}\n", quote(s))),
                    Some(Value::Array(_)) | None => stdout.push_str(&format!("readonly {name}\n")),
                }
            }
            return (SpecialOutcome { stdout, ..Default::default() }, Signal::None);
        }

        for operand in operands {
            let (name, assigned) = match operand.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (operand.clone(), None),
            };
            let variable = env.variables.get_or_new(&name, Scope::Local);
            if let Some(value) = assigned {
                if let Err(e) = variable.assign(Value::scalar(value), None) {
                    return (SpecialOutcome::error(usage_error("readonly", e), 1), Signal::None);
                }
            }
            if variable.read_only_location.is_none() {
                variable.read_only_location = Some(Location::dummy());
            }
        }

        (SpecialOutcome::with_status(0), Signal::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn marks_a_variable_read_only() {
        let mut env = env();
        Readonly.run(&mut env, &["readonly".to_string(), "FOO=bar".to_string()]);
        assert!(env.variables.get("FOO").unwrap().is_read_only());
    }

    #[test]
    fn reassigning_a_read_only_variable_fails() {
        let mut env = env();
        Readonly.run(&mut env, &["readonly".to_string(), "FOO=bar".to_string()]);
        let (outcome, _) = Readonly.run(&mut env, &["readonly".to_string(), "FOO=baz".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }
}
