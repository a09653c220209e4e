//! `unset` — removes a variable or function (`spec.md` §4.7). `-f` targets
//! the function table instead of the variable table; `-v` is accepted for
//! symmetry but is also the default.

use crate::common::usage_error;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Unset;

impl SpecialCommand for Unset {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);
        let target_functions = flags.contains(&'f');

        for name in operands {
            if target_functions {
                if let Err(e) = env.functions.remove(name) {
                    return (SpecialOutcome::error(usage_error("unset", e), 1), Signal::None);
                }
            } else if let Err(e) = env.variables.unset(name) {
                return (SpecialOutcome::error(usage_error("unset", e), 1), Signal::None);
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
    use wsh_env::variable::{Scope, Value};

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn removes_a_variable() {
        let mut env = env();
        env.variables.get_or_new("FOO", Scope::Local).assign(Value::scalar("bar"), None).unwrap();
        let (outcome, _) = Unset.run(&mut env, &["unset".to_string(), "FOO".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert!(env.variables.get("FOO").is_none());
    }

    #[test]
    fn fails_to_unset_a_read_only_variable() {
        let mut env = env();
        env.variables.get_or_new("FOO", Scope::Local).assign(Value::scalar("bar"), None).unwrap();
        let origin = wsh_syntax::source::Location::dummy();
        env.variables.get_mut("FOO").unwrap().read_only_location = Some(origin);
        let (outcome, _) = Unset.run(&mut env, &["unset".to_string(), "FOO".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }
}
