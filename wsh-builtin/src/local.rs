//! `local` — declares a function-local variable, optionally assigning it
//! (`spec.md` §4.7). Outside a function call (context depth 1) this
//! behaves like a plain assignment at the base context, matching bash's
//! tolerance of `local` at top level.

use crate::common::usage_error;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::variable::{Scope, Value};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Local;

impl SpecialCommand for Local {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        for operand in &argv[1..] {
            let (name, assigned) = match operand.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (operand.clone(), None),
            };
            let variable = env.variables.get_or_new(&name, Scope::Local);
            if let Some(value) = assigned {
                if let Err(e) = variable.assign(Value::scalar(value), None) {
                    return (SpecialOutcome::error(usage_error("local", e), 1), Signal::None);
                }
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
    use wsh_env::variable::Context;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn declares_in_the_innermost_context() {
        let mut env = env();
        env.variables.push_context(Context::default());
        Local.run(&mut env, &["local".to_string(), "FOO=bar".to_string()]);
        assert_eq!(env.variables.get("FOO").unwrap().value.as_ref().unwrap().as_scalar(), "bar");
        env.variables.pop_context();
        assert!(env.variables.get("FOO").is_none());
    }
}
