//! `export` — marks variables exported, optionally assigning them
//! (`spec.md` §4.7). `export -p` lists exported variables in a re-runnable
//! form, the same convention `declare -p`/`readonly -p` use.

use crate::common::usage_error;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::variable::{Scope, Value};
use wsh_env::Env;
use wsh_quote::quote;

#[derive(Clone, Copy, Debug)]
pub struct Export;

impl SpecialCommand for Export {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);

        if flags.contains(&'p') || operands.is_empty() {
            let mut stdout = String::new();
            let mut names: Vec<_> = env.variables.iter().filter(|(_, v)| v.is_exported).map(|(n, v)| (n.to_string(), v.clone())).collect();
            names.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, variable) in names {
                match &variable.value {
                    Some(Value::Scalar(s)) => stdout.push_str(&format!("export {name}={}\n", quote(s))),
                    Some(Value::Array(_)) | None => stdout.push_str(&format!("export {name}\n")),
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
                    return (SpecialOutcome::error(usage_error("export", e), 1), Signal::None);
                }
            }
            variable.is_exported = true;
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
    fn exports_an_existing_variable() {
        let mut env = env();
        env.variables.get_or_new("FOO", Scope::Local).assign(Value::scalar("bar"), None).unwrap();
        let (outcome, _) = Export.run(&mut env, &["export".to_string(), "FOO".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert!(env.variables.get("FOO").unwrap().is_exported);
    }

    #[test]
    fn export_with_assignment_sets_value_and_exports() {
        let mut env = env();
        let (outcome, _) = Export.run(&mut env, &["export".to_string(), "FOO=bar".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        let variable = env.variables.get("FOO").unwrap();
        assert!(variable.is_exported);
        assert_eq!(variable.value.as_ref().unwrap().as_scalar(), "bar");
    }
}
