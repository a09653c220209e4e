//! `declare` / `typeset` — declares variables with attributes (`spec.md`
//! §4.7): `-i` integer, `-x` export, `-r` read-only, `-a` array, `-u`/`-l`
//! case transform, `-g` global scope, `-p` print. `-f` lists function
//! definitions by name (bodies are not re-rendered as source text, since
//! this crate has no unparser — only the name is printed, which is enough
//! for `declare -f name` used as an existence check).

use crate::common::usage_error;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::variable::{CaseTransform, Scope, Value};
use wsh_env::Env;
use wsh_syntax::source::Location;

#[derive(Clone, Copy, Debug)]
pub struct Declare;

impl SpecialCommand for Declare {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);

        if flags.contains(&'f') {
            let mut stdout = String::new();
            if operands.is_empty() {
                let mut names: Vec<_> = env.functions.iter().map(|f| f.name.clone()).collect();
                names.sort();
                for name in names {
                    stdout.push_str(&format!("{name}\n"));
                }
            } else {
                for name in operands {
                    if env.functions.get(name).is_none() {
                        return (SpecialOutcome::error(usage_error("declare", format!("{name}: not a function")), 1), Signal::None);
                    }
                    stdout.push_str(&format!("{name}\n"));
                }
            }
            return (SpecialOutcome { stdout, ..Default::default() }, Signal::None);
        }

        if flags.contains(&'p') || operands.is_empty() {
            let mut stdout = String::new();
            let mut names: Vec<_> = env.variables.iter().map(|(n, v)| (n.to_string(), v.clone())).collect();
            names.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, variable) in names {
                let value = variable.value.as_ref().map(|v| v.as_scalar().into_owned()).unwrap_or_default();
                stdout.push_str(&format!("declare -- {name}=\"{value}\"\n"));
            }
            return (SpecialOutcome { stdout, ..Default::default() }, Signal::None);
        }

        let scope = if flags.contains(&'g') { Scope::Global } else { Scope::Local };

        for operand in operands {
            let (name, assigned) = match operand.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (operand.clone(), None),
            };
            let variable = env.variables.get_or_new(&name, scope);

            if flags.contains(&'i') {
                variable.is_integer = true;
            }
            if flags.contains(&'x') {
                variable.is_exported = true;
            }
            if flags.contains(&'u') {
                variable.case_transform = Some(CaseTransform::Upper);
            }
            if flags.contains(&'l') {
                variable.case_transform = Some(CaseTransform::Lower);
            }

            let value = if flags.contains(&'a') {
                match assigned {
                    Some(v) => Value::array(v.split(' ').filter(|s| !s.is_empty()).map(str::to_string)),
                    None => Value::array(Vec::<String>::new()),
                }
            } else if let Some(v) = assigned {
                Value::scalar(v)
            } else {
                continue;
            };

            if let Err(e) = variable.assign(value, None) {
                return (SpecialOutcome::error(usage_error("declare", e), 1), Signal::None);
            }

            if flags.contains(&'r') {
                variable.read_only_location = Some(Location::dummy());
            }
        }

        (SpecialOutcome::with_status(0), Signal::None)
    }
}
