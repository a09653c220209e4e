//! `alias` — defines or lists aliases (`spec.md` §3 "Alias table", §4.7).
//! `-g` defines a global alias (eligible for expansion in any word
//! position, not just command position — see `alias_expand`). With no
//! operands, or operands with no `=`, lists the matching alias
//! definitions in re-runnable form.

use wsh_env::alias::{Glossary, HashEntry};
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;
use wsh_quote::quote;
use wsh_syntax::source::Location;

#[derive(Clone, Copy, Debug)]
pub struct Alias;

impl SpecialCommand for Alias {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);
        let global = flags.contains(&'g');

        if operands.is_empty() {
            return (list(env), Signal::None);
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_status = 0;

        for operand in operands {
            match operand.split_once('=') {
                Some((name, replacement)) => {
                    env.aliases.replace(HashEntry::new(name.to_string(), replacement.to_string(), global, Location::dummy()));
                }
                None => match env.aliases.look_up(operand) {
                    Some(alias) => stdout.push_str(&format!("alias {}={}\n", alias.name, quote(&alias.replacement))),
                    None => {
                        stderr.push_str(&format!("wsh: alias: {operand}: not found\n"));
                        exit_status = 1;
                    }
                },
            }
        }

        (SpecialOutcome { stdout, stderr, exit_status }, Signal::None)
    }
}

fn list(env: &Env) -> SpecialOutcome {
    let mut entries: Vec<_> = env.aliases.iter().map(|e| e.0.clone()).collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let mut stdout = String::new();
    for alias in entries {
        stdout.push_str(&format!("alias {}={}\n", alias.name, quote(&alias.replacement)));
    }
    SpecialOutcome { stdout, ..Default::default() }
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
    fn defines_an_alias() {
        let mut env = env();
        Alias.run(&mut env, &["alias".to_string(), "ll=ls -l".to_string()]);
        assert_eq!(env.aliases.look_up("ll").unwrap().replacement, "ls -l");
    }

    #[test]
    fn global_flag_marks_the_alias_global() {
        let mut env = env();
        Alias.run(&mut env, &["alias".to_string(), "-g".to_string(), "X=hello".to_string()]);
        assert!(env.aliases.look_up("X").unwrap().global);
    }

    #[test]
    fn prints_an_existing_alias_definition() {
        let mut env = env();
        Alias.run(&mut env, &["alias".to_string(), "ll=ls -l".to_string()]);
        let (outcome, _) = Alias.run(&mut env, &["alias".to_string(), "ll".to_string()]);
        assert_eq!(outcome.stdout, "alias ll='ls -l'\n");
    }
}
