//! `trap` — registers or lists trap actions (`spec.md` §4.7). Only `EXIT`
//! and `ERR` are ever actually invoked by the executor; named signals are
//! recorded and printed by `trap -p` but never delivered, per
//! [`wsh_env::trap`]'s doc comment.

use crate::common::usage_error;
use wsh_env::trap::{Action, Condition};
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;
use wsh_quote::quote;
use wsh_syntax::source::Location;

#[derive(Clone, Copy, Debug)]
pub struct Trap;

impl SpecialCommand for Trap {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);

        if flags.contains(&'p') || operands.is_empty() {
            let mut stdout = String::new();
            for (condition, action) in env.traps.iter() {
                if let Action::Command(command) = action {
                    stdout.push_str(&format!("trap -- {} {condition}\n", quote(command)));
                }
            }
            return (SpecialOutcome { stdout, ..Default::default() }, Signal::None);
        }

        let (action_word, conditions) = operands.split_first().expect("checked non-empty above");
        if conditions.is_empty() {
            return (SpecialOutcome::error(usage_error("trap", "missing condition"), 2), Signal::None);
        }

        let action = match action_word.as_str() {
            "-" => Action::Default,
            "" => Action::Ignore,
            command => Action::Command(command.to_string().into()),
        };

        for name in conditions {
            let Some(condition) = Condition::parse(name) else {
                return (SpecialOutcome::error(usage_error("trap", format!("{name}: invalid trap condition")), 1), Signal::None);
            };
            env.traps.set_action(condition, action.clone(), Location::dummy());
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
    fn registers_an_exit_trap() {
        let mut env = env();
        Trap.run(&mut env, &["trap".to_string(), "echo bye".to_string(), "EXIT".to_string()]);
        assert_eq!(env.traps.get_action(&Condition::Exit), &Action::Command("echo bye".into()));
    }

    #[test]
    fn lists_registered_traps() {
        let mut env = env();
        Trap.run(&mut env, &["trap".to_string(), "echo bye".to_string(), "EXIT".to_string()]);
        let (outcome, _) = Trap.run(&mut env, &["trap".to_string(), "-p".to_string()]);
        assert!(outcome.stdout.contains("EXIT"));
    }
}
