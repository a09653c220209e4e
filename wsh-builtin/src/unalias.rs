//! `unalias` — removes alias definitions (`spec.md` §4.7). `-a` clears
//! the whole table.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Unalias;

impl SpecialCommand for Unalias {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let (flags, operands) = crate::common::split_flags(argv);

        if flags.contains(&'a') {
            env.aliases.clear();
            return (SpecialOutcome::with_status(0), Signal::None);
        }

        let mut stderr = String::new();
        let mut exit_status = 0;
        for name in operands {
            if !env.aliases.remove(name.as_str()) {
                stderr.push_str(&format!("wsh: unalias: {name}: not found\n"));
                exit_status = 1;
            }
        }

        (SpecialOutcome { stderr, exit_status, ..Default::default() }, Signal::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::alias::{Glossary, HashEntry};
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_syntax::source::Location;

    fn env_with_alias() -> Env {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        env.aliases.insert(HashEntry::new("ll".to_string(), "ls -l".to_string(), false, Location::dummy()));
        env
    }

    #[test]
    fn removes_a_named_alias() {
        let mut env = env_with_alias();
        let (outcome, _) = Unalias.run(&mut env, &["unalias".to_string(), "ll".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert!(env.aliases.look_up("ll").is_none());
    }

    #[test]
    fn dash_a_clears_everything() {
        let mut env = env_with_alias();
        Unalias.run(&mut env, &["unalias".to_string(), "-a".to_string()]);
        assert!(env.aliases.is_empty());
    }

    #[test]
    fn unknown_alias_fails() {
        let mut env = env_with_alias();
        let (outcome, _) = Unalias.run(&mut env, &["unalias".to_string(), "nope".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }
}
