//! `return [n]` — requests [`Signal::Return`] from a function or sourced
//! script (`spec.md` §4.6 "Control-flow is implemented via non-local
//! exceptions"). Defaults to the current exit status.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Return;

impl SpecialCommand for Return {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let status = match argv.get(1) {
            Some(s) => match s.parse() {
                Ok(n) => n,
                Err(_) => return (SpecialOutcome::error(format!("wsh: return: {s}: numeric argument required\n"), 2), Signal::None),
            },
            None => env.exit_status,
        };
        (SpecialOutcome::with_status(status), Signal::Return(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;

    #[test]
    fn defaults_to_current_exit_status() {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        env.exit_status = 7;
        let (outcome, signal) = Return.run(&mut env, &["return".to_string()]);
        assert_eq!(outcome.exit_status, 7);
        assert_eq!(signal, Signal::Return(7));
    }

    #[test]
    fn returns_a_given_status() {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        let (_, signal) = Return.run(&mut env, &["return".to_string(), "3".to_string()]);
        assert_eq!(signal, Signal::Return(3));
    }
}
