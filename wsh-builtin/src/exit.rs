//! `exit [n]` — requests [`Signal::Exit`], unwinding to the top of the
//! invocation (`spec.md` §4.6). Defaults to the current exit status.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Exit;

impl SpecialCommand for Exit {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let status = match argv.get(1) {
            Some(s) => match s.parse() {
                Ok(n) => n,
                Err(_) => return (SpecialOutcome::error(format!("wsh: exit: {s}: numeric argument required\n"), 2), Signal::Exit(2)),
            },
            None => env.exit_status,
        };
        (SpecialOutcome::with_status(status), Signal::Exit(status))
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
        env.exit_status = 5;
        let (outcome, signal) = Exit.run(&mut env, &["exit".to_string()]);
        assert_eq!(outcome.exit_status, 5);
        assert_eq!(signal, Signal::Exit(5));
    }

    #[test]
    fn exits_with_a_given_status() {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        let (_, signal) = Exit.run(&mut env, &["exit".to_string(), "9".to_string()]);
        assert_eq!(signal, Signal::Exit(9));
    }
}
