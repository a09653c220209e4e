//! `break [n]` — requests [`Signal::Break`] to unwind `n` enclosing loops
//! (`spec.md` §4.6), default 1.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Break;

impl SpecialCommand for Break {
    fn run(&self, _env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let n: u32 = match argv.get(1) {
            Some(s) => match s.parse() {
                Ok(n) if n > 0 => n,
                _ => return (SpecialOutcome::error(format!("wsh: break: {s}: numeric argument required\n"), 1), Signal::None),
            },
            None => 1,
        };
        (SpecialOutcome::with_status(0), Signal::Break(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;

    #[test]
    fn defaults_to_breaking_one_loop() {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        let (_, signal) = Break.run(&mut env, &["break".to_string()]);
        assert_eq!(signal, Signal::Break(1));
    }

    #[test]
    fn breaks_n_loops() {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        let (_, signal) = Break.run(&mut env, &["break".to_string(), "2".to_string()]);
        assert_eq!(signal, Signal::Break(2));
    }
}
