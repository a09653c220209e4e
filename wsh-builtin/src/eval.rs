//! `eval` — concatenates its operands with a space and runs the result as
//! a script in the current environment (`spec.md` §4.7). Needs
//! `wsh-semantics` directly, which is exactly why [`wsh_env::special`]
//! lives apart from the executor — see that module's doc comment.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Eval;

impl SpecialCommand for Eval {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let src = argv[1..].join(" ");
        let before = env.streams.clone();
        env.streams = Default::default();
        let signal = wsh_semantics::run_source(&src, env);
        let captured = std::mem::replace(&mut env.streams, before);
        (
            SpecialOutcome {
                stdout: captured.stdout,
                stderr: captured.stderr,
                exit_status: env.exit_status,
            },
            signal,
        )
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
    fn evaluates_concatenated_operands() {
        let mut env = env();
        let (outcome, _) = Eval.run(&mut env, &["eval".to_string(), "echo".to_string(), "hi".to_string()]);
        assert_eq!(outcome.stdout, "hi\n");
    }
}
