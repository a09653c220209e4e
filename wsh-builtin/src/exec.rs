//! `exec command...` — runs `command` and then unwinds the whole script
//! with its exit status, approximating bash's process-replacement
//! semantics (`spec.md` §5 "no real process model"): there is no process
//! to replace, so this dispatches `command` through the same registry
//! lookup the executor uses for a simple command and turns the result
//! into [`Signal::Exit`] rather than returning to the caller.
//!
//! `exec` with no operands (only redirections, already applied by the
//! executor before dispatch) is a no-op that succeeds.

use wsh_env::registry::CommandInput;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Exec;

impl SpecialCommand for Exec {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let words = &argv[1..];
        if words.is_empty() {
            return (SpecialOutcome::with_status(0), Signal::None);
        }

        let name = &words[0];

        if env.functions.get(name).is_some() {
            return (
                SpecialOutcome::error(format!("wsh: exec: {name}: replacing the shell with a function is not supported\n"), 126),
                Signal::Exit(126),
            );
        }

        if let Some(special) = env.specials.look_up(name) {
            let (outcome, _signal) = special.run(env, words);
            return (outcome.clone(), Signal::Exit(outcome.exit_status));
        }

        if let Some(registered) = env.registry.look_up(name) {
            let input = CommandInput {
                argv: words.to_vec(),
                stdin: Vec::new(),
                cwd: env.cwd.clone(),
                env: env.exported_env(),
                fs: &*env.fs,
            };
            let output = registered.run(input);
            return (
                SpecialOutcome {
                    stdout: output.stdout,
                    stderr: output.stderr,
                    exit_status: output.exit_status,
                },
                Signal::Exit(output.exit_status),
            );
        }

        (
            SpecialOutcome::error(format!("wsh: exec: {name}: command not found\n"), 127),
            Signal::Exit(127),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_env::registry::{Command, CommandOutput};

    #[derive(Debug)]
    struct Echo;
    impl Command for Echo {
        fn run(&self, input: CommandInput<'_>) -> CommandOutput {
            CommandOutput {
                stdout: format!("{}\n", input.argv[1..].join(" ")),
                exit_status: 0,
                ..Default::default()
            }
        }
    }

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn no_operands_is_a_no_op() {
        let mut env = env();
        let (outcome, signal) = Exec.run(&mut env, &["exec".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert_eq!(signal, Signal::None);
    }

    #[test]
    fn runs_the_command_and_signals_exit() {
        let mut env = env();
        env.registry.register("echo", Rc::new(Echo));
        let (outcome, signal) = Exec.run(&mut env, &["exec".to_string(), "echo".to_string(), "hi".to_string()]);
        assert_eq!(outcome.stdout, "hi\n");
        assert_eq!(signal, Signal::Exit(0));
    }

    #[test]
    fn missing_command_exits_127() {
        let mut env = env();
        let (outcome, signal) = Exec.run(&mut env, &["exec".to_string(), "nope".to_string()]);
        assert_eq!(outcome.exit_status, 127);
        assert_eq!(signal, Signal::Exit(127));
    }
}
