//! Special-builtin dispatch point (`spec.md` §4.7: "may consult/modify
//! interpreter state only when the builtin is marked as a *special
//! builtin*").
//!
//! A plain [`crate::registry::Command`] only ever sees argv/stdin/cwd/env/fs
//! — it cannot touch interpreter state. Special builtins (`cd`, `export`,
//! `set`, `shift`, `unset`, `return`, `break`, `continue`, `exit`,
//! `readonly`, `local`, `declare`, `exec`, `eval`, `source`, `trap`,
//! `getopts`) need `&mut Env`, and some of them (`return`/`break`/`continue`/
//! `exit`) need to hand a non-local control-flow signal back to the executor
//! rather than a plain exit status.
//!
//! Putting this registry here, rather than on the executor in `wsh-semantics`,
//! is what lets `wsh-builtin` depend on `wsh-semantics` (for `eval`/`source`,
//! which must parse and run a nested script) without creating a dependency
//! cycle: the executor only ever talks to the trait object in this module,
//! never to the `wsh-builtin` crate that implements it.

use crate::Env;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

/// A non-local control-flow request produced by a special builtin
/// (`spec.md` §4.6 "Control-flow is implemented via non-local exceptions").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Signal {
    /// No control-flow change; `exit_status` on [`SpecialOutcome`] applies.
    None,
    /// `break [n]`.
    Break(u32),
    /// `continue [n]`.
    Continue(u32),
    /// `return [status]`, from inside a function (or a sourced script).
    Return(u8),
    /// `exit [status]`, unwinding to the top of the invocation.
    Exit(u8),
}

/// Output of a special builtin invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SpecialOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u8,
}

impl SpecialOutcome {
    #[must_use]
    pub fn with_status(exit_status: u8) -> Self {
        SpecialOutcome {
            exit_status,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, exit_status: u8) -> Self {
        SpecialOutcome {
            stderr: message.into(),
            exit_status,
            ..Default::default()
        }
    }
}

/// A special builtin: mutates `env` directly and may request a non-local
/// control-flow signal via the `Signal` return value.
pub trait SpecialCommand: Debug {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal);
}

/// name → [`SpecialCommand`] mapping, populated by `wsh-builtin::install`.
#[derive(Clone, Debug, Default)]
pub struct SpecialRegistry {
    commands: HashMap<String, Rc<dyn SpecialCommand>>,
}

impl SpecialRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, command: Rc<dyn SpecialCommand>) {
        self.commands.insert(name.into(), command);
    }

    #[must_use]
    pub fn look_up(&self, name: &str) -> Option<Rc<dyn SpecialCommand>> {
        self.commands.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use std::rc::Rc;

    #[derive(Debug)]
    struct FakeExit;

    impl SpecialCommand for FakeExit {
        fn run(&self, _env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
            let status = argv.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
            (SpecialOutcome::with_status(status), Signal::Exit(status))
        }
    }

    #[test]
    fn registered_special_builtin_can_mutate_env_and_signal() {
        let mut registry = SpecialRegistry::new();
        registry.register("exit", Rc::new(FakeExit));
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        let command = registry.look_up("exit").unwrap();
        let (outcome, signal) = command.run(&mut env, &["exit".to_string(), "3".to_string()]);
        assert_eq!(outcome.exit_status, 3);
        assert_eq!(signal, Signal::Exit(3));
    }
}
