//! Command registry: name → builtin/utility dispatch contract
//! (`spec.md` §4.7, §6 "Command registry").

use crate::fs::FileSystem;
use std::collections::HashMap;
use std::rc::Rc;

/// Everything a dispatched command needs, per the `spec.md` §4.7 contract:
/// argv, stdin bytes, cwd, the exported-variable environment, and a
/// filesystem handle. A *special* builtin additionally receives `&mut
/// crate::Env` via the executor (not through this trait — see
/// `SpecialCommand`), since only special builtins may mutate interpreter
/// state.
#[derive(Clone, Debug)]
pub struct CommandInput<'a> {
    pub argv: Vec<String>,
    pub stdin: Vec<u8>,
    pub cwd: String,
    pub env: HashMap<String, String>,
    pub fs: &'a dyn FileSystem,
}

/// Output every dispatched command produces.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u8,
}

impl CommandOutput {
    #[must_use]
    pub fn with_status(exit_status: u8) -> Self {
        CommandOutput {
            exit_status,
            ..Default::default()
        }
    }
}

/// A regular builtin or virtual external utility: reads/writes only the
/// filesystem and its own argv/stdin, never interpreter state.
pub trait Command: std::fmt::Debug {
    fn run(&self, input: CommandInput<'_>) -> CommandOutput;
}

/// name → [`Command`] mapping. Special builtins (`cd`, `export`, `set`, …)
/// are dispatched separately by `wsh-semantics`'s executor, which needs
/// mutable access to `Env`; this registry only holds the ones that fit the
/// plain [`Command`] contract (`wsh-builtin`'s non-special builtins plus any
/// virtual external utilities a caller registers).
#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Rc<dyn Command>>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, command: Rc<dyn Command>) {
        self.commands.insert(name.into(), command);
    }

    #[must_use]
    pub fn look_up(&self, name: &str) -> Option<Rc<dyn Command>> {
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

    #[derive(Debug)]
    struct Echo;

    impl Command for Echo {
        fn run(&self, input: CommandInput<'_>) -> CommandOutput {
            CommandOutput {
                stdout: format!("{}\n", input.argv[1..].join(" ")),
                stderr: String::new(),
                exit_status: 0,
            }
        }
    }

    #[test]
    fn registered_command_is_found_by_name() {
        let mut registry = CommandRegistry::new();
        registry.register("echo", Rc::new(Echo));
        assert!(registry.contains("echo"));
        assert!(registry.look_up("missing").is_none());
    }

    #[test]
    fn dispatch_runs_the_command() {
        let mut registry = CommandRegistry::new();
        registry.register("echo", Rc::new(Echo));
        let fs = InMemoryFileSystem::new();
        let command = registry.look_up("echo").unwrap();
        let output = command.run(CommandInput {
            argv: vec!["echo".to_string(), "hi".to_string()],
            stdin: vec![],
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: &fs,
        });
        assert_eq!(output.stdout, "hi\n");
        assert_eq!(output.exit_status, 0);
    }
}
