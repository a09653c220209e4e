//! `pwd` — prints the current working directory (`spec.md` §4.7); needs
//! only `CommandInput::cwd`, so it fits the plain [`Command`] contract
//! rather than needing special-builtin access to `Env`.

use wsh_env::registry::{Command, CommandInput, CommandOutput};

#[derive(Clone, Copy, Debug)]
pub struct Pwd;

impl Command for Pwd {
    fn run(&self, input: CommandInput<'_>) -> CommandOutput {
        CommandOutput {
            stdout: format!("{}\n", input.cwd),
            exit_status: 0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wsh_env::fs::InMemoryFileSystem;

    #[test]
    fn prints_cwd_with_trailing_newline() {
        let fs = InMemoryFileSystem::new();
        let output = Pwd.run(CommandInput {
            argv: vec!["pwd".to_string()],
            stdin: Vec::new(),
            cwd: "/home/user".to_string(),
            env: HashMap::new(),
            fs: &fs,
        });
        assert_eq!(output.stdout, "/home/user\n");
        assert_eq!(output.exit_status, 0);
    }
}
