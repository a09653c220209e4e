//! `:` — does nothing, succeeds (`spec.md` §4.7 list of dispatch targets).

use wsh_env::registry::{Command, CommandInput, CommandOutput};

#[derive(Clone, Copy, Debug)]
pub struct Colon;

impl Command for Colon {
    fn run(&self, _input: CommandInput<'_>) -> CommandOutput {
        CommandOutput::with_status(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wsh_env::fs::InMemoryFileSystem;

    #[test]
    fn always_succeeds() {
        let fs = InMemoryFileSystem::new();
        let output = Colon.run(CommandInput {
            argv: vec![":".to_string(), "ignored".to_string()],
            stdin: Vec::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: &fs,
        });
        assert_eq!(output.exit_status, 0);
    }
}
