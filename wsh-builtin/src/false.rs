//! `false` — ignores its arguments, always fails.

use wsh_env::registry::{Command, CommandInput, CommandOutput};

#[derive(Clone, Copy, Debug)]
pub struct False;

impl Command for False {
    fn run(&self, _input: CommandInput<'_>) -> CommandOutput {
        CommandOutput::with_status(1)
    }
}
