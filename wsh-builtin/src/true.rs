//! `true` — ignores its arguments, always succeeds.

use wsh_env::registry::{Command, CommandInput, CommandOutput};

#[derive(Clone, Copy, Debug)]
pub struct True;

impl Command for True {
    fn run(&self, _input: CommandInput<'_>) -> CommandOutput {
        CommandOutput::with_status(0)
    }
}
