//! `continue [n]` — requests [`Signal::Continue`] to restart the `n`th
//! enclosing loop (`spec.md` §4.6), default 1.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Continue;

impl SpecialCommand for Continue {
    fn run(&self, _env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let n: u32 = match argv.get(1) {
            Some(s) => match s.parse() {
                Ok(n) if n > 0 => n,
                _ => return (SpecialOutcome::error(format!("wsh: continue: {s}: numeric argument required\n"), 1), Signal::None),
            },
            None => 1,
        };
        (SpecialOutcome::with_status(0), Signal::Continue(n))
    }
}
