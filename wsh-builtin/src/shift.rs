//! `shift` — drops the first `n` positional parameters (`spec.md` §4.7),
//! default 1. Fails if `n` exceeds the parameter count.

use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Shift;

impl SpecialCommand for Shift {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let n: usize = match argv.get(1) {
            Some(s) => match s.parse() {
                Ok(n) => n,
                Err(_) => return (SpecialOutcome::error(format!("wsh: shift: {s}: numeric argument required\n"), 1), Signal::None),
            },
            None => 1,
        };

        let params = env.variables.positional_params().to_vec();
        if n > params.len() {
            return (SpecialOutcome::error("wsh: shift: shift count out of range\n", 1), Signal::None);
        }

        env.variables.set_positional_params(params[n..].to_vec());
        (SpecialOutcome::with_status(0), Signal::None)
    }
}
