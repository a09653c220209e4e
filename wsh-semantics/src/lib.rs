//! Semantic layer for the sandboxed shell interpreter (`spec.md` §4.3–4.8):
//! alias preprocessing, word expansion, arithmetic and conditional
//! evaluation, and the executor that walks a [`wsh_syntax::syntax::Script`]
//! against a live [`wsh_env::Env`].
//!
//! [`wsh_syntax`] only builds the tree; everything that needs a variable
//! table, the filesystem, or a command registry to make sense of a word
//! lives here instead.

pub mod alias_expand;
pub mod arith_env;
pub mod assign;
pub mod cond;
pub mod error;
pub mod exec;
pub mod expansion;

use wsh_env::special::Signal;
use wsh_env::Env;

/// Expands aliases, parses, and runs a whole script as the top-level
/// program, appending its output to `env.streams` and returning the signal
/// it finished with (`spec.md` §4.1 "alias expansion" composed with §4.6
/// "executor") — the single entry point a driver (REPL, script-file
/// runner) needs.
///
/// A parse error is reported as if the script had been a single command
/// that failed with exit status 2, matching how a syntax error is surfaced
/// mid-script rather than through a separate error channel.
pub fn run_source(src: &str, env: &mut Env) -> Signal {
    let expanded = alias_expand::expand_aliases(src, &env.aliases);
    match wsh_syntax::parse(&expanded) {
        Ok(script) => exec::run_top_level(&script, env),
        Err(e) => {
            env.streams.write_stderr(&format!("wsh: syntax error: {e}\n"));
            env.exit_status = 2;
            Signal::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn standalone_assignment_succeeds_with_no_output() {
        let mut env = env();
        let signal = run_source("x=1\n", &mut env);
        assert_eq!(signal, Signal::None);
        assert_eq!(env.exit_status, 0);
    }

    #[test]
    fn syntax_error_is_reported_on_stderr() {
        let mut env = env();
        run_source("if\n", &mut env);
        assert_eq!(env.exit_status, 2);
    }
}
