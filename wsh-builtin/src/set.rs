//! `set` — toggles shell options and/or replaces the positional parameters
//! (`spec.md` §4.7). Supports the short forms this interpreter's
//! [`ShellOption`] covers (`-e`, `-u`, `-f`, `-x`, `-C`, plus their `+`
//! disabling counterparts) and the long form via `-o`/`+o name`. Bare
//! operands after `--` (or after a non-option first operand) replace `$@`.

use wsh_env::option::{self, ShellOption, State};
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Set;

fn short_option(c: char) -> Option<ShellOption> {
    match c {
        'e' => Some(ShellOption::ErrExit),
        'u' => Some(ShellOption::NoUnset),
        'f' => Some(ShellOption::NoGlob),
        'x' => Some(ShellOption::XTrace),
        'C' => Some(ShellOption::Clobber),
        _ => None,
    }
}

impl SpecialCommand for Set {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let mut index = 1;
        let mut saw_terminator = false;
        while let Some(arg) = argv.get(index) {
            if arg == "--" {
                index += 1;
                saw_terminator = true;
                break;
            }
            let (enabling, rest) = if let Some(rest) = arg.strip_prefix('-') {
                (true, rest)
            } else if let Some(rest) = arg.strip_prefix('+') {
                (false, rest)
            } else {
                break;
            };
            if rest.is_empty() {
                break;
            }

            if rest == "o" {
                index += 1;
                let Some(name) = argv.get(index) else {
                    print_options(env);
                    index += 1;
                    continue;
                };
                match option::ShellOption::from_long_name(name) {
                    Some(option) => env.options.set(option, state(enabling)),
                    None => return (SpecialOutcome::error(format!("wsh: set: {name}: invalid option name\n"), 1), Signal::None),
                }
                index += 1;
                continue;
            }

            for c in rest.chars() {
                match short_option(c) {
                    Some(option) => env.options.set(option, state(enabling)),
                    None => return (SpecialOutcome::error(format!("wsh: set: -{c}: invalid option\n"), 1), Signal::None),
                }
            }
            index += 1;
        }

        let operands: Vec<String> = argv[index..].to_vec();
        if saw_terminator || !operands.is_empty() {
            env.variables.set_positional_params(operands);
        }

        (SpecialOutcome::with_status(0), Signal::None)
    }
}

fn state(enabling: bool) -> State {
    if enabling {
        State::On
    } else {
        State::Off
    }
}

fn print_options(env: &mut Env) {
    for option in [
        ShellOption::ErrExit,
        ShellOption::NoUnset,
        ShellOption::PipeFail,
        ShellOption::XTrace,
        ShellOption::NoGlob,
        ShellOption::ExtGlob,
        ShellOption::NoCaseMatch,
        ShellOption::GlobStar,
        ShellOption::DotGlob,
        ShellOption::GlobSkipDots,
        ShellOption::NullGlob,
        ShellOption::FailGlob,
        ShellOption::LastPipe,
        ShellOption::Posix,
        ShellOption::Clobber,
    ] {
        let state = if env.options.is_on(option) { "on" } else { "off" };
        env.streams.write_stdout(&format!("{}\t{state}\n", option.long_name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn enables_errexit() {
        let mut env = env();
        Set.run(&mut env, &["set".to_string(), "-e".to_string()]);
        assert!(env.options.is_on(ShellOption::ErrExit));
    }

    #[test]
    fn disables_with_plus() {
        let mut env = env();
        env.options.set(ShellOption::ErrExit, State::On);
        Set.run(&mut env, &["set".to_string(), "+e".to_string()]);
        assert!(!env.options.is_on(ShellOption::ErrExit));
    }

    #[test]
    fn long_form_via_dash_o() {
        let mut env = env();
        Set.run(&mut env, &["set".to_string(), "-o".to_string(), "pipefail".to_string()]);
        assert!(env.options.is_on(ShellOption::PipeFail));
    }

    #[test]
    fn replaces_positional_params_after_double_dash() {
        let mut env = env();
        Set.run(&mut env, &["set".to_string(), "--".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(env.variables.positional_params(), ["a".to_string(), "b".to_string()]);
    }
}
