//! `getopts optstring name [arg...]` — parses one option per invocation
//! from the positional parameters (or `arg...` if given), per `spec.md`
//! §4.7. Tracks progress via `$OPTIND`, reports the option's argument (if
//! any) via `$OPTARG`, and stores the recognized option letter (or `?` on
//! an unrecognized one) into the variable named by `name`.

use wsh_env::variable::{Scope, Value, OPTARG, OPTIND};
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Getopts;

impl SpecialCommand for Getopts {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let Some(optstring) = argv.get(1) else {
            return (SpecialOutcome::error("wsh: getopts: optstring argument required\n", 2), Signal::None);
        };
        let Some(name_var) = argv.get(2) else {
            return (SpecialOutcome::error("wsh: getopts: name argument required\n", 2), Signal::None);
        };

        let args: Vec<String> = if argv.len() > 3 {
            argv[3..].to_vec()
        } else {
            env.variables.positional_params().to_vec()
        };

        let optind: usize = env
            .variables
            .get(OPTIND)
            .and_then(|v| v.value.as_ref())
            .map(|v| v.as_scalar().into_owned())
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        let index = optind.saturating_sub(1);

        let Some(arg) = args.get(index) else {
            return (SpecialOutcome::with_status(1), Signal::None);
        };

        if !arg.starts_with('-') || arg == "-" {
            return (SpecialOutcome::with_status(1), Signal::None);
        }

        let silent = optstring.starts_with(':');
        let letter = arg.chars().nth(1).unwrap_or('?');

        let spec_pos = optstring.find(letter);
        let mut next_optind = optind + 1;

        let outcome = match spec_pos {
            None => {
                set_var(env, name_var, "?");
                if !silent {
                    return (
                        SpecialOutcome::error(format!("wsh: getopts: illegal option -- {letter}\n"), 0),
                        finish(env, next_optind),
                    );
                }
                set_var(env, OPTARG, &letter.to_string());
                SpecialOutcome::with_status(0)
            }
            Some(pos) => {
                let takes_arg = optstring.as_bytes().get(pos + 1) == Some(&b':');
                if takes_arg {
                    let rest = &arg[2..];
                    let value = if !rest.is_empty() {
                        rest.to_string()
                    } else if let Some(next) = args.get(index + 1) {
                        next_optind += 1;
                        next.clone()
                    } else if silent {
                        set_var(env, name_var, ":");
                        set_var(env, OPTARG, &letter.to_string());
                        return (SpecialOutcome::with_status(0), finish(env, next_optind));
                    } else {
                        set_var(env, name_var, "?");
                        return (
                            SpecialOutcome::error(format!("wsh: getopts: option requires an argument -- {letter}\n"), 0),
                            finish(env, next_optind),
                        );
                    };
                    set_var(env, OPTARG, &value);
                } else {
                    env.variables.unset(OPTARG).ok();
                }
                set_var(env, name_var, &letter.to_string());
                SpecialOutcome::with_status(0)
            }
        };

        (outcome, finish(env, next_optind))
    }
}

fn set_var(env: &mut Env, name: &str, value: &str) {
    let variable = env.variables.get_or_new(name, Scope::Global);
    let _ = variable.assign(Value::scalar(value), None);
}

fn finish(env: &mut Env, next_optind: usize) -> Signal {
    set_var(env, OPTIND, &next_optind.to_string());
    Signal::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;

    fn env_with_args(args: &[&str]) -> Env {
        let mut env = Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string());
        env.variables.set_positional_params(args.iter().map(|s| s.to_string()).collect());
        env
    }

    #[test]
    fn parses_a_flag_option() {
        let mut env = env_with_args(&["-v"]);
        let (outcome, _) = Getopts.run(&mut env, &["getopts".to_string(), "v".to_string(), "opt".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert_eq!(env.variables.get("opt").unwrap().value.as_ref().unwrap().as_scalar(), "v");
    }

    #[test]
    fn parses_an_option_with_attached_argument() {
        let mut env = env_with_args(&["-ofile.txt"]);
        Getopts.run(&mut env, &["getopts".to_string(), "o:".to_string(), "opt".to_string()]);
        assert_eq!(env.variables.get("OPTARG").unwrap().value.as_ref().unwrap().as_scalar(), "file.txt");
    }

    #[test]
    fn stops_when_args_are_exhausted() {
        let mut env = env_with_args(&[]);
        let (outcome, _) = Getopts.run(&mut env, &["getopts".to_string(), "v".to_string(), "opt".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }
}
