//! `source`/`.` — reads a file from the virtual filesystem and runs it in
//! the current environment (`spec.md` §4.7), with any extra operands
//! becoming its positional parameters for the duration of the run.

use crate::common::usage_error;
use std::path::Path;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Source;

impl SpecialCommand for Source {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let Some(path) = argv.get(1) else {
            return (SpecialOutcome::error(usage_error("source", "filename argument required"), 2), Signal::None);
        };

        let resolved = if Path::new(path).is_absolute() {
            path.clone()
        } else {
            Path::new(&env.cwd).join(path).to_string_lossy().into_owned()
        };

        let bytes = match env.fs.read_file(Path::new(&resolved)) {
            Ok(bytes) => bytes,
            Err(e) => return (SpecialOutcome::error(usage_error("source", e), 1), Signal::None),
        };
        let src = String::from_utf8_lossy(&bytes).into_owned();

        let previous_params = env.variables.positional_params().to_vec();
        if argv.len() > 2 {
            env.variables.set_positional_params(argv[2..].to_vec());
        }

        let before = env.streams.clone();
        env.streams = Default::default();
        let signal = wsh_semantics::run_source(&src, env);
        let captured = std::mem::replace(&mut env.streams, before);

        env.variables.set_positional_params(previous_params);

        let signal = match signal {
            Signal::Exit(status) => Signal::Exit(status),
            Signal::Return(status) => {
                env.exit_status = status;
                Signal::None
            }
            other => other,
        };

        (
            SpecialOutcome {
                stdout: captured.stdout,
                stderr: captured.stderr,
                exit_status: env.exit_status,
            },
            signal,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::{FileSystem, InMemoryFileSystem, WriteOptions};

    fn env_with(path: &str, body: &str) -> Env {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new(path), body.as_bytes(), WriteOptions::default()).unwrap();
        Env::new(Rc::new(fs), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn runs_a_sourced_script_and_captures_its_output() {
        let mut env = env_with("/script.sh", "echo hi\n");
        let (outcome, signal) = Source.run(&mut env, &["source".to_string(), "/script.sh".to_string()]);
        assert_eq!(outcome.stdout, "hi\n");
        assert_eq!(signal, Signal::None);
    }

    #[test]
    fn return_inside_a_sourced_script_stops_there() {
        let mut env = env_with("/script.sh", "return 4\necho unreached\n");
        let (outcome, signal) = Source.run(&mut env, &["source".to_string(), "/script.sh".to_string()]);
        assert_eq!(outcome.exit_status, 4);
        assert_eq!(signal, Signal::None);
        assert_eq!(outcome.stdout, "");
    }

    #[test]
    fn missing_file_fails() {
        let mut env = env_with("/script.sh", "echo hi\n");
        let (outcome, _) = Source.run(&mut env, &["source".to_string(), "/missing.sh".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }
}
