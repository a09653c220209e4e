//! `cd` — changes the current working directory (`spec.md` §4.7).
//!
//! Simplified against the teacher's `cd`: no `CDPATH` search and no
//! logical/physical symlink-resolution modes (`-L`/`-P`), since neither
//! fits a deterministic, hermetic interpreter operating on a single
//! in-process virtual filesystem with no real process environment to read
//! `CDPATH` from. `-` (switch to `$OLDPWD`) is still honored, since that's
//! purely a `VariableSet` lookup.

use crate::common::usage_error;
use std::path::{Path, PathBuf};
use wsh_env::fs::FileType;
use wsh_env::special::{SpecialCommand, SpecialOutcome, Signal};
use wsh_env::Env;

#[derive(Clone, Copy, Debug)]
pub struct Cd;

fn resolve(cwd: &str, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        Path::new(cwd).join(target)
    }
}

impl SpecialCommand for Cd {
    fn run(&self, env: &mut Env, argv: &[String]) -> (SpecialOutcome, Signal) {
        let operand = argv.get(1).map(String::as_str);

        let target = match operand {
            None | Some("") => match env.variables.get("HOME").and_then(|v| v.value.as_ref()) {
                Some(value) => value.as_scalar().into_owned(),
                None => return (SpecialOutcome::error(usage_error("cd", "HOME not set"), 1), Signal::None),
            },
            Some("-") => match env.variables.get("OLDPWD").and_then(|v| v.value.as_ref()) {
                Some(value) => value.as_scalar().into_owned(),
                None => return (SpecialOutcome::error(usage_error("cd", "OLDPWD not set"), 1), Signal::None),
            },
            Some(path) => path.to_string(),
        };

        let resolved = resolve(&env.cwd, &target);

        match env.fs.stat(&resolved) {
            Ok(meta) if meta.file_type == FileType::Directory => {}
            Ok(_) => return (SpecialOutcome::error(usage_error("cd", format!("{target}: not a directory")), 1), Signal::None),
            Err(e) => return (SpecialOutcome::error(usage_error("cd", e), 1), Signal::None),
        }

        let new_cwd = resolved.to_string_lossy().into_owned();
        let printed_oldpwd_switch = operand == Some("-");
        env.set_cwd(new_cwd.clone());

        let mut outcome = SpecialOutcome::with_status(0);
        if printed_oldpwd_switch {
            outcome.stdout = format!("{new_cwd}\n");
        }
        (outcome, Signal::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wsh_env::fs::{FileSystem, InMemoryFileSystem};

    fn env() -> Env {
        let fs = InMemoryFileSystem::new();
        fs.mkdir(Path::new("/work"), true).unwrap();
        Env::new(Rc::new(fs), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn changes_cwd_to_an_existing_directory() {
        let mut env = env();
        let (outcome, signal) = Cd.run(&mut env, &["cd".to_string(), "/work".to_string()]);
        assert_eq!(outcome.exit_status, 0);
        assert_eq!(signal, Signal::None);
        assert_eq!(env.cwd, "/work");
    }

    #[test]
    fn fails_on_a_missing_directory() {
        let mut env = env();
        let (outcome, _signal) = Cd.run(&mut env, &["cd".to_string(), "/nope".to_string()]);
        assert_eq!(outcome.exit_status, 1);
    }

    #[test]
    fn dash_switches_to_oldpwd_and_prints_it() {
        let mut env = env();
        Cd.run(&mut env, &["cd".to_string(), "/work".to_string()]);
        let (outcome, _signal) = Cd.run(&mut env, &["cd".to_string(), "-".to_string()]);
        assert_eq!(outcome.stdout, "/\n");
        assert_eq!(env.cwd, "/");
    }
}
