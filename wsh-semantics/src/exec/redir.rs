//! Applying redirections against the virtual filesystem
//! (`spec.md` §4.2 "Redirections"; grounded on `yash-semantics/src/redir.rs`
//! and `redir/here_doc.rs`).
//!
//! There is no real file-descriptor table here — only stdin/stdout/stderr
//! are modeled (`spec.md` §5's "no true pipes/file descriptors" design), so
//! `n>file`/`n<&-` for any `n` other than 0/1/2 is accepted syntactically
//! and silently ignored; `2>&1`/`1>&2` (the only duplications real scripts
//! rely on) are honored.

use crate::error::ExpansionError;
use crate::expansion::{expand_word_single, text::expand_word_unsplit};
use std::path::Path;
use wsh_env::fs::WriteOptions;
use wsh_env::Env;
use wsh_syntax::syntax::{Heredoc, Redirection, RedirectionKind, RedirectionTarget};

#[derive(Debug)]
pub enum RedirError {
    Fs(String),
    Expansion(ExpansionError),
}

impl std::fmt::Display for RedirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirError::Fs(msg) => write!(f, "{msg}"),
            RedirError::Expansion(e) => write!(f, "{e}"),
        }
    }
}

impl From<ExpansionError> for RedirError {
    fn from(e: ExpansionError) -> Self {
        RedirError::Expansion(e)
    }
}

/// The net effect of a command's redirections: what its stdin should be
/// overridden to, and where its stdout/stderr should be diverted to instead
/// of propagating up to the caller.
#[derive(Default)]
pub struct RedirectionPlan {
    pub stdin_override: Option<Vec<u8>>,
    pub stdout_file: Option<(String, bool)>,
    pub stderr_file: Option<(String, bool)>,
    pub merge_stderr_into_stdout: bool,
    pub merge_stdout_into_stderr: bool,
}

pub fn plan_redirections(redirections: &[Redirection], env: &mut Env) -> Result<RedirectionPlan, RedirError> {
    let mut plan = RedirectionPlan::default();
    for redir in redirections {
        apply_one(redir, &mut plan, env)?;
    }
    Ok(plan)
}

fn apply_one(redir: &Redirection, plan: &mut RedirectionPlan, env: &mut Env) -> Result<(), RedirError> {
    match redir.kind {
        RedirectionKind::Input | RedirectionKind::ReadWrite => {
            let path = target_path(redir, env)?;
            let bytes = env.fs.read_file(Path::new(&path)).map_err(|e| RedirError::Fs(format!("{path}: {e}")))?;
            if redir.fd == 0 {
                plan.stdin_override = Some(bytes);
            }
        }
        RedirectionKind::Output | RedirectionKind::Clobber => {
            let path = target_path(redir, env)?;
            set_output_target(plan, redir.fd, path, false);
        }
        RedirectionKind::Append => {
            let path = target_path(redir, env)?;
            set_output_target(plan, redir.fd, path, true);
        }
        RedirectionKind::OutputBoth => {
            let path = target_path(redir, env)?;
            plan.stdout_file = Some((path.clone(), false));
            plan.stderr_file = Some((path, false));
        }
        RedirectionKind::DuplicateInput => {
            if is_close_target(redir) && redir.fd == 0 {
                plan.stdin_override = Some(Vec::new());
            }
        }
        RedirectionKind::DuplicateOutput => {
            if is_close_target(redir) {
                if redir.fd == 1 {
                    plan.stdout_file = Some(("/dev/null".to_string(), false));
                } else if redir.fd == 2 {
                    plan.stderr_file = Some(("/dev/null".to_string(), false));
                }
            } else {
                let target_fd = dup_target_fd(redir, env)?;
                if redir.fd == 2 && target_fd == Some(1) {
                    plan.merge_stderr_into_stdout = true;
                } else if redir.fd == 1 && target_fd == Some(2) {
                    plan.merge_stdout_into_stderr = true;
                }
            }
        }
        RedirectionKind::Heredoc | RedirectionKind::HeredocStrip => {
            if let RedirectionTarget::Heredoc(heredoc) = &redir.target {
                let content = heredoc_content(heredoc, env)?;
                if redir.fd == 0 {
                    plan.stdin_override = Some(content.into_bytes());
                }
            }
        }
        RedirectionKind::HereString => {
            if let RedirectionTarget::Word(word) = &redir.target {
                let text = expand_word_unsplit(word, env)?;
                if redir.fd == 0 {
                    plan.stdin_override = Some(format!("{text}\n").into_bytes());
                }
            }
        }
    }
    Ok(())
}

fn set_output_target(plan: &mut RedirectionPlan, fd: u32, path: String, append: bool) {
    if fd == 1 {
        plan.stdout_file = Some((path, append));
    } else if fd == 2 {
        plan.stderr_file = Some((path, append));
    }
}

fn target_path(redir: &Redirection, env: &mut Env) -> Result<String, RedirError> {
    match &redir.target {
        RedirectionTarget::Word(word) => Ok(expand_word_single(word, env)?),
        RedirectionTarget::Heredoc(_) => Ok(String::new()),
    }
}

fn is_close_target(redir: &Redirection) -> bool {
    matches!(&redir.target, RedirectionTarget::Word(w) if matches!(&w.parts[..], [wsh_syntax::syntax::WordPart::Unquoted(wsh_syntax::syntax::TextUnit::Literal(s))] if s == "-"))
}

fn dup_target_fd(redir: &Redirection, env: &mut Env) -> Result<Option<u32>, RedirError> {
    let path = target_path(redir, env)?;
    Ok(path.parse().ok())
}

/// Reads a heredoc's captured body, expanding it like a double-quoted string
/// if the delimiter was unquoted, stripping leading tabs if `<<-` was used.
fn heredoc_content(heredoc: &Heredoc, env: &mut Env) -> Result<String, RedirError> {
    let raw = heredoc.content.borrow().clone();
    let raw = if heredoc.strip_tabs {
        raw.lines().map(|line| line.trim_start_matches('\t')).collect::<Vec<_>>().join("\n") + if raw.ends_with('\n') { "\n" } else { "" }
    } else {
        raw
    };
    if !heredoc.expand {
        return Ok(raw);
    }
    let units = wsh_syntax::parse_text(&raw).map_err(|e| RedirError::Fs(e.to_string()))?;
    let word = wsh_syntax::syntax::Word {
        parts: units.into_iter().map(wsh_syntax::syntax::WordPart::Unquoted).collect(),
        location: wsh_syntax::source::Location::dummy(),
    };
    Ok(expand_word_unsplit(&word, env)?)
}

/// Applies `plan`'s output redirections to a just-produced result, writing
/// to `env.fs` as needed and returning what (if anything) should still
/// propagate to the caller (a pipeline's next stage or the script's
/// captured streams).
pub fn apply_output_plan(plan: &RedirectionPlan, mut stdout: String, mut stderr: String, env: &mut Env) -> Result<(String, String), RedirError> {
    if plan.merge_stderr_into_stdout {
        stdout.push_str(&stderr);
        stderr.clear();
    }
    if plan.merge_stdout_into_stderr {
        stderr.push_str(&stdout);
        stdout.clear();
    }
    if let Some((path, append)) = &plan.stdout_file {
        write_target(path, *append, &stdout, env)?;
        stdout.clear();
    }
    if let Some((path, append)) = &plan.stderr_file {
        write_target(path, *append, &stderr, env)?;
        stderr.clear();
    }
    Ok((stdout, stderr))
}

fn write_target(path: &str, append: bool, content: &str, env: &mut Env) -> Result<(), RedirError> {
    let options = WriteOptions {
        append,
        truncate: !append,
        ..Default::default()
    };
    env.fs.write_file(Path::new(path), content.as_bytes(), options).map_err(|e| RedirError::Fs(format!("{path}: {e}")))
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
    fn output_redirection_writes_a_file() {
        let mut env = env();
        let plan = RedirectionPlan {
            stdout_file: Some(("/out.txt".to_string(), false)),
            ..Default::default()
        };
        let (stdout, _) = apply_output_plan(&plan, "hello\n".to_string(), String::new(), &mut env).unwrap();
        assert_eq!(stdout, "");
        assert_eq!(env.fs.read_file(Path::new("/out.txt")).unwrap(), b"hello\n");
    }

    #[test]
    fn merge_stderr_into_stdout() {
        let mut env = env();
        let plan = RedirectionPlan {
            merge_stderr_into_stdout: true,
            ..Default::default()
        };
        let (stdout, stderr) = apply_output_plan(&plan, "a".to_string(), "b".to_string(), &mut env).unwrap();
        assert_eq!(stdout, "ab");
        assert_eq!(stderr, "");
    }
}
