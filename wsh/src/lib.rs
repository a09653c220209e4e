//! Sandboxed Bash-compatible script interpreter (`spec.md` §1–§2): this crate
//! wires the lexer/parser/AST (`wsh-syntax`), the expansion/arithmetic/
//! condition/executor layer (`wsh-semantics`), interpreter state
//! (`wsh-env`), and the special/regular builtins (`wsh-builtin`) behind the
//! single entry point `spec.md` §6 describes, plus a thin CLI mirroring its
//! `-c`/file/stdin/`--cwd`/`--json` surface.
//!
//! The CLI binary, the sandbox wrapper around it, and the network adapter
//! are named out of scope in `spec.md` §1; `startup` exists only to give
//! `src/main.rs` somewhere to park its argument parsing, not as a supported
//! embedding API.

pub mod diagnostics;
pub mod startup;

pub use wsh_arith as arith;
pub use wsh_builtin as builtin;
pub use wsh_env as env;
pub use wsh_fnmatch as fnmatch;
pub use wsh_quote as quote;
pub use wsh_semantics as semantics;
#[doc(no_inline)]
pub use wsh_syntax as syntax;

use std::collections::HashMap;
use std::rc::Rc;
use wsh_env::fs::{FileSystem, InMemoryFileSystem};
use wsh_env::limits::Limits;
use wsh_env::registry::CommandRegistry;
use wsh_env::variable::{Scope, Value};
use wsh_env::Env;

/// Caller-supplied context for one interpreter invocation (`spec.md` §6
/// "Entry point"): everything [`run`] needs besides the script text itself.
///
/// `Default` gives a fresh in-memory filesystem rooted at `/`, an empty
/// command registry (only the builtins `wsh-builtin` installs will be
/// runnable), and the default `Limits`.
pub struct RunContext {
    pub cwd: String,
    pub env_vars: HashMap<String, String>,
    pub limits: Limits,
    pub fs: Rc<dyn FileSystem>,
    pub registry: CommandRegistry,
    pub shell_name: String,
    pub positional_params: Vec<String>,
}

impl Default for RunContext {
    fn default() -> Self {
        RunContext {
            cwd: "/".to_string(),
            env_vars: HashMap::new(),
            limits: Limits::default(),
            fs: Rc::new(InMemoryFileSystem::new()),
            registry: CommandRegistry::new(),
            shell_name: "wsh".to_string(),
            positional_params: Vec::new(),
        }
    }
}

/// Result of one [`run`] invocation (`spec.md` §6: "returns (stdout string,
/// stderr string, exit status)").
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionReport {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u8,
}

/// Runs `script` to completion against a fresh [`Env`] built from `context`
/// and returns its captured output (`spec.md` §6 "Entry point").
///
/// Builds the `Env`, installs `wsh-builtin`'s special and regular builtins
/// on top of whatever `context.registry` already holds (so a caller's own
/// virtual external utilities are not lost, though a same-named builtin
/// takes priority — `wsh-builtin`'s names never collide with the utilities
/// `spec.md` §1 treats as external, so this only matters if a caller
/// deliberately shadows one), imports `context.env_vars` as exported
/// variables, sets the positional parameters, and hands the script to
/// [`wsh_semantics::run_source`].
#[must_use]
pub fn run(script: &str, context: RunContext) -> ExecutionReport {
    let mut env = Env::new(context.fs, context.cwd, context.shell_name);
    env.limits = context.limits;
    env.registry = context.registry;
    wsh_builtin::install(&mut env);

    for (name, value) in context.env_vars {
        let variable = env.variables.get_or_new(&name, Scope::Global);
        variable.assign(Value::scalar(value), None).ok();
        variable.is_exported = true;
    }
    env.variables.set_positional_params(context.positional_params);

    wsh_semantics::run_source(script, &mut env);

    ExecutionReport {
        stdout: env.streams.stdout.clone(),
        stderr: env.streams.stderr.clone(),
        exit_status: env.exit_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::registry::{Command, CommandInput, CommandOutput};

    /// `echo` is one of the "external-looking" utilities `spec.md` §1 treats
    /// as an out-of-scope collaborator, so these tests register their own
    /// stub the way a real embedder's command registry would.
    #[derive(Debug)]
    struct Echo;
    impl Command for Echo {
        fn run(&self, input: CommandInput<'_>) -> CommandOutput {
            CommandOutput {
                stdout: format!("{}\n", input.argv[1..].join(" ")),
                exit_status: 0,
                ..Default::default()
            }
        }
    }

    fn context_with_echo() -> RunContext {
        let mut context = RunContext::default();
        context.registry.register("echo", Rc::new(Echo));
        context
    }

    #[test]
    fn runs_a_script_and_captures_output() {
        let report = run("echo hi\n", context_with_echo());
        assert_eq!(report.stdout, "hi\n");
        assert_eq!(report.exit_status, 0);
    }

    #[test]
    fn env_vars_are_imported_as_exported_variables() {
        let mut context = context_with_echo();
        context.env_vars.insert("GREETING".to_string(), "hello".to_string());
        let report = run("echo $GREETING\n", context);
        assert_eq!(report.stdout, "hello\n");
    }

    #[test]
    fn positional_params_are_set_before_running() {
        let mut context = context_with_echo();
        context.positional_params = vec!["a".to_string(), "b".to_string()];
        let report = run("echo $1 $2\n", context);
        assert_eq!(report.stdout, "a b\n");
    }

    #[test]
    fn parse_errors_are_reported_with_exit_status_two() {
        let report = run("if\n", RunContext::default());
        assert_eq!(report.exit_status, 2);
        assert!(!report.stderr.is_empty());
    }

    #[test]
    fn builtins_are_installed_and_usable() {
        let report = run("pwd\n", RunContext::default());
        assert_eq!(report.stdout, "/\n");
        assert_eq!(report.exit_status, 0);
    }
}
