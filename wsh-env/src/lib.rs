//! Interpreter state for the sandboxed shell (`spec.md` "Interpreter
//! state"): the variable store, function table, alias table, shell options,
//! positional parameters, exit status, execution limits/counters, captured
//! streams, the virtual filesystem trait (plus an in-memory reference
//! implementation), the command-registry trait, and a minimal trap table.
//!
//! [`Env`] owns all of it for one interpreter invocation. `wsh-semantics`'s
//! executor is the only thing that mutates an `Env` once built; this crate
//! just defines the state and the traits external collaborators (builtin
//! implementations, a sandboxed filesystem adapter) implement against.

pub mod alias;
pub mod fs;
pub mod function;
pub mod limits;
pub mod option;
pub mod registry;
pub mod special;
pub mod streams;
pub mod trap;
pub mod variable;

use alias::AliasSet;
use fs::FileSystem;
use function::FunctionSet;
use limits::{Counters, Limits};
use option::OptionSet;
use registry::CommandRegistry;
use special::SpecialRegistry;
use std::rc::Rc;
use streams::CapturedStreams;
use trap::TrapSet;
use variable::{Scope, Value, VariableSet};

/// Exit status of a command, wrapped into `0..=255` the way POSIX shells do
/// (`spec.md` "Interpreter state — Exit status": "wrap from larger or
/// negative via modulo 256").
#[must_use]
pub fn wrap_exit_status(status: i32) -> u8 {
    status.rem_euclid(256) as u8
}

/// All state for one interpreter invocation.
pub struct Env {
    pub variables: VariableSet,
    pub functions: FunctionSet,
    pub aliases: AliasSet,
    pub options: OptionSet,
    pub traps: TrapSet,
    pub limits: Limits,
    pub counters: Counters,
    pub streams: CapturedStreams,
    pub fs: Rc<dyn FileSystem>,
    pub registry: CommandRegistry,
    pub specials: SpecialRegistry,
    pub exit_status: u8,
    pub cwd: String,
    /// `$0`.
    pub shell_name: String,
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("variables", &self.variables)
            .field("functions", &self.functions)
            .field("options", &self.options)
            .field("exit_status", &self.exit_status)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl Env {
    #[must_use]
    pub fn new(fs: Rc<dyn FileSystem>, cwd: String, shell_name: String) -> Self {
        let mut variables = VariableSet::new();
        variables
            .get_or_new(variable::IFS, Scope::Global)
            .assign(Value::scalar(variable::IFS_INITIAL_VALUE), None)
            .expect("fresh variable is never read-only");
        variables
            .get_or_new(variable::PWD, Scope::Global)
            .assign(Value::scalar(cwd.clone()), None)
            .expect("fresh variable is never read-only");
        Env {
            variables,
            functions: FunctionSet::new(),
            aliases: AliasSet::new(),
            options: OptionSet::default(),
            traps: TrapSet::new(),
            limits: Limits::default(),
            counters: Counters::new(),
            streams: CapturedStreams::new(),
            fs,
            registry: CommandRegistry::new(),
            specials: SpecialRegistry::new(),
            exit_status: 0,
            cwd,
            shell_name,
        }
    }

    /// Builds the exported-variable mapping passed to builtins/utilities via
    /// [`registry::CommandInput`] (`spec.md` §4.7).
    #[must_use]
    pub fn exported_env(&self) -> std::collections::HashMap<String, String> {
        self.variables
            .iter()
            .filter(|(_, variable)| variable.is_exported)
            .filter_map(|(name, variable)| {
                variable.value.as_ref().map(|value| (name.to_string(), value.as_scalar().into_owned()))
            })
            .collect()
    }

    /// Changes the working directory, keeping `$PWD`/`$OLDPWD` in sync the
    /// way the `cd` special builtin does.
    pub fn set_cwd(&mut self, new_cwd: String) {
        let old_cwd = std::mem::replace(&mut self.cwd, new_cwd.clone());
        self.variables
            .get_or_new(variable::OLDPWD, Scope::Global)
            .assign(Value::scalar(old_cwd), None)
            .ok();
        self.variables
            .get_or_new(variable::PWD, Scope::Global)
            .assign(Value::scalar(new_cwd), None)
            .ok();
    }
}
