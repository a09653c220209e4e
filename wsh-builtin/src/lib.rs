//! Special and regular builtin commands (`spec.md` §4.7 "Builtin dispatch
//! contract"): each submodule implements one builtin against either
//! [`wsh_env::special::SpecialCommand`] (needs `&mut Env`) or
//! [`wsh_env::registry::Command`] (argv/stdin/cwd/env/fs only).
//!
//! A handful of builtin names collide with Rust keywords or the `Self`-like
//! primitive names (`break`, `continue`, `return`, `true`, `false`); those
//! modules are declared with an explicit `#[path]` so the on-disk file
//! keeps the builtin's own name while the module identifier stays a valid
//! Rust identifier.

mod alias;
#[path = "break.rs"]
mod break_builtin;
mod cd;
mod colon;
#[path = "continue.rs"]
mod continue_builtin;
mod declare;
mod eval;
mod exec;
mod exit;
mod export;
#[path = "false.rs"]
mod false_builtin;
mod getopts;
mod local;
mod pwd;
mod readonly;
#[path = "return.rs"]
mod return_builtin;
mod set;
mod shift;
mod source;
mod test_builtin;
mod trap;
#[path = "true.rs"]
mod true_builtin;
mod unalias;
mod unset;

pub mod common;

use std::rc::Rc;
use wsh_env::Env;

/// Registers every builtin this crate implements into `env`'s special and
/// regular command registries. A driver calls this once, right after
/// building a fresh [`Env`], before running any script against it.
pub fn install(env: &mut Env) {
    macro_rules! special {
        ($name:expr, $ty:expr) => {
            env.specials.register($name, Rc::new($ty) as Rc<dyn wsh_env::special::SpecialCommand>)
        };
    }
    macro_rules! regular {
        ($name:expr, $ty:expr) => {
            env.registry.register($name, Rc::new($ty) as Rc<dyn wsh_env::registry::Command>)
        };
    }

    special!("cd", cd::Cd);
    special!("export", export::Export);
    special!("readonly", readonly::Readonly);
    special!("unset", unset::Unset);
    special!("local", local::Local);
    special!("declare", declare::Declare);
    special!("typeset", declare::Declare);
    special!("set", set::Set);
    special!("shift", shift::Shift);
    special!("return", return_builtin::Return);
    special!("break", break_builtin::Break);
    special!("continue", continue_builtin::Continue);
    special!("exit", exit::Exit);
    special!("eval", eval::Eval);
    special!("source", source::Source);
    special!(".", source::Source);
    special!("exec", exec::Exec);
    special!("trap", trap::Trap);
    special!("getopts", getopts::Getopts);
    special!("alias", alias::Alias);
    special!("unalias", unalias::Unalias);

    regular!(":", colon::Colon);
    regular!("true", true_builtin::True);
    regular!("false", false_builtin::False);
    regular!("pwd", pwd::Pwd);
    regular!("test", test_builtin::Test);
    regular!("[", test_builtin::Test);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn install_registers_every_special_and_regular_builtin() {
        let mut env = env();
        install(&mut env);
        for name in [
            "cd", "export", "readonly", "unset", "local", "declare", "typeset", "set", "shift",
            "return", "break", "continue", "exit", "eval", "source", ".", "exec", "trap",
            "getopts", "alias", "unalias",
        ] {
            assert!(env.specials.contains(name), "missing special builtin {name}");
        }
        for name in [":", "true", "false", "pwd", "test", "["] {
            assert!(env.registry.contains(name), "missing regular builtin {name}");
        }
    }
}
