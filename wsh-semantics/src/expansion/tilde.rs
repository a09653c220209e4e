//! Tilde expansion (`spec.md` §4.3 step 2: "`~`, `~user`, `~+`, `~-` at word
//! start or after `:` in assignment context").
//!
//! There is no user database in this hermetic interpreter, so `~user` (a
//! named user other than the invoker) always falls back to its literal
//! spelling — the same outcome a real shell gives for an unknown user.

use wsh_env::variable::{OLDPWD, PWD};
use wsh_env::Env;
use wsh_syntax::syntax::{TildeExpansion, TildeSuffix};

/// Resolves `tilde`, falling back to its literal source spelling when it
/// cannot be resolved (no `$HOME`, or a named user).
#[must_use]
pub fn expand_tilde(tilde: &TildeExpansion, env: &Env) -> String {
    match tilde.suffix {
        TildeSuffix::PlusDir => return scalar_or(env, PWD, "~+"),
        TildeSuffix::MinusDir => return scalar_or(env, OLDPWD, "~-"),
        TildeSuffix::None => {}
    }
    if tilde.user.is_empty() {
        scalar_or(env, wsh_env::variable::HOME, "~")
    } else {
        format!("~{}", tilde.user)
    }
}

fn scalar_or(env: &Env, name: &str, fallback: &str) -> String {
    env.variables
        .get(name)
        .and_then(|v| v.value.as_ref())
        .map(|v| v.as_scalar().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_env::variable::{Scope, Value};
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/home/user".to_string(), "wsh".to_string())
    }

    fn tilde(user: &str, suffix: TildeSuffix) -> TildeExpansion {
        TildeExpansion {
            user: user.to_string(),
            suffix,
        }
    }

    #[test]
    fn bare_tilde_expands_home() {
        let mut env = env();
        env.variables.get_or_new("HOME", Scope::Global).assign(Value::scalar("/home/user"), None).unwrap();
        assert_eq!(expand_tilde(&tilde("", TildeSuffix::None), &env), "/home/user");
    }

    #[test]
    fn bare_tilde_without_home_falls_back_to_literal() {
        let env = env();
        assert_eq!(expand_tilde(&tilde("", TildeSuffix::None), &env), "~");
    }

    #[test]
    fn named_user_is_never_resolved() {
        let env = env();
        assert_eq!(expand_tilde(&tilde("bob", TildeSuffix::None), &env), "~bob");
    }

    #[test]
    fn plus_and_minus_use_pwd_and_oldpwd() {
        let mut env = env();
        env.variables.get_or_new(OLDPWD, Scope::Global).assign(Value::scalar("/tmp"), None).unwrap();
        assert_eq!(expand_tilde(&tilde("", TildeSuffix::PlusDir), &env), "/home/user");
        assert_eq!(expand_tilde(&tilde("", TildeSuffix::MinusDir), &env), "/tmp");
    }
}
