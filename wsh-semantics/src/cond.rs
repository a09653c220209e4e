//! Condition evaluator for `[[ ]]`/`test`/`[` (`spec.md` §4.5).
//!
//! Unary/binary file tests go through `env.fs`; there is no multi-user
//! model in this hermetic filesystem, so the permission tests (`-r`/`-w`/
//! `-x`) check the owner bits of `Mode` directly rather than comparing
//! against a real uid/gid. Device/pipe/socket node types don't exist in
//! `wsh_env::fs::FileType` at all, so `-b`/`-c`/`-p`/`-S` are always false;
//! `-N` (modified since last read) has no read-time tracking to compare
//! against and is always false; `-t` is always false per `wsh_syntax`'s own
//! doc comment on the variant.
//!
//! A matched `=~` populates `BASH_REMATCH` with the whole match followed by
//! each capture group, mirroring bash.

use crate::arith_env::eval_arith_str;
use crate::error::Result;
use crate::expansion::text::expand_word_unsplit;
use regex::RegexBuilder;
use std::path::Path;
use wsh_env::fs::FileType;
use wsh_env::option::ShellOption;
use wsh_env::variable::Value;
use wsh_env::Env;
use wsh_fnmatch::{parse::Config, Pattern, PatternChar};
use wsh_syntax::cond::{BinaryTest, CondExpr, UnaryTest};
use wsh_syntax::source::Location;

pub fn eval_cond(expr: &CondExpr, env: &mut Env) -> Result<bool> {
    match expr {
        CondExpr::Not(inner) => Ok(!eval_cond(inner, env)?),
        CondExpr::And(lhs, rhs) => Ok(eval_cond(lhs, env)? && eval_cond(rhs, env)?),
        CondExpr::Or(lhs, rhs) => Ok(eval_cond(lhs, env)? || eval_cond(rhs, env)?),
        CondExpr::Word(word) => Ok(!expand_word_unsplit(word, env)?.is_empty()),
        CondExpr::Unary(test, word) => eval_unary(*test, word, env),
        CondExpr::Binary(lhs, test, rhs) => eval_binary(lhs, *test, rhs, env),
    }
}

fn eval_unary(test: UnaryTest, word: &wsh_syntax::syntax::Word, env: &mut Env) -> Result<bool> {
    let operand = expand_word_unsplit(word, env)?;
    Ok(match test {
        UnaryTest::Exists => env.fs.exists(Path::new(&operand)),
        UnaryTest::RegularFile => stat(env, &operand).is_some_and(|m| m.file_type == FileType::Regular),
        UnaryTest::Directory => stat(env, &operand).is_some_and(|m| m.file_type == FileType::Directory),
        UnaryTest::Symlink => env.fs.lstat(Path::new(&operand)).is_ok_and(|m| m.file_type == FileType::Symlink),
        UnaryTest::Readable => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o400 != 0),
        UnaryTest::Writable => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o200 != 0),
        UnaryTest::Executable => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o100 != 0),
        UnaryTest::NonEmptyFile => stat(env, &operand).is_some_and(|m| m.len > 0),
        UnaryTest::BlockSpecial | UnaryTest::CharSpecial | UnaryTest::Pipe | UnaryTest::Socket => false,
        UnaryTest::ModifiedSinceRead => false,
        UnaryTest::SetUid => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o4000 != 0),
        UnaryTest::SetGid => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o2000 != 0),
        UnaryTest::Sticky => stat(env, &operand).is_some_and(|m| m.mode.0 & 0o1000 != 0),
        UnaryTest::Terminal => false,
        UnaryTest::StringEmpty => operand.is_empty(),
        UnaryTest::StringNonEmpty => !operand.is_empty(),
        UnaryTest::OptionSet => ShellOption::from_long_name(&operand).is_some_and(|o| env.options.is_on(o)),
        UnaryTest::VariableSet => env.variables.get(&operand).and_then(|v| v.value.as_ref()).is_some(),
        UnaryTest::NameRef => env.variables.get(&operand).is_some_and(|v| v.nameref_target.is_some()),
    })
}

fn stat(env: &Env, path: &str) -> Option<wsh_env::fs::Metadata> {
    env.fs.stat(Path::new(path)).ok()
}

fn eval_binary(lhs: &wsh_syntax::syntax::Word, test: BinaryTest, rhs: &wsh_syntax::syntax::Word, env: &mut Env) -> Result<bool> {
    let left = expand_word_unsplit(lhs, env)?;
    let right = expand_word_unsplit(rhs, env)?;
    Ok(match test {
        BinaryTest::NewerThan => mtime(env, &left) > mtime(env, &right),
        BinaryTest::OlderThan => mtime(env, &left) < mtime(env, &right),
        BinaryTest::SameFile => env.fs.realpath(Path::new(&left)).ok() == env.fs.realpath(Path::new(&right)).ok(),
        BinaryTest::Eq => pattern_match(&right, &left, env),
        BinaryTest::Ne => !pattern_match(&right, &left, env),
        BinaryTest::Lt => left < right,
        BinaryTest::Gt => left > right,
        BinaryTest::RegexMatch => eval_regex_match(&left, &right, env),
        BinaryTest::NumEq => numeric(&left, env)? == numeric(&right, env)?,
        BinaryTest::NumNe => numeric(&left, env)? != numeric(&right, env)?,
        BinaryTest::NumLt => numeric(&left, env)? < numeric(&right, env)?,
        BinaryTest::NumLe => numeric(&left, env)? <= numeric(&right, env)?,
        BinaryTest::NumGt => numeric(&left, env)? > numeric(&right, env)?,
        BinaryTest::NumGe => numeric(&left, env)? >= numeric(&right, env)?,
    })
}

fn mtime(env: &Env, path: &str) -> Option<u64> {
    stat(env, path).map(|m| m.mtime)
}

fn numeric(text: &str, env: &mut Env) -> Result<i64> {
    eval_arith_str(text, env, &Location::dummy())
}

fn pattern_match(pattern_text: &str, candidate: &str, env: &Env) -> bool {
    let config = Config {
        extended_glob: env.options.is_on(ShellOption::ExtGlob),
    };
    let case_insensitive = env.options.is_on(ShellOption::NoCaseMatch);
    match Pattern::parse_chars(pattern_text.chars().map(PatternChar::Normal), config, case_insensitive) {
        Ok(pattern) => pattern.is_match(candidate),
        Err(_) => pattern_text == candidate,
    }
}

fn eval_regex_match(candidate: &str, pattern_text: &str, env: &mut Env) -> bool {
    let case_insensitive = env.options.is_on(ShellOption::NoCaseMatch);
    let Ok(re) = RegexBuilder::new(pattern_text).case_insensitive(case_insensitive).build() else {
        return false;
    };
    let Some(captures) = re.captures(candidate) else {
        return false;
    };
    let groups: Vec<String> = captures.iter().map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default()).collect();
    crate::assign::assign_array(&mut env.variables, "BASH_REMATCH", groups).ok();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::{FileSystem, InMemoryFileSystem, WriteOptions};
    use wsh_syntax::source::Location;
    use wsh_syntax::syntax::Word;
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    fn word(s: &str) -> Word {
        Word::literal(s, Location::dummy())
    }

    #[test]
    fn string_equality_is_glob_matched() {
        let mut env = env();
        assert!(eval_cond(&CondExpr::Binary(word("hello"), BinaryTest::Eq, word("h*")), &mut env).unwrap());
        assert!(!eval_cond(&CondExpr::Binary(word("hello"), BinaryTest::Eq, word("x*")), &mut env).unwrap());
    }

    #[test]
    fn numeric_comparison() {
        let mut env = env();
        assert!(eval_cond(&CondExpr::Binary(word("10"), BinaryTest::NumGt, word("9")), &mut env).unwrap());
    }

    #[test]
    fn file_exists_test() {
        let mut env = env();
        env.fs.write_file(Path::new("/a"), b"x", WriteOptions::default()).unwrap();
        assert!(eval_unary(UnaryTest::Exists, &word("/a"), &mut env).unwrap());
        assert!(!eval_unary(UnaryTest::Exists, &word("/b"), &mut env).unwrap());
        assert!(eval_unary(UnaryTest::NonEmptyFile, &word("/a"), &mut env).unwrap());
    }

    #[test]
    fn regex_match_populates_bash_rematch() {
        let mut env = env();
        assert!(eval_cond(&CondExpr::Binary(word("abc123"), BinaryTest::RegexMatch, word("[a-z]+([0-9]+)")), &mut env).unwrap());
        assert_eq!(
            env.variables.get("BASH_REMATCH").unwrap().value,
            Some(Value::Array(vec!["abc123".to_string(), "123".to_string()]))
        );
    }

    #[test]
    fn not_and_or_short_circuit() {
        let mut env = env();
        let expr = CondExpr::And(Box::new(CondExpr::Word(word("1"))), Box::new(CondExpr::Word(word(""))));
        assert!(!eval_cond(&expr, &mut env).unwrap());
        let expr = CondExpr::Not(Box::new(CondExpr::Word(word(""))));
        assert!(eval_cond(&expr, &mut env).unwrap());
    }
}
