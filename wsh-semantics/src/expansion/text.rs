//! Dispatches a [`Word`]'s parts/[`TextUnit`]s to the right expansion step
//! (`spec.md` §4.3 steps 2-5: tilde, parameter, arithmetic, command
//! substitution — brace expansion already ran over the source text before
//! parts ever reach here, and word splitting/globbing/quote removal happen
//! afterward in [`super::split`]/[`super::glob`]/on [`super::attr::AttrField`]
//! directly).

use super::attr::{Expansion, Origin};
use super::param::{self, ExpandWord};
use super::tilde;
use crate::arith_env::eval_arith;
use crate::error::Result;
use wsh_env::Env;
use wsh_syntax::syntax::{TextUnit, Word, WordPart};

/// Expands every part of `word` into `out`, without splitting or globbing.
pub fn expand_word_into(word: &Word, env: &mut Env, out: &mut dyn Expansion) -> Result<()> {
    for part in &word.parts {
        match part {
            WordPart::Unquoted(unit) => expand_text_unit(unit, false, env, &word.location, out)?,
            WordPart::SingleQuoted(s) => out.push_str(s, Origin::Literal, true),
            WordPart::DoubleQuoted(units) => {
                for unit in units {
                    expand_text_unit(unit, true, env, &word.location, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Expands `word` and joins every field produced into one string, for
/// contexts that never split (an operator's nested word, a heredoc
/// delimiter, an assignment's right-hand side).
pub fn expand_word_unsplit(word: &Word, env: &mut Env) -> Result<String> {
    let mut field = super::attr::AttrField::new();
    expand_word_into(word, env, &mut field)?;
    Ok(field.to_quote_removed_string())
}

fn expand_text_unit(unit: &TextUnit, is_quoted: bool, env: &mut Env, location: &wsh_syntax::source::Location, out: &mut dyn Expansion) -> Result<()> {
    match unit {
        TextUnit::Literal(s) => out.push_str(s, Origin::Literal, is_quoted),
        TextUnit::Backslash(c) => out.push_char(super::attr::AttrChar {
            value: *c,
            origin: Origin::Literal,
            is_quoted: true,
        }),
        TextUnit::DollarVariable(p) => {
            let mut callback = nested_word_callback();
            let mut expand_word = ExpandWord(&mut *callback);
            param::expand_param(p, is_quoted, env, out, location, &mut expand_word)?;
        }
        TextUnit::BracedParam(braced) => {
            let mut callback = nested_word_callback();
            let mut expand_word = ExpandWord(&mut *callback);
            param::expand_braced_param(braced, is_quoted, env, out, location, &mut expand_word)?;
        }
        TextUnit::CommandSubstitution(script) | TextUnit::Backquoted(script) => {
            let captured = crate::exec::run_captured(script, env);
            let trimmed = captured.trim_end_matches('\n');
            out.push_str(trimmed, Origin::SoftExpansion, is_quoted);
        }
        TextUnit::Arithmetic(expr) => {
            let value = eval_arith(expr, env, location)?;
            out.push_str(&value.to_string(), Origin::SoftExpansion, is_quoted);
        }
        TextUnit::Tilde(tilde) => {
            let expanded = tilde::expand_tilde(tilde, env);
            out.push_str(&expanded, Origin::HardExpansion, false);
        }
        TextUnit::ProcessSubstitution(proc_subst) => {
            let path = expand_process_substitution(proc_subst, env);
            out.push_str(&path, Origin::HardExpansion, is_quoted);
        }
    }
    Ok(())
}

/// There is no real file-descriptor/pipe layer in this hermetic interpreter
/// (`spec.md` §5: "no true pipes"), so `<(cmd)`/`>(cmd)` run eagerly and
/// hand back a synthetic path holding whatever `cmd` wrote to stdout,
/// rather than a live streaming descriptor. `>(cmd)` gets the same
/// treatment with an empty capture, since nothing downstream can feed it
/// bytes after the fact in a single-pass interpreter.
fn expand_process_substitution(proc_subst: &wsh_syntax::syntax::ProcessSubstitution, env: &mut Env) -> String {
    use wsh_syntax::syntax::ProcessSubstDirection;
    let ordinal = env.counters.total_commands;
    let path = format!("/dev/fd/wsh-procsubst-{ordinal}");
    let options = wsh_env::fs::WriteOptions {
        truncate: true,
        ..Default::default()
    };
    match proc_subst.direction {
        ProcessSubstDirection::Read => {
            let captured = crate::exec::run_captured(&proc_subst.script, env);
            env.fs.write_file(std::path::Path::new(&path), captured.as_bytes(), options).ok();
        }
        ProcessSubstDirection::Write => {
            env.fs.write_file(std::path::Path::new(&path), b"", options).ok();
        }
    }
    path
}

fn nested_word_callback<'a>() -> Box<dyn FnMut(&Word, &mut Env) -> Result<String> + 'a> {
    Box::new(expand_word_unsplit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_env::variable::{Scope, Value};
    use wsh_syntax::source::Location;
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    #[test]
    fn literal_and_variable_concatenate() {
        let mut env = env();
        env.variables.get_or_new("x", Scope::Global).assign(Value::scalar("world"), None).unwrap();
        let word = Word {
            parts: vec![
                WordPart::Unquoted(TextUnit::Literal("hello-".to_string())),
                WordPart::Unquoted(TextUnit::DollarVariable(wsh_syntax::syntax::Param {
                    id: "x".to_string(),
                    r#type: wsh_syntax::syntax::ParamType::Variable,
                })),
            ],
            location: Location::dummy(),
        };
        assert_eq!(expand_word_unsplit(&word, &mut env).unwrap(), "hello-world");
    }

    #[test]
    fn arithmetic_unit_expands_to_its_value() {
        let mut env = env();
        let word = Word {
            parts: vec![WordPart::Unquoted(TextUnit::Arithmetic(wsh_arith::parse("2 + 2").unwrap()))],
            location: Location::dummy(),
        };
        assert_eq!(expand_word_unsplit(&word, &mut env).unwrap(), "4");
    }
}
