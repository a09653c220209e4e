//! Parameter and variable expansion (`spec.md` §4.3 step 3), the
//! `${...}` operator catalog in full: default/assign/error/alt, length,
//! substring, pattern remove/replace, case transforms, `@`-transforms,
//! indirection, name-prefix listing, and array subscripts.
//!
//! Only indexed arrays exist at the variable-store level
//! (`wsh_env::variable::Value::Array` is a plain `Vec<String>`); associative
//! arrays (`declare -A`) are out of scope, recorded in `DESIGN.md`.

use super::attr::{Expansion, Origin};
use crate::arith_env::eval_arith;
use crate::assign::assign_value;
use crate::error::{ExpansionError, Result};
use wsh_env::variable::{Value, IFS};
use wsh_env::Env;
use wsh_fnmatch::{parse::Config as GlobConfig, Pattern};
use wsh_syntax::source::Location;
use wsh_syntax::syntax::{
    BracedParam, CaseMode, Param, ParamOp, ParamType, PatternSide, ReplaceMode, SpecialParam, SwitchCondition, SwitchType, TransformOp, Word,
};

/// Expands a bare `$name`/`$1`/`$@` reference with no braced operator.
pub fn expand_param(param: &Param, is_quoted: bool, env: &mut Env, out: &mut dyn Expansion, location: &Location, expand_word: &mut ExpandWord<'_>) -> Result<()> {
    let referent = resolve(param, None, env, location, expand_word)?;
    push_referent(&referent, is_quoted, env, out);
    Ok(())
}

/// Expands `${...}`, applying `braced.op` (if any) to the resolved value.
pub fn expand_braced_param(
    braced: &BracedParam,
    is_quoted: bool,
    env: &mut Env,
    out: &mut dyn Expansion,
    location: &Location,
    expand_word: &mut ExpandWord<'_>,
) -> Result<()> {
    if let Some(ParamOp::PrefixNames { at_form }) = &braced.op {
        let names = matching_names(&braced.param.id, env);
        push_referent(&Referent::Array(names, *at_form), is_quoted, env, out);
        return Ok(());
    }
    if matches!(braced.op, Some(ParamOp::Indirect)) {
        let indirect = resolve(&braced.param, braced.index.as_deref(), env, location, expand_word)?;
        let name = match &indirect {
            Referent::Scalar(Some(s)) => s.clone(),
            _ => String::new(),
        };
        let inner = Param {
            id: name,
            r#type: ParamType::Variable,
        };
        let referent = resolve(&inner, None, env, location, expand_word)?;
        push_referent(&referent, is_quoted, env, out);
        return Ok(());
    }

    let referent = resolve(&braced.param, braced.index.as_deref(), env, location, expand_word)?;

    match &braced.op {
        None => push_referent(&referent, is_quoted, env, out),
        Some(ParamOp::Length) => {
            let len = match &referent {
                Referent::Scalar(Some(s)) => s.chars().count(),
                Referent::Scalar(None) => 0,
                Referent::Array(values, _) => values.len(),
            };
            out.push_str(&len.to_string(), Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::Switch { condition, ty, word }) => {
            expand_switch(*condition, *ty, word, &braced.param, &referent, is_quoted, env, out, location, expand_word)?;
        }
        Some(ParamOp::Substring { offset, length }) => {
            let base = referent_to_scalar(&referent, env);
            let offset = eval_arith(offset, env, location)?;
            let length = match length {
                Some(expr) => Some(eval_arith(expr, env, location)?),
                None => None,
            };
            let substring = apply_substring(&base, offset, length);
            out.push_str(&substring, Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::RemovePattern { pattern, side, longest }) => {
            let base = referent_to_scalar(&referent, env);
            let pattern_text = expand_word.call(pattern, env)?;
            let result = apply_remove_pattern(&base, &pattern_text, *side, *longest, env);
            out.push_str(&result, Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::Replace { pattern, replacement, mode }) => {
            let base = referent_to_scalar(&referent, env);
            let pattern_text = expand_word.call(pattern, env)?;
            let replacement_text = match replacement {
                Some(w) => expand_word.call(w, env)?,
                None => String::new(),
            };
            let result = apply_replace(&base, &pattern_text, &replacement_text, *mode, env);
            out.push_str(&result, Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::Case { pattern, mode }) => {
            let base = referent_to_scalar(&referent, env);
            let pattern_text = match pattern {
                Some(w) => Some(expand_word.call(w, env)?),
                None => None,
            };
            let result = apply_case(&base, pattern_text.as_deref(), *mode, env);
            out.push_str(&result, Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::Transform(op)) => {
            let result = apply_transform(*op, &braced.param, &referent, env);
            out.push_str(&result, Origin::SoftExpansion, is_quoted);
        }
        Some(ParamOp::Indirect) | Some(ParamOp::PrefixNames { .. }) => unreachable!("handled above"),
    }
    Ok(())
}

/// Callback into the top-level word-expansion entry point, used for the
/// nested words an operator takes (`${x:-default}`, `${x/pat/repl}`, …).
/// Those words are expanded without splitting or globbing and joined into
/// one field, matching bash's treatment of operator arguments.
pub struct ExpandWord<'a>(pub &'a mut dyn FnMut(&Word, &mut Env) -> Result<String>);

impl ExpandWord<'_> {
    fn call(&mut self, word: &Word, env: &mut Env) -> Result<String> {
        (self.0)(word, env)
    }
}

#[derive(Clone, Debug)]
enum Referent {
    Scalar(Option<String>),
    /// `(elements, at_form)`; `at_form` controls whether a quoted reference
    /// distributes into separate fields (`$@`, `${a[@]}`) or joins into one
    /// (`$*`, `${a[*]}`).
    Array(Vec<String>, bool),
}

fn resolve(param: &Param, index: Option<&Word>, env: &mut Env, location: &Location, expand_word: &mut ExpandWord<'_>) -> Result<Referent> {
    if let ParamType::Special(special) = param.r#type {
        return Ok(resolve_special(special, env));
    }
    if let ParamType::Positional(n) = param.r#type {
        return Ok(Referent::Scalar(env.variables.positional_params().get(n.wrapping_sub(1)).cloned()));
    }

    let name = &param.id;
    let Some(index_word) = index else {
        return Ok(match env.variables.get(name).and_then(|v| v.value.clone()) {
            Some(Value::Array(values)) => Referent::Scalar(values.first().cloned()),
            Some(Value::Scalar(s)) => Referent::Scalar(Some(s)),
            None => Referent::Scalar(None),
        });
    };

    let index_text = expand_word.call(index_word, env)?;
    if index_text == "@" || index_text == "*" {
        let at_form = index_text == "@";
        let values = match env.variables.get(name).and_then(|v| v.value.clone()) {
            Some(Value::Array(values)) => values,
            Some(Value::Scalar(s)) => vec![s],
            None => vec![],
        };
        return Ok(Referent::Array(values, at_form));
    }

    let n = eval_arith(&wsh_arith::parse(&index_text).map_err(|e| ExpansionError::Arithmetic {
        message: e.to_string(),
        location: location.clone(),
    })?, env, location)?;
    let element = match env.variables.get(name).and_then(|v| v.value.as_ref()) {
        Some(Value::Array(values)) => normalize_index(n, values.len()).and_then(|i| values.get(i).cloned()),
        Some(Value::Scalar(s)) if n == 0 => Some(s.clone()),
        _ => None,
    };
    Ok(Referent::Scalar(element))
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    (resolved >= 0).then_some(resolved as usize)
}

fn resolve_special(special: SpecialParam, env: &Env) -> Referent {
    match special {
        SpecialParam::At => Referent::Array(env.variables.positional_params().to_vec(), true),
        SpecialParam::Asterisk => Referent::Array(env.variables.positional_params().to_vec(), false),
        SpecialParam::Count => Referent::Scalar(Some(env.variables.positional_params().len().to_string())),
        SpecialParam::Question => Referent::Scalar(Some(env.exit_status.to_string())),
        SpecialParam::Hyphen => Referent::Scalar(Some(option_flags(env))),
        // No real OS process backs this hermetic interpreter; a stable
        // placeholder keeps `$$` deterministic.
        SpecialParam::Dollar => Referent::Scalar(Some("1".to_string())),
        // No job control (`spec.md` Non-goals); there is never a background job.
        SpecialParam::Exclamation => Referent::Scalar(Some(String::new())),
        SpecialParam::Zero => Referent::Scalar(Some(env.shell_name.clone())),
    }
}

fn option_flags(env: &Env) -> String {
    use wsh_env::option::ShellOption::*;
    [(ErrExit, 'e'), (NoUnset, 'u'), (XTrace, 'x'), (NoGlob, 'f')]
        .into_iter()
        .filter(|(opt, _)| env.options.is_on(*opt))
        .map(|(_, c)| c)
        .collect()
}

fn matching_names(prefix: &str, env: &Env) -> Vec<String> {
    let mut names: Vec<String> = env.variables.iter().map(|(name, _)| name.to_string()).filter(|n| n.starts_with(prefix)).collect();
    names.sort();
    names
}

fn referent_to_scalar(referent: &Referent, env: &Env) -> String {
    match referent {
        Referent::Scalar(Some(s)) => s.clone(),
        Referent::Scalar(None) => String::new(),
        Referent::Array(values, _) => values.join(&ifs_first_char(env)),
    }
}

fn push_referent(referent: &Referent, is_quoted: bool, env: &Env, out: &mut dyn Expansion) {
    match referent {
        Referent::Scalar(Some(s)) => out.push_str(s, Origin::SoftExpansion, is_quoted),
        Referent::Scalar(None) => {}
        Referent::Array(values, at_form) => {
            if is_quoted && *at_form {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.start_new_field();
                    }
                    out.push_str(value, Origin::SoftExpansion, true);
                }
            } else {
                let joined = values.join(&ifs_first_char(env));
                out.push_str(&joined, Origin::SoftExpansion, is_quoted);
            }
        }
    }
}

fn ifs_first_char(env: &Env) -> String {
    match env.variables.get(IFS).and_then(|v| v.value.as_ref()) {
        None => " ".to_string(),
        Some(value) => value.as_scalar().chars().next().map(|c| c.to_string()).unwrap_or_default(),
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_switch(
    condition: SwitchCondition,
    ty: SwitchType,
    word: &Word,
    param: &Param,
    referent: &Referent,
    is_quoted: bool,
    env: &mut Env,
    out: &mut dyn Expansion,
    location: &Location,
    expand_word: &mut ExpandWord<'_>,
) -> Result<()> {
    let triggers = match (&condition, referent) {
        (SwitchCondition::Unset, Referent::Scalar(None)) => true,
        (SwitchCondition::Unset, Referent::Array(values, _)) => values.is_empty() && is_truly_unset(param, env),
        (SwitchCondition::UnsetOrEmpty, Referent::Scalar(None)) => true,
        (SwitchCondition::UnsetOrEmpty, Referent::Scalar(Some(s))) => s.is_empty(),
        (SwitchCondition::UnsetOrEmpty, Referent::Array(values, _)) => values.iter().all(|v| v.is_empty()),
        _ => false,
    };

    if !triggers {
        match ty {
            SwitchType::Alter => {}
            _ => {
                push_referent(referent, is_quoted, env, out);
                return Ok(());
            }
        }
    }

    match ty {
        SwitchType::Default => {
            if triggers {
                let value = expand_word.call(word, env)?;
                out.push_str(&value, Origin::SoftExpansion, is_quoted);
            }
        }
        SwitchType::Alter => {
            if !triggers {
                let value = expand_word.call(word, env)?;
                out.push_str(&value, Origin::SoftExpansion, is_quoted);
            }
        }
        SwitchType::Assign => {
            let value = expand_word.call(word, env)?;
            assign_value(&mut env.variables, &param.id, Value::scalar(value.clone())).map_err(|e| ExpansionError::RequiredSubstitution {
                name: param.id.clone(),
                message: e.to_string(),
                location: location.clone(),
            })?;
            out.push_str(&value, Origin::SoftExpansion, is_quoted);
        }
        SwitchType::Error => {
            let message = expand_word.call(word, env)?;
            let message = if message.is_empty() {
                "parameter not set".to_string()
            } else {
                message
            };
            return Err(ExpansionError::RequiredSubstitution {
                name: param.id.clone(),
                message,
                location: location.clone(),
            });
        }
    }
    Ok(())
}

fn is_truly_unset(param: &Param, env: &Env) -> bool {
    !matches!(param.r#type, ParamType::Variable) || env.variables.get(&param.id).and_then(|v| v.value.as_ref()).is_none()
}

fn apply_substring(base: &str, offset: i64, length: Option<i64>) -> String {
    let chars: Vec<char> = base.chars().collect();
    let len = chars.len() as i64;
    let start = if offset < 0 { (len + offset).max(0) } else { offset.min(len) };
    let end = match length {
        None => len,
        Some(l) if l < 0 => (len + l).max(start),
        Some(l) => (start + l).min(len),
    };
    if start >= end {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}

fn compile_pattern(text: &str, env: &Env) -> Option<Pattern> {
    let config = GlobConfig {
        extended_glob: env.options.is_on(wsh_env::option::ShellOption::ExtGlob),
    };
    let case_insensitive = env.options.is_on(wsh_env::option::ShellOption::NoCaseMatch);
    Pattern::parse_chars(text.chars().map(wsh_fnmatch::PatternChar::Normal), config, case_insensitive).ok()
}

fn apply_remove_pattern(base: &str, pattern_text: &str, side: PatternSide, longest: bool, env: &Env) -> String {
    let Some(pattern) = compile_pattern(pattern_text, env) else {
        return base.to_string();
    };
    let chars: Vec<char> = base.chars().collect();
    let candidates: Vec<usize> = match side {
        PatternSide::Prefix => {
            if longest {
                (0..=chars.len()).rev().collect()
            } else {
                (0..=chars.len()).collect()
            }
        }
        PatternSide::Suffix => {
            if longest {
                (0..=chars.len()).collect()
            } else {
                (0..=chars.len()).rev().collect()
            }
        }
    };
    for cut in candidates {
        let candidate: String = match side {
            PatternSide::Prefix => chars[..cut].iter().collect(),
            PatternSide::Suffix => chars[cut..].iter().collect(),
        };
        if pattern.is_match(&candidate) {
            let remainder: String = match side {
                PatternSide::Prefix => chars[cut..].iter().collect(),
                PatternSide::Suffix => chars[..cut].iter().collect(),
            };
            return remainder;
        }
    }
    base.to_string()
}

fn apply_replace(base: &str, pattern_text: &str, replacement: &str, mode: ReplaceMode, env: &Env) -> String {
    let (pattern_text, mode) = match pattern_text.strip_prefix('#') {
        Some(rest) => (rest, ReplaceMode::AnchorStart),
        None => match pattern_text.strip_prefix('%') {
            Some(rest) => (rest, ReplaceMode::AnchorEnd),
            None => (pattern_text, mode),
        },
    };
    let Some(pattern) = compile_pattern(pattern_text, env) else {
        return base.to_string();
    };
    let chars: Vec<char> = base.chars().collect();
    let n = chars.len();

    let find_match = |start: usize| -> Option<usize> {
        (start..=n).find(|&end| pattern.is_match(&chars[start..end].iter().collect::<String>()))
    };

    match mode {
        ReplaceMode::AnchorStart => match find_match(0) {
            Some(end) => format!("{replacement}{}", chars[end..].iter().collect::<String>()),
            None => base.to_string(),
        },
        ReplaceMode::AnchorEnd => {
            for start in 0..=n {
                let candidate: String = chars[start..].iter().collect();
                if pattern.is_match(&candidate) {
                    return format!("{}{replacement}", chars[..start].iter().collect::<String>());
                }
            }
            base.to_string()
        }
        ReplaceMode::First => match first_match_span(&pattern, &chars) {
            Some((start, end)) => format!(
                "{}{replacement}{}",
                chars[..start].iter().collect::<String>(),
                chars[end..].iter().collect::<String>()
            ),
            None => base.to_string(),
        },
        ReplaceMode::All => {
            let mut result = String::new();
            let mut i = 0;
            while i <= n {
                if let Some(end) = find_match(i) {
                    result.push_str(replacement);
                    if end == i {
                        if let Some(&c) = chars.get(i) {
                            result.push(c);
                        }
                        i += 1;
                    } else {
                        i = end;
                    }
                } else {
                    if let Some(&c) = chars.get(i) {
                        result.push(c);
                    }
                    i += 1;
                }
            }
            result
        }
    }
}

fn first_match_span(pattern: &Pattern, chars: &[char]) -> Option<(usize, usize)> {
    for start in 0..=chars.len() {
        for end in start..=chars.len() {
            if pattern.is_match(&chars[start..end].iter().collect::<String>()) {
                return Some((start, end));
            }
        }
    }
    None
}

fn apply_case(base: &str, pattern_text: Option<&str>, mode: CaseMode, env: &Env) -> String {
    let pattern = pattern_text.and_then(|p| compile_pattern(p, env));
    let matches = |c: char| pattern.as_ref().map_or(true, |p| p.is_match(&c.to_string()));
    let mut chars: Vec<char> = base.chars().collect();
    match mode {
        CaseMode::FirstUpper => {
            if let Some(c) = chars.first_mut() {
                if matches(*c) {
                    *c = c.to_ascii_uppercase();
                }
            }
        }
        CaseMode::FirstLower => {
            if let Some(c) = chars.first_mut() {
                if matches(*c) {
                    *c = c.to_ascii_lowercase();
                }
            }
        }
        CaseMode::AllUpper => {
            for c in &mut chars {
                if matches(*c) {
                    *c = c.to_ascii_uppercase();
                }
            }
        }
        CaseMode::AllLower => {
            for c in &mut chars {
                if matches(*c) {
                    *c = c.to_ascii_lowercase();
                }
            }
        }
    }
    chars.into_iter().collect()
}

fn apply_transform(op: TransformOp, param: &Param, referent: &Referent, env: &Env) -> String {
    let base = referent_to_scalar(referent, env);
    match op {
        TransformOp::Upper => base.to_uppercase(),
        TransformOp::Lower => base.to_lowercase(),
        TransformOp::Quote => wsh_quote::quote(&base).into_owned(),
        TransformOp::Escape => base.chars().flat_map(|c| if "\\\"'$`".contains(c) { vec!['\\', c] } else { vec![c] }).collect(),
        TransformOp::Prompt => base,
        TransformOp::Assign => format!("{}={}", param.id, wsh_quote::quote(&base)),
        TransformOp::KeysValues | TransformOp::KeysValuesQuoted => match referent {
            Referent::Array(values, _) => (0..values.len()).map(|i| i.to_string()).collect::<Vec<_>>().join(" "),
            Referent::Scalar(_) => "0".to_string(),
        },
        TransformOp::Attributes => {
            let mut flags = String::new();
            if let Referent::Array(..) = referent {
                flags.push('a');
            }
            flags
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::attr::AttrField;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_env::variable::Scope;
    use wsh_syntax::source::Location;
    use std::rc::Rc as StdRc;

    fn env() -> Env {
        Env::new(StdRc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    fn noop_expand_word<'a>() -> Box<dyn FnMut(&Word, &mut Env) -> Result<String> + 'a> {
        Box::new(|word, _env| {
            Ok(word
                .parts
                .iter()
                .filter_map(|p| match p {
                    wsh_syntax::syntax::WordPart::Unquoted(wsh_syntax::syntax::TextUnit::Literal(s)) => Some(s.clone()),
                    _ => None,
                })
                .collect())
        })
    }

    #[test]
    fn substring_handles_negative_offset_and_length() {
        assert_eq!(apply_substring("hello world", -5, None), "world");
        assert_eq!(apply_substring("hello world", 0, Some(-6)), "hello");
    }

    #[test]
    fn default_switch_uses_word_only_when_unset() {
        let mut env = env();
        let mut callback = noop_expand_word();
        let mut expand_word = ExpandWord(&mut *callback);
        let param = Param {
            id: "x".to_string(),
            r#type: ParamType::Variable,
        };
        let referent = Referent::Scalar(None);
        let mut out = AttrField::new();
        expand_switch(
            SwitchCondition::Unset,
            SwitchType::Default,
            &Word::literal("fallback", Location::dummy()),
            &param,
            &referent,
            false,
            &mut env,
            &mut out,
            &Location::dummy(),
            &mut expand_word,
        )
        .unwrap();
        assert_eq!(out.to_quote_removed_string(), "fallback");
    }

    #[test]
    fn assign_switch_writes_variable() {
        let mut env = env();
        let mut callback = noop_expand_word();
        let mut expand_word = ExpandWord(&mut *callback);
        let param = Param {
            id: "x".to_string(),
            r#type: ParamType::Variable,
        };
        let referent = Referent::Scalar(None);
        let mut out = AttrField::new();
        expand_switch(
            SwitchCondition::Unset,
            SwitchType::Assign,
            &Word::literal("assigned", Location::dummy()),
            &param,
            &referent,
            false,
            &mut env,
            &mut out,
            &Location::dummy(),
            &mut expand_word,
        )
        .unwrap();
        assert_eq!(env.variables.get("x").unwrap().value, Some(Value::scalar("assigned")));
    }

    #[test]
    fn remove_pattern_longest_prefix() {
        let env = env();
        assert_eq!(apply_remove_pattern("aXbXc", "a*X", PatternSide::Prefix, true, &env), "c");
        assert_eq!(apply_remove_pattern("aXbXc", "a*X", PatternSide::Prefix, false, &env), "bXc");
    }

    #[test]
    fn replace_all_occurrences() {
        let env = env();
        assert_eq!(apply_replace("ababab", "ab", "X", ReplaceMode::All, &env), "XXX");
        assert_eq!(apply_replace("ababab", "ab", "X", ReplaceMode::First, &env), "Xabab");
    }

    #[test]
    fn case_transform_first_upper() {
        let env = env();
        assert_eq!(apply_case("hello", None, CaseMode::FirstUpper, &env), "Hello");
        assert_eq!(apply_case("hello", None, CaseMode::AllUpper, &env), "HELLO");
    }

    #[test]
    fn indexed_array_element_and_whole_array() {
        let mut env = env();
        env.variables
            .get_or_new("a", Scope::Global)
            .assign(Value::Array(vec!["x".to_string(), "y".to_string(), "z".to_string()]), None)
            .unwrap();
        let mut callback = noop_expand_word();
        let mut expand_word = ExpandWord(&mut *callback);
        let param = Param {
            id: "a".to_string(),
            r#type: ParamType::Variable,
        };
        let one = Word::literal("1", Location::dummy());
        let referent = resolve(&param, Some(&one), &mut env, &Location::dummy(), &mut expand_word).unwrap();
        assert!(matches!(referent, Referent::Scalar(Some(ref s)) if s == "y"));

        let at = Word::literal("@", Location::dummy());
        let referent = resolve(&param, Some(&at), &mut env, &Location::dummy(), &mut expand_word).unwrap();
        assert!(matches!(referent, Referent::Array(ref v, true) if v.len() == 3));
    }
}
