//! Word splitting (`spec.md` §4.3 step 6): "only on unquoted-origin
//! expansion results, on current `IFS`; empty `IFS` disables splitting;
//! default `IFS` treats whitespace runs as one separator, non-whitespace
//! `IFS` chars each delimit one field".
//!
//! Only [`Origin::SoftExpansion`] characters that are not quoted are
//! eligible — literal text and tilde/brace output (`Origin::HardExpansion`)
//! never split, matching `spec.md`'s "array-typed expansions produce
//! multiple fields not re-split" rule by construction (those already
//! arrive as separate [`AttrField`]s, see [`super::attr`]).

use super::attr::{AttrChar, AttrField};
use wsh_env::variable::IFS;
use wsh_env::Env;

#[must_use]
pub fn split_field(field: &AttrField, env: &Env) -> Vec<AttrField> {
    let ifs = current_ifs(env);
    if ifs.is_empty() {
        return vec![field.clone()];
    }
    let whitespace: Vec<char> = ifs.chars().filter(|c| c.is_whitespace()).collect();
    let non_whitespace: Vec<char> = ifs.chars().filter(|c| !c.is_whitespace()).collect();

    let mut fields = Vec::new();
    let mut current = AttrField::new();
    let mut pending_field = false;
    let mut chars = field.0.iter().peekable();

    while let Some(&c) = chars.next() {
        if is_splittable(c, &whitespace, &non_whitespace) {
            if c.value.is_whitespace() {
                if !current.is_empty() || pending_field {
                    fields.push(std::mem::take(&mut current));
                    pending_field = false;
                }
                while chars.peek().is_some_and(|c| is_splittable(**c, &whitespace, &[]) && c.value.is_whitespace()) {
                    chars.next();
                }
            } else {
                fields.push(std::mem::take(&mut current));
                pending_field = true;
            }
        } else {
            current.push_char(c);
        }
    }
    if !current.is_empty() || pending_field {
        fields.push(current);
    }
    fields
}

fn is_splittable(c: AttrChar, whitespace: &[char], non_whitespace: &[char]) -> bool {
    !c.is_quoted && matches!(c.origin, super::attr::Origin::SoftExpansion) && (whitespace.contains(&c.value) || non_whitespace.contains(&c.value))
}

fn current_ifs(env: &Env) -> String {
    match env.variables.get(IFS).and_then(|v| v.value.as_ref()) {
        None => " \t\n".to_string(),
        Some(value) => value.as_scalar().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::InMemoryFileSystem;
    use wsh_env::variable::{Scope, Value};
    use std::rc::Rc;

    fn env() -> Env {
        Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "wsh".to_string())
    }

    fn soft(s: &str) -> AttrField {
        let mut field = AttrField::new();
        field.0.extend(s.chars().map(|value| AttrChar {
            value,
            origin: super::super::attr::Origin::SoftExpansion,
            is_quoted: false,
        }));
        field
    }

    fn text(field: &AttrField) -> String {
        field.to_quote_removed_string()
    }

    #[test]
    fn default_ifs_collapses_whitespace_runs() {
        let env = env();
        let fields = split_field(&soft("  a   b  c "), &env);
        let texts: Vec<String> = fields.iter().map(text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        let mut env = env();
        env.variables.get_or_new(IFS, Scope::Global).assign(Value::scalar(""), None).unwrap();
        let fields = split_field(&soft("a b c"), &env);
        assert_eq!(fields.len(), 1);
        assert_eq!(text(&fields[0]), "a b c");
    }

    #[test]
    fn non_whitespace_ifs_char_delimits_each_occurrence() {
        let mut env = env();
        env.variables.get_or_new(IFS, Scope::Global).assign(Value::scalar(":"), None).unwrap();
        let fields = split_field(&soft("a::b:c"), &env);
        let texts: Vec<String> = fields.iter().map(text).collect();
        assert_eq!(texts, vec!["a", "", "b", "c"]);
    }

    #[test]
    fn quoted_characters_never_split() {
        let env = env();
        let mut field = AttrField::new();
        field.push_str("a b", super::super::attr::Origin::SoftExpansion, true);
        let fields = split_field(&field, &env);
        assert_eq!(fields.len(), 1);
    }
}
