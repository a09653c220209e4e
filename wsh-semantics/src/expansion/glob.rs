//! Pathname expansion (`spec.md` §4.3 step 7): `*`/`?`/`[...]`/POSIX
//! classes via `wsh-fnmatch`, `extglob`, `globstar` (`**` matching across
//! directory separators), `dotglob`, `nocasematch`, and the
//! no-match/`nullglob`/`failglob` boundary behaviors.

use super::attr::{AttrChar, AttrField, Origin};
use crate::error::{ExpansionError, Result};
use std::path::{Path, PathBuf};
use wsh_env::option::ShellOption;
use wsh_env::Env;
use wsh_fnmatch::{parse::Config, Pattern, PatternChar};

/// Expands `field` as a pathname pattern against `env.fs`/`env.cwd`.
/// Returns `Ok(None)` when `field` has no glob metacharacter (caller keeps
/// the field as-is) or when `noglob` is set.
pub fn glob_expand(field: &AttrField, env: &Env, location: &wsh_syntax::source::Location) -> Result<Option<Vec<String>>> {
    let extglob = env.options.is_on(ShellOption::ExtGlob);
    if env.options.is_on(ShellOption::NoGlob) || !has_unquoted_metachar(field, extglob) {
        return Ok(None);
    }

    let config = Config { extended_glob: extglob };
    let case_insensitive = env.options.is_on(ShellOption::NoCaseMatch);
    let globstar = env.options.is_on(ShellOption::GlobStar);
    let dotglob = env.options.is_on(ShellOption::DotGlob);

    let components = split_components(field);
    let mut matches = walk(&env.cwd, &components, env, config, case_insensitive, globstar, dotglob);
    matches.sort();

    if matches.is_empty() {
        return if env.options.is_on(ShellOption::FailGlob) {
            Err(ExpansionError::FailGlob {
                pattern: field.to_quote_removed_string(),
                location: location.clone(),
            })
        } else if env.options.is_on(ShellOption::NullGlob) {
            Ok(Some(Vec::new()))
        } else {
            Ok(None)
        };
    }
    Ok(Some(matches))
}

/// Whether `field` contains a character that could start a pattern. When
/// `extglob` is on, `@`/`!`/`+`/`(` also count, since `+(foo)`/`@(foo|bar)`/
/// `!(foo)` have none of the plain glob metacharacters but are still
/// patterns.
fn has_unquoted_metachar(field: &AttrField, extglob: bool) -> bool {
    field.0.iter().any(|c| {
        if c.is_quoted {
            return false;
        }
        matches!(c.value, '*' | '?' | '[') || (extglob && matches!(c.value, '@' | '!' | '+' | '('))
    })
}

/// Splits `field` on unquoted `/`, keeping each component's per-character
/// quote attribution so a quoted glob metacharacter stays a literal
/// character rather than becoming a pattern operator.
fn split_components(field: &AttrField) -> Vec<Vec<AttrChar>> {
    let mut components = vec![Vec::new()];
    for &c in &field.0 {
        if c.value == '/' && !c.is_quoted {
            components.push(Vec::new());
        } else {
            components.last_mut().expect("always non-empty").push(c);
        }
    }
    components
}

fn to_pattern_chars(component: &[AttrChar]) -> impl Iterator<Item = PatternChar> + Clone + '_ {
    component.iter().map(|c| if c.is_quoted { PatternChar::Literal(c.value) } else { PatternChar::Normal(c.value) })
}

fn component_text(component: &[AttrChar]) -> String {
    component.iter().map(|c| c.value).collect()
}

fn is_literal(component: &[AttrChar]) -> bool {
    component.iter().all(|c| c.is_quoted || !matches!(c.value, '*' | '?' | '['))
}

fn walk(cwd: &str, components: &[Vec<AttrChar>], env: &Env, config: Config, case_insensitive: bool, globstar: bool, dotglob: bool) -> Vec<String> {
    let absolute = components.first().is_some_and(Vec::is_empty) && components.len() > 1;
    let base = if absolute { PathBuf::from("/") } else { PathBuf::from(cwd) };
    let parts: Vec<&[AttrChar]> = components.iter().map(Vec::as_slice).filter(|c| !c.is_empty()).collect();
    let mut results = Vec::new();
    walk_rec(&base, &parts, env, config, case_insensitive, globstar, dotglob, String::new(), &mut results);
    results
}

#[allow(clippy::too_many_arguments)]
fn walk_rec(
    dir: &Path,
    remaining: &[&[AttrChar]],
    env: &Env,
    config: Config,
    case_insensitive: bool,
    globstar: bool,
    dotglob: bool,
    prefix: String,
    results: &mut Vec<String>,
) {
    let Some((&component, rest)) = remaining.split_first() else {
        if !prefix.is_empty() {
            results.push(prefix);
        }
        return;
    };

    if component_text(component) == "**" && globstar && is_literal(component) {
        walk_rec(dir, rest, env, config, case_insensitive, globstar, dotglob, prefix.clone(), results);
        let Ok(entries) = env.fs.readdir(dir) else { return };
        for name in entries {
            if !dotglob && name.starts_with('.') {
                continue;
            }
            let next_dir = dir.join(&name);
            let is_dir = env.fs.stat(&next_dir).map(|m| m.file_type == wsh_env::fs::FileType::Directory).unwrap_or(false);
            if is_dir {
                let mut remaining_with_star = vec![component];
                remaining_with_star.extend(rest);
                walk_rec(&next_dir, &remaining_with_star, env, config, case_insensitive, globstar, dotglob, join(&prefix, &name), results);
            }
        }
        return;
    }

    let Ok(pattern) = Pattern::parse_chars(to_pattern_chars(component), config, case_insensitive) else {
        return;
    };
    let Ok(entries) = env.fs.readdir(dir) else { return };
    let mut names: Vec<String> = entries
        .into_iter()
        .filter(|name| {
            if name.starts_with('.') && !dotglob && !pattern.literal_leading_dot() {
                return false;
            }
            pattern.is_match(name)
        })
        .collect();
    names.sort();
    for name in names {
        let next_prefix = join(&prefix, &name);
        if rest.is_empty() {
            results.push(next_prefix);
        } else {
            walk_rec(&dir.join(&name), rest, env, config, case_insensitive, globstar, dotglob, next_prefix, results);
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::fs::{FileSystem, InMemoryFileSystem, WriteOptions};
    use std::rc::Rc;

    fn env_with_files(files: &[&str]) -> Env {
        let fs = Rc::new(InMemoryFileSystem::new());
        for path in files {
            fs.write_file(Path::new(path), b"", WriteOptions::default()).unwrap();
        }
        Env::new(fs, "/".to_string(), "wsh".to_string())
    }

    fn field_for(s: &str) -> AttrField {
        let mut field = AttrField::new();
        field.0.extend(s.chars().map(|value| AttrChar {
            value,
            origin: Origin::Literal,
            is_quoted: false,
        }));
        field
    }

    #[test]
    fn star_matches_sorted_files_in_cwd() {
        let env = env_with_files(&["/b.txt", "/a.txt", "/c.md"]);
        let result = glob_expand(&field_for("*.txt"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, Some(vec!["a.txt".to_string(), "b.txt".to_string()]));
    }

    #[test]
    fn no_match_returns_none_by_default() {
        let env = env_with_files(&["/a.txt"]);
        let result = glob_expand(&field_for("*.md"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn no_metacharacter_returns_none_without_touching_fs() {
        let env = env_with_files(&[]);
        let result = glob_expand(&field_for("plain"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn dotfiles_are_hidden_unless_dotglob() {
        let env = env_with_files(&["/.hidden", "/visible"]);
        let result = glob_expand(&field_for("*"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, Some(vec!["visible".to_string()]));
    }

    #[test]
    fn extglob_only_pattern_is_matched_when_extglob_is_on() {
        let mut env = env_with_files(&["/foo", "/bar", "/baz"]);
        env.options.set(ShellOption::ExtGlob, wsh_env::option::On);
        let result = glob_expand(&field_for("+(foo|bar)"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, Some(vec!["bar".to_string(), "foo".to_string()]));
    }

    #[test]
    fn extglob_only_pattern_is_literal_when_extglob_is_off() {
        let env = env_with_files(&["/foo", "/bar"]);
        let result = glob_expand(&field_for("+(foo|bar)"), &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn quoted_metacharacter_is_never_treated_as_a_pattern() {
        let env = env_with_files(&["/*.txt"]);
        let mut field = AttrField::new();
        field.push_str("*", Origin::Literal, true);
        field.push_str(".txt", Origin::Literal, false);
        let result = glob_expand(&field, &env, &wsh_syntax::source::Location::dummy()).unwrap();
        assert_eq!(result, None);
    }
}
