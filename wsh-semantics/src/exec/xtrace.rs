//! `PS4`-prefixed command tracing (`spec.md` §4.6 "xtrace"), gated on the
//! `xtrace` [`ShellOption`].
//!
//! There is no live standard error stream to interleave with here — tracing
//! a simple command produces one line that the caller prepends to that
//! command's own captured stderr, the same way the rest of the executor
//! threads output explicitly instead of writing into `env.streams`
//! directly.

use wsh_env::option::ShellOption;
use wsh_env::Env;

/// Builds the trace line for `words` (already fully expanded), or an empty
/// string if `xtrace` is off. `$PS4` is expanded fresh for every call, as
/// bash does; a `$PS4` that itself fails to expand falls back to its own
/// literal text rather than aborting the command being traced.
pub fn trace_line(words: &[String], env: &mut Env) -> String {
    if !env.options.is_on(ShellOption::XTrace) {
        return String::new();
    }
    let prefix = expand_ps4(env);
    let rendered: Vec<String> = words.iter().map(|w| wsh_quote::quote(w).into_owned()).collect();
    format!("{prefix}{}\n", rendered.join(" "))
}

fn expand_ps4(env: &mut Env) -> String {
    let ps4 = env
        .variables
        .get("PS4")
        .and_then(|v| v.value.as_ref())
        .map(|v| v.as_scalar().into_owned())
        .unwrap_or_else(|| "+ ".to_string());

    let Ok(units) = wsh_syntax::parse_text(&ps4) else {
        return ps4;
    };
    let word = wsh_syntax::syntax::Word {
        parts: units.into_iter().map(wsh_syntax::syntax::WordPart::Unquoted).collect(),
        location: wsh_syntax::source::Location::dummy(),
    };
    crate::expansion::expand_word_single(&word, env).unwrap_or(ps4)
}
