//! Word-expansion pipeline (`spec.md` §4.3): brace expansion, tilde,
//! parameter/command/arithmetic substitution, word splitting, pathname
//! expansion, quote removal, run in that order over each source [`Word`].

pub mod attr;
pub mod brace;
pub mod glob;
pub mod param;
pub mod split;
pub mod text;
pub mod tilde;

use crate::error::Result;
use wsh_env::Env;
use wsh_syntax::source::Location;
use wsh_syntax::syntax::Word;

/// Expands a full list of words (an argv, a `case` pattern list, …) through
/// every pipeline step, producing the final flat list of fields.
pub fn expand_words(words: &[Word], env: &mut Env) -> Result<Vec<String>> {
    let mut result = Vec::new();
    for word in words {
        for braced in brace::brace_expand(word) {
            result.extend(expand_one_to_fields(&braced, env)?);
        }
    }
    Ok(result)
}

/// Expands a single word (after brace expansion) into zero or more final
/// fields: text expansion, then splitting, then globbing, then quote
/// removal.
fn expand_one_to_fields(word: &Word, env: &mut Env) -> Result<Vec<String>> {
    let mut field = attr::AttrField::new();
    text::expand_word_into(word, env, &mut field)?;

    let split_fields = split::split_field(&field, env);
    let mut out = Vec::with_capacity(split_fields.len());
    for f in split_fields {
        match glob::glob_expand(&f, env, &word.location)? {
            Some(matches) => out.extend(matches),
            None => out.push(f.to_quote_removed_string()),
        }
    }
    Ok(out)
}

/// Expands `word` into exactly one field, joining everything produced (no
/// splitting or globbing) — for assignment right-hand sides, redirection
/// targets, `case` subjects, and other contexts `spec.md` defines as
/// single-field.
pub fn expand_word_single(word: &Word, env: &mut Env) -> Result<String> {
    text::expand_word_unsplit(word, env)
}

/// Expands a word that is itself the result of brace expansion applied to
/// `words`, keeping each brace alternative's fields distinct but collapsing
/// each alternative to a single joined field (used for `case` patterns,
/// which brace-expand but never split/glob).
pub fn expand_words_single(words: &[Word], env: &mut Env) -> Result<Vec<String>> {
    let mut result = Vec::new();
    for word in words {
        for braced in brace::brace_expand(word) {
            result.push(expand_word_single(&braced, env)?);
        }
    }
    Ok(result)
}
