//! Textual alias-substitution preprocessor (`spec.md` §3 "Alias table": "a
//! name → replacement text table, applied only in the lexer when
//! alias-expansion is active"; §4.1 "Alias expansion: before emitting a word
//! that is in command position, consult the alias table; if matched,
//! re-tokenize the alias replacement in place; guard against recursion").
//!
//! `wsh_syntax::parse` takes a plain `&str` with no alias glossary — the
//! lexer/parser crate doesn't depend on `wsh-env`, so it has no `AliasSet`
//! to consult (see `wsh_env::alias::Glossary`, whose only implementors live
//! in this crate's dependency graph, not `wsh-syntax`'s). Rather than
//! thread an alias lookup callback through the whole recursive-descent
//! parser, this module does the substitution as a single textual pass
//! *before* parsing: a simplified left-to-right scanner that tracks enough
//! shell structure (quoting, comments, command-position transitions after
//! `;`/`&&`/`||`/`|`/`(`/`{`/newline and after reserved words) to find
//! command-position words, expands them, and splices the replacement back
//! into the stream so further scanning can re-expand into it — mirroring
//! "re-tokenize the alias replacement in place".
//!
//! Global aliases (`alias -g`) expand in any word position, not just
//! command position. A per-path recursion guard (by alias name) matches
//! "each alias expanded at most once on a given expansion path"; a
//! replacement ending in a blank keeps the following word in command
//! position too, the same trailing-space rule bash uses for `alias
//! sudo='sudo '`-style wrappers.
//!
//! Function bodies are a coarse approximation: once the scanner sees what
//! looks like `name() {` or `function name {`, it copies through to the
//! matching `}` without expanding, since `spec.md` "Alias expansion
//! boundary" disables alias expansion inside function bodies at parse time
//! and this preprocessor has no parse tree yet to know a body's real
//! extent.

use wsh_env::alias::{AliasSet, Glossary};

const MAX_EXPANSIONS: usize = 10_000;

/// Expands aliases in `src` using `aliases`, returning the substituted
/// source text ready for [`wsh_syntax::parse`].
pub fn expand_aliases(src: &str, aliases: &AliasSet) -> String {
    expand(src, aliases)
}

/// Runs the whole substitution; implemented as a free function over an
/// explicit work queue instead of nested recursive borrows of `Scanner`,
/// since a spliced-in replacement must resume scanning with the *same*
/// command-position state the alias word itself was found in.
pub fn expand(src: &str, aliases: &AliasSet) -> String {
    if aliases.is_empty() {
        return src.to_string();
    }
    let mut out = String::new();
    let mut queue: Vec<Chunk> = vec![Chunk {
        text: src.chars().collect(),
        pos: 0,
        pop_name_on_exhaust: None,
        force_command_position_on_exhaust: false,
    }];
    let mut command_position = true;
    let mut in_flight: Vec<String> = Vec::new();
    let mut expansions = 0usize;

    'outer: while let Some(chunk) = queue.last_mut() {
        skip_and_copy_blanks(chunk, &mut out);
        if chunk.pos >= chunk.text.len() {
            if let Some(name) = chunk.pop_name_on_exhaust.take() {
                in_flight.retain(|n| n != &name);
            }
            if chunk.force_command_position_on_exhaust {
                command_position = true;
            }
            queue.pop();
            continue;
        }

        let c = chunk.text[chunk.pos];

        if c == '#' && command_position_word_start(chunk) {
            while chunk.pos < chunk.text.len() && chunk.text[chunk.pos] != '\n' {
                out.push(chunk.text[chunk.pos]);
                chunk.pos += 1;
            }
            continue;
        }

        if is_operator_start(c) {
            let (token, becomes_command_position) = consume_operator(chunk);
            out.push_str(&token);
            command_position = becomes_command_position;
            continue;
        }

        if c == '\n' {
            out.push('\n');
            chunk.pos += 1;
            command_position = true;
            continue;
        }

        // Skip function-body-looking blocks verbatim.
        if command_position {
            if let Some(copied) = try_copy_function_body(chunk) {
                out.push_str(&copied);
                command_position = false;
                continue;
            }
        }

        let word = consume_word(chunk);
        if word.is_empty() {
            // Shouldn't happen (blanks/operators/newline already handled),
            // but guard against an infinite loop on an unexpected char.
            out.push(c);
            chunk.pos += 1;
            continue;
        }

        let is_reserved = RESERVED_WORDS.contains(&word.as_str());
        let lookup = if expansions < MAX_EXPANSIONS {
            aliases.look_up(&word)
        } else {
            None
        };

        let eligible = lookup.is_some_and(|a| (command_position || a.global) && !in_flight.contains(&word));
        if eligible {
            let alias = aliases.look_up(&word).expect("just matched");
            expansions += 1;
            in_flight.push(word.clone());
            let ends_in_blank = alias.replacement.chars().last().is_some_and(|c| c == ' ' || c == '\t');
            queue.push(Chunk {
                text: alias.replacement.chars().collect(),
                pos: 0,
                pop_name_on_exhaust: Some(word),
                force_command_position_on_exhaust: ends_in_blank,
            });
            continue 'outer;
        }

        out.push_str(&word);
        command_position = is_reserved;
    }

    out
}

struct Chunk {
    text: Vec<char>,
    pos: usize,
    pop_name_on_exhaust: Option<String>,
    /// Set when this chunk is an alias replacement ending in a blank: bash
    /// keeps the word right after such a replacement eligible for
    /// command-position alias expansion even though the replacement's own
    /// last word was not itself in command position.
    force_command_position_on_exhaust: bool,
}

const RESERVED_WORDS: &[&str] = &[
    "if", "then", "elif", "else", "fi", "do", "done", "while", "until", "for", "case", "esac", "in", "select", "function", "time", "!",
];

fn command_position_word_start(chunk: &Chunk) -> bool {
    chunk.pos == 0 || matches!(chunk.text.get(chunk.pos - 1), Some(' ' | '\t' | '\n'))
}

fn skip_and_copy_blanks(chunk: &mut Chunk, out: &mut String) {
    while let Some(&c) = chunk.text.get(chunk.pos) {
        if c == ' ' || c == '\t' {
            out.push(c);
            chunk.pos += 1;
        } else if c == '\\' && chunk.text.get(chunk.pos + 1) == Some(&'\n') {
            out.push_str("\\\n");
            chunk.pos += 2;
        } else {
            break;
        }
    }
}

fn is_operator_start(c: char) -> bool {
    matches!(c, ';' | '|' | '&' | '(' | ')' | '{' | '}')
}

/// Consumes one shell operator token (`;`, `;;`, `&&`, `||`, `&`, `|`, `|&`,
/// `(`, `)`, `{`, `}`), returning it and whether the next word is in
/// command position.
fn consume_operator(chunk: &mut Chunk) -> (String, bool) {
    let c = chunk.text[chunk.pos];
    chunk.pos += 1;
    let two = chunk.text.get(chunk.pos).copied();
    let extended = match (c, two) {
        (';', Some(';')) | ('&', Some('&')) | ('|', Some('|')) | ('|', Some('&')) => {
            chunk.pos += 1;
            true
        }
        _ => false,
    };
    let token: String = if extended {
        vec![c, two.unwrap()].into_iter().collect()
    } else {
        c.to_string()
    };
    let command_position = !matches!(c, ')');
    (token, command_position)
}

/// Consumes a single word: a run of non-blank, non-operator, non-newline
/// characters, honoring single/double quoting and backslash escapes so an
/// alias name embedded in a quoted string is never mistaken for a bare
/// word.
fn consume_word(chunk: &mut Chunk) -> String {
    let mut word = String::new();
    while let Some(&c) = chunk.text.get(chunk.pos) {
        match c {
            ' ' | '\t' | '\n' => break,
            c if is_operator_start(c) => break,
            '\\' => {
                word.push(c);
                chunk.pos += 1;
                if let Some(&next) = chunk.text.get(chunk.pos) {
                    word.push(next);
                    chunk.pos += 1;
                }
            }
            '\'' => {
                word.push(c);
                chunk.pos += 1;
                while let Some(&q) = chunk.text.get(chunk.pos) {
                    word.push(q);
                    chunk.pos += 1;
                    if q == '\'' {
                        break;
                    }
                }
            }
            '"' => {
                word.push(c);
                chunk.pos += 1;
                while let Some(&q) = chunk.text.get(chunk.pos) {
                    word.push(q);
                    chunk.pos += 1;
                    if q == '\\' {
                        if let Some(&esc) = chunk.text.get(chunk.pos) {
                            word.push(esc);
                            chunk.pos += 1;
                        }
                        continue;
                    }
                    if q == '"' {
                        break;
                    }
                }
            }
            _ => {
                word.push(c);
                chunk.pos += 1;
            }
        }
    }
    word
}

/// If `chunk` at the current position looks like a function definition
/// head (`name() {` or `function name {` / `function name () {`), copies
/// the whole brace-balanced body through verbatim (quote-aware, so a `}`
/// inside a string doesn't end the block early) and returns it; otherwise
/// leaves `chunk` untouched and returns `None`.
fn try_copy_function_body(chunk: &mut Chunk) -> Option<String> {
    let checkpoint = chunk.pos;
    let mut head = String::new();

    if matches!(peek_word(chunk).as_deref(), Some("function")) {
        head.push_str(&consume_word(chunk));
        skip_and_copy_blanks(chunk, &mut head);
        head.push_str(&consume_word(chunk));
        skip_and_copy_blanks(chunk, &mut head);
        if chunk.text.get(chunk.pos) == Some(&'(') {
            head.push('(');
            chunk.pos += 1;
            if chunk.text.get(chunk.pos) == Some(&')') {
                head.push(')');
                chunk.pos += 1;
            }
            skip_and_copy_blanks(chunk, &mut head);
        }
    } else {
        let name = peek_word(chunk)?;
        let name_end = chunk.pos + name.chars().count();
        if chunk.text.get(name_end) != Some(&'(') || chunk.text.get(name_end + 1) != Some(&')') {
            chunk.pos = checkpoint;
            return None;
        }
        head.push_str(&consume_word(chunk));
        head.push_str("()");
        chunk.pos += 2;
        skip_and_copy_blanks(chunk, &mut head);
    }

    if chunk.text.get(chunk.pos) != Some(&'{') {
        chunk.pos = checkpoint;
        return None;
    }

    let mut body = String::from('{');
    chunk.pos += 1;
    let mut depth = 1i32;
    while depth > 0 {
        let Some(&c) = chunk.text.get(chunk.pos) else { break };
        match c {
            '{' => {
                depth += 1;
                body.push(c);
                chunk.pos += 1;
            }
            '}' => {
                depth -= 1;
                body.push(c);
                chunk.pos += 1;
            }
            '\'' => {
                body.push(c);
                chunk.pos += 1;
                while let Some(&q) = chunk.text.get(chunk.pos) {
                    body.push(q);
                    chunk.pos += 1;
                    if q == '\'' {
                        break;
                    }
                }
            }
            '"' => {
                body.push(c);
                chunk.pos += 1;
                while let Some(&q) = chunk.text.get(chunk.pos) {
                    body.push(q);
                    chunk.pos += 1;
                    if q == '\\' {
                        if let Some(&esc) = chunk.text.get(chunk.pos) {
                            body.push(esc);
                            chunk.pos += 1;
                        }
                        continue;
                    }
                    if q == '"' {
                        break;
                    }
                }
            }
            _ => {
                body.push(c);
                chunk.pos += 1;
            }
        }
    }

    Some(format!("{head}{body}"))
}

fn peek_word(chunk: &Chunk) -> Option<String> {
    let mut pos = chunk.pos;
    let mut word = String::new();
    while let Some(&c) = chunk.text.get(pos) {
        if c == ' ' || c == '\t' || c == '\n' || is_operator_start(c) {
            break;
        }
        word.push(c);
        pos += 1;
    }
    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_env::alias::HashEntry;
    use wsh_syntax::source::Location;

    fn aliases(entries: &[(&str, &str, bool)]) -> AliasSet {
        let mut set = AliasSet::new();
        for (name, replacement, global) in entries {
            set.insert(HashEntry::new(name.to_string(), replacement.to_string(), *global, Location::dummy()));
        }
        set
    }

    #[test]
    fn expands_a_command_position_alias() {
        let set = aliases(&[("ll", "ls -l", false)]);
        assert_eq!(expand("ll /tmp\n", &set), "ls -l /tmp\n");
    }

    #[test]
    fn does_not_expand_in_non_command_position() {
        let set = aliases(&[("ll", "ls -l", false)]);
        assert_eq!(expand("echo ll\n", &set), "echo ll\n");
    }

    #[test]
    fn global_alias_expands_anywhere() {
        let set = aliases(&[("X", "hello", true)]);
        assert_eq!(expand("echo X\n", &set), "echo hello\n");
    }

    #[test]
    fn trailing_space_keeps_command_position_for_the_next_word() {
        let set = aliases(&[("sudo", "sudo ", false), ("ll", "ls -l", false)]);
        assert_eq!(expand("sudo ll\n", &set), "sudo ls -l\n");
    }

    #[test]
    fn recursion_guard_prevents_infinite_self_expansion() {
        let set = aliases(&[("ls", "ls -F", false)]);
        assert_eq!(expand("ls\n", &set), "ls -F\n");
    }

    #[test]
    fn quoted_word_is_left_untouched() {
        let set = aliases(&[("ll", "ls -l", false)]);
        assert_eq!(expand("echo 'll'\n", &set), "echo 'll'\n");
    }

    #[test]
    fn alias_expands_after_semicolon() {
        let set = aliases(&[("ll", "ls -l", false)]);
        assert_eq!(expand("echo hi; ll\n", &set), "echo hi; ls -l\n");
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let set = aliases(&[]);
        assert_eq!(expand("ll /tmp\n", &set), "ll /tmp\n");
    }
}
