//! Brace expansion (`spec.md` §4.3 step 1: "`{a,b,c}` and `{1..9[..step]}`
//! ... Cross-product with adjacent text; applied first, unquoted-only;
//! literal if unbalanced").
//!
//! `wsh_syntax::syntax::TextUnit` has no dedicated brace-expansion node (the
//! lexer treats `{`/`}` as ordinary characters — see `DESIGN.md`), so this
//! runs as a textual pass over each [`WordPart::Unquoted`]`(TextUnit::Literal
//! (_))` span before the rest of the pipeline sees the word, matching real
//! shells' purely lexical treatment of brace syntax. Quoted parts and other
//! expansions are never searched; a literal run is expanded independently of
//! its neighbors, so a brace group split across two adjacent literal parts
//! (rare — the lexer normally merges contiguous literal text into one part)
//! is not recognized. This is recorded as a known simplification.

use wsh_syntax::syntax::{TextUnit, Word, WordPart};

/// Expands brace groups in `word`, returning the cross-product of resulting
/// words. Returns `vec![word.clone()]` when there is nothing to expand.
pub fn brace_expand(word: &Word) -> Vec<Word> {
    let mut variants: Vec<Vec<WordPart>> = vec![Vec::new()];
    for part in &word.parts {
        if let WordPart::Unquoted(TextUnit::Literal(text)) = part {
            let texts = expand_text(text);
            if texts.len() > 1 {
                let mut next = Vec::with_capacity(variants.len() * texts.len());
                for existing in &variants {
                    for text in &texts {
                        let mut v = existing.clone();
                        v.push(WordPart::Unquoted(TextUnit::Literal(text.clone())));
                        next.push(v);
                    }
                }
                variants = next;
                continue;
            }
        }
        for v in &mut variants {
            v.push(part.clone());
        }
    }
    variants
        .into_iter()
        .map(|parts| Word {
            parts,
            location: word.location.clone(),
        })
        .collect()
}

fn expand_text(s: &str) -> Vec<String> {
    match find_brace_group(s) {
        Some((prefix, items, suffix)) => items
            .into_iter()
            .flat_map(|item| {
                expand_text(&suffix)
                    .into_iter()
                    .map(move |tail| format!("{prefix}{item}{tail}"))
                    .collect::<Vec<_>>()
            })
            .flat_map(|combined| expand_text(&combined))
            .collect(),
        None => vec![s.to_string()],
    }
}

/// Finds the first brace group in `s` that is actually a valid comma list or
/// range (skipping over any earlier `{` that isn't, so it's left literal),
/// returning `(text before it, its expanded items, text after it)`.
fn find_brace_group(s: &str) -> Option<(String, Vec<String>, String)> {
    let chars: Vec<char> = s.chars().collect();
    let mut search_from = 0;
    while let Some(open) = find_unescaped(&chars, search_from, '{') {
        if let Some(close) = matching_close(&chars, open) {
            let content: String = chars[open + 1..close].iter().collect();
            if let Some(items) = parse_content(&content) {
                let prefix: String = chars[..open].iter().collect();
                let suffix: String = chars[close + 1..].iter().collect();
                return Some((prefix, items, suffix));
            }
        }
        search_from = open + 1;
    }
    None
}

fn find_unescaped(chars: &[char], from: usize, target: char) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == target {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Finds the index of the `}` matching the `{` at `open`, honoring nested
/// brace groups and backslash escapes.
fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn parse_content(content: &str) -> Option<Vec<String>> {
    parse_range(content).or_else(|| {
        let items = split_top_level_commas(content);
        (items.len() >= 2).then_some(items)
    })
}

fn split_top_level_commas(content: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(n) = chars.next() {
                    current.push(n);
                }
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

/// `{1..9}`, `{1..9..2}`, `{a..z}`, `{09..11}` (zero-padded).
fn parse_range(content: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = content.split("..").collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let step: i64 = if parts.len() == 3 { parts[2].parse().ok()? } else { 1 };
    if step == 0 {
        return None;
    }
    let step = step.unsigned_abs() as i64;

    if let (Ok(start), Ok(end)) = (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
        let zero_pad = parts[0].trim_start_matches('-').starts_with('0') || parts[1].trim_start_matches('-').starts_with('0');
        let width = parts[0].trim_start_matches('-').len().max(parts[1].trim_start_matches('-').len());
        let signed_step = if end >= start { step } else { -step };
        let mut out = Vec::new();
        let mut n = start;
        loop {
            out.push(format_range_number(n, zero_pad, width));
            if n == end {
                break;
            }
            n += signed_step;
            if (signed_step > 0 && n > end) || (signed_step < 0 && n < end) {
                break;
            }
        }
        return Some(out);
    }

    let (a, b) = (parts[0].chars().next()?, parts[1].chars().next()?);
    if parts[0].chars().count() == 1 && parts[1].chars().count() == 1 && a.is_ascii_alphabetic() && b.is_ascii_alphabetic() {
        let (a, b) = (a as i64, b as i64);
        let signed_step = if b >= a { step } else { -step };
        let mut out = Vec::new();
        let mut n = a;
        loop {
            out.push(((n as u8) as char).to_string());
            if n == b {
                break;
            }
            n += signed_step;
            if (signed_step > 0 && n > b) || (signed_step < 0 && n < b) {
                break;
            }
        }
        return Some(out);
    }
    None
}

fn format_range_number(n: i64, zero_pad: bool, width: usize) -> String {
    if zero_pad {
        if n < 0 {
            format!("-{:0width$}", -n, width = width)
        } else {
            format!("{n:0width$}")
        }
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsh_syntax::source::Location;

    fn literal(s: &str) -> Word {
        Word::literal(s, Location::dummy())
    }

    fn texts(word: &Word) -> Vec<String> {
        brace_expand(word)
            .into_iter()
            .map(|w| {
                w.parts
                    .into_iter()
                    .map(|p| match p {
                        WordPart::Unquoted(TextUnit::Literal(s)) => s,
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn comma_list_cross_product() {
        assert_eq!(texts(&literal("a{b,c}d")), vec!["abd", "acd"]);
    }

    #[test]
    fn numeric_range() {
        assert_eq!(texts(&literal("{1..3}")), vec!["1", "2", "3"]);
    }

    #[test]
    fn numeric_range_zero_padded() {
        assert_eq!(texts(&literal("{01..03}")), vec!["01", "02", "03"]);
    }

    #[test]
    fn alpha_range() {
        assert_eq!(texts(&literal("{a..c}")), vec!["a", "b", "c"]);
    }

    #[test]
    fn range_with_step() {
        assert_eq!(texts(&literal("{1..5..2}")), vec!["1", "3", "5"]);
    }

    #[test]
    fn unbalanced_braces_are_literal() {
        assert_eq!(texts(&literal("{a,b")), vec!["{a,b"]);
    }

    #[test]
    fn single_item_no_comma_is_literal() {
        assert_eq!(texts(&literal("{only}")), vec!["{only}"]);
    }

    #[test]
    fn nested_braces_expand() {
        let mut results = texts(&literal("{a,b{1,2}}"));
        results.sort();
        assert_eq!(results, vec!["a", "b1", "b2"]);
    }
}
