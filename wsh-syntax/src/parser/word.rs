// Licensed under the MIT license. See LICENSE for details.

//! Parsing of `$...` expansions into [`TextUnit`]s (`spec.md` §4.2's "word
//! parsing" subgrammar).

use super::{ErrorCause, PResult, Parser};
use crate::syntax::*;

impl Parser<'_> {
    /// Called with the cursor on a `$`. Returns `None` (consuming nothing)
    /// if what follows isn't a recognized expansion, so the caller can fall
    /// back to treating `$` as a literal character.
    pub(super) fn dollar(&mut self, in_double_quotes: bool) -> PResult<Option<TextUnit>> {
        debug_assert_eq!(self.peek_char(), Some('$'));
        match self.peek_at(1) {
            Some('(') if self.peek_at(2) == Some('(') => {
                self.bump();
                self.bump();
                self.bump();
                Some(self.arithmetic_substitution()).transpose()
            }
            Some('(') => {
                self.bump();
                self.bump();
                Some(self.command_substitution()).transpose()
            }
            Some('{') => {
                self.bump();
                self.bump();
                Some(self.braced_param()).transpose()
            }
            Some('\'') if !in_double_quotes => {
                self.bump();
                Some(Ok(TextUnit::Literal(self.ansi_c_quoted()?))).transpose()
            }
            Some(c) if is_param_start(c) => {
                self.bump();
                let param = self.bare_param();
                Some(Ok(TextUnit::DollarVariable(param))).transpose()
            }
            _ => Ok(None),
        }
    }

    fn ansi_c_quoted(&mut self) -> PResult<String> {
        let start = self.pos;
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(s),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some('\'') => s.push('\''),
                    Some('"') => s.push('"'),
                    Some('a') => s.push('\u{7}'),
                    Some('b') => s.push('\u{8}'),
                    Some('e') => s.push('\u{1b}'),
                    Some('f') => s.push('\u{c}'),
                    Some('v') => s.push('\u{b}'),
                    Some(other) => {
                        s.push('\\');
                        s.push(other);
                    }
                    None => return Err(self.error_at(start, ErrorCause::UnterminatedSubstitution("$'"), self.pos)),
                },
                Some(c) => s.push(c),
                None => return Err(self.error_at(start, ErrorCause::UnterminatedSubstitution("$'"), self.pos)),
            }
        }
    }

    fn bare_param(&mut self) -> Param {
        match self.peek_char() {
            Some(c @ ('@' | '*' | '#' | '?' | '-' | '$' | '!')) => {
                self.bump();
                let special = match c {
                    '@' => SpecialParam::At,
                    '*' => SpecialParam::Asterisk,
                    '#' => SpecialParam::Count,
                    '?' => SpecialParam::Question,
                    '-' => SpecialParam::Hyphen,
                    '$' => SpecialParam::Dollar,
                    '!' => SpecialParam::Exclamation,
                    _ => unreachable!(),
                };
                Param {
                    id: c.to_string(),
                    r#type: ParamType::Special(special),
                }
            }
            Some(c) if c.is_ascii_digit() => {
                self.bump();
                Param {
                    id: c.to_string(),
                    r#type: ParamType::Positional(c.to_digit(10).unwrap() as usize),
                }
            }
            _ => {
                let start = self.pos;
                while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
                    self.bump();
                }
                let id = self.src[start..self.pos].to_string();
                Param {
                    id,
                    r#type: ParamType::Variable,
                }
            }
        }
    }

    fn arithmetic_substitution(&mut self) -> PResult<TextUnit> {
        let start = self.pos;
        let text = self.scan_until_double_close_paren(start)?;
        let expr = wsh_arith::parse(&text).map_err(ErrorCause::Arithmetic).map_err(|e| self.error_at(start, e, self.pos))?;
        Ok(TextUnit::Arithmetic(expr))
    }

    /// Scans up to (and consumes) the `))` that closes a `$((` / `((`
    /// arithmetic form, honoring nested parens within the expression.
    fn scan_until_double_close_paren(&mut self, err_start: usize) -> PResult<String> {
        let mut depth = 0usize;
        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(err_start, ErrorCause::UnterminatedSubstitution("(("), self.pos)),
                Some('(') => {
                    depth += 1;
                    s.push('(');
                    self.bump();
                }
                Some(')') if depth > 0 => {
                    depth -= 1;
                    s.push(')');
                    self.bump();
                }
                Some(')') => {
                    self.bump();
                    if self.peek_char() == Some(')') {
                        self.bump();
                        return Ok(s);
                    }
                    s.push(')');
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    fn command_substitution(&mut self) -> PResult<TextUnit> {
        let start = self.pos;
        let text = self.scan_balanced_parens(start)?;
        let script = super::parse(&text)
            .map_err(|e| self.error_at(start, ErrorCause::Nested(Box::new(e)), self.pos))?;
        Ok(TextUnit::CommandSubstitution(script))
    }

    /// Scans the body of a `$(...)` or `<(...)`/`>(...)` process
    /// substitution up to and including the matching `)`, honoring nested
    /// parens, quotes, and further `$(...)`.
    fn scan_balanced_parens(&mut self, err_start: usize) -> PResult<String> {
        let mut depth = 1usize;
        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(err_start, ErrorCause::UnterminatedSubstitution("$("), self.pos)),
                Some('(') => {
                    depth += 1;
                    s.push('(');
                    self.bump();
                }
                Some(')') => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        return Ok(s);
                    }
                    s.push(')');
                }
                Some('\'') => {
                    s.push('\'');
                    self.bump();
                    while let Some(c) = self.peek_char() {
                        s.push(c);
                        self.bump();
                        if c == '\'' {
                            break;
                        }
                    }
                }
                Some('"') => {
                    s.push('"');
                    self.bump();
                    loop {
                        match self.peek_char() {
                            None => break,
                            Some('\\') => {
                                s.push('\\');
                                self.bump();
                                if let Some(c) = self.peek_char() {
                                    s.push(c);
                                    self.bump();
                                }
                            }
                            Some('"') => {
                                s.push('"');
                                self.bump();
                                break;
                            }
                            Some(c) => {
                                s.push(c);
                                self.bump();
                            }
                        }
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Reads a process substitution `<(...)`/`>(...)`; the cursor is on
    /// `(` when called.
    pub(super) fn process_substitution(&mut self, direction: ProcessSubstDirection) -> PResult<TextUnit> {
        let start = self.pos;
        self.bump(); // (
        let text = self.scan_balanced_parens(start)?;
        let script = super::parse(&text)
            .map_err(|e| self.error_at(start, ErrorCause::Nested(Box::new(e)), self.pos))?;
        Ok(TextUnit::ProcessSubstitution(ProcessSubstitution { direction, script }))
    }

    fn braced_param(&mut self) -> PResult<TextUnit> {
        let start = self.pos;
        let body = self.scan_balanced_braces(start)?;
        let mut sub = Parser::new(&body);
        let param = sub.braced_param_body()?;
        if !sub.eof() {
            return Err(self.error_at(start, ErrorCause::ExpectedToken("}"), self.pos));
        }
        Ok(TextUnit::BracedParam(Box::new(param)))
    }

    fn scan_balanced_braces(&mut self, err_start: usize) -> PResult<String> {
        let mut depth = 1usize;
        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(err_start, ErrorCause::UnterminatedSubstitution("${"), self.pos)),
                Some('{') => {
                    depth += 1;
                    s.push('{');
                    self.bump();
                }
                Some('}') => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        return Ok(s);
                    }
                    s.push('}');
                }
                Some('\'') => {
                    s.push('\'');
                    self.bump();
                    while let Some(c) = self.peek_char() {
                        s.push(c);
                        self.bump();
                        if c == '\'' {
                            break;
                        }
                    }
                }
                Some('"') => {
                    s.push('"');
                    self.bump();
                    loop {
                        match self.peek_char() {
                            None => break,
                            Some('\\') => {
                                s.push('\\');
                                self.bump();
                                if let Some(c) = self.peek_char() {
                                    s.push(c);
                                    self.bump();
                                }
                            }
                            Some('"') => {
                                s.push('"');
                                self.bump();
                                break;
                            }
                            Some(c) => {
                                s.push(c);
                                self.bump();
                            }
                        }
                    }
                }
                Some('$') if self.peek_at(1) == Some('(') => {
                    s.push('$');
                    self.bump();
                    s.push('(');
                    self.bump();
                    let inner = self.scan_balanced_parens(err_start)?;
                    s.push_str(&inner);
                    s.push(')');
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Parses the inside of `${...}` (this parser's source is exactly that
    /// inner text, with no surrounding braces).
    fn braced_param_body(&mut self) -> PResult<BracedParam> {
        if self.peek_char() == Some('#') && self.peek_at(1).is_some_and(is_param_start) {
            self.bump();
            let param = self.bare_param();
            let index = self.maybe_index()?;
            return Ok(BracedParam {
                param,
                index,
                op: Some(ParamOp::Length),
            });
        }
        if self.peek_char() == Some('!') && self.peek_at(1).is_some_and(is_param_start) && self.peek_at(1) != Some('#') {
            self.bump();
            let param = self.bare_param();
            if matches!(self.peek_char(), Some('*' | '@')) && matches!(param.r#type, ParamType::Variable) {
                let at_form = self.bump() == Some('@');
                return Ok(BracedParam {
                    param,
                    index: None,
                    op: Some(ParamOp::PrefixNames { at_form }),
                });
            }
            let index = self.maybe_index()?;
            let op = if self.eof() { None } else { Some(ParamOp::Indirect) };
            return Ok(BracedParam { param, index, op });
        }
        let param = self.bare_param();
        let index = self.maybe_index()?;
        let op = self.param_op()?;
        Ok(BracedParam { param, index, op })
    }

    fn maybe_index(&mut self) -> PResult<Option<Box<Word>>> {
        if self.peek_char() != Some('[') {
            return Ok(None);
        }
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(start, ErrorCause::ExpectedToken("]"), self.pos)),
                Some('[') => {
                    depth += 1;
                    text.push('[');
                    self.bump();
                }
                Some(']') => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        break;
                    }
                    text.push(']');
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        let mut sub = Parser::new(&text);
        let word = sub.word()?.unwrap_or_else(|| Word::literal("", crate::source::Location::dummy()));
        Ok(Some(Box::new(word)))
    }

    fn param_op(&mut self) -> PResult<Option<ParamOp>> {
        if self.eof() {
            return Ok(None);
        }
        let colon = self.eat_char(':');
        let op = match self.peek_char() {
            Some('-') => {
                self.bump();
                self.switch_op(colon, SwitchType::Default)?
            }
            Some('=') => {
                self.bump();
                self.switch_op(colon, SwitchType::Assign)?
            }
            Some('?') => {
                self.bump();
                self.switch_op(colon, SwitchType::Error)?
            }
            Some('+') => {
                self.bump();
                self.switch_op(colon, SwitchType::Alter)?
            }
            Some(_) if colon => {
                // `${x:offset[:length]}` substring
                let offset = self.arith_arg(&[':', '\0'])?;
                let length = if self.eat_char(':') { Some(self.arith_arg(&[])?) } else { None };
                ParamOp::Substring {
                    offset: Box::new(offset),
                    length: length.map(Box::new),
                }
            }
            Some('#') => {
                self.bump();
                let longest = self.eat_char('#');
                let pattern = self.rest_as_word()?;
                ParamOp::RemovePattern {
                    pattern,
                    side: PatternSide::Prefix,
                    longest,
                }
            }
            Some('%') => {
                self.bump();
                let longest = self.eat_char('%');
                let pattern = self.rest_as_word()?;
                ParamOp::RemovePattern {
                    pattern,
                    side: PatternSide::Suffix,
                    longest,
                }
            }
            Some('/') => {
                self.bump();
                let mode = match self.peek_char() {
                    Some('/') => {
                        self.bump();
                        ReplaceMode::All
                    }
                    Some('#') => {
                        self.bump();
                        ReplaceMode::AnchorStart
                    }
                    Some('%') => {
                        self.bump();
                        ReplaceMode::AnchorEnd
                    }
                    _ => ReplaceMode::First,
                };
                let pattern = self.word_until_char('/')?;
                let replacement = if self.eat_char('/') { Some(self.rest_as_word()?) } else { None };
                ParamOp::Replace { pattern, replacement, mode }
            }
            Some('^') => {
                self.bump();
                let mode = if self.eat_char('^') { CaseMode::AllUpper } else { CaseMode::FirstUpper };
                ParamOp::Case { pattern: self.optional_rest_word()?, mode }
            }
            Some(',') => {
                self.bump();
                let mode = if self.eat_char(',') { CaseMode::AllLower } else { CaseMode::FirstLower };
                ParamOp::Case { pattern: self.optional_rest_word()?, mode }
            }
            Some('@') => {
                self.bump();
                let transform = match self.bump() {
                    Some('U') => TransformOp::Upper,
                    Some('L') => TransformOp::Lower,
                    Some('Q') => TransformOp::Quote,
                    Some('E') => TransformOp::Escape,
                    Some('P') => TransformOp::Prompt,
                    Some('A') => TransformOp::Assign,
                    Some('K') => TransformOp::KeysValues,
                    Some('k') => TransformOp::KeysValuesQuoted,
                    Some('a') => TransformOp::Attributes,
                    _ => return Err(self.error_here(ErrorCause::ExpectedToken("transform operator"))),
                };
                ParamOp::Transform(transform)
            }
            None if colon => {
                return Err(self.error_here(ErrorCause::ExpectedToken("switch operator")));
            }
            _ => return Err(self.error_here(ErrorCause::ExpectedToken("parameter operator"))),
        };
        Ok(Some(op))
    }

    fn switch_op(&mut self, colon: bool, ty: SwitchType) -> PResult<ParamOp> {
        let word = self.rest_as_word()?;
        Ok(ParamOp::Switch {
            condition: if colon { SwitchCondition::UnsetOrEmpty } else { SwitchCondition::Unset },
            ty,
            word,
        })
    }

    fn rest_as_word(&mut self) -> PResult<Word> {
        Ok(self.word()?.unwrap_or_else(|| Word::literal("", crate::source::Location::dummy())))
    }

    fn optional_rest_word(&mut self) -> PResult<Option<Word>> {
        if self.eof() {
            Ok(None)
        } else {
            Ok(Some(self.rest_as_word()?))
        }
    }

    fn word_until_char(&mut self, stop: char) -> PResult<Word> {
        let start = self.pos;
        let mut parts = Vec::new();
        let mut literal = String::new();
        while let Some(c) = self.peek_char() {
            if c == stop {
                break;
            }
            match c {
                '\\' => {
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        literal.push(escaped);
                    }
                }
                _ => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        if !literal.is_empty() {
            parts.push(WordPart::Unquoted(TextUnit::Literal(literal)));
        }
        if parts.is_empty() {
            parts.push(WordPart::Unquoted(TextUnit::Literal(String::new())));
        }
        Ok(Word {
            parts,
            location: self.location_from(start),
        })
    }

    fn arith_arg(&mut self, stop: &[char]) -> PResult<wsh_arith::ast::Expr> {
        let start = self.pos;
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if stop.contains(&c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        wsh_arith::parse(&text)
            .map_err(ErrorCause::Arithmetic)
            .map_err(|e| self.error_at(start, e, self.pos))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use crate::syntax::*;

    fn one_unit(src: &str) -> TextUnit {
        let script = crate::parse(src).unwrap();
        let Command::Simple(cmd) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a simple command");
        };
        match &cmd.words[0].parts[0] {
            WordPart::Unquoted(unit) => unit.clone(),
            other => panic!("expected an unquoted word part, got {other:?}"),
        }
    }

    #[test]
    fn plain_dollar_variable() {
        let unit = one_unit("echo $x");
        assert_matches!(unit, TextUnit::DollarVariable(Param { r#type: ParamType::Variable, .. }));
    }

    #[test]
    fn positional_parameters_are_single_digits() {
        let unit = one_unit("echo $1");
        assert_matches!(unit, TextUnit::DollarVariable(Param { r#type: ParamType::Positional(1), .. }));
    }

    #[test]
    fn braced_length_operator() {
        let unit = one_unit("echo ${#x}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert_eq!(p.op, Some(ParamOp::Length));
    }

    #[test]
    fn braced_default_switch_with_colon_checks_emptiness() {
        let unit = one_unit("echo ${x:-fallback}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        let Some(ParamOp::Switch { condition, ty, word }) = p.op else {
            panic!("expected a switch operator");
        };
        assert_eq!(condition, SwitchCondition::UnsetOrEmpty);
        assert_eq!(ty, SwitchType::Default);
        assert_eq!(word.parts, vec![WordPart::Unquoted(TextUnit::Literal("fallback".to_string()))]);
    }

    #[test]
    fn braced_substring_with_offset_and_length() {
        let unit = one_unit("echo ${x:1:2}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert_matches!(p.op, Some(ParamOp::Substring { length: Some(_), .. }));
    }

    #[test]
    fn braced_array_index() {
        let unit = one_unit("echo ${a[0]}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert!(p.index.is_some());
    }

    #[test]
    fn indirect_expansion() {
        let unit = one_unit("echo ${!ref}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert_eq!(p.op, Some(ParamOp::Indirect));
    }

    #[test]
    fn prefix_names_at_form() {
        let unit = one_unit("echo ${!prefix@}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert_eq!(p.op, Some(ParamOp::PrefixNames { at_form: true }));
    }

    #[test]
    fn upper_case_transform() {
        let unit = one_unit("echo ${x^^}");
        let TextUnit::BracedParam(p) = unit else { panic!("expected a braced param") };
        assert_matches!(p.op, Some(ParamOp::Case { mode: CaseMode::AllUpper, .. }));
    }

    #[test]
    fn arithmetic_substitution_parses_the_inner_expression() {
        let unit = one_unit("echo $((1 + 2))");
        assert_matches!(unit, TextUnit::Arithmetic(_));
    }

    #[test]
    fn command_substitution_parses_a_nested_script() {
        let unit = one_unit("echo $(ls -l)");
        let TextUnit::CommandSubstitution(script) = unit else {
            panic!("expected a command substitution");
        };
        assert_eq!(script.statements.len(), 1);
    }

    #[test]
    fn process_substitution_is_readable() {
        let unit = one_unit("echo <(ls -l)");
        assert_matches!(unit, TextUnit::ProcessSubstitution(ProcessSubstitution { direction: ProcessSubstDirection::Read, .. }));
    }

    #[test]
    fn ansi_c_quoting_decodes_escapes() {
        let unit = one_unit(r"echo $'a\tb'");
        assert_eq!(unit, TextUnit::Literal("a\tb".to_string()));
    }

    #[test]
    fn unterminated_braced_param_is_an_error() {
        assert!(crate::parse("echo ${x").is_err());
    }
}

fn is_param_start(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '@' | '*' | '#' | '?' | '-' | '$' | '!')
}
