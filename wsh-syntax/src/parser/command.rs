// Licensed under the MIT license. See LICENSE for details.

//! Simple commands: leading assignments, argv words, and redirections
//! (`spec.md` §3, §4.2).

use super::lex::{Keyword, Operator};
use super::{ErrorCause, PResult, Parser};
use crate::syntax::*;

impl<'a> Parser<'a> {
    /// Parses one command: a simple command, a compound command (with its
    /// trailing redirections), or a function definition.
    pub(super) fn command(&mut self) -> PResult<Command> {
        self.skip_blanks();
        if let Some(compound) = self.try_compound_command()? {
            return Ok(compound);
        }
        if let Some(def) = self.try_function_definition()? {
            return Ok(def);
        }
        self.simple_command().map(Command::Simple)
    }

    fn try_function_definition(&mut self) -> PResult<Option<Command>> {
        let save = self.checkpoint();
        if self.eat_keyword(Keyword::Function) {
            self.skip_blanks();
            if let Some(name) = self.try_bare_name() {
                self.skip_blanks();
                self.eat_operator(Operator::OpenParen);
                self.skip_blanks();
                let _ = self.eat_operator(Operator::CloseParen);
                return self.function_body(name).map(Some);
            }
        }
        self.restore(save.clone());

        if let Some(name) = self.try_bare_name() {
            self.skip_blanks();
            if self.eat_operator(Operator::OpenParen) {
                self.skip_blanks();
                if self.eat_operator(Operator::CloseParen) {
                    return self.function_body(name).map(Some);
                }
            }
        }
        self.restore(save);
        Ok(None)
    }

    fn function_body(&mut self, name: String) -> PResult<Command> {
        let start = self.pos;
        self.skip_blanks_and_newlines();
        let Some(compound) = self.try_compound_command()? else {
            return Err(self.error_here(ErrorCause::ExpectedToken("compound command")));
        };
        let Command::Compound(body, redirections) = compound else {
            unreachable!("try_compound_command only returns Command::Compound")
        };
        Ok(Command::FunctionDef(FunctionDefinition {
            name,
            body,
            redirections,
            location: self.location_from(start),
        }))
    }

    /// Attempts to read a plain identifier usable as a function name (no
    /// expansions, quoting, or trailing `=`), restoring position on failure.
    fn try_bare_name(&mut self) -> Option<String> {
        let save = self.checkpoint();
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let name = self.slice_from(start);
        if name.is_empty() || name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            self.restore(save);
            return None;
        }
        Some(name.to_string())
    }

    fn simple_command(&mut self) -> PResult<SimpleCommand> {
        let mut cmd = SimpleCommand::default();
        loop {
            self.skip_blanks();
            if self.try_redirection(&mut cmd.redirections)? {
                continue;
            }
            if cmd.words.is_empty() {
                if let Some(assignment) = self.try_assignment()? {
                    cmd.assignments.push(assignment);
                    continue;
                }
            }
            match self.word()? {
                Some(word) => cmd.words.push(word),
                None => break,
            }
        }
        if cmd.assignments.is_empty() && cmd.words.is_empty() && cmd.redirections.is_empty() {
            return Err(self.error_here(ErrorCause::EmptyCommand));
        }
        Ok(cmd)
    }

    /// `name=word`, `name+=word`, `name=(...)`, or `name[idx]=word`,
    /// consuming nothing and returning `Ok(None)` if the lookahead doesn't
    /// match an assignment shape.
    fn try_assignment(&mut self) -> PResult<Option<Assignment>> {
        let save = self.checkpoint();
        let start = self.pos;
        let Some(name) = self.try_bare_name() else {
            return Ok(None);
        };
        let index = if self.peek_char() == Some('[') {
            self.bump();
            let idx_start = self.pos;
            let mut depth = 1usize;
            loop {
                match self.peek_char() {
                    None => {
                        self.restore(save);
                        return Ok(None);
                    }
                    Some('[') => {
                        depth += 1;
                        self.bump();
                    }
                    Some(']') => {
                        depth -= 1;
                        self.bump();
                        if depth == 0 {
                            break;
                        }
                    }
                    Some(_) => {
                        self.bump();
                    }
                }
            }
            let text = self.slice(idx_start, self.pos - 1);
            Some(self.reparse_word(text)?)
        } else {
            None
        };
        let append = self.peek_char() == Some('+') && self.peek_at(1) == Some('=');
        let plain = self.peek_char() == Some('=');
        if !append && !plain {
            self.restore(save);
            return Ok(None);
        }
        self.bump();
        if append {
            self.bump();
        }
        let value = if self.peek_char() == Some('(') {
            self.bump();
            AssignmentValue::Array(self.array_literal_elements()?)
        } else {
            AssignmentValue::Scalar(
                self.word()?
                    .unwrap_or_else(|| Word::literal("", crate::source::Location::dummy())),
            )
        };
        Ok(Some(Assignment {
            name,
            index,
            value,
            append,
            location: self.location_from(start),
        }))
    }

    fn array_literal_elements(&mut self) -> PResult<Vec<ArrayElement>> {
        let mut elements = Vec::new();
        loop {
            self.skip_blanks_and_newlines();
            if self.peek_char() == Some(')') {
                self.bump();
                break;
            }
            if self.peek_char().is_none() {
                return Err(self.error_here(ErrorCause::ExpectedToken(")")));
            }
            let save = self.checkpoint();
            let key = if self.peek_char() == Some('[') {
                self.bump();
                let idx_start = self.pos;
                while !matches!(self.peek_char(), None | Some(']')) {
                    self.bump();
                }
                let text = self.slice_from(idx_start);
                if self.peek_char() == Some(']') && self.peek_at(1) == Some('=') {
                    self.bump();
                    self.bump();
                    Some(self.reparse_word(text)?)
                } else {
                    self.restore(save);
                    None
                }
            } else {
                None
            };
            let value = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
            elements.push(ArrayElement { key, value });
        }
        Ok(elements)
    }

    fn reparse_word(&mut self, text: &'a str) -> PResult<Word> {
        let mut sub = Parser::new(text);
        Ok(sub.word()?.unwrap_or_else(|| Word::literal("", crate::source::Location::dummy())))
    }

    /// Attempts a redirection at the current position, pushing it to
    /// `out` and returning `true` if one was present.
    pub(super) fn try_redirection(&mut self, out: &mut Vec<Redirection>) -> PResult<bool> {
        let save = self.checkpoint();
        let start = self.pos;
        let fd = self.leading_fd_number();
        let Some(op) = self.peek_operator() else {
            self.restore(save);
            return Ok(false);
        };
        // `<(...)`/`>(...)` are process substitutions, not redirections.
        if matches!(op, Operator::Less | Operator::Great) && self.peek_at(1) == Some('(') {
            self.restore(save);
            return Ok(false);
        }
        let Some((kind, default_fd)) = Parser::redirection_kind(op) else {
            self.restore(save);
            return Ok(false);
        };
        self.eat_operator(op);
        self.skip_blanks();
        let fd = fd.unwrap_or(default_fd);
        let target = match kind {
            RedirectionKind::Heredoc | RedirectionKind::HeredocStrip => {
                let word = self.word()?.ok_or_else(|| self.error_here(ErrorCause::InvalidRedirection))?;
                let (delimiter, expand) = plain_text_if_unquoted(&word);
                let strip_tabs = matches!(kind, RedirectionKind::HeredocStrip);
                RedirectionTarget::Heredoc(self.register_heredoc(delimiter, expand, strip_tabs))
            }
            _ => {
                let word = self.word()?.ok_or_else(|| self.error_here(ErrorCause::InvalidRedirection))?;
                RedirectionTarget::Word(word)
            }
        };
        out.push(Redirection {
            kind,
            fd,
            target,
            location: self.location_from(start),
        });
        Ok(true)
    }

    /// An optional leading digit sequence naming the fd being redirected,
    /// e.g. the `2` in `2>file`. Must be immediately followed by a
    /// redirection operator to count; otherwise it's not consumed.
    fn leading_fd_number(&mut self) -> Option<u32> {
        let save = self.checkpoint();
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let text = self.slice_from(start);
        if text.is_empty() || self.peek_operator().is_none() {
            self.restore(save);
            return None;
        }
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::*;

    fn simple(src: &str) -> SimpleCommand {
        let script = crate::parse(src).unwrap();
        let Command::Simple(cmd) = script.statements[0].and_or.first.commands[0].clone() else {
            panic!("expected a simple command");
        };
        cmd
    }

    fn literal(word: &Word) -> String {
        word.parts
            .iter()
            .map(|p| match p {
                WordPart::Unquoted(TextUnit::Literal(s)) => s.as_str(),
                _ => panic!("not a plain literal part: {p:?}"),
            })
            .collect()
    }

    #[test]
    fn words_and_leading_assignments() {
        let cmd = simple("FOO=bar echo hi");
        assert_eq!(cmd.assignments.len(), 1);
        assert_eq!(cmd.assignments[0].name, "FOO");
        assert_eq!(cmd.words.iter().map(literal).collect::<Vec<_>>(), vec!["echo", "hi"]);
    }

    #[test]
    fn assignment_only_after_a_word_is_a_plain_argument() {
        let cmd = simple("echo FOO=bar");
        assert!(cmd.assignments.is_empty());
        assert_eq!(cmd.words.len(), 2);
    }

    #[test]
    fn append_assignment() {
        let cmd = simple("FOO+=bar :");
        assert!(cmd.assignments[0].append);
    }

    #[test]
    fn indexed_assignment() {
        let cmd = simple("a[0]=x :");
        assert!(cmd.assignments[0].index.is_some());
    }

    #[test]
    fn array_literal_assignment() {
        let cmd = simple("a=(one two three) :");
        let AssignmentValue::Array(elements) = &cmd.assignments[0].value else {
            panic!("expected an array literal");
        };
        assert_eq!(elements.len(), 3);
        assert_eq!(literal(&elements[1].value), "two");
    }

    #[test]
    fn output_redirection() {
        let cmd = simple("echo hi > out.txt");
        assert_eq!(cmd.redirections.len(), 1);
        assert_eq!(cmd.redirections[0].kind, RedirectionKind::Output);
        assert_eq!(cmd.redirections[0].fd, 1);
    }

    #[test]
    fn redirection_with_explicit_fd() {
        let cmd = simple("echo hi 2>> err.log");
        assert_eq!(cmd.redirections[0].kind, RedirectionKind::Append);
        assert_eq!(cmd.redirections[0].fd, 2);
    }

    #[test]
    fn function_definition_with_function_keyword() {
        let script = crate::parse("function greet { echo hi; }").unwrap();
        let Command::FunctionDef(def) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a function definition");
        };
        assert_eq!(def.name, "greet");
    }

    #[test]
    fn function_definition_posix_style() {
        let script = crate::parse("greet() { echo hi; }").unwrap();
        let Command::FunctionDef(def) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a function definition");
        };
        assert_eq!(def.name, "greet");
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(crate::parse(";").is_err());
    }
}

/// Returns the heredoc delimiter's literal text and whether it allows
/// expansion (false if any part of the word was quoted).
fn plain_text_if_unquoted(word: &Word) -> (String, bool) {
    let mut text = String::new();
    let mut expand = true;
    for part in &word.parts {
        match part {
            WordPart::Unquoted(TextUnit::Literal(s)) => text.push_str(s),
            WordPart::SingleQuoted(s) => {
                expand = false;
                text.push_str(s);
            }
            WordPart::DoubleQuoted(units) => {
                expand = false;
                for u in units {
                    if let TextUnit::Literal(s) = u {
                        text.push_str(s);
                    }
                }
            }
            _ => {}
        }
    }
    (text, expand)
}
