// Licensed under the MIT license. See LICENSE for details.

//! Operator/keyword recognition and word scanning (`spec.md` §4.1).

use super::{ErrorCause, PResult, Parser};
use crate::source::Location;
use crate::syntax::{Heredoc, RedirectionKind, TextUnit, Word, WordPart};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    /// `|`
    Pipe,
    /// `|&`
    PipeAmp,
    /// `&`
    Amp,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `;`
    Semi,
    /// `;;`
    SemiSemi,
    /// `;&`
    SemiAmp,
    /// `;;&`
    SemiSemiAmp,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `<`
    Less,
    /// `>`
    Great,
    /// `>>`
    GreatGreat,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<<<`
    LessLessLess,
    /// `<&`
    LessAmp,
    /// `>&`
    GreatAmp,
    /// `<>`
    LessGreat,
    /// `>|`
    GreatPipe,
    /// `&>`
    AmpGreat,
}

/// Reserved words recognized only at the start of a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Keyword {
    If,
    Then,
    Elif,
    Else,
    Fi,
    For,
    While,
    Until,
    Do,
    Done,
    Case,
    In,
    Esac,
    Function,
    Select,
    OpenBrace,
    CloseBrace,
    Bang,
    DoubleOpenParen,
    DoubleOpenBracket,
    DoubleCloseBracket,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::Fi => "fi",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Until => "until",
            Keyword::Do => "do",
            Keyword::Done => "done",
            Keyword::Case => "case",
            Keyword::In => "in",
            Keyword::Esac => "esac",
            Keyword::Function => "function",
            Keyword::Select => "select",
            Keyword::OpenBrace => "{",
            Keyword::CloseBrace => "}",
            Keyword::Bang => "!",
            Keyword::DoubleOpenParen => "((",
            Keyword::DoubleOpenBracket => "[[",
            Keyword::DoubleCloseBracket => "]]",
        }
    }

    fn from_word(s: &str) -> Option<Self> {
        Some(match s {
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "fi" => Keyword::Fi,
            "for" => Keyword::For,
            "while" => Keyword::While,
            "until" => Keyword::Until,
            "do" => Keyword::Do,
            "done" => Keyword::Done,
            "case" => Keyword::Case,
            "in" => Keyword::In,
            "esac" => Keyword::Esac,
            "function" => Keyword::Function,
            "select" => Keyword::Select,
            "{" => Keyword::OpenBrace,
            "}" => Keyword::CloseBrace,
            "!" => Keyword::Bang,
            _ => return None,
        })
    }
}

/// Characters that end a bare word outside any quoting.
const OPERATOR_START: &[char] = &['|', '&', ';', '(', ')', '<', '>'];

pub(super) fn is_word_terminator(c: char) -> bool {
    c.is_whitespace() || OPERATOR_START.contains(&c) || c == '#'
}

impl Parser<'_> {
    /// Peeks the next maximal-munch operator without consuming it, except
    /// `{`/`}` which are only operators at a word boundary and are handled
    /// via keyword lookup instead.
    pub(super) fn peek_operator(&mut self) -> Option<Operator> {
        use Operator::*;
        let rest = &self.src[self.pos..];
        let table: &[(&str, Operator)] = &[
            (";;&", SemiSemiAmp),
            (";;", SemiSemi),
            (";&", SemiAmp),
            (";", Semi),
            ("<<<", LessLessLess),
            ("<<-", LessLessDash),
            ("<<", LessLess),
            ("<&", LessAmp),
            ("<>", LessGreat),
            ("<", Less),
            (">>", GreatGreat),
            (">&", GreatAmp),
            (">|", GreatPipe),
            (">", Great),
            ("&>", AmpGreat),
            ("&&", AmpAmp),
            ("&", Amp),
            ("||", PipePipe),
            ("|&", PipeAmp),
            ("|", Pipe),
            ("(", OpenParen),
            (")", CloseParen),
        ];
        table.iter().find(|(s, _)| rest.starts_with(s)).map(|&(_, op)| op)
    }

    pub(super) fn eat_operator(&mut self, op: Operator) -> bool {
        if self.peek_operator() == Some(op) {
            let len = operator_str(op).len();
            for _ in 0..len {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Consumes a `\n` and, if any here-document bodies are pending on this
    /// logical line, captures them from the immediately following lines.
    pub(super) fn consume_newline(&mut self) -> PResult<()> {
        debug_assert_eq!(self.peek_char(), Some('\n'));
        self.bump();
        self.drain_pending_heredocs()
    }

    fn drain_pending_heredocs(&mut self) -> PResult<()> {
        let pending = std::mem::take(&mut self.pending_heredocs);
        for heredoc in pending {
            let mut body = String::new();
            loop {
                if self.eof() {
                    return Err(self.error_here(ErrorCause::UnterminatedHeredoc(heredoc.delimiter.clone())));
                }
                let line_start = self.pos;
                while !matches!(self.peek_char(), None | Some('\n')) {
                    self.bump();
                }
                let mut line = &self.src[line_start..self.pos];
                if !self.eof() {
                    self.bump(); // the newline
                }
                let trimmed = if heredoc.strip_tabs { line.trim_start_matches('\t') } else { line };
                if trimmed == heredoc.delimiter {
                    break;
                }
                if heredoc.strip_tabs {
                    line = trimmed;
                }
                body.push_str(line);
                body.push('\n');
            }
            *heredoc.content.borrow_mut() = body;
        }
        Ok(())
    }

    /// Scans a word starting at the current position. Returns `None` if the
    /// next non-blank character cannot start a word (operator, EOF, `\n`).
    pub(super) fn word(&mut self) -> PResult<Option<Word>> {
        self.skip_blanks();
        let starts_process_subst = matches!(self.peek_char(), Some('<' | '>')) && self.peek_at(1) == Some('(');
        if self.eof() || matches!(self.peek_char(), Some('\n')) || (self.peek_operator().is_some() && !starts_process_subst) {
            return Ok(None);
        }
        let start = self.pos;
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            let Some(c) = self.peek_char() else { break };
            let is_process_subst = matches!(c, '<' | '>') && self.peek_at(1) == Some('(');
            if is_word_terminator(c) && !is_process_subst {
                break;
            }
            match c {
                '<' | '>' if is_process_subst => {
                    flush_literal(&mut parts, &mut literal);
                    self.bump();
                    let direction = if c == '<' {
                        crate::syntax::ProcessSubstDirection::Read
                    } else {
                        crate::syntax::ProcessSubstDirection::Write
                    };
                    parts.push(WordPart::Unquoted(self.process_substitution(direction)?));
                }
                '\'' => {
                    flush_literal(&mut parts, &mut literal);
                    parts.push(WordPart::SingleQuoted(self.single_quoted()?));
                }
                '"' => {
                    flush_literal(&mut parts, &mut literal);
                    parts.push(WordPart::DoubleQuoted(self.double_quoted()?));
                }
                '$' => {
                    if let Some(unit) = self.dollar(false)? {
                        flush_literal(&mut parts, &mut literal);
                        parts.push(WordPart::Unquoted(unit));
                    } else {
                        literal.push('$');
                        self.bump();
                    }
                }
                '`' => {
                    flush_literal(&mut parts, &mut literal);
                    parts.push(WordPart::Unquoted(self.backquoted()?));
                }
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') => {} // line continuation, contributes nothing
                        Some(escaped) => literal.push(escaped),
                        None => literal.push('\\'),
                    }
                }
                '~' if literal.is_empty() && parts.is_empty() => {
                    flush_literal(&mut parts, &mut literal);
                    parts.push(WordPart::Unquoted(self.tilde()));
                }
                _ => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        flush_literal(&mut parts, &mut literal);
        if parts.is_empty() {
            parts.push(WordPart::Unquoted(TextUnit::Literal(String::new())));
        }
        let location = self.location_from(start);
        Ok(Some(Word { parts, location }))
    }

    /// Scans a "command-position" word: a reserved word, if it literally
    /// matches one, is not consumed (the caller checks first via
    /// [`Self::peek_keyword`]).
    pub(super) fn peek_keyword(&mut self) -> Option<Keyword> {
        let save = (self.pos, self.chars.clone());
        self.skip_blanks();
        let start = self.pos;
        if self.starts_with("((") {
            self.chars = save.1;
            self.pos = save.0;
            return None; // handled by the `((` operator check, not a bare word
        }
        while let Some(c) = self.peek_char() {
            if is_word_terminator(c) {
                break;
            }
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let kw = Keyword::from_word(text).filter(|_| {
            // A keyword must be a standalone word: nothing glued to it.
            match self.peek_char() {
                None => true,
                Some(c) => c.is_whitespace() || OPERATOR_START.contains(&c) || c == '#',
            }
        });
        self.chars = save.1;
        self.pos = save.0;
        kw
    }

    pub(super) fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.skip_blanks();
        if self.peek_keyword() == Some(kw) {
            for _ in 0..kw.as_str().chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    pub(super) fn expect_keyword(&mut self, kw: Keyword) -> PResult<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.error_here(ErrorCause::ExpectedKeyword(kw.as_str())))
        }
    }

    fn single_quoted(&mut self) -> PResult<String> {
        let start = self.pos;
        self.bump(); // opening '
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(s),
                Some(c) => s.push(c),
                None => return Err(self.error_at(start, ErrorCause::UnterminatedSingleQuote, self.pos)),
            }
        }
    }

    fn double_quoted(&mut self) -> PResult<Vec<TextUnit>> {
        let start = self.pos;
        self.bump(); // opening "
        let mut units = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(start, ErrorCause::UnterminatedDoubleQuote, self.pos)),
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.peek_char() {
                        Some(c @ ('"' | '\\' | '$' | '`')) => {
                            literal.push(c);
                            self.bump();
                        }
                        Some('\n') => {
                            self.bump();
                        }
                        _ => literal.push('\\'),
                    }
                }
                Some('$') => {
                    if let Some(unit) = self.dollar(true)? {
                        if !literal.is_empty() {
                            units.push(TextUnit::Literal(std::mem::take(&mut literal)));
                        }
                        units.push(unit);
                    } else {
                        literal.push('$');
                        self.bump();
                    }
                }
                Some('`') => {
                    if !literal.is_empty() {
                        units.push(TextUnit::Literal(std::mem::take(&mut literal)));
                    }
                    units.push(self.backquoted()?);
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        if !literal.is_empty() {
            units.push(TextUnit::Literal(literal));
        }
        Ok(units)
    }

    /// Like [`Self::double_quoted`]'s inner scan, but runs to the end of
    /// input instead of stopping at a closing `"` — see [`super::parse_text`].
    pub(super) fn text_to_eof(&mut self) -> PResult<Vec<TextUnit>> {
        let mut units = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek_char() {
                None => break,
                Some('\\') => {
                    self.bump();
                    match self.peek_char() {
                        Some(c @ ('\\' | '$' | '`')) => {
                            literal.push(c);
                            self.bump();
                        }
                        Some('\n') => {
                            self.bump();
                        }
                        _ => literal.push('\\'),
                    }
                }
                Some('$') => {
                    if let Some(unit) = self.dollar(true)? {
                        if !literal.is_empty() {
                            units.push(TextUnit::Literal(std::mem::take(&mut literal)));
                        }
                        units.push(unit);
                    } else {
                        literal.push('$');
                        self.bump();
                    }
                }
                Some('`') => {
                    if !literal.is_empty() {
                        units.push(TextUnit::Literal(std::mem::take(&mut literal)));
                    }
                    units.push(self.backquoted()?);
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        if !literal.is_empty() {
            units.push(TextUnit::Literal(literal));
        }
        Ok(units)
    }

    fn backquoted(&mut self) -> PResult<TextUnit> {
        let start = self.pos;
        self.bump(); // opening `
        let mut src = String::new();
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') if matches!(self.peek_char(), Some('`' | '\\' | '$')) => {
                    src.push(self.bump().unwrap());
                }
                Some(c) => src.push(c),
                None => return Err(self.error_at(start, ErrorCause::UnterminatedSubstitution("`"), self.pos)),
            }
        }
        let script = super::parse(&src).map_err(|e| self.error_at(start, ErrorCause::Nested(Box::new(e)), self.pos))?;
        Ok(TextUnit::Backquoted(script))
    }

    fn tilde(&mut self) -> TextUnit {
        debug_assert_eq!(self.peek_char(), Some('~'));
        self.bump();
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.' || c == '-') {
            self.bump();
        }
        let name = &self.src[start..self.pos];
        let (user, suffix) = match name {
            "+" => (String::new(), crate::syntax::TildeSuffix::PlusDir),
            "-" => (String::new(), crate::syntax::TildeSuffix::MinusDir),
            _ => (name.to_string(), crate::syntax::TildeSuffix::None),
        };
        TextUnit::Tilde(crate::syntax::TildeExpansion { user, suffix })
    }

    pub(super) fn redirection_kind(op: Operator) -> Option<(RedirectionKind, u32)> {
        use Operator::*;
        Some(match op {
            Less => (RedirectionKind::Input, 0),
            Great => (RedirectionKind::Output, 1),
            GreatGreat => (RedirectionKind::Append, 1),
            LessGreat => (RedirectionKind::ReadWrite, 0),
            GreatPipe => (RedirectionKind::Clobber, 1),
            LessAmp => (RedirectionKind::DuplicateInput, 0),
            GreatAmp => (RedirectionKind::DuplicateOutput, 1),
            AmpGreat => (RedirectionKind::OutputBoth, 1),
            LessLess => (RedirectionKind::Heredoc, 0),
            LessLessDash => (RedirectionKind::HeredocStrip, 0),
            LessLessLess => (RedirectionKind::HereString, 0),
            _ => return None,
        })
    }

    pub(super) fn register_heredoc(&mut self, delimiter: String, expand: bool, strip_tabs: bool) -> Heredoc {
        let content = Rc::new(RefCell::new(String::new()));
        self.pending_heredocs.push(PendingHeredoc {
            delimiter: delimiter.clone(),
            strip_tabs,
            content: Rc::clone(&content),
        });
        Heredoc {
            delimiter,
            expand,
            strip_tabs,
            content,
        }
    }
}

pub(super) struct PendingHeredoc {
    delimiter: String,
    strip_tabs: bool,
    content: Rc<RefCell<String>>,
}

fn flush_literal(parts: &mut Vec<WordPart>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(WordPart::Unquoted(TextUnit::Literal(std::mem::take(literal))));
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use crate::syntax::*;

    fn one_word(src: &str) -> Word {
        let script = crate::parse(src).unwrap();
        let Command::Simple(cmd) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a simple command");
        };
        cmd.words[0].clone()
    }

    fn literal(word: &Word) -> String {
        word.parts
            .iter()
            .map(|p| match p {
                WordPart::Unquoted(TextUnit::Literal(s)) => s.clone(),
                WordPart::SingleQuoted(s) => s.clone(),
                _ => panic!("not a plain literal part: {p:?}"),
            })
            .collect()
    }

    #[test]
    fn scans_a_plain_word() {
        assert_eq!(literal(&one_word("echo hello")).as_str(), "hello");
    }

    #[test]
    fn single_quotes_suppress_all_expansion() {
        let word = one_word(r"echo 'a$b`c'");
        assert_eq!(word.parts, vec![WordPart::SingleQuoted("a$b`c".to_string())]);
    }

    #[test]
    fn double_quotes_still_expand_parameters() {
        let word = one_word(r#"echo "a$b c""#);
        let WordPart::DoubleQuoted(units) = &word.parts[0] else {
            panic!("expected a double-quoted part");
        };
        assert_matches!(units[1], TextUnit::DollarVariable(_));
    }

    #[test]
    fn backslash_escapes_a_single_character() {
        assert_eq!(literal(&one_word("echo a\\ b")).as_str(), "a b");
    }

    #[test]
    fn rejects_an_unterminated_single_quote() {
        assert!(crate::parse("echo 'abc").is_err());
    }

    #[test]
    fn heredoc_body_is_captured_up_to_the_delimiter() {
        let script = crate::parse("cat <<EOF\nline one\nline two\nEOF\n").unwrap();
        let Command::Simple(cmd) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a simple command");
        };
        let Redirection {
            target: RedirectionTarget::Heredoc(heredoc),
            ..
        } = &cmd.redirections[0]
        else {
            panic!("expected a heredoc redirection");
        };
        assert_eq!(heredoc.delimiter, "EOF");
        assert_eq!(heredoc.content.borrow().as_str(), "line one\nline two\n");
    }

    #[test]
    fn heredoc_with_dash_strips_leading_tabs() {
        let script = crate::parse("cat <<-EOF\n\t\tindented\n\tEOF\n").unwrap();
        let Command::Simple(cmd) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a simple command");
        };
        let Redirection {
            target: RedirectionTarget::Heredoc(heredoc),
            ..
        } = &cmd.redirections[0]
        else {
            panic!("expected a heredoc redirection");
        };
        assert_eq!(heredoc.content.borrow().as_str(), "indented\n");
    }

    #[test]
    fn quoted_heredoc_delimiter_disables_expansion() {
        let script = crate::parse("cat <<'EOF'\n$x\nEOF\n").unwrap();
        let Command::Simple(cmd) = &script.statements[0].and_or.first.commands[0] else {
            panic!("expected a simple command");
        };
        let Redirection {
            target: RedirectionTarget::Heredoc(heredoc),
            ..
        } = &cmd.redirections[0]
        else {
            panic!("expected a heredoc redirection");
        };
        assert!(!heredoc.expand);
    }
}

fn operator_str(op: Operator) -> &'static str {
    use Operator::*;
    match op {
        Pipe => "|",
        PipeAmp => "|&",
        Amp => "&",
        AmpAmp => "&&",
        PipePipe => "||",
        Semi => ";",
        SemiSemi => ";;",
        SemiAmp => ";&",
        SemiSemiAmp => ";;&",
        OpenParen => "(",
        CloseParen => ")",
        OpenBrace => "{",
        CloseBrace => "}",
        Less => "<",
        Great => ">",
        GreatGreat => ">>",
        LessLess => "<<",
        LessLessDash => "<<-",
        LessLessLess => "<<<",
        LessAmp => "<&",
        GreatAmp => ">&",
        LessGreat => "<>",
        GreatPipe => ">|",
        AmpGreat => "&>",
    }
}
