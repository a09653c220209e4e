// Licensed under the MIT license. See LICENSE for details.

//! Top-level statement grammar and compound commands: `if`, `for`,
//! C-style `for`, `while`/`until`, `case`, `select`, `{ }`, `( )`, `(( ))`,
//! and `[[ ]]` (`spec.md` §4.2).

use super::lex::{Keyword, Operator};
use super::{ErrorCause, PResult, Parser};
use crate::syntax::*;

impl Parser<'_> {
    /// Parses statements until EOF, a `)` (subshell close), or one of
    /// `terminators` is seen as the next keyword.
    pub(super) fn script(&mut self, terminators: &[Keyword]) -> PResult<Script> {
        let mut statements = Vec::new();
        loop {
            self.skip_blanks_and_newlines();
            if self.at_end_of_script(terminators) {
                break;
            }
            statements.push(self.statement()?);
        }
        Ok(Script { statements })
    }

    fn at_end_of_script(&mut self, terminators: &[Keyword]) -> bool {
        if self.eof() {
            return true;
        }
        if self.peek_operator() == Some(Operator::CloseParen) {
            return true;
        }
        let kw = self.peek_keyword();
        terminators.iter().any(|&t| Some(t) == kw)
    }

    fn statement(&mut self) -> PResult<Statement> {
        let and_or = self.and_or_list()?;
        self.skip_blanks();
        let is_async = self.eat_operator(Operator::Amp);
        self.skip_blanks();
        if self.eat_operator(Operator::Semi) {
        } else if self.peek_char() == Some('\n') {
            self.consume_newline()?;
        }
        Ok(Statement { and_or, is_async })
    }

    fn and_or_list(&mut self) -> PResult<AndOrList> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            self.skip_blanks();
            let op = if self.eat_operator(Operator::AmpAmp) {
                AndOrOp::And
            } else if self.eat_operator(Operator::PipePipe) {
                AndOrOp::Or
            } else {
                break;
            };
            self.skip_blanks_and_newlines();
            rest.push((op, self.pipeline()?));
        }
        Ok(AndOrList { first, rest })
    }

    fn pipeline(&mut self) -> PResult<Pipeline> {
        self.skip_blanks();
        let negated = self.eat_keyword(Keyword::Bang);
        self.skip_blanks();
        let mut commands = vec![self.command()?];
        let mut pipe_stderr = Vec::new();
        loop {
            self.skip_blanks();
            let stderr = if self.eat_operator(Operator::PipeAmp) {
                true
            } else if self.eat_operator(Operator::Pipe) {
                false
            } else {
                break;
            };
            pipe_stderr.push(stderr);
            self.skip_blanks_and_newlines();
            commands.push(self.command()?);
        }
        Ok(Pipeline {
            negated,
            commands,
            pipe_stderr,
        })
    }

    pub(super) fn try_compound_command(&mut self) -> PResult<Option<Command>> {
        self.skip_blanks();
        let compound = if self.eat_keyword(Keyword::If) {
            CompoundCommand::If(self.if_command()?)
        } else if self.eat_keyword(Keyword::For) {
            self.for_command()?
        } else if self.eat_keyword(Keyword::While) {
            CompoundCommand::While(self.do_done_loop()?)
        } else if self.eat_keyword(Keyword::Until) {
            CompoundCommand::Until(self.do_done_loop()?)
        } else if self.eat_keyword(Keyword::Case) {
            CompoundCommand::Case(self.case_command()?)
        } else if self.eat_keyword(Keyword::Select) {
            CompoundCommand::Select(self.select_command()?)
        } else if self.eat_keyword(Keyword::OpenBrace) {
            CompoundCommand::Group(self.group_body()?)
        } else if self.double_open_paren() {
            CompoundCommand::ArithmeticCmd(self.arithmetic_command_body()?)
        } else if self.double_open_bracket() {
            CompoundCommand::ConditionalCmd(self.conditional_command_body()?)
        } else if self.eat_operator(Operator::OpenParen) {
            CompoundCommand::Subshell(self.subshell_body()?)
        } else {
            return Ok(None);
        };
        self.skip_blanks();
        let mut redirections = Vec::new();
        while self.try_redirection(&mut redirections)? {
            self.skip_blanks();
        }
        Ok(Some(Command::Compound(Box::new(compound), redirections)))
    }

    fn double_open_paren(&mut self) -> bool {
        if self.starts_with_raw("((") {
            self.bump();
            self.bump();
            true
        } else {
            false
        }
    }

    fn double_open_bracket(&mut self) -> bool {
        let boundary = match self.peek_at(2) {
            None => true,
            Some(c) => c.is_whitespace(),
        };
        if self.starts_with_raw("[[") && boundary {
            self.bump();
            self.bump();
            true
        } else {
            false
        }
    }

    fn starts_with_raw(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn if_command(&mut self) -> PResult<IfCommand> {
        let mut branches = Vec::new();
        loop {
            let condition = self.script(&[Keyword::Then])?;
            self.expect_keyword(Keyword::Then)?;
            let body = self.script(&[Keyword::Elif, Keyword::Else, Keyword::Fi])?;
            branches.push((condition, body));
            if self.eat_keyword(Keyword::Elif) {
                continue;
            }
            break;
        }
        let else_ = if self.eat_keyword(Keyword::Else) {
            Some(self.script(&[Keyword::Fi])?)
        } else {
            None
        };
        self.expect_keyword(Keyword::Fi)?;
        Ok(IfCommand { branches, else_ })
    }

    fn for_command(&mut self) -> PResult<CompoundCommand> {
        self.skip_blanks();
        if self.double_open_paren() {
            return self.c_style_for();
        }
        let name = self
            .bare_identifier()
            .ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
        self.skip_blanks();
        let words = if self.eat_keyword(Keyword::In) {
            let mut words = Vec::new();
            while let Some(w) = self.word()? {
                words.push(w);
            }
            self.end_of_list_item()?;
            Some(words)
        } else {
            self.end_of_list_item()?;
            None
        };
        let body = self.do_block()?;
        Ok(CompoundCommand::For(ForCommand { name, words, body }))
    }

    fn c_style_for(&mut self) -> PResult<CompoundCommand> {
        let init = self.optional_arith_clause(';')?;
        self.skip_blanks();
        self.expect_char(';')?;
        let cond = self.optional_arith_clause(';')?;
        self.skip_blanks();
        self.expect_char(';')?;
        let update = self.optional_arith_clause(')')?;
        self.skip_blanks();
        self.expect_char(')')?;
        self.expect_char(')')?;
        self.end_of_list_item()?;
        let body = self.do_block()?;
        Ok(CompoundCommand::CStyleFor(CStyleForCommand { init, cond, update, body }))
    }

    fn optional_arith_clause(&mut self, stop: char) -> PResult<Option<wsh_arith::ast::Expr>> {
        self.skip_blanks();
        if self.peek_char() == Some(stop) {
            return Ok(None);
        }
        let start = self.pos;
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => break,
                Some(c) if c == stop => break,
                Some(_) => text.push(self.bump().unwrap()),
            }
        }
        let expr = wsh_arith::parse(text.trim())
            .map_err(ErrorCause::Arithmetic)
            .map_err(|e| self.error_at(start, e, self.pos))?;
        Ok(Some(expr))
    }

    fn do_done_loop(&mut self) -> PResult<ConditionalLoop> {
        let condition = self.script(&[Keyword::Do])?;
        let body = self.do_block_after_condition()?;
        Ok(ConditionalLoop { condition, body })
    }

    /// Consumes `do ... done` (the `do` keyword has not yet been consumed).
    fn do_block(&mut self) -> PResult<Script> {
        self.skip_blanks_and_newlines();
        self.expect_keyword(Keyword::Do)?;
        self.do_block_after_condition()
    }

    /// Consumes `do ... done`, given the `do` keyword has just been matched
    /// as part of the loop's own condition-terminator scan.
    fn do_block_after_condition(&mut self) -> PResult<Script> {
        let body = self.script(&[Keyword::Done])?;
        self.expect_keyword(Keyword::Done)?;
        Ok(body)
    }

    fn case_command(&mut self) -> PResult<CaseCommand> {
        self.skip_blanks();
        let subject = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
        self.skip_blanks_and_newlines();
        self.expect_keyword(Keyword::In)?;
        self.skip_blanks_and_newlines();
        let mut arms = Vec::new();
        while self.peek_keyword() != Some(Keyword::Esac) {
            let mut patterns = Vec::new();
            self.eat_operator(Operator::OpenParen);
            loop {
                let pat = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
                patterns.push(pat);
                self.skip_blanks();
                if self.peek_char() == Some('|') {
                    self.bump();
                    self.skip_blanks();
                    continue;
                }
                break;
            }
            self.skip_blanks();
            if !self.eat_operator(Operator::CloseParen) {
                return Err(self.error_here(ErrorCause::InvalidCasePattern));
            }
            self.skip_blanks_and_newlines();
            let body = self.script(&[Keyword::Esac])?;
            self.skip_blanks();
            let terminator = if self.eat_operator(Operator::SemiSemiAmp) {
                CaseTerminator::TestNext
            } else if self.eat_operator(Operator::SemiAmp) {
                CaseTerminator::FallThrough
            } else {
                self.eat_operator(Operator::SemiSemi);
                CaseTerminator::Break
            };
            arms.push(CaseArm { patterns, body, terminator });
            self.skip_blanks_and_newlines();
        }
        self.expect_keyword(Keyword::Esac)?;
        Ok(CaseCommand { subject, arms })
    }

    fn select_command(&mut self) -> PResult<SelectCommand> {
        self.skip_blanks();
        let name = self.bare_identifier().ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
        self.skip_blanks();
        let words = if self.eat_keyword(Keyword::In) {
            let mut words = Vec::new();
            while let Some(w) = self.word()? {
                words.push(w);
            }
            self.end_of_list_item()?;
            Some(words)
        } else {
            self.end_of_list_item()?;
            None
        };
        let body = self.do_block()?;
        Ok(SelectCommand { name, words, body })
    }

    fn group_body(&mut self) -> PResult<Script> {
        let body = self.script(&[Keyword::CloseBrace])?;
        self.expect_keyword(Keyword::CloseBrace)?;
        Ok(body)
    }

    fn subshell_body(&mut self) -> PResult<Script> {
        let body = self.script(&[])?;
        self.skip_blanks_and_newlines();
        if !self.eat_operator(Operator::CloseParen) {
            return Err(self.error_here(ErrorCause::ExpectedToken(")")));
        }
        Ok(body)
    }

    fn arithmetic_command_body(&mut self) -> PResult<wsh_arith::ast::Expr> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_here(ErrorCause::UnterminatedSubstitution("(("))),
                Some('(') => {
                    depth += 1;
                    text.push('(');
                    self.bump();
                }
                Some(')') if depth > 0 => {
                    depth -= 1;
                    text.push(')');
                    self.bump();
                }
                Some(')') => {
                    self.bump();
                    if self.peek_char() == Some(')') {
                        self.bump();
                        break;
                    }
                    text.push(')');
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        wsh_arith::parse(&text)
            .map_err(ErrorCause::Arithmetic)
            .map_err(|e| self.error_at(start, e, self.pos))
    }

    fn conditional_command_body(&mut self) -> PResult<crate::cond::CondExpr> {
        let expr = self.cond_or()?;
        self.skip_blanks_and_newlines();
        self.expect_keyword(Keyword::DoubleCloseBracket)?;
        Ok(expr)
    }

    fn bare_identifier(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let name = self.slice_from(start);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    fn expect_char(&mut self, c: char) -> PResult<()> {
        if self.eat_char(c) {
            Ok(())
        } else {
            Err(self.error_here(ErrorCause::InvalidRedirection))
        }
    }

    /// `;` or newline, terminating a `for`/`select` word-list or an empty
    /// C-style-`for` clause before `do`.
    fn end_of_list_item(&mut self) -> PResult<()> {
        self.skip_blanks();
        if self.eat_operator(Operator::Semi) {
            self.skip_blanks_and_newlines();
        } else if self.peek_char() == Some('\n') {
            self.skip_blanks_and_newlines();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use crate::syntax::*;

    fn first_command(src: &str) -> Command {
        crate::parse(src).unwrap().statements[0].and_or.first.commands[0].clone()
    }

    #[test]
    fn if_elif_else() {
        let Command::Compound(compound, _) = first_command("if false; then a; elif true; then b; else c; fi") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::If(if_cmd) = *compound else { panic!("expected if") };
        assert_eq!(if_cmd.branches.len(), 2);
        assert!(if_cmd.else_.is_some());
    }

    #[test]
    fn for_over_a_word_list() {
        let Command::Compound(compound, _) = first_command("for x in a b c; do echo $x; done") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::For(for_cmd) = *compound else { panic!("expected for") };
        assert_eq!(for_cmd.name, "x");
        assert_eq!(for_cmd.words.unwrap().len(), 3);
    }

    #[test]
    fn for_without_in_defaults_to_positional_params() {
        let Command::Compound(compound, _) = first_command("for x; do echo $x; done") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::For(for_cmd) = *compound else { panic!("expected for") };
        assert!(for_cmd.words.is_none());
    }

    #[test]
    fn c_style_for_loop() {
        let Command::Compound(compound, _) = first_command("for ((i=0; i<10; i=i+1)); do echo $i; done") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::CStyleFor(c_for) = *compound else { panic!("expected c-style for") };
        assert!(c_for.init.is_some());
        assert!(c_for.cond.is_some());
        assert!(c_for.update.is_some());
    }

    #[test]
    fn while_loop() {
        let Command::Compound(compound, _) = first_command("while true; do echo x; done") else {
            panic!("expected a compound command");
        };
        assert_matches!(*compound, CompoundCommand::While(_));
    }

    #[test]
    fn until_loop() {
        let Command::Compound(compound, _) = first_command("until false; do echo x; done") else {
            panic!("expected a compound command");
        };
        assert_matches!(*compound, CompoundCommand::Until(_));
    }

    #[test]
    fn case_with_fall_through_terminators() {
        let Command::Compound(compound, _) = first_command("case $x in a) echo a;; b) echo b;& c) echo c;;& esac") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::Case(case_cmd) = *compound else { panic!("expected case") };
        assert_eq!(case_cmd.arms.len(), 3);
        assert_eq!(case_cmd.arms[0].terminator, CaseTerminator::Break);
        assert_eq!(case_cmd.arms[1].terminator, CaseTerminator::FallThrough);
        assert_eq!(case_cmd.arms[2].terminator, CaseTerminator::TestNext);
    }

    #[test]
    fn case_pattern_alternatives() {
        let Command::Compound(compound, _) = first_command("case $x in a|b) echo hit;; esac") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::Case(case_cmd) = *compound else { panic!("expected case") };
        assert_eq!(case_cmd.arms[0].patterns.len(), 2);
    }

    #[test]
    fn select_loop() {
        let Command::Compound(compound, _) = first_command("select x in a b; do echo $x; done") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::Select(select_cmd) = *compound else { panic!("expected select") };
        assert_eq!(select_cmd.name, "x");
    }

    #[test]
    fn brace_group() {
        let Command::Compound(compound, _) = first_command("{ echo a; echo b; }") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::Group(body) = *compound else { panic!("expected a group") };
        assert_eq!(body.statements.len(), 2);
    }

    #[test]
    fn subshell() {
        let Command::Compound(compound, _) = first_command("(echo a; echo b)") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::Subshell(body) = *compound else { panic!("expected a subshell") };
        assert_eq!(body.statements.len(), 2);
    }

    #[test]
    fn arithmetic_command() {
        let Command::Compound(compound, _) = first_command("((x = 1 + 2))") else {
            panic!("expected a compound command");
        };
        assert_matches!(*compound, CompoundCommand::ArithmeticCmd(_));
    }

    #[test]
    fn conditional_command() {
        let Command::Compound(compound, _) = first_command("[[ -f foo.txt ]]") else {
            panic!("expected a compound command");
        };
        let CompoundCommand::ConditionalCmd(cond) = *compound else { panic!("expected [[ ]]") };
        assert_matches!(cond, crate::cond::CondExpr::Unary(crate::cond::UnaryTest::RegularFile, _));
    }

    #[test]
    fn unclosed_if_is_an_error() {
        assert!(crate::parse("if true; then echo x").is_err());
    }
}
