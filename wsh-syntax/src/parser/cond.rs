// Licensed under the MIT license. See LICENSE for details.

//! `[[ ]]` conditional expressions: `!` > `&&` > `||`, parenthesized groups
//! (`spec.md` §4.2, §4.5).

use super::lex::Operator;
use super::lex::Keyword;
use super::{ErrorCause, PResult, Parser};
use crate::cond::{BinaryTest, CondExpr, UnaryTest};
use crate::syntax::{TextUnit, Word, WordPart};

impl Parser<'_> {
    pub(super) fn cond_or(&mut self) -> PResult<CondExpr> {
        let mut left = self.cond_and()?;
        loop {
            self.skip_blanks_and_newlines();
            if self.eat_operator(Operator::PipePipe) {
                self.skip_blanks_and_newlines();
                left = CondExpr::Or(Box::new(left), Box::new(self.cond_and()?));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn cond_and(&mut self) -> PResult<CondExpr> {
        let mut left = self.cond_not()?;
        loop {
            self.skip_blanks_and_newlines();
            if self.eat_operator(Operator::AmpAmp) {
                self.skip_blanks_and_newlines();
                left = CondExpr::And(Box::new(left), Box::new(self.cond_not()?));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn cond_not(&mut self) -> PResult<CondExpr> {
        self.skip_blanks_and_newlines();
        if self.eat_keyword(Keyword::Bang) {
            self.skip_blanks_and_newlines();
            Ok(CondExpr::Not(Box::new(self.cond_not()?)))
        } else {
            self.cond_primary()
        }
    }

    fn cond_primary(&mut self) -> PResult<CondExpr> {
        self.skip_blanks_and_newlines();
        if self.eat_operator(Operator::OpenParen) {
            let inner = self.cond_or()?;
            self.skip_blanks_and_newlines();
            if !self.eat_operator(Operator::CloseParen) {
                return Err(self.error_here(ErrorCause::ExpectedToken(")")));
            }
            return Ok(inner);
        }
        if let Some(test) = self.peek_plain_word()?.as_deref().and_then(unary_test) {
            self.word()?; // consume the operator word just peeked
            self.skip_blanks();
            let operand = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
            return Ok(CondExpr::Unary(test, operand));
        }
        let left = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
        self.skip_blanks();
        // `<`/`>` are lexed as redirection operators everywhere else, but
        // inside `[[ ]]` they are plain lexicographic comparisons.
        if self.eat_operator(Operator::Less) {
            self.skip_blanks();
            let right = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
            return Ok(CondExpr::Binary(left, BinaryTest::Lt, right));
        }
        if self.eat_operator(Operator::Great) {
            self.skip_blanks();
            let right = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
            return Ok(CondExpr::Binary(left, BinaryTest::Gt, right));
        }
        if let Some(op) = self.peek_plain_word()?.as_deref().and_then(binary_test) {
            self.word()?; // consume the operator word
            self.skip_blanks();
            let right = self.word()?.ok_or_else(|| self.error_here(ErrorCause::ExpectedWord))?;
            return Ok(CondExpr::Binary(left, op, right));
        }
        Ok(CondExpr::Word(left))
    }

    /// Looks at the next word without consuming it, returning its text only
    /// if it is a plain unquoted literal (so it can be an operator token).
    fn peek_plain_word(&mut self) -> PResult<Option<String>> {
        let save = self.checkpoint();
        let word = self.word()?;
        self.restore(save);
        Ok(word.as_ref().and_then(plain_literal))
    }
}

fn plain_literal(word: &Word) -> Option<String> {
    match word.parts.as_slice() {
        [WordPart::Unquoted(TextUnit::Literal(s))] => Some(s.clone()),
        [] => Some(String::new()),
        _ => None,
    }
}

fn unary_test(s: &str) -> Option<UnaryTest> {
    use UnaryTest::*;
    Some(match s {
        "-e" => Exists,
        "-f" => RegularFile,
        "-d" => Directory,
        "-L" | "-h" => Symlink,
        "-r" => Readable,
        "-w" => Writable,
        "-x" => Executable,
        "-s" => NonEmptyFile,
        "-b" => BlockSpecial,
        "-c" => CharSpecial,
        "-p" => Pipe,
        "-S" => Socket,
        "-N" => ModifiedSinceRead,
        "-u" => SetUid,
        "-g" => SetGid,
        "-k" => Sticky,
        "-t" => Terminal,
        "-z" => StringEmpty,
        "-n" => StringNonEmpty,
        "-o" => OptionSet,
        "-v" => VariableSet,
        "-R" => NameRef,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use crate::cond::{BinaryTest, CondExpr, UnaryTest};
    use crate::syntax::Command;

    fn cond(src: &str) -> CondExpr {
        let script = crate::parse(&format!("[[ {src} ]]")).unwrap();
        let Command::Compound(compound, _) = script.statements[0].and_or.first.commands[0].clone() else {
            panic!("expected a compound command");
        };
        let crate::syntax::CompoundCommand::ConditionalCmd(cond) = *compound else {
            panic!("expected a [[ ]] command")
        };
        cond
    }

    #[test]
    fn unary_string_test() {
        assert_matches!(cond("-z $x"), CondExpr::Unary(UnaryTest::StringEmpty, _));
    }

    #[test]
    fn binary_equality() {
        assert_matches!(cond("$a = $b"), CondExpr::Binary(_, BinaryTest::Eq, _));
    }

    #[test]
    fn binary_numeric_comparison() {
        assert_matches!(cond("$a -lt $b"), CondExpr::Binary(_, BinaryTest::NumLt, _));
    }

    #[test]
    fn lexicographic_less_than_is_not_a_redirection() {
        assert_matches!(cond("$a < $b"), CondExpr::Binary(_, BinaryTest::Lt, _));
    }

    #[test]
    fn regex_match() {
        assert_matches!(cond("$a =~ ^foo"), CondExpr::Binary(_, BinaryTest::RegexMatch, _));
    }

    #[test]
    fn negation() {
        assert_matches!(cond("! -e foo"), CondExpr::Not(_));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = cond("-n $a && -n $b || -n $c");
        let CondExpr::Or(lhs, _) = expr else { panic!("expected the top-level `||`") };
        assert_matches!(*lhs, CondExpr::And(_, _));
    }

    #[test]
    fn parenthesized_grouping() {
        let expr = cond("( -n $a || -n $b ) && -n $c");
        assert_matches!(expr, CondExpr::And(_, _));
    }

    #[test]
    fn bare_word_is_a_non_empty_string_test() {
        assert_matches!(cond("$x"), CondExpr::Word(_));
    }
}

fn binary_test(s: &str) -> Option<BinaryTest> {
    use BinaryTest::*;
    Some(match s {
        "-nt" => NewerThan,
        "-ot" => OlderThan,
        "-ef" => SameFile,
        "=" | "==" => Eq,
        "!=" => Ne,
        "<" => Lt,
        ">" => Gt,
        "=~" => RegexMatch,
        "-eq" => NumEq,
        "-ne" => NumNe,
        "-lt" => NumLt,
        "-le" => NumLe,
        "-gt" => NumGt,
        "-ge" => NumGe,
        _ => return None,
    })
}
