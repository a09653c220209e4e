//! `test`/`[` — the POSIX conditional command (`spec.md` §4.7 dispatch
//! list; `-a`/`-o`/`!`/`(`/`)` precedence is a `test`-specific grammar,
//! distinct from `[[ ]]`'s parse-time grammar in `wsh_syntax::cond`, so it
//! is parsed and evaluated here rather than reusing [`wsh_semantics::cond`]
//! directly. File/string/numeric primitives still check the same
//! [`wsh_env::fs`]/[`wsh_env::variable`] state `[[ ]]` does; the one
//! deliberate divergence is `=`/`!=`, which `test` compares as plain
//! strings rather than `[[ ]]`'s glob-pattern match.
//!
//! `[` requires its last operand to be a literal `]`; that operand is
//! stripped before parsing and is the only difference from `test`.

use std::path::Path;
use wsh_env::fs::FileType;
use wsh_env::registry::{Command, CommandInput, CommandOutput};
use wsh_env::Env;
use wsh_semantics::arith_env::eval_arith_str;
use wsh_syntax::source::Location;

#[derive(Clone, Copy, Debug)]
pub struct Test;

impl Command for Test {
    fn run(&self, input: CommandInput<'_>) -> CommandOutput {
        let name = input.argv.first().map(String::as_str).unwrap_or("test");
        let mut tokens = input.argv[1..].to_vec();

        if name == "[" {
            match tokens.last() {
                Some(last) if last == "]" => {
                    tokens.pop();
                }
                _ => return error("[", "missing closing `]`"),
            }
        }

        let mut parser = Parser { tokens: &tokens, pos: 0, fs: input.fs };
        match parser.or_expr() {
            Ok(result) if parser.pos == tokens.len() => CommandOutput::with_status(if result { 0 } else { 1 }),
            Ok(_) => error(name, "unexpected extra argument"),
            Err(message) => error(name, message),
        }
    }
}

fn error(name: &str, message: impl std::fmt::Display) -> CommandOutput {
    CommandOutput {
        stderr: format!("wsh: {name}: {message}\n"),
        exit_status: 2,
        ..Default::default()
    }
}

struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
    fs: &'a dyn wsh_env::fs::FileSystem,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn take(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.pos).map(String::as_str);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<bool, &'static str> {
        let mut result = self.and_expr()?;
        while self.peek() == Some("-o") {
            self.take();
            result = self.and_expr()? || result;
        }
        Ok(result)
    }

    fn and_expr(&mut self) -> Result<bool, &'static str> {
        let mut result = self.not_expr()?;
        while self.peek() == Some("-a") {
            self.take();
            result = self.not_expr()? && result;
        }
        Ok(result)
    }

    fn not_expr(&mut self) -> Result<bool, &'static str> {
        if self.peek() == Some("!") {
            self.take();
            return Ok(!self.not_expr()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool, &'static str> {
        if self.peek() == Some("(") {
            self.take();
            let result = self.or_expr()?;
            if self.take() != Some(")") {
                return Err("missing closing `(`");
            }
            return Ok(result);
        }

        if let Some(op) = self.peek() {
            if let Some(unary) = unary_op(op) {
                // A lone unary-test flag with no following operand (e.g. a
                // trailing `-f` in `[ a = a -a -f ]` with nothing after it)
                // is not itself an error case worth distinguishing here;
                // it simply falls through to the bare-operand branch below.
                if self.tokens.get(self.pos + 1).is_some() {
                    self.take();
                    let operand = self.take().expect("checked above");
                    return Ok(self.eval_unary(unary, operand));
                }
            }
        }

        if self.tokens.get(self.pos + 1).and_then(|t| binary_op(t)).is_some() {
            let left = self.take().expect("peeked").to_string();
            let op = binary_op(self.take().expect("peeked")).expect("checked above");
            let Some(right) = self.take() else {
                return Err("missing operand after binary operator");
            };
            return self.eval_binary(&left, op, right);
        }

        match self.take() {
            Some(operand) => Ok(!operand.is_empty()),
            None => Ok(false),
        }
    }

    fn eval_unary(&self, test: UnaryOp, operand: &str) -> bool {
        match test {
            UnaryOp::Exists => self.fs.exists(Path::new(operand)),
            UnaryOp::RegularFile => self.stat(operand).is_some_and(|m| m.file_type == FileType::Regular),
            UnaryOp::Directory => self.stat(operand).is_some_and(|m| m.file_type == FileType::Directory),
            UnaryOp::Symlink => self.fs.lstat(Path::new(operand)).is_ok_and(|m| m.file_type == FileType::Symlink),
            UnaryOp::Readable => self.stat(operand).is_some_and(|m| m.mode.0 & 0o400 != 0),
            UnaryOp::Writable => self.stat(operand).is_some_and(|m| m.mode.0 & 0o200 != 0),
            UnaryOp::Executable => self.stat(operand).is_some_and(|m| m.mode.0 & 0o100 != 0),
            UnaryOp::NonEmptyFile => self.stat(operand).is_some_and(|m| m.len > 0),
            UnaryOp::StringEmpty => operand.is_empty(),
            UnaryOp::StringNonEmpty => !operand.is_empty(),
            UnaryOp::DeviceOrSpecial => false,
        }
    }

    fn stat(&self, path: &str) -> Option<wsh_env::fs::Metadata> {
        self.fs.stat(Path::new(path)).ok()
    }

    fn eval_binary(&self, left: &str, op: BinaryOp, right: &str) -> Result<bool, &'static str> {
        Ok(match op {
            BinaryOp::StringEq => left == right,
            BinaryOp::StringNe => left != right,
            BinaryOp::Lt => left < right,
            BinaryOp::Gt => left > right,
            BinaryOp::NumEq => self.numeric(left)? == self.numeric(right)?,
            BinaryOp::NumNe => self.numeric(left)? != self.numeric(right)?,
            BinaryOp::NumLt => self.numeric(left)? < self.numeric(right)?,
            BinaryOp::NumLe => self.numeric(left)? <= self.numeric(right)?,
            BinaryOp::NumGt => self.numeric(left)? > self.numeric(right)?,
            BinaryOp::NumGe => self.numeric(left)? >= self.numeric(right)?,
            BinaryOp::NewerThan => self.mtime(left) > self.mtime(right),
            BinaryOp::OlderThan => self.mtime(left) < self.mtime(right),
            BinaryOp::SameFile => self.fs.realpath(Path::new(left)).ok() == self.fs.realpath(Path::new(right)).ok(),
        })
    }

    fn mtime(&self, path: &str) -> Option<u64> {
        self.stat(path).map(|m| m.mtime)
    }

    fn numeric(&self, text: &str) -> Result<i64, &'static str> {
        let mut env = standalone_arith_env();
        eval_arith_str(text, &mut env, &Location::dummy()).map_err(|_| "integer expression expected")
    }
}

/// `test -eq`/`-lt`/etc. accept plain decimal integers (bash also allows
/// `$((...))`-style arithmetic expansions as operands, which is why this
/// reuses the arithmetic evaluator rather than `str::parse`); neither
/// needs variable state, so a throwaway `Env` is enough.
fn standalone_arith_env() -> Env {
    use std::rc::Rc;
    use wsh_env::fs::InMemoryFileSystem;
    Env::new(Rc::new(InMemoryFileSystem::new()), "/".to_string(), "test".to_string())
}

#[derive(Clone, Copy, Debug)]
enum UnaryOp {
    Exists,
    RegularFile,
    Directory,
    Symlink,
    Readable,
    Writable,
    Executable,
    NonEmptyFile,
    StringEmpty,
    StringNonEmpty,
    DeviceOrSpecial,
}

fn unary_op(token: &str) -> Option<UnaryOp> {
    Some(match token {
        "-e" => UnaryOp::Exists,
        "-f" => UnaryOp::RegularFile,
        "-d" => UnaryOp::Directory,
        "-L" | "-h" => UnaryOp::Symlink,
        "-r" => UnaryOp::Readable,
        "-w" => UnaryOp::Writable,
        "-x" => UnaryOp::Executable,
        "-s" => UnaryOp::NonEmptyFile,
        "-z" => UnaryOp::StringEmpty,
        "-n" => UnaryOp::StringNonEmpty,
        "-b" | "-c" | "-p" | "-S" | "-N" | "-u" | "-g" | "-k" | "-t" => UnaryOp::DeviceOrSpecial,
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug)]
enum BinaryOp {
    StringEq,
    StringNe,
    Lt,
    Gt,
    NumEq,
    NumNe,
    NumLt,
    NumLe,
    NumGt,
    NumGe,
    NewerThan,
    OlderThan,
    SameFile,
}

fn binary_op(token: &str) -> Option<BinaryOp> {
    Some(match token {
        "=" | "==" => BinaryOp::StringEq,
        "!=" => BinaryOp::StringNe,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "-eq" => BinaryOp::NumEq,
        "-ne" => BinaryOp::NumNe,
        "-lt" => BinaryOp::NumLt,
        "-le" => BinaryOp::NumLe,
        "-gt" => BinaryOp::NumGt,
        "-ge" => BinaryOp::NumGe,
        "-nt" => BinaryOp::NewerThan,
        "-ot" => BinaryOp::OlderThan,
        "-ef" => BinaryOp::SameFile,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wsh_env::fs::{FileSystem, InMemoryFileSystem, WriteOptions};

    fn run(fs: &dyn FileSystem, argv: &[&str]) -> CommandOutput {
        Test.run(CommandInput {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            stdin: Vec::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs,
        })
    }

    #[test]
    fn bare_operand_tests_non_emptiness() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(run(&fs, &["test", "nonempty"]).exit_status, 0);
        assert_eq!(run(&fs, &["test", ""]).exit_status, 1);
    }

    #[test]
    fn string_equality_is_literal_not_glob() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(run(&fs, &["test", "a*", "=", "a*"]).exit_status, 0);
        assert_eq!(run(&fs, &["test", "abc", "=", "a*"]).exit_status, 1);
    }

    #[test]
    fn numeric_comparison() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(run(&fs, &["test", "3", "-lt", "10"]).exit_status, 0);
        assert_eq!(run(&fs, &["test", "3", "-gt", "10"]).exit_status, 1);
    }

    #[test]
    fn and_or_and_negation() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(run(&fs, &["test", "a", "=", "a", "-a", "b", "=", "b"]).exit_status, 0);
        assert_eq!(run(&fs, &["test", "!", "a", "=", "b"]).exit_status, 0);
        assert_eq!(run(&fs, &["test", "a", "=", "b", "-o", "1", "=", "1"]).exit_status, 0);
    }

    #[test]
    fn file_exists_and_bracket_form_requires_closing_bracket() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/a"), b"x", WriteOptions::default()).unwrap();
        assert_eq!(run(&fs, &["test", "-f", "/a"]).exit_status, 0);
        assert_eq!(run(&fs, &["[", "-f", "/a", "]"]).exit_status, 0);
        assert_eq!(run(&fs, &["[", "-f", "/a"]).exit_status, 2);
    }
}
