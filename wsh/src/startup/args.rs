//! Command-line parser for the surface `spec.md` §6 names: `-c SCRIPT`, a
//! file operand, stdin, `--cwd DIR`, `--json`, and `-e`/`--errexit`.

use std::path::PathBuf;
use thiserror::Error;

/// Where the script text comes from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Source {
    /// No `-c` and no file operand: read the whole of standard input.
    #[default]
    Stdin,
    /// A file operand.
    File(PathBuf),
    /// `-c SCRIPT`.
    String(String),
}

/// Parsed command line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub source: Source,
    pub cwd: Option<String>,
    pub json: bool,
    pub errexit: bool,
    pub positional_params: Vec<String>,
}

/// Error in command line parsing.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("option `{0}` missing an argument")]
    MissingOptionArgument(String),
    #[error("missing command string for `-c`")]
    MissingCommandString,
}

/// Parses `args` (typically `std::env::args().skip(1)`, i.e. not including
/// the program name).
pub fn parse<I, S>(args: I) -> Result<Args, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut result = Args::default();
    let mut command_string = None;

    loop {
        match args.peek().map(String::as_str) {
            Some("-c") | Some("--command") => {
                args.next();
                command_string = Some(args.next().ok_or(Error::MissingCommandString)?);
            }
            Some("--cwd") => {
                args.next();
                let value = args.next().ok_or_else(|| Error::MissingOptionArgument("--cwd".to_string()))?;
                result.cwd = Some(value);
            }
            Some("--json") => {
                args.next();
                result.json = true;
            }
            Some("-e") | Some("--errexit") => {
                args.next();
                result.errexit = true;
            }
            Some("--") => {
                args.next();
                break;
            }
            Some(arg) if arg.starts_with('-') && arg.len() > 1 => {
                let arg = arg.to_string();
                return Err(Error::UnknownOption(arg));
            }
            _ => break,
        }
    }

    if let Some(command) = command_string {
        result.source = Source::String(command);
    } else if let Some(path) = args.next() {
        result.source = Source::File(PathBuf::from(path));
    }
    result.positional_params.extend(args);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_string_selects_string_source() {
        let args = parse(["-c", "echo hi"]).unwrap();
        assert_eq!(args.source, Source::String("echo hi".to_string()));
    }

    #[test]
    fn file_operand_selects_file_source() {
        let args = parse(["script.sh", "a", "b"]).unwrap();
        assert_eq!(args.source, Source::File(PathBuf::from("script.sh")));
        assert_eq!(args.positional_params, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn no_operands_selects_stdin() {
        let args = parse(std::iter::empty::<String>()).unwrap();
        assert_eq!(args.source, Source::Stdin);
    }

    #[test]
    fn cwd_and_json_and_errexit_are_parsed() {
        let args = parse(["--cwd", "/work", "--json", "-e", "-c", "true"]).unwrap();
        assert_eq!(args.cwd, Some("/work".to_string()));
        assert!(args.json);
        assert!(args.errexit);
    }

    #[test]
    fn missing_command_string_is_an_error() {
        assert_eq!(parse(["-c"]).unwrap_err(), Error::MissingCommandString);
    }

    #[test]
    fn unknown_option_is_an_error() {
        assert_eq!(parse(["--bogus"]).unwrap_err(), Error::UnknownOption("--bogus".to_string()));
    }
}
