//! Shared argument-parsing helpers (`spec.md` §4.7 "Builtin dispatch
//! contract"), grounded on `yash-builtin/src/common.rs`'s role as the one
//! place every builtin's option scanning goes through.

/// A minimal single-dash-flag scanner: consumes leading `-xyz`-style
/// clusters (no option arguments) off `argv[1..]`, stopping at the first
/// `--` or non-option word. Good enough for this crate's builtins, none of
/// which take an option that itself takes an argument except where a
/// builtin parses that option itself (e.g. `declare -p name`, handled
/// inline).
pub fn split_flags<'a>(argv: &'a [String]) -> (Vec<char>, &'a [String]) {
    let mut flags = Vec::new();
    let mut index = 1;
    while let Some(arg) = argv.get(index) {
        if arg == "--" {
            index += 1;
            break;
        }
        let Some(rest) = arg.strip_prefix('-') else { break };
        if rest.is_empty() {
            break;
        }
        flags.extend(rest.chars());
        index += 1;
    }
    (flags, &argv[index..])
}

/// Renders a `wsh: name: message\n` diagnostic the way every builtin in
/// this crate reports a usage or runtime error.
pub fn usage_error(name: &str, message: impl std::fmt::Display) -> String {
    format!("wsh: {name}: {message}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_leading_flag_cluster() {
        let argv = vec!["set".to_string(), "-ex".to_string(), "a".to_string()];
        let (flags, rest) = split_flags(&argv);
        assert_eq!(flags, vec!['e', 'x']);
        assert_eq!(rest, ["a".to_string()]);
    }

    #[test]
    fn stops_at_double_dash() {
        let argv = vec!["set".to_string(), "--".to_string(), "-x".to_string()];
        let (flags, rest) = split_flags(&argv);
        assert!(flags.is_empty());
        assert_eq!(rest, ["-x".to_string()]);
    }

    #[test]
    fn no_flags_returns_everything_as_operands() {
        let argv = vec!["echo".to_string(), "a".to_string()];
        let (flags, rest) = split_flags(&argv);
        assert!(flags.is_empty());
        assert_eq!(rest, ["a".to_string()]);
    }
}
