//! Minimal trap table (`spec.md` "Interpreter state — Trap handlers
//! (minimal support)"; `SPEC_FULL.md` §3).
//!
//! There is no real OS signal delivery in a sandboxed, hermetic interpreter,
//! so this table only ever fires `EXIT` (at normal invocation end) and `ERR`
//! (after a command reports non-zero status, when `errtrace`-like behavior
//! is wanted by a caller). Named signal conditions are recorded and can be
//! introspected by `trap -p`, but nothing in this crate delivers them.

use std::collections::BTreeMap;
use std::rc::Rc;
use wsh_syntax::source::Location;

/// A condition a trap can be registered against.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// Fires once, when the interpreter invocation ends.
    Exit,
    /// Fires after a command completes with non-zero status.
    Err,
    /// A named signal (e.g. `"TERM"`); recorded but never delivered.
    Signal(String),
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Exit => f.write_str("EXIT"),
            Condition::Err => f.write_str("ERR"),
            Condition::Signal(name) => f.write_str(name),
        }
    }
}

impl Condition {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "EXIT" | "0" => Some(Condition::Exit),
            "ERR" => Some(Condition::Err),
            "" => None,
            name => Some(Condition::Signal(name.trim_start_matches("SIG").to_string())),
        }
    }
}

/// What happens when a [`Condition`] is met.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// No handler registered (or the condition's builtin default, which for
    /// every condition here is "do nothing").
    #[default]
    Default,
    /// `trap '' COND` — explicitly ignore.
    Ignore,
    /// `trap 'command' COND` — run the given script text when triggered.
    Command(Rc<str>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Entry {
    action: Action,
    origin: Location,
}

/// name → [`Action`] table, keyed by [`Condition`].
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    traps: BTreeMap<Condition, Entry>,
}

impl TrapSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_action(&self, condition: &Condition) -> &Action {
        self.traps.get(condition).map_or(&Action::Default, |entry| &entry.action)
    }

    pub fn set_action(&mut self, condition: Condition, action: Action, origin: Location) {
        self.traps.insert(condition, Entry { action, origin });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &Action)> {
        self.traps.iter().map(|(cond, entry)| (cond, &entry.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_condition_is_default() {
        let traps = TrapSet::new();
        assert_eq!(traps.get_action(&Condition::Exit), &Action::Default);
    }

    #[test]
    fn set_then_get() {
        let mut traps = TrapSet::new();
        traps.set_action(Condition::Exit, Action::Command("echo bye".into()), Location::dummy());
        assert_eq!(traps.get_action(&Condition::Exit), &Action::Command("echo bye".into()));
    }

    #[test]
    fn parse_recognizes_exit_err_and_signal_names() {
        assert_eq!(Condition::parse("EXIT"), Some(Condition::Exit));
        assert_eq!(Condition::parse("0"), Some(Condition::Exit));
        assert_eq!(Condition::parse("ERR"), Some(Condition::Err));
        assert_eq!(Condition::parse("SIGTERM"), Some(Condition::Signal("TERM".to_string())));
        assert_eq!(Condition::parse("INT"), Some(Condition::Signal("INT".to_string())));
    }
}
