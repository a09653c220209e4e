//! Alias table (`spec.md` "Interpreter state — alias table"; applied only in
//! the lexer, only when alias expansion is active).

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use wsh_syntax::source::Location;

/// A single alias definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    pub name: String,
    pub replacement: String,
    /// Global aliases (`alias -g`) may replace a word anywhere, not only in
    /// command position.
    pub global: bool,
    pub origin: Location,
}

/// Wraps an [`Alias`] in `Rc` so replaced-out definitions can still be
/// inspected (e.g. diagnostics), keyed for a `HashSet` by name only.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    #[must_use]
    pub fn new(name: String, replacement: String, global: bool, origin: Location) -> Self {
        HashEntry(Rc::new(Alias {
            name,
            replacement,
            global,
            origin,
        }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

pub type AliasSet = HashSet<HashEntry>;

/// The read-only view the parser consults to expand alias words. Kept
/// separate from `AliasSet` so the parser crate can depend on this trait
/// without depending on the rest of `wsh-env`.
pub trait Glossary: Debug {
    #[must_use]
    fn look_up(&self, name: &str) -> Option<Rc<Alias>>;

    /// Hint the parser uses to skip alias expansion entirely when no aliases
    /// are defined.
    #[must_use]
    fn is_empty(&self) -> bool {
        false
    }
}

impl Glossary for AliasSet {
    fn look_up(&self, name: &str) -> Option<Rc<Alias>> {
        self.get(name).map(|entry| entry.0.clone())
    }

    fn is_empty(&self) -> bool {
        HashSet::is_empty(self)
    }
}

/// A glossary that never matches, for contexts with alias expansion disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGlossary;

impl Glossary for EmptyGlossary {
    fn look_up(&self, _name: &str) -> Option<Rc<Alias>> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_look_up() {
        let mut set = AliasSet::new();
        set.insert(HashEntry::new("ll".into(), "ls -l".into(), false, Location::dummy()));
        assert_eq!(set.look_up("ll").unwrap().replacement, "ls -l");
        assert!(set.look_up("missing").is_none());
    }

    #[test]
    fn redefining_replaces_the_entry() {
        let mut set = AliasSet::new();
        set.insert(HashEntry::new("ll".into(), "ls -l".into(), false, Location::dummy()));
        set.replace(HashEntry::new("ll".into(), "ls -la".into(), false, Location::dummy()));
        assert_eq!(set.look_up("ll").unwrap().replacement, "ls -la");
    }

    #[test]
    fn empty_glossary_never_matches() {
        assert!(EmptyGlossary.is_empty());
        assert!(EmptyGlossary.look_up("ll").is_none());
    }
}
