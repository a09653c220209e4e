//! Shell options (`spec.md` "Interpreter state" — `errexit`, `nounset`, …),
//! represented as an [`enumset::EnumSet`] exactly the way the teacher's
//! `option` module represents its (larger) option set.

use enumset::{EnumSet, EnumSetType};
use std::fmt::{self, Display, Formatter};

/// On/off state of a single option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    On,
    Off,
}

pub use State::*;

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            On => "on",
            Off => "off",
        })
    }
}

/// A shell option settable via `set -o`/`shopt`.
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
pub enum ShellOption {
    ErrExit,
    NoUnset,
    PipeFail,
    XTrace,
    NoGlob,
    ExtGlob,
    NoCaseMatch,
    GlobStar,
    DotGlob,
    GlobSkipDots,
    /// A pathname pattern with no match expands to zero fields instead of
    /// its own literal spelling.
    NullGlob,
    /// A pathname pattern with no match is a fatal expansion error instead
    /// of expanding to its own literal spelling. Takes precedence over
    /// `nullglob` if both are somehow on.
    FailGlob,
    LastPipe,
    Posix,
    /// Allows overwriting an existing file with `>` (off means `noclobber`).
    Clobber,
}

pub use ShellOption::*;

impl ShellOption {
    /// The name used with `set -o NAME` / `shopt -s NAME`.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            ErrExit => "errexit",
            NoUnset => "nounset",
            PipeFail => "pipefail",
            XTrace => "xtrace",
            NoGlob => "noglob",
            ExtGlob => "extglob",
            NoCaseMatch => "nocasematch",
            GlobStar => "globstar",
            DotGlob => "dotglob",
            GlobSkipDots => "globskipdots",
            NullGlob => "nullglob",
            FailGlob => "failglob",
            LastPipe => "lastpipe",
            Posix => "posix",
            Clobber => "clobber",
        }
    }

    #[must_use]
    pub fn from_long_name(name: &str) -> Option<Self> {
        EnumSet::<ShellOption>::all()
            .iter()
            .find(|option| option.long_name() == name)
    }
}

/// Map from every [`ShellOption`] to its current [`State`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionSet {
    enabled: EnumSet<ShellOption>,
}

impl Default for OptionSet {
    /// `clobber` is on by default (matching bash); everything else starts
    /// off.
    fn default() -> Self {
        OptionSet {
            enabled: EnumSet::only(Clobber),
        }
    }
}

impl OptionSet {
    #[must_use]
    pub fn get(&self, option: ShellOption) -> State {
        if self.enabled.contains(option) {
            On
        } else {
            Off
        }
    }

    #[must_use]
    pub fn is_on(&self, option: ShellOption) -> bool {
        self.get(option) == On
    }

    pub fn set(&mut self, option: ShellOption, state: State) {
        match state {
            On => {
                self.enabled.insert(option);
            }
            Off => {
                self.enabled.remove(option);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clobber_is_on_by_default_and_errexit_is_off() {
        let options = OptionSet::default();
        assert_eq!(options.get(Clobber), On);
        assert_eq!(options.get(ErrExit), Off);
    }

    #[test]
    fn set_and_unset_round_trip() {
        let mut options = OptionSet::default();
        options.set(ErrExit, On);
        assert_eq!(options.get(ErrExit), On);
        options.set(ErrExit, Off);
        assert_eq!(options.get(ErrExit), Off);
    }

    #[test]
    fn long_name_round_trips() {
        assert_eq!(ShellOption::from_long_name("pipefail"), Some(PipeFail));
        assert_eq!(ShellOption::from_long_name("bogus"), None);
    }
}
