//! Attribute-tagged characters threaded through the expansion pipeline
//! (`spec.md` §4.3), grounded on the teacher's `AttrChar`/`Expansion`
//! architecture (`yash-semantics/src/expansion.rs`) but synchronous and
//! collapsed to the three origins this pipeline actually distinguishes.
//!
//! Every character produced by any expansion step carries whether it was
//! quoted in the source (quote removal strips the quote marks but splitting
//! and globbing must still respect what they guarded) and where it came
//! from: plain source text, a "hard" expansion (tilde/brace, never
//! re-split but still subject to globbing), or a "soft" expansion
//! (parameter/command/arithmetic substitution, split like plain text when
//! unquoted).

/// Where a character came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    Literal,
    HardExpansion,
    SoftExpansion,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrChar {
    pub value: char,
    pub origin: Origin,
    pub is_quoted: bool,
}

/// One field's worth of expansion output, still carrying attribution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttrField(pub Vec<AttrChar>);

impl AttrField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote removal: drop the attribution, keep the characters.
    #[must_use]
    pub fn to_quote_removed_string(&self) -> String {
        self.0.iter().map(|c| c.value).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sink for expansion output. A word's expansion targets one [`AttrField`]
/// until [`crate::expansion::split`] fans it out into several.
pub trait Expansion {
    fn push_char(&mut self, c: AttrChar);

    fn push_str(&mut self, s: &str, origin: Origin, is_quoted: bool) {
        for value in s.chars() {
            self.push_char(AttrChar {
                value,
                origin,
                is_quoted,
            });
        }
    }

    /// Marks a hard field boundary that must survive even though nothing
    /// requires splitting — used only for the quoted `"$@"`/`"${a[@]}"`
    /// element-per-field rule. A single-field sink ignores this.
    fn start_new_field(&mut self) {}
}

impl Expansion for AttrField {
    fn push_char(&mut self, c: AttrChar) {
        self.0.push(c);
    }
}

/// Multi-field accumulation, used for `"$@"` and `"${a[@]}"`: each element
/// becomes its own field, never re-split or re-globbed (`spec.md` §4.3
/// "Array-typed expansions").
impl Expansion for Vec<AttrField> {
    fn push_char(&mut self, c: AttrChar) {
        if self.is_empty() {
            self.push(AttrField::new());
        }
        self.last_mut().expect("just ensured non-empty").push_char(c);
    }

    fn start_new_field(&mut self) {
        self.push(AttrField::new());
    }
}
