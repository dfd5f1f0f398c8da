/*!
The atoms of the logic: terms, predicates, literals, clauses, and labels
(spec §3, §4.B).

Every interned structure here (terms, predicates, label fragments,
labels) follows the same shape: an `...Inner` struct holding the actual
data, compared and hashed by pointer identity via [identity_by_pointer],
wrapped in an [crate::interning::Handle] so that cloning is cheap and
equality is `O(1)`.
*/

pub mod clause;
pub mod label;
pub mod literal;
pub mod predicate;
pub mod term;

pub use clause::Clause;
pub use label::{Label, LabelFragment};
pub use literal::Literal;
pub use predicate::Predicate;
pub use term::Term;

use std::collections::HashMap;

/// A substitution environment: bindings from (interned) variable [Term]s
/// to their replacement [Term].
pub type Env = HashMap<Term, Term>;

/// Per-literal mapping from a (first-seen) variable to its positional tag
/// placeholder, used while computing [Literal::tag].
pub type TagEnv = HashMap<Term, String>;

/// Implements `PartialEq`/`Eq`/`Hash` for an interned `...Inner` struct by
/// the address of `self`, so that `Arc<Inner>` (aliased as
/// [crate::interning::Handle]) gets identity-based equality/hashing for
/// free via its blanket forwarding impls.
///
/// Mirrors the `Interned` mixin of the original implementation, which
/// gives every internalized class `__eq__`/`__hash__` based on `id(self)`.
macro_rules! identity_by_pointer {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::eq(self, other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                (self as *const Self as usize).hash(state)
            }
        }
    };
}

pub(crate) use identity_by_pointer;

/// Prepends the byte length of `s` to `s`: the length-prefixing scheme
/// used throughout `id`/`tag` construction so concatenated components can
/// never be ambiguously re-split (spec §4.B).
pub fn add_size(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}
