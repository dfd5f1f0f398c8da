/*!
Labels: the atoms of a descriptive sentence, each naming one choice
within one partitioning of possible worlds (spec §3, §4.C/§4.D).

Grounded in `original_source/judged/worlds.py`'s `Label`, `LabelFragment`,
`LabelConstant`, and `LabelFunction` classes.
*/

use crate::interning::{Handle, Interner};
use std::sync::{Arc, OnceLock};

use super::term::Term;
use super::{add_size, identity_by_pointer};

/// One side of a [Label]: either a bare symbolic constant, or a ground
/// function symbol applied to terms (so that a rule can parameterise its
/// label by the variables it binds, e.g. `roll(Face)`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum LabelFragmentKind {
    Constant(Term),
    Function(String, Vec<Term>),
}

/// The interned body of a label fragment.
pub struct LabelFragmentInner {
    kind: LabelFragmentKind,
}

identity_by_pointer!(LabelFragmentInner);

impl LabelFragmentInner {
    pub fn kind(&self) -> &LabelFragmentKind {
        &self.kind
    }

    pub fn is_grounded(&self) -> bool {
        match &self.kind {
            LabelFragmentKind::Constant(t) => t.is_const(),
            LabelFragmentKind::Function(_, terms) => terms.iter().all(Term::is_const),
        }
    }

    /// The length-prefixed structural id.
    pub fn tag(&self) -> String {
        match &self.kind {
            LabelFragmentKind::Constant(t) => add_size(t.id()),
            LabelFragmentKind::Function(name, terms) => {
                let mut s = add_size(name);
                for t in terms {
                    s.push_str(&add_size(t.id()));
                }
                s
            }
        }
    }
}

impl std::fmt::Display for LabelFragmentInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LabelFragmentKind::Constant(t) => write!(f, "{t}"),
            LabelFragmentKind::Function(name, terms) => {
                write!(f, "{name}(")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A handle to an interned label fragment.
pub type LabelFragment = Handle<LabelFragmentInner>;

fn fragment_interner() -> &'static Interner<LabelFragmentKind, LabelFragmentInner> {
    static INTERNER: OnceLock<Interner<LabelFragmentKind, LabelFragmentInner>> = OnceLock::new();
    INTERNER.get_or_init(Interner::new)
}

/// Interns a constant label fragment.
pub fn label_constant(term: Term) -> LabelFragment {
    let key = LabelFragmentKind::Constant(term);
    fragment_interner().intern(key, |kind| LabelFragmentInner { kind })
}

/// Interns a function-shaped label fragment.
pub fn label_function(name: impl Into<String>, terms: Vec<Term>) -> LabelFragment {
    let key = LabelFragmentKind::Function(name.into(), terms);
    fragment_interner().intern(key, |kind| LabelFragmentInner { kind })
}

/// Applies a substitution to a label fragment's terms, re-interning the
/// result.
pub fn subst_fragment(fragment: &LabelFragment, env: &super::Env) -> LabelFragment {
    match &fragment.kind {
        LabelFragmentKind::Constant(t) => label_constant(t.subst(env)),
        LabelFragmentKind::Function(name, terms) => {
            label_function(name.clone(), terms.iter().map(|t| t.subst(env)).collect())
        }
    }
}

/// The interned body of a label: `partitioning = part`, e.g. `weather =
/// rainy` or `roll(Face) = six`.
pub struct LabelInner {
    partitioning: LabelFragment,
    part: LabelFragment,
}

identity_by_pointer!(LabelInner);

impl LabelInner {
    pub fn partitioning(&self) -> &LabelFragment {
        &self.partitioning
    }

    pub fn part(&self) -> &LabelFragment {
        &self.part
    }

    pub fn is_grounded(&self) -> bool {
        self.partitioning.is_grounded() && self.part.is_grounded()
    }

    /// The BDD variable name for this label: `partitioning_tag '_'
    /// part_tag`, matching `label_bdd_var` in the original so the same
    /// label always resolves to the same BDD variable.
    pub fn tag(&self) -> String {
        format!("{}_{}", self.partitioning.tag(), self.part.tag())
    }
}

impl std::fmt::Display for LabelInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.partitioning, self.part)
    }
}

/// A handle to an interned label.
pub type Label = Handle<LabelInner>;

fn label_interner() -> &'static Interner<(LabelFragment, LabelFragment), LabelInner> {
    static INTERNER: OnceLock<Interner<(LabelFragment, LabelFragment), LabelInner>> =
        OnceLock::new();
    INTERNER.get_or_init(Interner::new)
}

/// Interns a label pairing a partitioning fragment with a part fragment.
pub fn label(partitioning: LabelFragment, part: LabelFragment) -> Label {
    let key = (partitioning, part);
    label_interner().intern(key, |(partitioning, part)| LabelInner { partitioning, part })
}

/// Applies a substitution to both sides of a label, re-interning the
/// result.
pub fn subst_label(l: &Label, env: &super::Env) -> Label {
    label(subst_fragment(&l.partitioning, env), subst_fragment(&l.part, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::ConstantKind;

    #[test]
    fn equal_fragments_intern_identically() {
        let a = label_constant(Term::constant("rainy", ConstantKind::Symbol));
        let b = label_constant(Term::constant("rainy", ConstantKind::Symbol));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn equal_labels_intern_identically() {
        let w = label_constant(Term::constant("weather", ConstantKind::Symbol));
        let r = label_constant(Term::constant("rainy", ConstantKind::Symbol));
        let a = label(w.clone(), r.clone());
        let b = label(w, r);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn function_fragment_requires_ground_terms_to_be_grounded() {
        let f = label_function("roll", vec![Term::fresh_variable()]);
        assert!(!f.is_grounded());
    }
}
