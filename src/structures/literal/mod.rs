/*!
Literals: a predicate applied to terms, paired with a polarity (spec §3,
§4.B).

Grounded in `original_source/judged/__init__.py`'s `Literal` class; kept
as a plain struct rather than a trait plus canonical implementation,
since there is exactly one representation here and no alternate
encodings to abstract over.
*/

use crate::structures::{add_size, predicate::Predicate, term::Term, Env, TagEnv};

/// A predicate applied to a sequence of terms, with a polarity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    predicate: Predicate,
    terms: Vec<Term>,
    polarity: bool,
}

impl Literal {
    /// Builds a literal. Panics (a library-internal bug, not a user
    /// error) if `terms.len()` does not match the predicate's arity.
    pub fn new(predicate: Predicate, terms: Vec<Term>, polarity: bool) -> Self {
        assert_eq!(
            terms.len(),
            predicate.arity(),
            "literal arity mismatch: {} expects {} terms, got {}",
            predicate,
            predicate.arity(),
            terms.len()
        );
        Literal {
            predicate,
            terms,
            polarity,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn polarity(&self) -> bool {
        self.polarity
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// The length-prefixed structural id: polarity, predicate id, then
    /// each term's id in argument order, each length-prefixed so the
    /// concatenation is unambiguous.
    pub fn id(&self) -> String {
        let mut s = String::new();
        s.push_str(if self.polarity { "+" } else { "-" });
        s.push_str(&add_size(self.predicate.id()));
        for term in &self.terms {
            s.push_str(&add_size(term.id()));
        }
        s
    }

    /// A variable-renaming-invariant id: identical for any two literals
    /// that are equal up to consistent renaming of variables (alpha
    /// equivalence). Built the same way as [Literal::id] but substituting
    /// each variable's first-occurrence positional placeholder for its
    /// interned id.
    pub fn tag(&self) -> String {
        let mut env = TagEnv::new();
        let mut s = String::new();
        s.push_str(if self.polarity { "+" } else { "-" });
        s.push_str(&add_size(self.predicate.id()));
        for (i, term) in self.terms.iter().enumerate() {
            s.push_str(&add_size(&term.tag(i, &mut env)));
        }
        s
    }

    /// Applies a substitution to every term.
    pub fn subst(&self, env: &Env) -> Literal {
        if env.is_empty() {
            return self.clone();
        }
        Literal {
            predicate: self.predicate.clone(),
            terms: self.terms.iter().map(|t| t.subst(env)).collect(),
            polarity: self.polarity,
        }
    }

    /// Extends `env` with fresh bindings for every variable in this
    /// literal not already bound.
    pub fn shuffle_into(&self, env: &mut Env) {
        for term in &self.terms {
            term.shuffle(env);
        }
    }

    /// Builds a fresh renaming environment for this literal's variables.
    pub fn shuffle(&self) -> Env {
        let mut env = Env::new();
        self.shuffle_into(&mut env);
        env
    }

    /// Renames every variable in this literal to a fresh one, consistently.
    pub fn rename(&self) -> Literal {
        self.subst(&self.shuffle())
    }

    /// Attempts to unify `self` against `other`, chasing both arguments
    /// through `env` at every position and extending `env` on success.
    pub fn unify(&self, other: &Literal, env: Env) -> Option<Env> {
        if !std::sync::Arc::ptr_eq(&self.predicate, &other.predicate) {
            return None;
        }
        let mut env = env;
        for (a, b) in self.terms.iter().zip(other.terms.iter()) {
            let a = a.chase(&env);
            let b = b.chase(&env);
            if a == b {
                continue;
            }
            env = a.unify(&b, env)?;
        }
        Some(env)
    }

    /// The literal with polarity flipped.
    pub fn invert(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            terms: self.terms.clone(),
            polarity: !self.polarity,
        }
    }

    /// Whether every argument term is a ground constant.
    pub fn is_grounded(&self) -> bool {
        self.terms.iter().all(Term::is_const)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}", self.predicate.name())?;
        if !self.terms.is_empty() {
            write!(f, "(")?;
            for (i, term) in self.terms.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{term}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::predicate::predicate;
    use crate::structures::term::ConstantKind;

    fn lit(pred: &str, arity: usize, terms: Vec<Term>, polarity: bool) -> Literal {
        Literal::new(predicate(pred, arity), terms, polarity)
    }

    #[test]
    fn tag_is_invariant_under_variable_renaming() {
        let x = Term::fresh_variable();
        let y = Term::fresh_variable();
        let a = lit("parent", 2, vec![x.clone(), y.clone()], true);
        let b = lit("parent", 2, vec![y, x], true);
        assert_eq!(a.tag(), b.tag());
    }

    #[test]
    fn id_distinguishes_polarity() {
        let c = Term::constant("alice", ConstantKind::Symbol);
        let a = lit("p", 1, vec![c.clone()], true);
        let b = lit("p", 1, vec![c], false);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn unify_binds_a_variable_to_a_constant() {
        let x = Term::fresh_variable();
        let c = Term::constant("alice", ConstantKind::Symbol);
        let a = lit("p", 1, vec![x.clone()], true);
        let b = lit("p", 1, vec![c.clone()], true);
        let env = a.unify(&b, Env::new()).unwrap();
        assert_eq!(env.get(&x), Some(&c));
    }

    #[test]
    fn unify_fails_on_different_predicates() {
        let c = Term::constant("alice", ConstantKind::Symbol);
        let a = lit("p", 1, vec![c.clone()], true);
        let b = lit("q", 1, vec![c], true);
        assert!(a.unify(&b, Env::new()).is_none());
    }

    #[test]
    fn invert_flips_polarity_only() {
        let c = Term::constant("alice", ConstantKind::Symbol);
        let a = lit("p", 1, vec![c], true);
        assert!(!a.invert().polarity());
        assert_eq!(a.invert().terms(), a.terms());
    }

    #[test]
    fn is_grounded_requires_all_constants() {
        let c = Term::constant("alice", ConstantKind::Symbol);
        let x = Term::fresh_variable();
        assert!(lit("p", 1, vec![c.clone()], true).is_grounded());
        assert!(!lit("p", 1, vec![x], true).is_grounded());
    }
}
