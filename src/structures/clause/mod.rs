/*!
Clauses: a head literal, a (possibly empty) body, delayed literals set
aside during SLG resolution, and a descriptive sentence (spec §3, §4.B).

Grounded in `original_source/judged/__init__.py`'s `Clause` class.
*/

use crate::sentence::Sentence;
use crate::structures::{add_size, literal::Literal, Env};

/// A rule (or fact, when `body` and `delayed` are both empty): `head :-
/// body` annotated with a descriptive `sentence`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    head: Literal,
    body: Vec<Literal>,
    delayed: Vec<Literal>,
    sentence: Sentence,
}

impl Clause {
    pub fn new(head: Literal, body: Vec<Literal>, sentence: Sentence) -> Self {
        Clause {
            head,
            body,
            delayed: Vec::new(),
            sentence,
        }
    }

    pub fn with_delayed(
        head: Literal,
        body: Vec<Literal>,
        delayed: Vec<Literal>,
        sentence: Sentence,
    ) -> Self {
        Clause {
            head,
            body,
            delayed,
            sentence,
        }
    }

    pub fn head(&self) -> &Literal {
        &self.head
    }

    pub fn body(&self) -> &[Literal] {
        &self.body
    }

    pub fn delayed(&self) -> &[Literal] {
        &self.delayed
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// Whether the clause has no remaining body literals (an answer, in
    /// SLG terms).
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// Every literal other than the head, in resolution order (body
    /// first, then delayed), mirroring the original's `Clause.__iter__`.
    pub fn rest(&self) -> impl Iterator<Item = &Literal> {
        self.body.iter().chain(self.delayed.iter())
    }

    /// The length-prefixed structural id: head, then each body literal,
    /// a `|` separator, then each delayed literal, then a `%` separator
    /// and the sentence's rendering — all length-prefixed.
    pub fn id(&self) -> String {
        let mut s = add_size(&self.head.id());
        for lit in &self.body {
            s.push_str(&add_size(&lit.id()));
        }
        s.push('|');
        for lit in &self.delayed {
            s.push_str(&add_size(&lit.id()));
        }
        s.push('%');
        s.push_str(&add_size(&self.sentence.to_string()));
        s
    }

    /// Applies a substitution to the head, body, and delayed literals.
    ///
    /// The sentence is deliberately left untouched: this mirrors the
    /// original `Clause.subst`, under which a clause's descriptive
    /// sentence is never itself substituted through (sentence labels are
    /// expected to already be ground, or to share variables that get
    /// resolved independently through the head/body).
    pub fn subst(&self, env: &Env) -> Clause {
        if env.is_empty() {
            return self.clone();
        }
        Clause {
            head: self.head.subst(env),
            body: self.body.iter().map(|l| l.subst(env)).collect(),
            delayed: self.delayed.iter().map(|l| l.subst(env)).collect(),
            sentence: self.sentence.clone(),
        }
    }

    /// Builds a fresh renaming environment covering every variable in the
    /// body and delayed literals (not the head: the head's variables
    /// always also occur in the body, per the safety invariant).
    pub fn shuffle(&self) -> Env {
        let mut env = Env::new();
        for lit in self.rest() {
            lit.shuffle_into(&mut env);
        }
        env
    }

    /// Renames every variable in the clause to a fresh one, consistently.
    pub fn rename(&self) -> Clause {
        self.subst(&self.shuffle())
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (i, lit) in self.body.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{lit}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::predicate::predicate;
    use crate::structures::term::{ConstantKind, Term};

    #[test]
    fn rename_produces_fresh_variables_consistently_across_body() {
        let x = Term::fresh_variable();
        let y = Term::fresh_variable();
        let head = Literal::new(predicate("ancestor", 2), vec![x.clone(), y.clone()], true);
        let body = vec![Literal::new(predicate("parent", 2), vec![x, y], true)];
        let clause = Clause::new(head, body, Sentence::Top);
        let renamed = clause.rename();
        assert_eq!(renamed.head().terms()[0], renamed.body()[0].terms()[0]);
        assert_ne!(renamed.head().terms()[0], clause.head().terms()[0]);
    }

    #[test]
    fn facts_have_no_body() {
        let c = Term::constant("alice", ConstantKind::Symbol);
        let clause = Clause::new(
            Literal::new(predicate("person", 1), vec![c], true),
            vec![],
            Sentence::Top,
        );
        assert!(clause.is_fact());
    }
}
