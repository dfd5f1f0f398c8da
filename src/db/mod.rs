/*!
The knowledge base: the set of asserted clauses and registered primitive
predicates a [crate::procedures::prover::Prover] queries against (spec
§3, §4.E).

Grounded in `original_source/judged/logic.py`'s `Knowledge` class.
*/

pub mod primitives;

use std::collections::HashMap;

use crate::sentence::Sentence;
use crate::structures::label::LabelFragment;
use crate::structures::{Clause, Literal, Predicate};
use crate::types::JudgedError;

use primitives::ProverHandle;

/// The knowledge base: asserted clauses indexed by head predicate, split
/// into ground facts and bodied rules (spec §3), plus registered
/// primitive predicates.
///
/// Clauses are indexed by predicate and, within each bucket, by
/// structural id, since clauses here are identified structurally rather
/// than by an insertion-order key.
pub struct Knowledge {
    facts: HashMap<Predicate, HashMap<String, Clause>>,
    rules: HashMap<Predicate, HashMap<String, Clause>>,
    primitives: HashMap<Predicate, Vec<Box<dyn primitives::Primitive>>>,
}

impl Default for Knowledge {
    fn default() -> Self {
        let mut kb = Knowledge {
            facts: HashMap::new(),
            rules: HashMap::new(),
            primitives: HashMap::new(),
        };
        primitives::register_primitives(&mut kb);
        kb
    }
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clause is safe when every variable in its head also occurs in
    /// its body or delayed literals, and every variable in a negative
    /// body literal also occurs in some positive body literal (spec §3).
    pub fn is_safe(&self, clause: &Clause) -> bool {
        use crate::structures::Term;
        use std::collections::HashSet;

        let head_vars: HashSet<&Term> = clause
            .head()
            .terms()
            .iter()
            .filter(|t| !t.is_const())
            .collect();
        let body_vars: HashSet<&Term> = clause
            .rest()
            .flat_map(Literal::terms)
            .filter(|t| !t.is_const())
            .collect();
        let head_covered = head_vars.is_subset(&body_vars);

        let pos_vars: HashSet<&Term> = clause
            .rest()
            .filter(|l| l.polarity())
            .flat_map(Literal::terms)
            .filter(|t| !t.is_const())
            .collect();
        let neg_vars: HashSet<&Term> = clause
            .rest()
            .filter(|l| !l.polarity())
            .flat_map(Literal::terms)
            .filter(|t| !t.is_const())
            .collect();
        let neg_covered = neg_vars.is_subset(&pos_vars);

        head_covered && neg_covered
    }

    /// Whether `clause` would be stored as a *fact* (spec §3): head-ground
    /// with empty body and delayed literals.
    fn is_fact_shaped(clause: &Clause) -> bool {
        clause.body().is_empty() && clause.delayed().is_empty() && clause.head().is_grounded()
    }

    /// Asserts a clause, rejecting it with [JudgedError::Safety] if
    /// unsafe. Stored in `facts` when head-ground with an empty body,
    /// otherwise in `rules`.
    pub fn assert_clause(&mut self, clause: Clause) -> Result<Clause, JudgedError> {
        if !self.is_safe(&clause) {
            return Err(JudgedError::Safety(clause.to_string()));
        }
        log::trace!(target: "judged::db", "asserting {clause}");
        let bucket = if Self::is_fact_shaped(&clause) {
            self.facts.entry(clause.head().predicate().clone()).or_default()
        } else {
            self.rules.entry(clause.head().predicate().clone()).or_default()
        };
        bucket.insert(clause.id(), clause.clone());
        Ok(clause)
    }

    /// Retracts a clause by structural id from whichever of `facts`/
    /// `rules` it would belong to. A no-op if it was never asserted.
    pub fn retract_clause(&mut self, clause: Clause) -> Clause {
        log::trace!(target: "judged::db", "retracting {clause}");
        let pred = clause.head().predicate().clone();
        let map = if Self::is_fact_shaped(&clause) {
            &mut self.facts
        } else {
            &mut self.rules
        };
        let mut drop_bucket = false;
        if let Some(bucket) = map.get_mut(&pred) {
            bucket.remove(&clause.id());
            drop_bucket = bucket.is_empty();
        }
        if drop_bucket {
            map.remove(&pred);
        }
        clause
    }

    /// Registers a primitive predicate implementation. A predicate may
    /// have more than one primitive registered against it (e.g. two
    /// extensions both contributing generators for the same name); their
    /// outputs are fused at query time rather than one overwriting the
    /// other (spec §4.E).
    pub fn add_primitive(&mut self, predicate: Predicate, generator: Box<dyn primitives::Primitive>) {
        self.primitives.entry(predicate).or_default().push(generator);
    }

    /// All clauses whose head matches `literal`'s predicate: every
    /// registered primitive's output concatenated, then asserted rules,
    /// then asserted facts, mirroring `Knowledge.clauses`. `prover` gives
    /// primitives access to the knowledge base and the per-query cache
    /// (spec §6).
    pub fn clauses(
        &self,
        literal: &Literal,
        prover: &dyn ProverHandle,
    ) -> Result<Vec<Clause>, JudgedError> {
        let mut out = Vec::new();
        if let Some(primitives) = self.primitives.get(literal.predicate()) {
            for primitive in primitives {
                out.extend(primitive.generate(literal, prover)?);
            }
        }
        if let Some(bucket) = self.rules.get(literal.predicate()) {
            out.extend(bucket.values().cloned());
        }
        if let Some(bucket) = self.facts.get(literal.predicate()) {
            out.extend(bucket.values().cloned());
        }
        Ok(out)
    }

    /// Every asserted fact and rule, in no particular order (the `.kb`
    /// REPL command, `original_source/judged/__main__.py`'s `ic_kb`).
    /// Primitive predicates are not included: they have no clause body to
    /// show.
    pub fn asserted_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.facts
            .values()
            .chain(self.rules.values())
            .flat_map(|bucket| bucket.values())
    }

    /// The distinct parts known to be possible under `partitioning`,
    /// gathered from every asserted clause's sentence. Used exclusively
    /// by [crate::sentence::exclusion_matrix] and for a Monte Carlo
    /// context's uniform-distribution fallback.
    pub fn parts(&self, partitioning: &LabelFragment) -> Vec<LabelFragment> {
        let mut seen: Vec<LabelFragment> = Vec::new();
        let buckets = self.facts.values().chain(self.rules.values());
        for bucket in buckets {
            for clause in bucket.values() {
                for label in clause.sentence().labels() {
                    if std::sync::Arc::ptr_eq(label.partitioning(), partitioning)
                        && !seen.iter().any(|p| std::sync::Arc::ptr_eq(p, label.part()))
                    {
                        seen.push(label.part().clone());
                    }
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::predicate::predicate;
    use crate::structures::term::{ConstantKind, Term};

    struct NoHandle<'a>(&'a Knowledge);
    impl<'a> ProverHandle for NoHandle<'a> {
        fn kb(&self) -> &Knowledge {
            self.0
        }
        fn cache_get(&self, _key: &str) -> Result<Option<Vec<Clause>>, JudgedError> {
            Ok(None)
        }
        fn cache_set(&self, _key: String, _value: Vec<Clause>) -> Result<(), JudgedError> {
            Ok(())
        }
        fn cache_clear(&self) {}
    }

    fn fact(name: &str, arity: usize, terms: Vec<Term>) -> Clause {
        Clause::new(
            Literal::new(predicate(name, arity), terms, true),
            vec![],
            Sentence::Top,
        )
    }

    #[test]
    fn unsafe_clause_is_rejected() {
        let mut kb = Knowledge::new();
        let x = Term::fresh_variable();
        let head = Literal::new(predicate("p", 1), vec![x], true);
        let clause = Clause::new(head, vec![], Sentence::Top);
        assert!(kb.assert_clause(clause).is_err());
    }

    #[test]
    fn asserted_fact_is_retrievable() {
        let mut kb = Knowledge::new();
        let c = Term::constant("alice", ConstantKind::Symbol);
        let clause = fact("person", 1, vec![c]);
        kb.assert_clause(clause.clone()).unwrap();

        let query = Literal::new(predicate("person", 1), vec![Term::fresh_variable()], true);
        let handle = NoHandle(&kb);
        assert_eq!(kb.clauses(&query, &handle).unwrap().len(), 1);
    }

    #[test]
    fn retract_removes_the_fact() {
        let mut kb = Knowledge::new();
        let c = Term::constant("alice", ConstantKind::Symbol);
        let clause = fact("person", 1, vec![c]);
        kb.assert_clause(clause.clone()).unwrap();
        kb.retract_clause(clause);

        let query = Literal::new(predicate("person", 1), vec![Term::fresh_variable()], true);
        let handle = NoHandle(&kb);
        assert!(kb.clauses(&query, &handle).unwrap().is_empty());
    }

    #[test]
    fn rule_with_a_body_is_stored_separately_from_facts() {
        let mut kb = Knowledge::new();
        let x = Term::fresh_variable();
        let head = Literal::new(predicate("ancestor", 1), vec![x.clone()], true);
        let body = vec![Literal::new(predicate("parent", 1), vec![x], true)];
        let rule = Clause::new(head, body, Sentence::Top);
        kb.assert_clause(rule).unwrap();
        assert!(kb.facts.get(&predicate("ancestor", 1)).is_none());
        assert!(kb.rules.get(&predicate("ancestor", 1)).is_some());
    }
}
