/*!
Primitive (native) predicates: predicates answered by Rust code instead
of asserted clauses (spec §4.E, §6).

Grounded in `original_source/judged/primitives.py` (the built-in `=/2`
predicate) and `original_source/judged/external.py` (the closure-based
SQL-binding primitives, and its `_caching_decorator`, which motivate
modelling a primitive as a trait object consulted through a
[ProverHandle] rather than a bare function pointer, so a primitive can
close over its own state and reach the per-query cache and knowledge
base).
*/

use crate::sentence::Sentence;
use crate::structures::predicate::predicate;
use crate::structures::{Clause, Env, Literal};
use crate::types::JudgedError;

use super::Knowledge;

/// The view of a prover a [Primitive] is allowed: the knowledge base it
/// is answering against, and the per-query cache interface (spec §6's
/// "caching interface exposed to primitives").
///
/// A trait rather than a concrete type because `db` cannot depend on
/// `procedures` (the prover) without a cycle; `procedures::Prover`
/// implements this.
pub trait ProverHandle {
    fn kb(&self) -> &Knowledge;

    /// Fetches a cached clause list for `key`, the literal's tag.
    /// `Err(JudgedError::Cache(..))` if no cache is configured.
    fn cache_get(&self, key: &str) -> Result<Option<Vec<Clause>>, JudgedError>;

    /// Stores a clause list for `key`. `Err(JudgedError::Cache(..))` if no
    /// cache is configured.
    fn cache_set(&self, key: String, value: Vec<Clause>) -> Result<(), JudgedError>;

    /// Clears the cache. A no-op (never an error) if none is configured,
    /// mirroring `caching.NoCache.clear`.
    fn cache_clear(&self);
}

/// A native predicate: given the literal it was asked to answer, and a
/// handle onto the knowledge base/cache, yields the (fact-shaped)
/// clauses it holds for.
///
/// Implementations may hold their own state (a connection, a closed-over
/// table) behind `&self`, matching the way the original's generator-
/// producing closures captured state such as a SQL connection.
pub trait Primitive: Send + Sync {
    fn generate(&self, literal: &Literal, prover: &dyn ProverHandle) -> Result<Vec<Clause>, JudgedError>;
}

/// The built-in structural-equality predicate `=/2`: attempts to unify
/// its two arguments and, if that succeeds in making them equal, yields
/// the resulting ground fact.
pub struct Equals;

impl Primitive for Equals {
    fn generate(&self, literal: &Literal, _prover: &dyn ProverHandle) -> Result<Vec<Clause>, JudgedError> {
        let terms = literal.terms();
        let (mut a, mut b) = (terms[0].clone(), terms[1].clone());
        if let Some(env) = a.unify(&b, Env::new()) {
            a = a.subst(&env);
            b = b.subst(&env);
        }
        if a != b {
            return Ok(vec![]);
        }
        let fact = Literal::new(predicate("=", 2), vec![a, b], true);
        Ok(vec![Clause::new(fact, vec![], Sentence::Top)])
    }
}

/// Registers every built-in primitive predicate on a fresh [crate::db::Knowledge].
pub fn register_primitives(kb: &mut crate::db::Knowledge) {
    kb.add_primitive(predicate("=", 2), Box::new(Equals));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::{ConstantKind, Term};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct NoCacheHandle(Knowledge);

    impl ProverHandle for NoCacheHandle {
        fn kb(&self) -> &Knowledge {
            &self.0
        }
        fn cache_get(&self, _key: &str) -> Result<Option<Vec<Clause>>, JudgedError> {
            Err(JudgedError::Cache("no cache configured".into()))
        }
        fn cache_set(&self, _key: String, _value: Vec<Clause>) -> Result<(), JudgedError> {
            Err(JudgedError::Cache("no cache configured".into()))
        }
        fn cache_clear(&self) {}
    }

    struct DictCacheHandle(Knowledge, RefCell<HashMap<String, Vec<Clause>>>);

    impl ProverHandle for DictCacheHandle {
        fn kb(&self) -> &Knowledge {
            &self.0
        }
        fn cache_get(&self, key: &str) -> Result<Option<Vec<Clause>>, JudgedError> {
            Ok(self.1.borrow().get(key).cloned())
        }
        fn cache_set(&self, key: String, value: Vec<Clause>) -> Result<(), JudgedError> {
            self.1.borrow_mut().insert(key, value);
            Ok(())
        }
        fn cache_clear(&self) {
            self.1.borrow_mut().clear();
        }
    }

    #[test]
    fn equals_unifies_a_variable_against_a_constant() {
        let eq = Equals;
        let handle = NoCacheHandle(Knowledge::new());
        let c = Term::constant("a", ConstantKind::Symbol);
        let query = Literal::new(predicate("=", 2), vec![c.clone(), Term::fresh_variable()], true);
        let clauses = eq.generate(&query, &handle).unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].head().terms()[0], clauses[0].head().terms()[1]);
    }

    #[test]
    fn equals_rejects_distinct_constants() {
        let eq = Equals;
        let handle = NoCacheHandle(Knowledge::new());
        let a = Term::constant("a", ConstantKind::Symbol);
        let b = Term::constant("b", ConstantKind::Symbol);
        let query = Literal::new(predicate("=", 2), vec![a, b], true);
        assert!(eq.generate(&query, &handle).unwrap().is_empty());
    }

    #[test]
    fn dict_cache_handle_round_trips_a_value() {
        let handle = DictCacheHandle(Knowledge::new(), RefCell::new(HashMap::new()));
        assert!(handle.cache_get("k").unwrap().is_none());
        handle.cache_set("k".into(), vec![]).unwrap();
        assert_eq!(handle.cache_get("k").unwrap(), Some(vec![]));
    }
}
