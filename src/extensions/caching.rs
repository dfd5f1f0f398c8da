/*!
A caching wrapper for primitive predicates (spec §6's caching
interface), grounded in `original_source/judged/external.py`'s
`_caching_decorator`: look the literal's tag up in the per-query cache
before generating, store the result on a miss.

`original_source/judged/caching.py`'s three strategies (`NoCache`,
`DictCache`, `ReportingCache`) are not separately modelled here: which
cache backend is active is a property of the `ProverHandle` passed in
(spec §6 — `Cache` errors when none is configured), not of the
primitive itself, so a single [Cached] wrapper covers all three by
simply deferring to whatever cache the caller wired up. `external.py`'s
`eager_loading`/`conservative_loading`/`custom_strategy` helpers concern
*when* an external data source is loaded relative to caching, which has
no counterpart without an external connector in this crate; see
DESIGN.md.
*/

use crate::db::primitives::{Primitive, ProverHandle};
use crate::structures::{Clause, Literal};
use crate::types::JudgedError;

/// Wraps a [Primitive] so its results are cached per query, keyed by
/// the queried literal's alpha-invariant tag.
pub struct Cached<P> {
    inner: P,
}

impl<P: Primitive> Cached<P> {
    pub fn new(inner: P) -> Self {
        Cached { inner }
    }
}

impl<P: Primitive> Primitive for Cached<P> {
    fn generate(&self, literal: &Literal, prover: &dyn ProverHandle) -> Result<Vec<Clause>, JudgedError> {
        let key = literal.tag();
        if let Some(hit) = prover.cache_get(&key)? {
            return Ok(hit);
        }
        let value = self.inner.generate(literal, prover)?;
        prover.cache_set(key, value.clone())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Knowledge;
    use crate::structures::predicate::predicate;
    use crate::structures::term::{ConstantKind, Term};
    use crate::sentence::Sentence;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    struct CountingPrimitive {
        calls: Cell<usize>,
    }

    impl Primitive for CountingPrimitive {
        fn generate(&self, literal: &Literal, _prover: &dyn ProverHandle) -> Result<Vec<Clause>, JudgedError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![Clause::new(literal.clone(), vec![], Sentence::Top)])
        }
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
    fn a_second_call_with_the_same_tag_hits_the_cache() {
        let inner = CountingPrimitive { calls: Cell::new(0) };
        let cached = Cached::new(inner);
        let handle = DictCacheHandle(Knowledge::new(), RefCell::new(HashMap::new()));
        let literal = Literal::new(predicate("p", 1), vec![Term::constant("a", ConstantKind::Symbol)], true);

        cached.generate(&literal, &handle).unwrap();
        cached.generate(&literal, &handle).unwrap();

        assert_eq!(cached.inner.calls.get(), 1);
    }
}
