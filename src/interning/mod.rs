/*!
Structural hash-consing.

Terms, predicates, labels, and BDD nodes are all created on demand and must
compare and hash by identity rather than by structure once interned (spec
§3, §4.A). [Interner] is the single generic table behind each of these: a
weak-value map keyed by a structural key, handing out [Handle]s that
implement `Eq`/`Hash` by pointer rather than by derived structural
equality.

Weak retention means an entry is reclaimed once nothing outside the
interner still holds its handle, matching the "weakly held" option noted
in spec §4.A. Contexts own their own interners (one per kind) so BDD
variable numbering and term identity never leak between independent
contexts (spec §9).
*/

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak};

/// A pointer-identity handle to an interned value.
///
/// Two handles compare equal iff they were produced by the same
/// [Interner::intern] call graph for equal keys, i.e. iff they point at
/// the same allocation.
pub type Handle<V> = Arc<V>;

/// A hash-consing table mapping structural keys to shared, identity-equal
/// handles.
pub struct Interner<K, V> {
    table: Mutex<HashMap<K, Weak<V>>>,
}

impl<K, V> Default for Interner<K, V> {
    fn default() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Interner<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a fresh, empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical handle for `key`, building `value` (via
    /// `make`) only on first use.
    ///
    /// `make` is given the key by value since most constructors consume
    /// it directly (e.g. to build the stored struct).
    pub fn intern(&self, key: K, make: impl FnOnce(K) -> V) -> Handle<V> {
        let mut table = self.table.lock().expect("interner lock poisoned");

        if let Some(existing) = table.get(&key).and_then(Weak::upgrade) {
            return existing;
        }

        let value = Arc::new(make(key.clone()));
        table.insert(key, Arc::downgrade(&value));
        value
    }

    /// The number of live entries. Intended for diagnostics/tests only:
    /// entries may be reclaimed between this call and any subsequent use.
    pub fn live_count(&self) -> usize {
        let table = self.table.lock().expect("interner lock poisoned");
        table.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_yield_identical_handles() {
        let interner: Interner<String, String> = Interner::new();
        let a = interner.intern("foo".to_string(), |k| k);
        let b = interner.intern("foo".to_string(), |k| k);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_keys_yield_distinct_handles() {
        let interner: Interner<String, String> = Interner::new();
        let a = interner.intern("foo".to_string(), |k| k);
        let b = interner.intern("bar".to_string(), |k| k);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn reclaims_unreferenced_entries() {
        let interner: Interner<String, String> = Interner::new();
        {
            let _a = interner.intern("foo".to_string(), |k| k);
            assert_eq!(interner.live_count(), 1);
        }
        assert_eq!(interner.live_count(), 0);
    }
}
