/*!
A reduced ordered binary decision diagram over label variables (spec
§4.C).

Grounded line-for-line in `original_source/datalog/bdd.py`: the `_ite`
shortcut cases, the `_node`/`_restrict` recursion, and the `ZERO`/`ONE`
sinks all mirror that module. Nodes are interned (hash-consed) per
engine instance so that structurally equal sub-diagrams are always the
same allocation, giving `O(1)` equality between diagrams built from the
same engine — the property `equivalent`/`falsehood` in [crate::sentence]
rely on.
*/

use crate::interning::{Handle, Interner};
use std::collections::HashMap;
use std::sync::Arc;

/// A BDD variable index. Assigned in first-seen order by [BddEngine::var].
pub type Var = u32;

/// The body of an interned BDD node: either a sink, or a decision on
/// `var` between a `high` (var = true) and `low` (var = false) branch.
pub enum NodeInner {
    Zero,
    One,
    Branch {
        var: Var,
        high: Node,
        low: Node,
    },
}

impl PartialEq for NodeInner {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
impl Eq for NodeInner {}
impl std::hash::Hash for NodeInner {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self as *const Self as usize).hash(state)
    }
}

/// A handle to an interned BDD node.
pub type Node = Handle<NodeInner>;

#[derive(Clone, PartialEq, Eq, Hash)]
enum NodeKey {
    Zero,
    One,
    Branch(Var, Node, Node),
}

/// An ordered BDD engine: owns the node table and the label-variable
/// index assignment for one context (spec §9's "interner lifetime"
/// decision — never shared between contexts).
pub struct BddEngine {
    nodes: Interner<NodeKey, NodeInner>,
    zero: Node,
    one: Node,
    vars: std::sync::Mutex<HashMap<String, Var>>,
    var_names: std::sync::Mutex<Vec<String>>,
}

impl Default for BddEngine {
    fn default() -> Self {
        let nodes = Interner::new();
        let zero = nodes.intern(NodeKey::Zero, |_| NodeInner::Zero);
        let one = nodes.intern(NodeKey::One, |_| NodeInner::One);
        BddEngine {
            nodes,
            zero,
            one,
            vars: std::sync::Mutex::new(HashMap::new()),
            var_names: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl BddEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero(&self) -> Node {
        self.zero.clone()
    }

    pub fn one(&self) -> Node {
        self.one.clone()
    }

    pub fn is_zero(&self, n: &Node) -> bool {
        Arc::ptr_eq(n, &self.zero)
    }

    pub fn is_one(&self, n: &Node) -> bool {
        Arc::ptr_eq(n, &self.one)
    }

    /// Returns the stable variable index for `label_tag`, assigning the
    /// next free index on first use. Mirrors `datalog.bdd.variable`'s
    /// module-level `variables`/`variables_rev` maps, but scoped to this
    /// engine instead of process-wide.
    pub fn var(&self, label_tag: &str) -> Var {
        let mut vars = self.vars.lock().expect("bdd var table poisoned");
        if let Some(&v) = vars.get(label_tag) {
            return v;
        }
        let mut names = self.var_names.lock().expect("bdd var name table poisoned");
        let v = names.len() as Var;
        names.push(label_tag.to_string());
        vars.insert(label_tag.to_string(), v);
        v
    }

    pub fn var_name(&self, var: Var) -> String {
        self.var_names.lock().expect("bdd var name table poisoned")[var as usize].clone()
    }

    fn node(&self, var: Var, high: Node, low: Node) -> Node {
        if Arc::ptr_eq(&high, &low) {
            return high;
        }
        let key = NodeKey::Branch(var, high, low);
        self.nodes.intern(key, |key| match key {
            NodeKey::Branch(var, high, low) => NodeInner::Branch { var, high, low },
            _ => unreachable!(),
        })
    }

    /// A single-variable diagram: true when `label_tag` holds.
    pub fn variable(&self, label_tag: &str) -> Node {
        let var = self.var(label_tag);
        self.node(var, self.one(), self.zero())
    }

    /// Logical negation.
    pub fn neg(&self, n: &Node) -> Node {
        match n.as_ref() {
            NodeInner::Zero => self.one(),
            NodeInner::One => self.zero(),
            NodeInner::Branch { var, high, low } => {
                let high = self.neg(high);
                let low = self.neg(low);
                self.node(*var, high, low)
            }
        }
    }

    /// If-then-else: `if f then g else h`, the single primitive all other
    /// boolean connectives are built from (`_ite` in the original).
    pub fn ite(&self, f: &Node, g: &Node, h: &Node) -> Node {
        // Terminal shortcuts, mirroring `datalog.bdd._ite` exactly.
        if self.is_one(f) {
            return g.clone();
        }
        if self.is_zero(f) {
            return h.clone();
        }
        if Arc::ptr_eq(g, h) {
            return g.clone();
        }
        if self.is_one(g) && self.is_zero(h) {
            return f.clone();
        }
        if self.is_zero(g) && self.is_one(h) {
            return self.neg(f);
        }

        let top_var = [f, g, h]
            .iter()
            .filter_map(|n| match n.as_ref() {
                NodeInner::Branch { var, .. } => Some(*var),
                _ => None,
            })
            .min()
            .expect("at least one of f/g/h is a branch once the terminal shortcuts are exhausted");

        let restrict_high = |n: &Node| self.restrict(n, top_var, true);
        let restrict_low = |n: &Node| self.restrict(n, top_var, false);

        let high = self.ite(&restrict_high(f), &restrict_high(g), &restrict_high(h));
        let low = self.ite(&restrict_low(f), &restrict_low(g), &restrict_low(h));
        self.node(top_var, high, low)
    }

    /// Restricts `n` by fixing `var` to `value`, recursing only into
    /// branches whose variable is `var` or comes before it in the order.
    pub fn restrict(&self, n: &Node, var: Var, value: bool) -> Node {
        match n.as_ref() {
            NodeInner::Zero | NodeInner::One => n.clone(),
            NodeInner::Branch {
                var: node_var,
                high,
                low,
            } => {
                if *node_var == var {
                    if value {
                        high.clone()
                    } else {
                        low.clone()
                    }
                } else if *node_var > var {
                    n.clone()
                } else {
                    let high = self.restrict(high, var, value);
                    let low = self.restrict(low, var, value);
                    self.node(*node_var, high, low)
                }
            }
        }
    }

    pub fn and(&self, a: &Node, b: &Node) -> Node {
        self.ite(a, b, &self.zero())
    }

    pub fn or(&self, a: &Node, b: &Node) -> Node {
        self.ite(a, &self.one(), b)
    }

    pub fn xor(&self, a: &Node, b: &Node) -> Node {
        let not_b = self.neg(b);
        self.ite(a, &not_b, b)
    }

    /// The set of variables actually appearing in `n`.
    pub fn support(&self, n: &Node) -> Vec<Var> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        fn walk(n: &Node, seen: &mut std::collections::HashSet<Var>, out: &mut Vec<Var>) {
            if let NodeInner::Branch { var, high, low } = n.as_ref() {
                if seen.insert(*var) {
                    out.push(*var);
                }
                walk(high, seen, out);
                walk(low, seen, out);
            }
        }
        walk(n, &mut seen, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_shortcuts_short_circuit_ite() {
        let e = BddEngine::new();
        let one = e.one();
        let zero = e.zero();
        let a = e.variable("a");
        assert!(Arc::ptr_eq(&e.ite(&one, &a, &zero), &a));
        assert!(Arc::ptr_eq(&e.ite(&zero, &a, &zero), &zero));
    }

    #[test]
    fn and_or_neg_are_consistent() {
        let e = BddEngine::new();
        let a = e.variable("a");
        let not_a = e.neg(&a);
        assert!(e.is_zero(&e.and(&a, &not_a)));
        assert!(e.is_one(&e.or(&a, &not_a)));
    }

    #[test]
    fn same_formula_yields_identical_node() {
        let e = BddEngine::new();
        let a = e.variable("a");
        let b = e.variable("b");
        let left = e.and(&a, &b);
        let right = e.and(&a, &b);
        assert!(Arc::ptr_eq(&left, &right));
    }

    #[test]
    fn restrict_fixes_a_variable() {
        let e = BddEngine::new();
        let a = e.variable("a");
        let b = e.variable("b");
        let f = e.and(&a, &b);
        let var_a = e.var("a");
        assert!(e.is_zero(&e.restrict(&f, var_a, false)));
        assert!(Arc::ptr_eq(&e.restrict(&f, var_a, true), &b));
    }

    #[test]
    fn xor_is_true_iff_operands_differ() {
        let e = BddEngine::new();
        let a = e.variable("a");
        let b = e.variable("b");
        assert!(e.is_zero(&e.xor(&a, &a)));
        assert!(!e.is_zero(&e.xor(&a, &b)));
    }
}
