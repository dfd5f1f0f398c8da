/*!
The descriptive-sentence algebra: propositional formulas over labels,
evaluated through an [bdd::BddEngine] to decide equivalence and
satisfiability under a knowledge base's mutual-exclusion constraints
(spec §3, §4.C, §4.D).

Grounded in `original_source/judged/worlds.py`.
*/

pub mod algebra;
pub mod bdd;

pub use algebra::{conjunct, disjunct, equivalent, falsehood, exclusion_matrix, Sentence};
pub use bdd::BddEngine;
