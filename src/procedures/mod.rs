//! The SLG tabled prover (spec §4.F/§4.G).
//!
//! [subgoal] holds the tabling bookkeeping records, [prover] the base
//! engine generalised over a [prover::ProverStrategy], and [exact] the
//! sentence-aware strategy used for exact probability queries.

pub mod exact;
pub mod prover;
pub mod subgoal;
