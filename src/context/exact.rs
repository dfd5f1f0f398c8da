/*!
[ExactContext]: a context that admits every world and reports each
answer's exact descriptive sentence rather than collapsing to one world
(spec §4.H).

Grounded in `original_source/judged/context.py`'s `ExactContext`.
*/

use std::sync::Arc;

use crate::config::Config;
use crate::db::Knowledge;
use crate::extensions::Extension;
use crate::procedures::exact::{ExactProver, ExactStrategy};
use crate::sentence::BddEngine;
use crate::structures::label::LabelFragment;
use crate::structures::{Clause, Literal};
use crate::types::JudgedError;

use super::{Answer, ContextCore, QueryResult};

/// Answers queries against every possible world at once: `check` is the
/// constant `true`, and each answer carries the sentence under which it
/// holds (encoded in the yielded clause).
pub struct ExactContext {
    core: ContextCore,
    prover: ExactProver,
}

impl ExactContext {
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    pub fn from_config(config: Config) -> Self {
        ExactContext {
            core: ContextCore::new(),
            prover: ExactProver::new(ExactStrategy::new(BddEngine::new())).with_limit(config.prover_limit),
        }
    }

    pub fn assert_clause(&mut self, clause: Clause) -> Result<Clause, JudgedError> {
        self.core.knowledge.assert_clause(clause)
    }

    pub fn retract_clause(&mut self, clause: Clause) -> Clause {
        self.core.knowledge.retract_clause(clause)
    }

    pub fn add_probability(&mut self, partitioning: LabelFragment, part: LabelFragment, prob: f64) {
        self.core.add_probability(partitioning, part, prob);
    }

    pub fn use_extension(&mut self, extension: Arc<Extension>, config: &str) -> Result<(), JudgedError> {
        self.core.use_extension(extension, config)
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.core.knowledge
    }

    pub fn ask(&mut self, query: &Literal) -> Result<QueryResult, JudgedError> {
        self.core.before_ask();
        let checker = |_p: &LabelFragment, _v: &LabelFragment| -> Result<bool, JudgedError> { Ok(true) };
        let result = self
            .prover
            .ask(&self.core.knowledge, query, &checker)
            .map(|clauses| QueryResult {
                answers: clauses
                    .into_iter()
                    .map(|clause| Answer {
                        clause,
                        probability: None,
                    })
                    .collect(),
                iterations: None,
                error: None,
            });
        self.core.after_ask();
        result
    }
}

impl Default for ExactContext {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Context for ExactContext {
    fn assert_clause(&mut self, clause: Clause) -> Result<Clause, JudgedError> {
        self.assert_clause(clause)
    }
    fn retract_clause(&mut self, clause: Clause) -> Clause {
        self.retract_clause(clause)
    }
    fn add_probability(&mut self, partitioning: LabelFragment, part: LabelFragment, prob: f64) {
        self.add_probability(partitioning, part, prob)
    }
    fn use_extension(&mut self, extension: Arc<Extension>, config: &str) -> Result<(), JudgedError> {
        self.use_extension(extension, config)
    }
    fn knowledge(&self) -> &Knowledge {
        self.knowledge()
    }
    fn knowledge_mut(&mut self) -> &mut Knowledge {
        &mut self.core.knowledge
    }
    fn ask(&mut self, query: &Literal) -> Result<QueryResult, JudgedError> {
        self.ask(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Sentence;
    use crate::structures::label::{label, label_constant};
    use crate::structures::predicate::predicate;
    use crate::structures::term::{ConstantKind, Term};

    fn sym(name: &str) -> Term {
        Term::constant(name, ConstantKind::Symbol)
    }

    #[test]
    fn exact_context_surfaces_a_disjoined_sentence() {
        let mut ctx = ExactContext::new();
        let coin = predicate("coin", 1);
        let partitioning = label_constant(sym("coin"));
        let heads = label(partitioning.clone(), label_constant(sym("heads")));
        let tails = label(partitioning, label_constant(sym("tails")));

        ctx.assert_clause(Clause::new(
            Literal::new(coin.clone(), vec![sym("flip")], true),
            vec![],
            Sentence::label(heads),
        ))
        .unwrap();
        ctx.assert_clause(Clause::new(
            Literal::new(coin.clone(), vec![sym("flip")], true),
            vec![],
            Sentence::label(tails),
        ))
        .unwrap();

        let query = Literal::new(coin, vec![sym("flip")], true);
        let result = ctx.ask(&query).unwrap();
        assert_eq!(result.answers.len(), 1);
        assert!(matches!(result.answers[0].clause.sentence(), Sentence::Or(terms) if terms.len() == 2));
    }
}
