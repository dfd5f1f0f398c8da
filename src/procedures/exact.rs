/*!
The exact prover (spec §4.G): an SLG prover that carries a descriptive
sentence alongside every clause instead of a single fixed world-choice,
rejecting resolvents that are provably impossible and refusing negation
outright.

Grounded in `original_source/judged/logic.py`'s `ExactProver(Prover)`,
translated into a [ProverStrategy] (see [super::prover]'s module docs
for why a strategy trait stands in for Python's subclassing here) that
parameterises [Prover] instead of re-implementing its recursive engine.
*/

use crate::db::Knowledge;
use crate::sentence::{conjunct, disjunct, equivalent, falsehood, BddEngine, Sentence};
use crate::structures::Clause;
use crate::structures::Literal;
use crate::types::JudgedError;

use super::prover::{Prover, ProverStrategy};

/// [ProverStrategy] for the exact prover: sentences are conjoined
/// through resolution/factoring, a resolvent whose sentence is
/// unsatisfiable is dropped, negative literals are refused, and answers
/// are grouped by head into one disjoined sentence each.
pub struct ExactStrategy {
    engine: BddEngine,
}

impl ExactStrategy {
    pub fn new(engine: BddEngine) -> Self {
        ExactStrategy { engine }
    }

    pub fn engine(&self) -> &BddEngine {
        &self.engine
    }
}

impl ProverStrategy for ExactStrategy {
    fn combine_sentence(&self, a: &Sentence, b: &Sentence) -> Sentence {
        conjunct([a.clone(), b.clone()])
    }

    fn is_rejected(&self, kb: &Knowledge, sentence: &Sentence) -> bool {
        falsehood(sentence, kb, &self.engine)
    }

    fn negative_literal_error(&self) -> Option<JudgedError> {
        Some(JudgedError::Unsupported(
            "the exact prover cannot resolve a negative literal".into(),
        ))
    }

    fn answer_subsumed_by(&self, kb: &Knowledge, clause: &Clause, answers: &[Clause]) -> bool {
        answers
            .iter()
            .any(|cl| cl.head() == clause.head() && equivalent(cl.sentence(), clause.sentence(), kb, &self.engine))
    }

    fn positive_waiter_todo(
        &self,
        clause: &Clause,
        selected: &Literal,
        answers: &[Clause],
        resolve: &dyn Fn(&Clause, &Literal, &Clause) -> Option<Clause>,
        factor: &dyn Fn(&Clause, &Literal, &Clause) -> Option<Clause>,
    ) -> Vec<Clause> {
        let mut todo = Vec::new();
        for c in answers {
            let clean_fact_exists = answers
                .iter()
                .any(|cl| cl.head() == c.head() && cl.body().is_empty() && cl.delayed().is_empty());
            if clean_fact_exists {
                let fact = Clause::new(c.head().clone(), vec![], c.sentence().clone());
                if let Some(r) = resolve(clause, selected, &fact) {
                    todo.push(r);
                }
            } else if let Some(f) = factor(clause, selected, c) {
                todo.push(f);
            }
        }
        todo
    }

    fn finalize(&self, answers: Vec<Clause>) -> Vec<Clause> {
        let mut heads: Vec<Literal> = Vec::new();
        let mut sentences: Vec<Vec<Sentence>> = Vec::new();
        for answer in answers {
            match heads.iter().position(|h| h == answer.head()) {
                Some(i) => sentences[i].push(answer.sentence().clone()),
                None => {
                    heads.push(answer.head().clone());
                    sentences.push(vec![answer.sentence().clone()]);
                }
            }
        }
        heads
            .into_iter()
            .zip(sentences)
            .map(|(head, sentences)| Clause::new(head, vec![], disjunct(sentences)))
            .collect()
    }
}

/// The exact prover: an SLG [Prover] parameterised with [ExactStrategy].
pub type ExactProver = Prover<ExactStrategy>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::BddEngine;
    use crate::structures::label::{label, label_constant};
    use crate::structures::predicate::predicate;
    use crate::structures::term::{ConstantKind, Term};

    fn sym(name: &str) -> Term {
        Term::constant(name, ConstantKind::Symbol)
    }

    fn admit_all() -> &'static dyn Fn(
        &crate::structures::label::LabelFragment,
        &crate::structures::label::LabelFragment,
    ) -> Result<bool, JudgedError> {
        &|_p, _x| Ok(true)
    }

    #[test]
    fn exact_prover_groups_answers_by_head_and_disjoins_sentences() {
        let mut kb = Knowledge::new();
        let coin = predicate("coin", 1);
        let partitioning = label_constant(sym("coin"));
        let heads = label(partitioning.clone(), label_constant(sym("heads")));
        let tails = label(partitioning, label_constant(sym("tails")));

        kb.assert_clause(Clause::new(
            Literal::new(coin.clone(), vec![sym("flip")], true),
            vec![],
            Sentence::label(heads),
        ))
        .unwrap();
        kb.assert_clause(Clause::new(
            Literal::new(coin.clone(), vec![sym("flip")], true),
            vec![],
            Sentence::label(tails),
        ))
        .unwrap();

        let prover = ExactProver::new(ExactStrategy::new(BddEngine::new()));
        let query = Literal::new(coin, vec![sym("flip")], true);
        let answers = prover.ask(&kb, &query, admit_all()).unwrap();

        assert_eq!(answers.len(), 1);
        assert!(matches!(answers[0].sentence(), Sentence::Or(terms) if terms.len() == 2));
    }

    #[test]
    fn exact_prover_refuses_negative_literals() {
        let mut kb = Knowledge::new();
        let p = predicate("p", 1);
        let q = predicate("q", 1);
        let x = Term::fresh_variable();
        kb.assert_clause(Clause::new(
            Literal::new(q.clone(), vec![x.clone()], true),
            vec![Literal::new(p, vec![x], false)],
            Sentence::Top,
        ))
        .unwrap();

        let prover = ExactProver::new(ExactStrategy::new(BddEngine::new()));
        let query = Literal::new(q, vec![Term::fresh_variable()], true);
        let result = prover.ask(&kb, &query, admit_all());
        assert!(matches!(result, Err(JudgedError::Unsupported(_))));
    }
}
