/*!
[MonteCarloContext]: a context that repeatedly samples a world, weighted
by the registered probability distributions, and reports each distinct
answer's observed frequency (spec §4.H).

Grounded in `original_source/judged/context.py`'s `MontecarloContext`,
whose `pick`/`_ask` implement weighted sampling and the root-mean-square
convergence check this translates directly.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::config::Config;
use crate::db::Knowledge;
use crate::extensions::Extension;
use crate::procedures::prover::{BaseStrategy, Prover};
use crate::structures::label::LabelFragment;
use crate::structures::{Clause, Literal};
use crate::types::JudgedError;

use super::{Answer, ContextCore, QueryResult};

/// Answers queries by repeated weighted sampling of the registered
/// probability distributions, converging on observed answer/world
/// frequencies (spec §4.H).
pub struct MonteCarloContext {
    core: ContextCore,
    prover: Prover<BaseStrategy>,
    iterations: usize,
    tolerance: f64,
}

impl MonteCarloContext {
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    pub fn from_config(config: Config) -> Self {
        MonteCarloContext {
            core: ContextCore::new(),
            prover: Prover::new(BaseStrategy).with_limit(config.prover_limit),
            iterations: config.montecarlo_iterations,
            tolerance: config.montecarlo_tolerance,
        }
    }

    /// Overrides the iteration cap for this context (`0` means
    /// unbounded, matching the original's `number=0`).
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Overrides the RMSE convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
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

    /// Weighted-randomly picks a part of `partitioning` according to its
    /// registered probability distribution.
    fn pick(&self, partitioning: &LabelFragment) -> Result<LabelFragment, JudgedError> {
        let distribution = self.core.prob.get(partitioning).ok_or_else(|| {
            JudgedError::Distribution(format!("probabilities for partitioning '{partitioning}' not set"))
        })?;
        let r: f64 = rand::rng().random();
        let mut acc = 0.0;
        for (part, prob) in distribution {
            acc += prob;
            if acc >= r {
                return Ok(part.clone());
            }
        }
        Err(JudgedError::Distribution(format!(
            "probabilities for partitioning '{partitioning}' do not sum to 1.0"
        )))
    }

    pub fn ask(&mut self, query: &Literal) -> Result<QueryResult, JudgedError> {
        self.core.before_ask();
        let outcome = self.run(query);
        self.core.after_ask();
        outcome
    }

    fn run(&mut self, query: &Literal) -> Result<QueryResult, JudgedError> {
        let mut world_counts: HashMap<Vec<(LabelFragment, LabelFragment)>, usize> = HashMap::new();
        let mut answer_counts: HashMap<Clause, usize> = HashMap::new();
        let mut count = 0usize;

        let rmse = |world_counts: &HashMap<Vec<(LabelFragment, LabelFragment)>, usize>, count: usize| -> f64 {
            if world_counts.is_empty() {
                return 0.0;
            }
            let mut sum = 0.0;
            for (world, observed) in world_counts {
                let exact: f64 = world.iter().map(|(p, v)| self.core.prob[p][v]).product();
                let p = *observed as f64 / count as f64;
                sum += (exact - p).powi(2);
            }
            (sum / world_counts.len() as f64).sqrt()
        };

        loop {
            if self.iterations != 0 && count >= self.iterations {
                break;
            }
            count += 1;

            let choices: RefCell<HashMap<LabelFragment, LabelFragment>> = RefCell::new(HashMap::new());
            let checker = |partitioning: &LabelFragment, part: &LabelFragment| -> Result<bool, JudgedError> {
                if !choices.borrow().contains_key(partitioning) {
                    let picked = self.pick(partitioning)?;
                    choices.borrow_mut().insert(partitioning.clone(), picked);
                }
                let chosen = choices.borrow().get(partitioning).unwrap().clone();
                Ok(std::sync::Arc::ptr_eq(&chosen, part))
            };

            let answers = self.prover.ask(&self.core.knowledge, query, &checker)?;

            let mut world: Vec<(LabelFragment, LabelFragment)> = choices.into_inner().into_iter().collect();
            world.sort_by(|a, b| a.0.tag().cmp(&b.0.tag()).then(a.1.tag().cmp(&b.1.tag())));

            for answer in answers {
                *answer_counts.entry(answer).or_insert(0) += 1;
            }
            *world_counts.entry(world).or_insert(0) += 1;

            if self.tolerance > 0.0 && rmse(&world_counts, count) <= self.tolerance {
                break;
            }
        }

        let error = rmse(&world_counts, count);
        let answers = answer_counts
            .into_iter()
            .map(|(clause, observed)| Answer {
                clause,
                probability: Some(observed as f64 / count as f64),
            })
            .collect();

        Ok(QueryResult {
            answers,
            iterations: Some(count),
            error: Some(error),
        })
    }
}

impl Default for MonteCarloContext {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Context for MonteCarloContext {
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
