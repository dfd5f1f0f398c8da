/*!
Actions: the closed set of operations a program performs against a
[crate::context::Context] (spec §4.I).

Grounded in `original_source/judged/actions.py`'s `Action` hierarchy. The
original dispatches through subclassing (`perform`/`substitute`
overridden per class); here a closed [Action] enum plays the same role,
preferring enum dispatch over trait objects since the set of variants is
fixed and small.
*/

use std::fmt;

use log::trace;

use crate::context::Context;
use crate::extensions::lookup_extension;
use crate::sentence::Sentence;
use crate::structures::label::{Label, LabelFragment};
use crate::structures::{Clause, Env, Literal};
use crate::types::{JudgedError, LocationContext};

/// Asserts `clause` into the context's knowledge base.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertAction {
    pub clause: Clause,
    pub source: Option<LocationContext>,
}

/// Retracts `clause` from the context's knowledge base.
#[derive(Clone, Debug, PartialEq)]
pub struct RetractAction {
    pub clause: Clause,
    pub source: Option<LocationContext>,
}

/// Queries the context for `literal` (a bare literal clause with a Top
/// sentence — enforced at construction, spec §4.I).
#[derive(Clone, Debug, PartialEq)]
pub struct QueryAction {
    literal: Literal,
    pub source: Option<LocationContext>,
}

impl QueryAction {
    pub fn new(clause: Clause, source: Option<LocationContext>) -> Result<Self, JudgedError> {
        if !clause.body().is_empty() {
            return Err(JudgedError::QueryShape(
                "cannot query for a clause, only literals can be queried on".into(),
            ));
        }
        if *clause.sentence() != Sentence::Top {
            return Err(JudgedError::QueryShape(
                "cannot perform a query with a descriptive sentence".into(),
            ));
        }
        Ok(QueryAction {
            literal: clause.head().clone(),
            source,
        })
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }
}

/// Sets the probability of one ground label.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotateProbabilityAction {
    pub label: Label,
    pub probability: f64,
    pub source: Option<LocationContext>,
}

/// Distributes probability uniformly across every part of `partitioning`
/// currently observed in the knowledge base (`@uniform`, spec §6).
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotateDistributionAction {
    pub partitioning: LabelFragment,
    pub source: Option<LocationContext>,
}

/// Attaches a globally registered extension to the context.
#[derive(Clone, Debug, PartialEq)]
pub struct UseModuleAction {
    pub module: String,
    pub config: String,
    pub source: Option<LocationContext>,
}

/// Re-exports one predicate from an already-known module, installing
/// the module first if the context hasn't used it yet.
#[derive(Clone, Debug, PartialEq)]
pub struct UsePredicateAction {
    pub module: String,
    pub predicate: String,
    pub alias: Option<String>,
    pub source: Option<LocationContext>,
}

/// A sequence of actions run in order; its result is its last child's.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundAction {
    pub children: Vec<Action>,
    pub source: Option<LocationContext>,
}

/// Runs `query_clause`, then for every grounded, Top-sentence answer
/// substitutes the query/answer unification into each child action and
/// runs it (spec §4.I). Skips non-exact results (more than one
/// iteration recorded) and answers with an intermediate probability.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorAction {
    pub children: Vec<Action>,
    query: Literal,
    pub source: Option<LocationContext>,
}

impl GeneratorAction {
    pub fn new(children: Vec<Action>, query_clause: Clause, source: Option<LocationContext>) -> Result<Self, JudgedError> {
        if !query_clause.body().is_empty() {
            return Err(JudgedError::QueryShape("generator query clause must be a literal".into()));
        }
        if *query_clause.sentence() != Sentence::Top {
            return Err(JudgedError::QueryShape(
                "cannot perform a query with a descriptive sentence".into(),
            ));
        }
        Ok(GeneratorAction {
            children,
            query: query_clause.head().clone(),
            source,
        })
    }
}

/// The closed set of operations a program performs against a context
/// (spec §4.I).
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Assert(AssertAction),
    Retract(RetractAction),
    Query(QueryAction),
    AnnotateProbability(AnnotateProbabilityAction),
    AnnotateDistribution(AnnotateDistributionAction),
    UseModule(UseModuleAction),
    UsePredicate(UsePredicateAction),
    Compound(CompoundAction),
    Generator(GeneratorAction),
}

impl Action {
    /// Runs the action against `context`, returning the last query
    /// result produced, if any (a bare assert/retract/annotate yields
    /// `None`; a compound or generator yields its last query's result).
    pub fn perform(&self, context: &mut dyn Context) -> Result<Option<crate::context::QueryResult>, JudgedError> {
        trace!("performing action: {self}");
        match self {
            Action::Assert(a) => {
                context.assert_clause(a.clause.clone())?;
                Ok(None)
            }
            Action::Retract(a) => {
                context.retract_clause(a.clause.clone());
                Ok(None)
            }
            Action::Query(a) => {
                let result = context.ask(&a.literal)?;
                Ok(Some(result))
            }
            Action::AnnotateProbability(a) => {
                context.add_probability(a.label.partitioning().clone(), a.label.part().clone(), a.probability);
                Ok(None)
            }
            Action::AnnotateDistribution(a) => {
                let parts = context.knowledge().parts(&a.partitioning);
                if !parts.is_empty() {
                    let share = 1.0 / parts.len() as f64;
                    for part in parts {
                        context.add_probability(a.partitioning.clone(), part, share);
                    }
                }
                Ok(None)
            }
            Action::UseModule(a) => {
                perform_use_module(a, context)?;
                Ok(None)
            }
            Action::UsePredicate(a) => {
                if lookup_extension(&a.module).is_none() {
                    perform_use_module(
                        &UseModuleAction {
                            module: a.module.clone(),
                            config: String::new(),
                            source: a.source,
                        },
                        context,
                    )?;
                }
                let ext = lookup_extension(&a.module)
                    .expect("just-installed extension must be in the registry");
                ext.register_predicate(context.knowledge_mut(), &a.predicate, a.alias.as_deref())?;
                Ok(None)
            }
            Action::Compound(a) => {
                let mut last = None;
                for child in &a.children {
                    last = child.perform(context)?;
                }
                Ok(last)
            }
            Action::Generator(a) => perform_generator(a, context),
        }
    }

    /// The source location this action was parsed from, if any
    /// (`original_source/judged/__main__.py`'s `handle_reader` attaches
    /// this to any error an action raises while running).
    pub fn source(&self) -> Option<LocationContext> {
        match self {
            Action::Assert(a) => a.source,
            Action::Retract(a) => a.source,
            Action::Query(a) => a.source,
            Action::AnnotateProbability(a) => a.source,
            Action::AnnotateDistribution(a) => a.source,
            Action::UseModule(a) => a.source,
            Action::UsePredicate(a) => a.source,
            Action::Compound(a) => a.source,
            Action::Generator(a) => a.source,
        }
    }

    /// Replaces free variables per `env` in every embedded term
    /// (clause/label/query), recursing through compound/generator
    /// children. Used to ground a generator's children against each
    /// answer it iterates.
    pub fn substitute(&self, env: &Env) -> Action {
        match self {
            Action::Assert(a) => Action::Assert(AssertAction {
                clause: a.clause.subst(env),
                source: a.source,
            }),
            Action::Retract(a) => Action::Retract(RetractAction {
                clause: a.clause.subst(env),
                source: a.source,
            }),
            Action::Query(a) => Action::Query(QueryAction {
                literal: a.literal.subst(env),
                source: a.source,
            }),
            Action::AnnotateProbability(a) => Action::AnnotateProbability(AnnotateProbabilityAction {
                label: crate::structures::label::subst_label(&a.label, env),
                probability: a.probability,
                source: a.source,
            }),
            Action::AnnotateDistribution(a) => Action::AnnotateDistribution(AnnotateDistributionAction {
                partitioning: crate::structures::label::subst_fragment(&a.partitioning, env),
                source: a.source,
            }),
            Action::UseModule(a) => Action::UseModule(a.clone()),
            Action::UsePredicate(a) => Action::UsePredicate(a.clone()),
            Action::Compound(a) => Action::Compound(CompoundAction {
                children: a.children.iter().map(|c| c.substitute(env)).collect(),
                source: a.source,
            }),
            Action::Generator(a) => Action::Generator(GeneratorAction {
                children: a.children.iter().map(|c| c.substitute(env)).collect(),
                query: a.query.subst(env),
                source: a.source,
            }),
        }
    }
}

fn perform_use_module(action: &UseModuleAction, context: &mut dyn Context) -> Result<(), JudgedError> {
    let ext = lookup_extension(&action.module).ok_or_else(|| {
        JudgedError::Extension(format!("module '{}' not found", action.module))
    })?;
    context.use_extension(ext, &action.config)
}

fn perform_generator(action: &GeneratorAction, context: &mut dyn Context) -> Result<Option<crate::context::QueryResult>, JudgedError> {
    let result = context.ask(&action.query)?;

    if let Some(iterations) = result.iterations {
        if iterations != 1 {
            return Ok(None);
        }
    }

    for answer in &result.answers {
        if let Some(p) = answer.probability {
            if p != 1.0 {
                continue;
            }
        }
        if *answer.clause.sentence() != Sentence::Top {
            continue;
        }

        let env = match action.query.unify(answer.clause.head(), Env::new()) {
            Some(env) => env,
            None => continue,
        };

        for child in &action.children {
            child.substitute(&env).perform(context)?;
        }
    }

    Ok(None)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assert(a) => write!(f, "assert {}", a.clause),
            Action::Retract(a) => write!(f, "retract {}", a.clause),
            Action::Query(a) => write!(f, "query {}", a.literal),
            Action::AnnotateProbability(a) => write!(f, "annotate p({}) = {}", a.label, a.probability),
            Action::AnnotateDistribution(a) => write!(f, "annotate p({}) with uniform distribution", a.partitioning),
            Action::UseModule(a) => write!(f, "use module '{}'", a.module),
            Action::UsePredicate(a) => match &a.alias {
                Some(alias) => write!(f, "use predicate '{}' from module '{}' as '{}'", a.predicate, a.module, alias),
                None => write!(f, "use predicate '{}' from module '{}'", a.predicate, a.module),
            },
            Action::Compound(a) => {
                write!(f, "compound of {{")?;
                for (i, c) in a.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "}}")
            }
            Action::Generator(a) => write!(f, "generate for {{{}}} based on {}", a.children.len(), a.query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeterministicContext;
    use crate::structures::predicate::predicate as pred;
    use crate::structures::term::{ConstantKind, Term};

    fn sym(name: &str) -> Term {
        Term::constant(name, ConstantKind::Symbol)
    }

    #[test]
    fn query_action_rejects_a_clause_with_a_body() {
        let head = Literal::new(pred("p", 1), vec![sym("a")], true);
        let body = Literal::new(pred("q", 1), vec![sym("a")], true);
        let clause = Clause::new(head, vec![body], Sentence::Top);
        let result = QueryAction::new(clause, None);
        assert!(matches!(result, Err(JudgedError::QueryShape(_))));
    }

    #[test]
    fn assert_then_query_round_trips_through_a_context() {
        let mut ctx = DeterministicContext::new();
        let head = Literal::new(pred("p", 1), vec![sym("a")], true);
        let clause = Clause::new(head.clone(), vec![], Sentence::Top);
        let assertion = Action::Assert(AssertAction { clause, source: None });
        assertion.perform(&mut ctx).unwrap();

        let query = Action::Query(QueryAction::new(Clause::new(head, vec![], Sentence::Top), None).unwrap());
        let result = query.perform(&mut ctx).unwrap().unwrap();
        assert_eq!(result.answers.len(), 1);
    }

    #[test]
    fn uniform_annotation_splits_probability_across_observed_parts() {
        let mut ctx = DeterministicContext::new();
        let partitioning = crate::structures::label::label_constant(sym("weather"));
        let rainy = crate::structures::label::label_constant(sym("rainy"));
        let sunny = crate::structures::label::label_constant(sym("sunny"));
        let label_a = crate::structures::label::label(partitioning.clone(), rainy);
        let label_b = crate::structures::label::label(partitioning.clone(), sunny);

        ctx.assert_clause(Clause::new(
            Literal::new(pred("forecast", 0), vec![], true),
            vec![],
            Sentence::label(label_a),
        ))
        .unwrap();
        ctx.assert_clause(Clause::new(
            Literal::new(pred("forecast2", 0), vec![], true),
            vec![],
            Sentence::label(label_b),
        ))
        .unwrap();

        let action = Action::AnnotateDistribution(AnnotateDistributionAction {
            partitioning,
            source: None,
        });
        action.perform(&mut ctx).unwrap();
    }
}
