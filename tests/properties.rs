//! Property-based tests for the universal invariants spec §8 calls out:
//! interning, alpha-invariant tagging, unification soundness, BDD
//! canonicity, and clause safety.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use judged::db::Knowledge;
use judged::sentence::{conjunct, disjunct, equivalent, BddEngine, Sentence};
use judged::structures::label::{label, label_constant};
use judged::structures::predicate::predicate;
use judged::structures::term::{ConstantKind, Term};
use judged::structures::{Clause, Literal};

/// Keeps generated names to a small, valid-identifier alphabet so we
/// don't spend quickcheck's budget on inputs the generator would
/// immediately discard.
fn sanitize(raw: String) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_ascii_lowercase())
    }
}

#[quickcheck]
fn equal_constants_intern_to_the_same_term(raw: String) -> TestResult {
    let Some(name) = sanitize(raw) else {
        return TestResult::discard();
    };
    let a = Term::constant(name.clone(), ConstantKind::Symbol);
    let b = Term::constant(name, ConstantKind::Symbol);
    TestResult::from_bool(a == b)
}

#[quickcheck]
fn distinct_constants_never_intern_to_the_same_term(raw_a: String, raw_b: String) -> TestResult {
    let (Some(a_name), Some(b_name)) = (sanitize(raw_a), sanitize(raw_b)) else {
        return TestResult::discard();
    };
    if a_name == b_name {
        return TestResult::discard();
    }
    let a = Term::constant(a_name, ConstantKind::Symbol);
    let b = Term::constant(b_name, ConstantKind::Symbol);
    TestResult::from_bool(a != b)
}

#[quickcheck]
fn literal_tag_is_invariant_under_consistent_variable_renaming(raw: String) -> TestResult {
    let Some(name) = sanitize(raw) else {
        return TestResult::discard();
    };
    let p = predicate(name, 2);
    let x = Term::fresh_variable();
    let y = Term::fresh_variable();

    let original = Literal::new(p.clone(), vec![x.clone(), y.clone()], true);
    let renamed = original.rename();

    TestResult::from_bool(original.tag() == renamed.tag())
}

#[quickcheck]
fn unifying_a_variable_literal_with_a_ground_one_binds_the_ground_value(raw: String) -> TestResult {
    let Some(name) = sanitize(raw) else {
        return TestResult::discard();
    };
    let p = predicate(name, 1);
    let c = Term::constant("ground", ConstantKind::Symbol);
    let x = Term::fresh_variable();

    let query = Literal::new(p.clone(), vec![x.clone()], true);
    let fact = Literal::new(p, vec![c.clone()], true);

    match query.unify(&fact, judged::structures::Env::new()) {
        Some(env) => TestResult::from_bool(env.get(&x) == Some(&c)),
        None => TestResult::failed(),
    }
}

#[quickcheck]
fn unification_never_succeeds_across_different_predicates(raw_a: String, raw_b: String) -> TestResult {
    let (Some(a_name), Some(b_name)) = (sanitize(raw_a), sanitize(raw_b)) else {
        return TestResult::discard();
    };
    if a_name == b_name {
        return TestResult::discard();
    }
    let c = Term::constant("x", ConstantKind::Symbol);
    let a = Literal::new(predicate(a_name, 1), vec![c.clone()], true);
    let b = Literal::new(predicate(b_name, 1), vec![c], true);
    TestResult::from_bool(a.unify(&b, judged::structures::Env::new()).is_none())
}

#[quickcheck]
fn every_sentence_is_equivalent_to_itself(picks: Vec<bool>) -> TestResult {
    if picks.is_empty() || picks.len() > 6 {
        return TestResult::discard();
    }
    let weather = label_constant(Term::constant("weather", ConstantKind::Symbol));
    let labels: Vec<Sentence> = picks
        .iter()
        .enumerate()
        .map(|(i, positive)| {
            let part = label_constant(Term::constant(format!("part{i}"), ConstantKind::Symbol));
            let s = Sentence::label(label(weather.clone(), part));
            if *positive {
                s
            } else {
                Sentence::not(s)
            }
        })
        .collect();
    let sentence = conjunct(labels.clone());
    let kb = Knowledge::new();
    let engine = BddEngine::new();
    TestResult::from_bool(equivalent(&sentence, &sentence, &kb, &engine))
}

#[quickcheck]
fn disjunction_is_commutative_up_to_equivalence(picks: Vec<u8>) -> TestResult {
    if picks.len() < 2 || picks.len() > 6 {
        return TestResult::discard();
    }
    let weather = label_constant(Term::constant("weather", ConstantKind::Symbol));
    let labels: Vec<Sentence> = picks
        .iter()
        .map(|n| {
            let part = label_constant(Term::constant(format!("part{n}"), ConstantKind::Symbol));
            Sentence::label(label(weather.clone(), part))
        })
        .collect();
    let mut reversed = labels.clone();
    reversed.reverse();

    let forward = disjunct(labels);
    let backward = disjunct(reversed);

    let kb = Knowledge::new();
    let engine = BddEngine::new();
    TestResult::from_bool(equivalent(&forward, &backward, &kb, &engine))
}

#[quickcheck]
fn a_clause_whose_body_covers_every_head_variable_is_safe(vars: Vec<bool>) -> TestResult {
    if vars.is_empty() || vars.len() > 4 {
        return TestResult::discard();
    }
    let mut kb = Knowledge::new();
    let xs: Vec<Term> = (0..vars.len()).map(|_| Term::fresh_variable()).collect();
    let head = Literal::new(predicate("reachable", xs.len()), xs.clone(), true);
    let body = vec![Literal::new(predicate("seed", xs.len()), xs, true)];
    let clause = Clause::new(head, body, Sentence::Top);

    match kb.assert_clause(clause) {
        Ok(accepted) => TestResult::from_bool(kb.is_safe(&accepted)),
        Err(_) => TestResult::failed(),
    }
}

#[quickcheck]
fn a_clause_whose_head_variable_is_unbound_in_the_body_is_unsafe(raw: String) -> TestResult {
    let Some(name) = sanitize(raw) else {
        return TestResult::discard();
    };
    let kb = Knowledge::new();
    let x = Term::fresh_variable();
    let head = Literal::new(predicate(name, 1), vec![x], true);
    let clause = Clause::new(head, vec![], Sentence::Top);
    TestResult::from_bool(!kb.is_safe(&clause))
}
