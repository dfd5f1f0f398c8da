/*!
A library for probabilistic Datalog: evaluating queries over programs
whose clauses are annotated with descriptive sentences naming the
possible worlds in which they hold.

JudgeD programs are ordinary Datalog, extended with a `[sentence]`
suffix on a clause (`flip(X) :- coin(X) [weather = rainy]`) describing
*when* that clause contributes. A sentence is a propositional formula
over labels (`partitioning = part`), and a knowledge base's labels
partition the space of possible worlds. Queries are answered by one of
three [context] variants, matching the evaluation strategy a caller
needs:
- [context::DeterministicContext] fixes one world up front (every
  partitioning resolved to exactly one part) and asks whether a goal
  holds in it.
- [context::ExactContext] asks against every possible world at once,
  via a binary decision diagram over the program's descriptive
  sentences, returning each answer alongside the sentence under which
  it holds.
- [context::MonteCarloContext] repeatedly samples a world, weighted by
  a registered probability distribution over each partitioning, and
  reports each answer's observed frequency.

# Orientation

The library is organised around the core structure of a [context]:
- A knowledge base (asserted/retracted clauses, primitive predicates,
  probability distributions) is stored in [db::Knowledge].
- Clauses ([structures::Clause]) are a head [structures::Literal], a
  body of further literals, and a descriptive [sentence::Sentence];
  queries are answered by tabled SLG resolution over this structure
  (see [procedures::prover]).
- The descriptive-sentence algebra and its BDD-backed semantics live in
  [sentence].
- [actions] is the closed set of operations ( assert / retract / query
  / annotate / use a module / generate ) a parsed program performs
  against whichever context it was run under.
- [parser] turns JudgeD's surface syntax into a sequence of
  [actions::Action]s.
- [extensions] lets native Rust code contribute primitive predicates
  (e.g. a SQL-backed lookup) a program can `@use`.

Useful starting points, then, may be:
- [context] to see how a query is actually answered.
- [db] to inspect the knowledge a context holds.
- [structures] for the abstract elements of a program (clauses,
  literals, terms, labels).
- [sentence] for the descriptive-sentence algebra and its BDD engine.
- [parser] to see how surface syntax becomes [actions::Action]s.

# Examples

+ Assert a fact and ask a deterministic query.

```rust
# use judged::context::{Context, DeterministicContext};
# use judged::sentence::Sentence;
# use judged::structures::predicate::predicate;
# use judged::structures::term::{ConstantKind, Term};
# use judged::structures::{Clause, Literal};
let mut ctx = DeterministicContext::new();

let parent = predicate("parent", 2);
let tom = Term::constant("tom", ConstantKind::Symbol);
let liz = Term::constant("liz", ConstantKind::Symbol);

ctx.assert_clause(Clause::new(
    Literal::new(parent.clone(), vec![tom.clone(), liz.clone()], true),
    vec![],
    Sentence::Top,
))
.unwrap();

let query = Literal::new(parent, vec![tom, liz], true);
let result = ctx.ask(&query).unwrap();
assert_eq!(result.answers.len(), 1);
```

+ Parse a small program and run each action against a context.

```rust
# use judged::actions::Action;
# use judged::context::{Context, DeterministicContext};
# use judged::parser::grammar::parse_program;
let program = parse_program("parent(tom, liz). parent(tom, liz)?").unwrap();
let mut ctx = DeterministicContext::new();
let mut last = None;
for action in &program {
    last = action.perform(&mut ctx).unwrap();
}
assert_eq!(last.unwrap().answers.len(), 1);
```

# Guiding principles

## Modularity

  + A solver is built of many interconnected parts, but where possible
    (and reasonable) interaction between parts happens through
    documented access points: clauses and labels are reached through
    [db::Knowledge]'s own methods rather than by poking at its private
    storage, and the query-evaluation strategy (deterministic / exact /
    Monte Carlo) is a choice of [context] type rather than a runtime
    flag threaded through every call.
  + Use of external crates is limited to crates which help support
    modularity: [log] for diagnostics, [rand] for Monte Carlo sampling,
    [thiserror]-free error handling via one flat [types::err::JudgedError]
    enum.

## Verification

  + Tabled (SLG) resolution guards against infinite regress on
    recursive programs by remembering every subgoal already under
    evaluation; see [procedures::prover] for the generator/consumer
    structure this relies on.

## Simple efficiency

  + Terms, labels, and predicates are interned process-wide (see
    [structures]), so equality and hashing are `O(1)` pointer
    comparisons rather than structural comparisons.

# Logs

Diagnostics are emitted through [log!](log) at `trace!` granularity on
each resolution step and each [actions::Action] performed, and `debug!`
on context-level lifecycle events (extension installation, distribution
changes). As logging is only built on request, logs are verbose; filter
with `RUST_LOG` when used with
[env_logger](https://docs.rs/env_logger/latest/env_logger/).
*/

#![allow(clippy::collapsible_else_if)]
#![allow(clippy::derivable_impls)]
#![allow(mixed_script_confusables)]

pub mod actions;
pub mod config;
pub mod context;
pub mod db;
pub mod extensions;
pub mod interning;
pub mod parser;
pub mod procedures;
pub mod sentence;
pub mod structures;
pub mod types;
