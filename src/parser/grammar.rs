/*!
A recursive-descent parser over [super::tokenizer::Token]s that builds
[Clause]s, descriptive [Sentence]s, and [Action]s (spec §4.J, §6).

Grounded line-for-line in `original_source/judged/parser.py` (preferred
over `original_source/datalog/parser.py`: the `judged` variant adds
label-function arguments and the `@use`/`@from` module annotations spec
§6 names). `Tokens` mirrors the original's unlimited-pushback token
cursor.
*/

use crate::actions::{
    Action, AnnotateDistributionAction, AnnotateProbabilityAction, AssertAction, GeneratorAction, QueryAction,
    RetractAction, UseModuleAction, UsePredicateAction,
};
use crate::sentence::{conjunct, disjunct, Sentence};
use crate::structures::label::{label, label_constant, label_function, Label, LabelFragment};
use crate::structures::predicate::predicate;
use crate::structures::term::{ConstantKind, Term};
use crate::structures::{Clause, Literal};
use crate::types::{JudgedError, LocationContext};

use super::tokenizer::{tokenize, Token, TokenKind};

/// A pushback-aware cursor over a token stream (`parser.py`'s `Tokens`).
pub struct Tokens {
    stream: std::collections::VecDeque<Token>,
    buffer: Vec<Token>,
    last_line: usize,
}

impl Tokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        Tokens {
            stream: tokens.into(),
            buffer: Vec::new(),
            last_line: 1,
        }
    }

    fn take(&mut self) -> Option<Token> {
        let next = self.buffer.pop().or_else(|| self.stream.pop_front());
        if let Some(t) = &next {
            self.last_line = t.line;
        }
        next
    }

    pub fn push(&mut self, t: Token) {
        self.buffer.push(t);
    }

    pub fn peek(&mut self) -> Option<Token> {
        let t = self.take()?;
        self.push(t.clone());
        Some(t)
    }

    pub fn next(&mut self, test: impl Fn(&Token) -> bool, message: &str) -> Result<Token, JudgedError> {
        match self.take() {
            Some(t) if test(&t) => Ok(t),
            Some(t) => Err(JudgedError::parse(message.to_string(), LocationContext::single(t.line))),
            None => Err(JudgedError::parse(message.to_string(), LocationContext::single(self.last_line))),
        }
    }

    pub fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, JudgedError> {
        let full = if message.is_empty() {
            format!("expected a token of type {kind:?}")
        } else {
            format!("expected a token of type {kind:?} {message}")
        };
        self.next(|t| t.kind == kind, &full)
    }

    pub fn expect_keyword(&mut self, spelling: &str, message: &str) -> Result<Token, JudgedError> {
        let full = if message.is_empty() {
            format!("expected the keyword '{spelling}'")
        } else {
            format!("expected the keyword '{spelling}' {message}")
        };
        self.next(|t| t.kind == TokenKind::Name && t.spelling == spelling, &full)
    }

    pub fn test(&mut self, test: impl Fn(&Token) -> bool) -> bool {
        match self.peek() {
            Some(t) => test(&t),
            None => false,
        }
    }

    pub fn test_for(&mut self, kind: TokenKind) -> bool {
        self.test(|t| t.kind == kind)
    }

    pub fn test_keyword(&mut self, spelling: &str) -> bool {
        self.test(|t| t.kind == TokenKind::Name && t.spelling == spelling)
    }

    pub fn consume(&mut self, kind: TokenKind) -> bool {
        if self.test_for(kind) {
            self.expect(kind, "").expect("test_for guaranteed the token type");
            true
        } else {
            false
        }
    }

    pub fn is_empty(&mut self) -> bool {
        self.peek().is_none()
    }
}

fn is_identifier(t: &Token) -> bool {
    matches!(t.kind, TokenKind::Name | TokenKind::String | TokenKind::Number)
}

fn make_term(token: &Token) -> Term {
    match token.kind {
        TokenKind::Name if token.spelling.starts_with(|c: char| c.is_uppercase()) => Term::variable(token.spelling.clone()),
        TokenKind::Name if token.spelling == "_" => Term::fresh_variable(),
        TokenKind::Name => Term::constant(token.spelling.clone(), ConstantKind::Symbol),
        TokenKind::String => Term::constant(token.spelling.clone(), ConstantKind::Str),
        TokenKind::Number => Term::constant(token.spelling.clone(), ConstantKind::Number),
        _ => Term::constant(token.spelling.clone(), ConstantKind::Symbol),
    }
}

/// Parses a literal, including the infix `=`/`!=` spellings of the
/// built-in equality predicate (spec §6).
pub fn parse_literal(ts: &mut Tokens) -> Result<Literal, JudgedError> {
    let mut polarity = !ts.consume(TokenKind::Tilde);
    let mut pred_tok = ts.next(is_identifier, "expected an identifier or string as predicate or start of equality")?;
    let mut terms = Vec::new();

    if ts.consume(TokenKind::LParen) {
        terms.push(ts.next(is_identifier, "expected an identifier or string as literal term")?);
        while ts.consume(TokenKind::Comma) {
            terms.push(ts.next(is_identifier, "expected an identifier or string as literal term")?);
        }
        ts.expect(TokenKind::RParen, "to close literal with terms")?;
    } else if ts.test_for(TokenKind::Equals) {
        terms.push(pred_tok.clone());
        pred_tok = ts.expect(TokenKind::Equals, "")?;
        terms.push(ts.next(is_identifier, "expected an identifier or string as right hand side of equality")?);
    } else if ts.test_for(TokenKind::NEquals) {
        terms.push(pred_tok.clone());
        let neq = ts.expect(TokenKind::NEquals, "")?;
        pred_tok = Token {
            kind: TokenKind::Equals,
            spelling: "=".to_string(),
            line: neq.line,
        };
        polarity = false;
        terms.push(ts.next(is_identifier, "expected an identifier or string as right hand side of inequality")?);
    }

    if !matches!(pred_tok.kind, TokenKind::Name | TokenKind::Equals) {
        return Err(JudgedError::parse("expected a name as predicate".to_string(), LocationContext::single(pred_tok.line)));
    }

    let pred = predicate(pred_tok.spelling, terms.len());
    let body = terms.iter().map(make_term).collect();
    Ok(Literal::new(pred, body, polarity))
}

fn parse_label_fragment(ts: &mut Tokens, name: Token) -> Result<LabelFragment, JudgedError> {
    if ts.consume(TokenKind::LParen) {
        let mut terms = Vec::new();
        if !ts.consume(TokenKind::RParen) {
            terms.push(ts.next(is_identifier, "expected a variable name or constant in a label function")?);
            while ts.consume(TokenKind::Comma) {
                terms.push(ts.next(is_identifier, "expected a variable name or constant in a label function")?);
            }
            ts.expect(TokenKind::RParen, "to close a label function")?;
        }
        Ok(label_function(name.spelling, terms.iter().map(make_term).collect()))
    } else {
        Ok(label_constant(make_term(&name)))
    }
}

/// Parses a label (or `true`/`false`) inside `[...]` or a probability
/// annotation.
pub fn parse_descriptive_label(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    let left_tok = ts.next(is_identifier, "expected an identifier or string as partitioning of a label")?;

    if left_tok.spelling == "true" {
        return Ok(Sentence::Top);
    }
    if left_tok.spelling == "false" {
        return Ok(Sentence::Bottom);
    }

    let left = parse_label_fragment(ts, left_tok)?;
    ts.expect(TokenKind::Equals, "as part of a label")?;
    let right_tok = ts.next(is_identifier, "expected an identifier or string as part of a label")?;
    let right = parse_label_fragment(ts, right_tok)?;
    Ok(Sentence::label(label(left, right)))
}

/// Parses a bare label, without the `true`/`false` shorthand, for use in
/// a probability annotation's `p(label)`.
pub fn parse_plain_label(ts: &mut Tokens) -> Result<Label, JudgedError> {
    let left_tok = ts.next(is_identifier, "expected an identifier or string as partitioning of a label")?;
    let left = parse_label_fragment(ts, left_tok)?;
    ts.expect(TokenKind::Equals, "as part of a label")?;
    let right_tok = ts.next(is_identifier, "expected an identifier or string as part of a label")?;
    let right = parse_label_fragment(ts, right_tok)?;
    Ok(label(left, right))
}

fn parse_sentence_leaf(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    if ts.consume(TokenKind::LParen) {
        let result = parse_sentence(ts)?;
        ts.expect(TokenKind::RParen, "to close expression")?;
        Ok(result)
    } else {
        parse_descriptive_label(ts)
    }
}

fn parse_sentence_not(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    if ts.test(|t| t.kind == TokenKind::Name && t.spelling == "not") {
        ts.next(|_| true, "")?;
        Ok(Sentence::not(parse_sentence_not(ts)?))
    } else {
        parse_sentence_leaf(ts)
    }
}

fn parse_sentence_and(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    let left = parse_sentence_not(ts)?;
    if ts.test(|t| t.kind == TokenKind::Name && t.spelling == "and") {
        ts.next(|_| true, "")?;
        let right = parse_sentence_and(ts)?;
        Ok(conjunct([left, right]))
    } else {
        Ok(left)
    }
}

fn parse_sentence_or(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    let left = parse_sentence_and(ts)?;
    if ts.test(|t| t.kind == TokenKind::Name && t.spelling == "or") {
        ts.next(|_| true, "")?;
        let right = parse_sentence_or(ts)?;
        Ok(disjunct([left, right]))
    } else {
        Ok(left)
    }
}

/// Parses a descriptive sentence (spec §4.D / §6).
pub fn parse_sentence(ts: &mut Tokens) -> Result<Sentence, JudgedError> {
    parse_sentence_or(ts)
}

/// Parses a clause: `head [ :- body ] [ '[' sentence ']' ]`.
pub fn parse_clause(ts: &mut Tokens) -> Result<Clause, JudgedError> {
    let head = parse_literal(ts)?;
    let mut body = Vec::new();

    if ts.consume(TokenKind::Where) {
        body.push(parse_literal(ts)?);
        while ts.consume(TokenKind::Comma) {
            body.push(parse_literal(ts)?);
        }
    }

    let sentence = if ts.consume(TokenKind::LBracket) {
        let sentence = parse_sentence(ts)?;
        ts.expect(TokenKind::RBracket, "")?;
        sentence
    } else {
        Sentence::Top
    };

    Ok(Clause::new(head, body, sentence))
}

fn is_probability_keyword(t: &Token) -> bool {
    t.kind == TokenKind::Name && (t.spelling == "P" || t.spelling == "p")
}

fn parse_label_or_function(ts: &mut Tokens) -> Result<LabelFragment, JudgedError> {
    let name = ts.next(is_identifier, "expected an identifier as a partitioning name or label function name")?;
    parse_label_fragment(ts, name)
}

fn parse_annotation(ts: &mut Tokens, source: LocationContext) -> Result<Action, JudgedError> {
    if ts.test(is_probability_keyword) {
        ts.next(is_probability_keyword, "expected a probability notation of the form P(x=n)")?;
        ts.expect(TokenKind::LParen, "")?;
        let label = parse_plain_label(ts)?;
        ts.expect(TokenKind::RParen, "")?;
        ts.expect(TokenKind::Equals, "to continue probability assignment")?;
        let prob_tok = ts.expect(TokenKind::Number, "to complete probability assignment")?;
        let probability: f64 = prob_tok
            .spelling
            .parse()
            .map_err(|_| JudgedError::parse("expected a number as a probability".to_string(), LocationContext::single(prob_tok.line)))?;
        Ok(Action::AnnotateProbability(AnnotateProbabilityAction {
            label,
            probability,
            source: Some(source),
        }))
    } else if ts.test_keyword("uniform") {
        ts.expect_keyword("uniform", "")?;
        let partitioning = parse_label_or_function(ts)?;
        Ok(Action::AnnotateDistribution(AnnotateDistributionAction {
            partitioning,
            source: Some(source),
        }))
    } else if ts.test_keyword("use") {
        let (module, config) = parse_use_annotation(ts)?;
        Ok(Action::UseModule(UseModuleAction {
            module,
            config,
            source: Some(source),
        }))
    } else if ts.test_keyword("from") {
        let (module, predicate_name, alias) = parse_from_annotation(ts)?;
        match predicate_name {
            None => Ok(Action::UseModule(UseModuleAction {
                module,
                config: String::new(),
                source: Some(source),
            })),
            Some(predicate_name) => Ok(Action::UsePredicate(UsePredicateAction {
                module,
                predicate: predicate_name,
                alias,
                source: Some(source),
            })),
        }
    } else {
        let line = ts.peek().map(|t| t.line).unwrap_or(ts.last_line);
        Err(JudgedError::parse(
            "expected explicit probability assignment, distribution assignment, use statement, or from statement".to_string(),
            LocationContext::single(line),
        ))
    }
}

/// Parses `use "name"` or `use "name" with k="v", ...`. The
/// configuration is flattened into a single string (`k=v,k=v`, spec
/// §6's extension config string) since [crate::extensions::Extension]'s
/// setup hooks accept one opaque `&str`.
fn parse_use_annotation(ts: &mut Tokens) -> Result<(String, String), JudgedError> {
    ts.consume(TokenKind::Name);
    let module = ts.expect(TokenKind::String, "to indicate which module to use")?.spelling;
    let mut config = String::new();

    if ts.test_keyword("with") {
        ts.expect_keyword("with", "")?;
        loop {
            let key = ts.expect(TokenKind::Name, "as the configuration key name")?.spelling;
            ts.expect(TokenKind::Equals, "to separate configuration key and value")?;
            let value = ts.expect(TokenKind::String, "as the value for the configuration key")?.spelling;
            if !config.is_empty() {
                config.push(',');
            }
            config.push_str(&key);
            config.push('=');
            config.push_str(&value);
            if !ts.consume(TokenKind::Comma) {
                break;
            }
        }
    }

    Ok((module, config))
}

/// Parses `from "name" use name [as alias]` / `from "name" use all`.
#[allow(clippy::type_complexity)]
fn parse_from_annotation(ts: &mut Tokens) -> Result<(String, Option<String>, Option<String>), JudgedError> {
    ts.consume(TokenKind::Name);
    let module = ts.expect(TokenKind::String, "to indicate from which module to use")?.spelling;

    if ts.test_keyword("use") {
        ts.expect_keyword("use", "")?;
        let predicate_name = ts
            .expect(TokenKind::Name, "as the predicate name to use, or the indicator 'all' to use all predicates")?
            .spelling;
        if predicate_name == "all" {
            return Ok((module, None, None));
        }
        let mut alias = None;
        if ts.test_keyword("as") {
            ts.expect_keyword("as", "to separate used predicate and alias")?;
            alias = Some(ts.expect(TokenKind::Name, "to give the alias under which the predicate should be used")?.spelling);
        }
        Ok((module, Some(predicate_name), alias))
    } else {
        let line = ts.peek().map(|t| t.line).unwrap_or(ts.last_line);
        Err(JudgedError::parse(
            "expected keyword 'use' to indicate which predicates to use from the module".to_string(),
            LocationContext::single(line),
        ))
    }
}

/// Parses one full program: a sequence of clause-actions and
/// annotations, terminated by EOF (`_parse`, `parser.py`).
pub fn parse_program(source: &str) -> Result<Vec<Action>, JudgedError> {
    let tokens = tokenize(source)?;
    let mut ts = Tokens::new(tokens);
    let mut actions = Vec::new();

    while !ts.is_empty() {
        let start_line = ts.peek().map(|t| t.line).unwrap_or(ts.last_line);

        if ts.consume(TokenKind::At) {
            let end_tok = ts.peek();
            let action = parse_annotation(&mut ts, LocationContext::single(start_line))?;
            ts.next(|t| t.kind == TokenKind::Period, "expected period to close annotation")?;
            let _ = end_tok;
            actions.push(action);
        } else {
            let clause = parse_clause(&mut ts)?;
            let action_tok = ts.next(
                |t| matches!(t.kind, TokenKind::Period | TokenKind::Tilde | TokenKind::Query),
                "expected period, tilde or question mark to indicate action",
            )?;
            let source = LocationContext::new(start_line, action_tok.line);
            let action = match action_tok.kind {
                TokenKind::Period => Action::Assert(AssertAction { clause, source: Some(source) }),
                TokenKind::Tilde => Action::Retract(RetractAction { clause, source: Some(source) }),
                TokenKind::Query => Action::Query(QueryAction::new(clause, Some(source))?),
                _ => unreachable!(),
            };
            actions.push(action);
        }
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fact_assertion() {
        let actions = parse_program("parent(tom, liz).").unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::Assert(_)));
    }

    #[test]
    fn parses_a_rule_with_a_descriptive_sentence() {
        let actions = parse_program("flip(X) :- coin(X) [weather = rainy].").unwrap();
        let Action::Assert(a) = &actions[0] else { panic!("expected assert") };
        assert_eq!(a.clause.body().len(), 1);
        assert!(matches!(a.clause.sentence(), Sentence::Label(_)));
    }

    #[test]
    fn parses_a_retraction_and_a_query() {
        let actions = parse_program("p(a)~ p(a)?").unwrap();
        assert!(matches!(actions[0], Action::Retract(_)));
        assert!(matches!(actions[1], Action::Query(_)));
    }

    #[test]
    fn parses_an_infix_equality_literal() {
        let actions = parse_program("a = b?").unwrap();
        let Action::Query(q) = &actions[0] else { panic!("expected query") };
        assert_eq!(q.literal().predicate().name(), "=");
    }

    #[test]
    fn parses_a_probability_annotation() {
        let actions = parse_program("@P(weather = rainy) = 0.3.").unwrap();
        assert!(matches!(actions[0], Action::AnnotateProbability(_)));
    }

    #[test]
    fn parses_a_uniform_annotation() {
        let actions = parse_program("@uniform p(weather).").unwrap();
        assert!(matches!(actions[0], Action::AnnotateDistribution(_)));
    }

    #[test]
    fn parses_a_use_annotation_with_config() {
        let actions = parse_program("@use \"sql\" with table=\"people\".").unwrap();
        let Action::UseModule(a) = &actions[0] else { panic!("expected use module") };
        assert_eq!(a.module, "sql");
        assert_eq!(a.config, "table=people");
    }

    #[test]
    fn parses_a_from_use_with_alias() {
        let actions = parse_program("@from \"sql\" use lookup as find.").unwrap();
        let Action::UsePredicate(a) = &actions[0] else { panic!("expected use predicate") };
        assert_eq!(a.module, "sql");
        assert_eq!(a.predicate, "lookup");
        assert_eq!(a.alias.as_deref(), Some("find"));
    }

    #[test]
    fn parses_an_and_or_sentence() {
        let actions = parse_program("p(a) [x = y and (z = w or not u = v)].").unwrap();
        let Action::Assert(a) = &actions[0] else { panic!("expected assert") };
        assert!(matches!(a.clause.sentence(), Sentence::And(_)));
    }

    #[test]
    fn rejects_a_query_with_a_body() {
        let result = parse_program("p(a) :- q(a)?");
        assert!(matches!(result, Err(JudgedError::QueryShape(_))));
    }
}
