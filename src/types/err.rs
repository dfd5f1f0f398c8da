/*!
Error types used in the library (spec §7).

A flat taxonomy, not a hierarchy: every error that can cross a public
boundary is a variant of [JudgedError]. Some variants carry a
[LocationContext] when they originate from the surface-syntax layer,
where a line range is meaningful; core errors do not since they arise
from in-memory structures with no source position.
*/

use std::fmt;

/// A line range in the surface-syntax source an error was raised for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocationContext {
    pub start_line: usize,
    pub stop_line: usize,
}

impl LocationContext {
    pub fn new(start_line: usize, stop_line: usize) -> Self {
        LocationContext {
            start_line,
            stop_line,
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }
}

impl fmt::Display for LocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.stop_line {
            write!(f, "line {}", self.start_line)
        } else {
            write!(f, "lines {}-{}", self.start_line, self.stop_line)
        }
    }
}

/// The union of every error kind the library may surface (spec §7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JudgedError {
    /// A tokenizer could not make sense of a character sequence.
    TokenizeError {
        message: String,
        location: LocationContext,
    },

    /// A parser could not build a well-formed clause/action from a token
    /// stream.
    ParseError {
        message: String,
        location: LocationContext,
    },

    /// `Knowledge::assert_clause` rejected an unsafe clause (spec §3's
    /// safety invariant).
    Safety(String),

    /// A `QueryAction`/`GeneratorAction` clause was not a bare literal
    /// with a `Top` sentence.
    QueryShape(String),

    /// The `ExactProver` encountered a negative literal, which it cannot
    /// handle.
    Unsupported(String),

    /// A `MontecarloContext` sampled a partitioning with no, or a
    /// sub-normalised, probability distribution.
    Distribution(String),

    /// A primitive predicate touched the per-query cache without one
    /// being configured for it.
    Cache(String),

    /// Extension registration or lookup failed.
    Extension(String),

    /// A prover-imposed iteration/stack-depth bound was exceeded.
    Limit(String),

    /// A context-level cancellation token fired mid-`ask` (spec §5).
    Cancelled,
}

impl fmt::Display for JudgedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgedError::TokenizeError { message, location } => {
                write!(f, "tokenize error at {location}: {message}")
            }
            JudgedError::ParseError { message, location } => {
                write!(f, "parse error at {location}: {message}")
            }
            JudgedError::Safety(clause) => {
                write!(f, "asserted clause is unsafe: '{clause}'")
            }
            JudgedError::QueryShape(message) => write!(f, "invalid query shape: {message}"),
            JudgedError::Unsupported(message) => write!(f, "unsupported: {message}"),
            JudgedError::Distribution(message) => write!(f, "distribution error: {message}"),
            JudgedError::Cache(message) => write!(f, "cache error: {message}"),
            JudgedError::Extension(message) => write!(f, "extension error: {message}"),
            JudgedError::Limit(message) => write!(f, "limit exceeded: {message}"),
            JudgedError::Cancelled => write!(f, "query cancelled"),
        }
    }
}

impl std::error::Error for JudgedError {}

impl JudgedError {
    pub fn parse(message: impl Into<String>, location: LocationContext) -> Self {
        JudgedError::ParseError {
            message: message.into(),
            location,
        }
    }

    pub fn tokenize(message: impl Into<String>, location: LocationContext) -> Self {
        JudgedError::TokenizeError {
            message: message.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_location_for_parse_errors() {
        let e = JudgedError::parse("unexpected token", LocationContext::single(3));
        assert!(e.to_string().contains("line 3"));
    }
}
