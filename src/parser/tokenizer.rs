/*!
Tokenizes JudgeD surface syntax (spec §6) into a flat stream of
[Token]s, each carrying the 1-based source line it started on.

Grounded line-for-line in `original_source/datalog/tokenizer.py`'s
hand-rolled character-state-machine tokenizer (preferred over
`original_source/judged/tokenizer.py`, which differs only in its
import path) — the original deliberately avoids a parser-combinator or
regex-based approach, so this keeps the same explicit state machine
rather than reaching for a lexer crate.
*/

use crate::types::{JudgedError, LocationContext};

/// One lexical token, tagged by kind, spelling, and the line it started
/// on.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, spelling: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            spelling: spelling.into(),
            line,
        }
    }
}

/// The kinds of token the tokenizer produces (`datalog/tokens.py`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Comma,
    Equals,
    NEquals,
    Where,
    Period,
    Tilde,
    Query,
    Name,
    String,
    Number,
    LBracket,
    RBracket,
    At,
}

fn punctuation(spelling: &str) -> Option<TokenKind> {
    Some(match spelling {
        "(" => TokenKind::LParen,
        ")" => TokenKind::RParen,
        "," => TokenKind::Comma,
        "=" => TokenKind::Equals,
        "!=" => TokenKind::NEquals,
        ":-" => TokenKind::Where,
        "." => TokenKind::Period,
        "~" => TokenKind::Tilde,
        "?" => TokenKind::Query,
        "[" => TokenKind::LBracket,
        "]" => TokenKind::RBracket,
        "@" => TokenKind::At,
        _ => return None,
    })
}

fn is_punctuation_start(c: char) -> bool {
    matches!(c, '(' | ')' | ',' | '=' | '!' | ':' | '.' | '~' | '?' | '[' | ']' | '@')
}

fn is_identifier_char(c: char) -> bool {
    !is_punctuation_start(c) && !c.is_whitespace() && c != '%' && c != '"'
}

fn string_escape(c: char) -> Option<char> {
    Some(match c {
        'n' => '\n',
        '\\' => '\\',
        '"' => '"',
        '\'' => '\'',
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0B}',
        _ => return None,
    })
}

/// A pushback-aware character cursor that tracks the current line.
struct Characters {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Characters {
    fn new(source: &str) -> Self {
        Characters {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn next(&mut self) -> Option<char> {
        if self.pos >= self.chars.len() {
            return None;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Pushes the cursor back by one character (only ever used to undo
    /// the single character just read by `next`).
    fn push_back(&mut self, c: char) {
        if c == '\n' {
            self.line -= 1;
        }
        self.pos -= 1;
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Neutral,
    Name,
    Punct,
    Comment,
    Str,
    StrEsc,
    Number,
    NumberFractional,
}

/// Tokenizes `source` in full, per `datalog/tokenizer.py`'s `tokenize`
/// generator, collected eagerly rather than lazily (the parser consumes
/// the whole stream anyway, and eager collection keeps error locations
/// simple to compute).
pub fn tokenize(source: &str) -> Result<Vec<Token>, JudgedError> {
    let mut cs = Characters::new(source);
    let mut tokens = Vec::new();
    let mut state = State::Neutral;
    let mut accum = String::new();
    let mut line = 0usize;

    while let Some(c) = cs.next() {
        match state {
            State::Neutral => {
                if c == '-' {
                    match cs.next() {
                        Some(c2) if c2.is_ascii_digit() => {
                            cs.push_back(c2);
                            state = State::Number;
                            accum.push(c);
                            line = cs.line;
                            continue;
                        }
                        Some(c2) => cs.push_back(c2),
                        None => {}
                    }
                }

                if c.is_ascii_digit() {
                    state = State::Number;
                    accum.push(c);
                    line = cs.line;
                } else if is_identifier_char(c) {
                    state = State::Name;
                    accum.push(c);
                    line = cs.line;
                } else if is_punctuation_start(c) {
                    state = State::Punct;
                    accum.push(c);
                    line = cs.line;
                } else if c == '%' {
                    state = State::Comment;
                    line = cs.line;
                } else if c == '"' {
                    state = State::Str;
                    line = cs.line;
                }
                // else: whitespace and unclaimed garbage, skipped
            }

            State::Comment => {
                if c == '\n' {
                    state = State::Neutral;
                }
            }

            State::Name => {
                if is_identifier_char(c) {
                    accum.push(c);
                } else {
                    tokens.push(Token::new(TokenKind::Name, std::mem::take(&mut accum), line));
                    cs.push_back(c);
                    state = State::Neutral;
                }
            }

            State::Punct => {
                let mut joined = accum.clone();
                joined.push(c);
                if let Some(kind) = punctuation(&joined) {
                    tokens.push(Token::new(kind, joined, line));
                    accum.clear();
                    state = State::Neutral;
                } else if let Some(kind) = punctuation(&accum) {
                    tokens.push(Token::new(kind, std::mem::take(&mut accum), line));
                    cs.push_back(c);
                    state = State::Neutral;
                } else {
                    return Err(JudgedError::tokenize("unknown punctuation mark", LocationContext::single(cs.line)));
                }
            }

            State::Str => {
                if c == '"' {
                    tokens.push(Token::new(TokenKind::String, std::mem::take(&mut accum), line));
                    state = State::Neutral;
                } else if c == '\\' {
                    state = State::StrEsc;
                } else if c == '\n' {
                    return Err(JudgedError::tokenize("newline in string literal", LocationContext::single(cs.line)));
                } else {
                    accum.push(c);
                }
            }

            State::StrEsc => {
                if let Some(escaped) = string_escape(c) {
                    accum.push(escaped);
                    state = State::Str;
                } else if c.is_digit(8) {
                    let mut octal = String::new();
                    octal.push(c);
                    for _ in 0..2 {
                        match cs.next() {
                            Some(c2) if c2.is_digit(8) => octal.push(c2),
                            Some(c2) => {
                                cs.push_back(c2);
                                break;
                            }
                            None => {
                                return Err(JudgedError::tokenize(
                                    "end of file in octal character escape",
                                    LocationContext::single(cs.line),
                                ));
                            }
                        }
                    }
                    let value = u32::from_str_radix(&octal, 8).unwrap_or(0);
                    if let Some(decoded) = char::from_u32(value) {
                        accum.push(decoded);
                    }
                    state = State::Str;
                } else {
                    return Err(JudgedError::tokenize("unrecognised string escape", LocationContext::single(cs.line)));
                }
            }

            State::Number => {
                if c.is_ascii_digit() {
                    accum.push(c);
                } else if c == '.' {
                    match cs.next() {
                        Some(c2) if c2.is_ascii_digit() => {
                            cs.push_back(c2);
                            accum.push(c);
                            state = State::NumberFractional;
                        }
                        c2 => {
                            tokens.push(Token::new(TokenKind::Number, std::mem::take(&mut accum), line));
                            if let Some(c2) = c2 {
                                cs.push_back(c2);
                            }
                            cs.push_back(c);
                            state = State::Neutral;
                        }
                    }
                } else {
                    tokens.push(Token::new(TokenKind::Number, std::mem::take(&mut accum), line));
                    cs.push_back(c);
                    state = State::Neutral;
                }
            }

            State::NumberFractional => {
                if c.is_ascii_digit() {
                    accum.push(c);
                } else {
                    tokens.push(Token::new(TokenKind::Number, std::mem::take(&mut accum), line));
                    cs.push_back(c);
                    state = State::Neutral;
                }
            }
        }
    }

    match state {
        State::Neutral => {}
        State::Name => tokens.push(Token::new(TokenKind::Name, accum, line)),
        State::Punct => {
            if let Some(kind) = punctuation(&accum) {
                tokens.push(Token::new(kind, accum, line));
            } else {
                return Err(JudgedError::tokenize("end of file in punctuation", LocationContext::single(cs.line)));
            }
        }
        State::Str => return Err(JudgedError::tokenize("end of file in string literal", LocationContext::single(cs.line))),
        State::StrEsc => return Err(JudgedError::tokenize("end of file in string escape", LocationContext::single(cs.line))),
        State::Number | State::NumberFractional => tokens.push(Token::new(TokenKind::Number, accum, line)),
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_simple_fact() {
        let tokens = tokenize("parent(tom, liz).").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Name,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::Comma,
                TokenKind::Name,
                TokenKind::RParen,
                TokenKind::Period,
            ]
        );
    }

    #[test]
    fn tokenizes_a_rule_with_a_sentence() {
        let tokens = tokenize("flip(X) :- coin(X) [weather = rainy].").unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Where));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::LBracket));
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let tokens = tokenize("a.\nb.\n").unwrap();
        let lines: Vec<usize> = tokens.iter().filter(|t| t.kind == TokenKind::Name).map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("a. % a trailing comment\nb.").unwrap();
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Name).count(), 2);
    }

    #[test]
    fn unterminated_string_is_a_tokenize_error() {
        let result = tokenize("\"unterminated");
        assert!(matches!(result, Err(JudgedError::TokenizeError { .. })));
    }

    #[test]
    fn negative_numbers_are_single_tokens() {
        let tokens = tokenize("weighs(-3).").unwrap();
        let number = tokens.iter().find(|t| t.kind == TokenKind::Number).unwrap();
        assert_eq!(number.spelling, "-3");
    }
}
