//! Lexer: splits engine output into bracket and atom tokens.
//!
//! A token is either a single bracket character or a maximal run of
//! characters that are neither whitespace nor brackets. There is no
//! quoting, escaping, or comment syntax at this level.

use std::fmt;

/// The two bracket families the reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    /// `(` … `)`
    Round,
    /// `[` … `]`
    Square,
}

impl Bracket {
    /// The closing character for this bracket family.
    pub fn close(self) -> char {
        match self {
            Self::Round => ')',
            Self::Square => ']',
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.close())
    }
}

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Open(Bracket),
    Close(Bracket),
    Atom(&'a str),
}

/// A single token with its byte offset into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

/// Whether `c` terminates an atom.
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']')
}

/// Streaming tokenizer over a borrowed input buffer.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte length of the underlying input.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();
        let start = self.pos;
        let c = self.input[start..].chars().next()?;

        let kind = match c {
            '(' => TokenKind::Open(Bracket::Round),
            '[' => TokenKind::Open(Bracket::Square),
            ')' => TokenKind::Close(Bracket::Round),
            ']' => TokenKind::Close(Bracket::Square),
            _ => {
                let rest = &self.input[start..];
                let len = rest.find(is_delimiter).unwrap_or(rest.len());
                self.pos = start + len;
                return Some(Token {
                    kind: TokenKind::Atom(&rest[..len]),
                    offset: start,
                });
            }
        };

        self.pos = start + c.len_utf8();
        Some(Token {
            kind,
            offset: start,
        })
    }
}

/// Convenience: collect every token of `input`.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
