//! Reader: builds [`Expr`] trees from a token stream.
//!
//! `(` must close with `)` and `[` with `]`. A failure anywhere aborts the
//! whole call; [`parse_lines`] and [`parse_resilient`] provide the
//! line-segmented fallback for engine output that is not one well-formed
//! stream.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use super::Expr;
use super::lexer::{Bracket, Lexer, TokenKind};
use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Errors produced by the expression reader.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ParseError {
    #[error("unexpected end of input at byte {offset}")]
    #[diagnostic(
        code(metta::sexpr::unexpected_eof),
        help(
            "The input is empty or a list was left open. \
             Check that every '(' and '[' has a matching closer."
        )
    )]
    UnexpectedEof { offset: usize },

    #[error("unexpected closing '{found}' at byte {offset}")]
    #[diagnostic(
        code(metta::sexpr::unexpected_close),
        help("A closing bracket appeared with no list open. Remove it or add the missing opener.")
    )]
    UnexpectedClose { found: char, offset: usize },

    #[error("mismatched bracket at byte {offset}: expected '{expected}', found '{found}'")]
    #[diagnostic(
        code(metta::sexpr::mismatched_bracket),
        help("'(' must close with ')' and '[' with ']'; the two are not interchangeable.")
    )]
    MismatchedBracket {
        expected: char,
        found: char,
        offset: usize,
    },
}

/// The three failure shapes of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    UnexpectedEof,
    UnexpectedClose,
    MismatchedBracket,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::UnexpectedEof { .. } => ParseErrorKind::UnexpectedEof,
            Self::UnexpectedClose { .. } => ParseErrorKind::UnexpectedClose,
            Self::MismatchedBracket { .. } => ParseErrorKind::MismatchedBracket,
        }
    }

    /// Byte offset of the offending position.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedEof { offset }
            | Self::UnexpectedClose { offset, .. }
            | Self::MismatchedBracket { offset, .. } => *offset,
        }
    }
}

/// Result type for reader operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

struct Frame {
    bracket: Bracket,
    children: Vec<Expr>,
}

/// Pull-based reader over one input buffer.
pub struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Read the next top-level expression, or `None` once input is exhausted.
    ///
    /// Nesting is tracked on an explicit stack so deeply nested engine
    /// output cannot exhaust the call stack.
    pub fn next_expr(&mut self) -> ParseResult<Option<Expr>> {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let Some(token) = self.lexer.next() else {
                return if stack.is_empty() {
                    Ok(None)
                } else {
                    Err(ParseError::UnexpectedEof {
                        offset: self.lexer.input_len(),
                    })
                };
            };

            let complete = match token.kind {
                TokenKind::Open(bracket) => {
                    stack.push(Frame {
                        bracket,
                        children: Vec::new(),
                    });
                    None
                }
                TokenKind::Close(found) => {
                    let Some(frame) = stack.pop() else {
                        return Err(ParseError::UnexpectedClose {
                            found: found.close(),
                            offset: token.offset,
                        });
                    };
                    if frame.bracket != found {
                        return Err(ParseError::MismatchedBracket {
                            expected: frame.bracket.close(),
                            found: found.close(),
                            offset: token.offset,
                        });
                    }
                    Some(Expr::List(frame.children))
                }
                TokenKind::Atom(text) => Some(Expr::Atom(text.to_string())),
            };

            if let Some(expr) = complete {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(expr),
                    None => return Ok(Some(expr)),
                }
            }
        }
    }
}

/// Parse the first expression in `input`. Anything after it is ignored.
pub fn parse_one(input: &str) -> ParseResult<Expr> {
    Reader::new(input)
        .next_expr()?
        .ok_or(ParseError::UnexpectedEof { offset: input.len() })
}

/// Parse every top-level expression in `input`, all or nothing.
pub fn parse_all(input: &str) -> ParseResult<Vec<Expr>> {
    let mut reader = Reader::new(input);
    let mut exprs = Vec::new();
    while let Some(expr) = reader.next_expr()? {
        exprs.push(expr);
    }
    Ok(exprs)
}

/// Best-effort parse, one line at a time.
///
/// Only lines whose first non-blank character is an opening bracket are
/// considered. Each unreadable line is skipped and reported.
pub fn parse_lines(input: &str) -> (Vec<Expr>, Vec<Diagnostic>) {
    let mut exprs = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with(['(', '[']) {
            continue;
        }
        match parse_all(trimmed) {
            Ok(parsed) => exprs.extend(parsed),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "skipping unreadable line");
                diagnostics
                    .push(Diagnostic::new(DiagnosticKind::Parse, e.to_string()).at_line(idx + 1));
            }
        }
    }

    (exprs, diagnostics)
}

/// Parse the whole buffer, falling back to [`parse_lines`] when it is not
/// one well-formed stream.
pub fn parse_resilient(input: &str) -> (Vec<Expr>, Vec<Diagnostic>) {
    match parse_all(input) {
        Ok(exprs) => (exprs, Vec::new()),
        Err(e) => {
            tracing::debug!(error = %e, "full parse failed, segmenting by line");
            parse_lines(input)
        }
    }
}
