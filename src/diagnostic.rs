//! Non-fatal findings reported alongside results.
//!
//! Malformed spans in engine output and unrecognized vocabulary in
//! knowledge documents never abort a pass; they are collected here so the
//! caller can show them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a recoverable finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A span of input could not be read and was skipped.
    Parse,
    /// An eventuality type outside the known vocabulary.
    UnknownType,
    /// A role predicate outside the known vocabulary.
    UnknownRole,
    /// A predicate that is neither structural nor a known role.
    UnknownPredicate,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::UnknownType => write!(f, "unknown-type"),
            Self::UnknownRole => write!(f, "unknown-role"),
            Self::UnknownPredicate => write!(f, "unknown-predicate"),
        }
    }
}

/// A recoverable finding with an optional 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Attach a 1-based source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Whether this finding is a warning rather than a skipped span.
    pub fn is_warning(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::Parse)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {line}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}
