//! Shape detection for single expressions.

use serde::Serialize;

use crate::sexpr::{Expr, WILDCARD, matches};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PatternKind {
    PropositionAssertion,
    Contradiction,
    Conflict,
    Violation,
    Compliance,
    Unknown,
}

/// Checked in order; the first match wins.
const PATTERNS: &[(PatternKind, &[&str])] = &[
    (PatternKind::PropositionAssertion, &["triple", WILDCARD, "type", "rexist"]),
    (PatternKind::Contradiction, &["id_not_not_false", WILDCARD]),
    (PatternKind::Conflict, &["conflict", WILDCARD, WILDCARD]),
    (PatternKind::Violation, &["quote", WILDCARD]),
    (PatternKind::Compliance, &["is_complied_with_by", WILDCARD, WILDCARD]),
];

pub fn detect_pattern(expr: &Expr) -> PatternKind {
    PATTERNS
        .iter()
        .find(|(_, pattern)| matches(expr, pattern))
        .map_or(PatternKind::Unknown, |(kind, _)| *kind)
}

pub fn find_patterns_of_kind(exprs: &[Expr], kind: PatternKind) -> Vec<&Expr> {
    exprs.iter().filter(|expr| detect_pattern(expr) == kind).collect()
}
