//! Semantic classification of reasoning-engine output.
//!
//! The engine prints a stream of expressions, often wrapped one level deep
//! in result lists. Each category has its own detector over the parsed
//! stream; a detector that finds nothing contributes nothing, and
//! classification never fails:
//!
//! - **Propositions** (`proposition`): eventualities asserted to exist
//! - **Contradictions** (`contradiction`): refuted existence or actions
//! - **Conflicts** (`conflict`): regulations pulling in opposite directions
//! - **Violations** (`violation`): rules that must be broken
//! - **Compliances** (`compliance`): obligations and what fulfils them

pub mod compliance;
pub mod conflict;
pub mod contradiction;
pub mod metrics;
pub mod pattern;
pub mod proposition;
pub mod violation;

use rayon::prelude::*;
use serde::Serialize;

use crate::diagnostic::Diagnostic;
use crate::resolver::{DescriptionTemplates, EntityResolver};
use crate::sexpr::{Expr, parse_resilient};

pub use compliance::{Compliance, find_compliances};
pub use conflict::{Conflict, find_conflicts, parse_conflict};
pub use contradiction::{Contradiction, ContradictionKind, base_action_key, find_contradictions};
pub use metrics::{ComplianceDetail, ConflictDetail, ContradictionDetail, Metrics, ViolationDetail};
pub use pattern::{PatternKind, detect_pattern, find_patterns_of_kind};
pub use proposition::{Proposition, extract_propositions};
pub use violation::{VIOLATION_REASON, Violation, find_violations, parse_violation};

/// `expr` followed by its children when it is a list.
pub(crate) fn with_children(expr: &Expr) -> impl Iterator<Item = &Expr> {
    std::iter::once(expr).chain(expr.as_list().unwrap_or_default())
}

/// Everything found in one engine output buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub propositions: Vec<Proposition>,
    pub contradictions: Vec<Contradiction>,
    pub conflicts: Vec<Conflict>,
    pub violations: Vec<Violation>,
    pub compliances: Vec<Compliance>,
    /// Lines skipped because they could not be read.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    /// Whether no category found anything.
    pub fn is_empty(&self) -> bool {
        self.propositions.is_empty()
            && self.contradictions.is_empty()
            && self.conflicts.is_empty()
            && self.violations.is_empty()
            && self.compliances.is_empty()
    }
}

/// Classifier over shared, read-only resolver tables.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    resolver: &'a EntityResolver,
    templates: &'a DescriptionTemplates,
}

impl<'a> Classifier<'a> {
    pub fn new(resolver: &'a EntityResolver, templates: &'a DescriptionTemplates) -> Self {
        Self { resolver, templates }
    }

    pub fn resolver(&self) -> &'a EntityResolver {
        self.resolver
    }

    pub fn templates(&self) -> &'a DescriptionTemplates {
        self.templates
    }

    /// Parse `output` (falling back to line-by-line reading when it is not
    /// one well-formed stream) and classify it.
    pub fn analyze(&self, output: &str) -> AnalysisResult {
        let (exprs, diagnostics) = parse_resilient(output);
        let mut result = self.classify(&exprs);
        result.diagnostics = diagnostics;

        tracing::debug!(
            expressions = exprs.len(),
            propositions = result.propositions.len(),
            contradictions = result.contradictions.len(),
            conflicts = result.conflicts.len(),
            violations = result.violations.len(),
            compliances = result.compliances.len(),
            skipped = result.diagnostics.len(),
            "classified engine output"
        );
        result
    }

    /// Classify already-parsed expressions.
    pub fn classify(&self, exprs: &[Expr]) -> AnalysisResult {
        AnalysisResult {
            propositions: extract_propositions(exprs, self.resolver),
            contradictions: find_contradictions(exprs, self.resolver),
            conflicts: find_conflicts(exprs, self.resolver),
            violations: find_violations(exprs, self.resolver),
            compliances: find_compliances(exprs, self.resolver),
            diagnostics: Vec::new(),
        }
    }

    /// Analyze independent outputs in parallel, preserving input order.
    pub fn analyze_batch(&self, outputs: &[&str]) -> Vec<AnalysisResult> {
        outputs.par_iter().map(|output| self.analyze(output)).collect()
    }

    /// Analyze and project into [`Metrics`] in one step.
    pub fn metrics(&self, output: &str) -> Metrics {
        self.analyze(output).to_metrics(self.resolver, self.templates)
    }
}
