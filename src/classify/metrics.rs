//! Flat projection of an analysis for report renderers.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AnalysisResult, Compliance, Conflict, Contradiction, ContradictionKind, Violation};
use crate::resolver::{ConflictContext, DescriptionTemplates, EntityResolver, Tense};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictDetail {
    pub entity1: String,
    pub entity2: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationDetail {
    pub violator: String,
    pub violated_rule: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContradictionDetail {
    pub entity1: String,
    pub entity2: String,
    pub kind: ContradictionKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceDetail {
    pub entity: String,
    pub obligation: String,
    pub fulfilled_by: String,
    pub description: String,
}

/// Category counts plus one human-readable detail per finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub contradictions: usize,
    pub contradiction_pairs: usize,
    pub compliances: usize,
    pub conflicts: usize,
    pub violations: usize,
    pub inferred_facts: usize,
    pub inferred_state_of_affairs: Vec<String>,
    pub conflict_details: Vec<ConflictDetail>,
    pub violation_details: Vec<ViolationDetail>,
    pub contradiction_details: Vec<ContradictionDetail>,
    pub compliance_details: Vec<ComplianceDetail>,
}

impl Metrics {
    pub fn total(&self) -> usize {
        self.contradiction_pairs
            + self.compliances
            + self.conflicts
            + self.violations
            + self.inferred_facts
    }

    pub fn has_positive_inferences(&self) -> bool {
        self.inferred_facts > 0 || self.compliances > 0
    }

    pub fn has_negative_inferences(&self) -> bool {
        self.contradictions > 0 || self.conflicts > 0 || self.violations > 0
    }
}

impl AnalysisResult {
    /// Project into [`Metrics`], describing each finding with `templates`.
    pub fn to_metrics(
        &self,
        resolver: &EntityResolver,
        templates: &DescriptionTemplates,
    ) -> Metrics {
        Metrics {
            contradictions: self.contradictions.len(),
            contradiction_pairs: self.contradictions.len(),
            compliances: self.compliances.len(),
            conflicts: self.conflicts.len(),
            violations: self.violations.len(),
            inferred_facts: self.propositions.len(),
            inferred_state_of_affairs: self.propositions.iter().map(ToString::to_string).collect(),
            conflict_details: self
                .conflicts
                .iter()
                .map(|c| ConflictDetail {
                    entity1: c.regulation1.clone(),
                    entity2: c.regulation2.clone(),
                    description: describe_conflict(c, resolver, templates),
                })
                .collect(),
            violation_details: self
                .violations
                .iter()
                .map(|v| ViolationDetail {
                    violator: v.violator.clone(),
                    violated_rule: v.violated_rule.clone(),
                    description: describe_violation(v, resolver, templates),
                })
                .collect(),
            contradiction_details: self
                .contradictions
                .iter()
                .map(|c| ContradictionDetail {
                    entity1: c.positive.to_string(),
                    entity2: c.negative.to_string(),
                    kind: c.kind,
                    description: describe_contradiction(c, resolver, templates),
                })
                .collect(),
            compliance_details: self
                .compliances
                .iter()
                .map(|c| ComplianceDetail {
                    entity: c.entity.clone(),
                    obligation: c.obligation.clone(),
                    fulfilled_by: c.fulfilled_by.clone(),
                    description: describe_compliance(c, resolver, templates),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptions
// ---------------------------------------------------------------------------

pub fn describe_contradiction(
    contradiction: &Contradiction,
    resolver: &EntityResolver,
    templates: &DescriptionTemplates,
) -> String {
    let positive = &contradiction.positive;
    match contradiction.kind {
        ContradictionKind::Action => {
            let agent = resolver.resolve_entity(&positive.entity);
            templates.contradiction_description(
                &format!("{agent} {}", positive.action),
                &format!("{agent} does not {}", positive.action),
                ContradictionKind::Action.as_str(),
            )
        }
        ContradictionKind::Existence => {
            let entity = resolver.resolve_entity(&positive.entity);
            let vars = BTreeMap::from([
                ("entity", entity.as_str()),
                ("action1", "exist"),
                ("action2", "not exist"),
            ]);
            templates
                .render("contradiction_existence", &vars)
                .unwrap_or_else(|| {
                    format!("Contradiction: {entity} both exists and does not exist")
                })
        }
        kind => templates.contradiction_description(
            &positive.to_string(),
            &contradiction.negative.to_string(),
            kind.as_str(),
        ),
    }
}

pub fn describe_conflict(
    conflict: &Conflict,
    resolver: &EntityResolver,
    templates: &DescriptionTemplates,
) -> String {
    let regulation1 = resolver.resolve_entity(&conflict.regulation1);
    let regulation2 = resolver.resolve_entity(&conflict.regulation2);
    let reason = format!(
        "{regulation1} conflicts with {regulation2} regarding {}",
        conflict.conflicting_requirement
    );
    let action = if conflict.affected_id.is_empty() {
        conflict.conflicting_requirement.clone()
    } else {
        resolver.resolve_action(&conflict.affected_id, Tense::Base)
    };
    templates.conflict_description(ConflictContext {
        entity: &conflict.affected_entity,
        regulation1: &regulation1,
        regulation2: &regulation2,
        reason: &reason,
        action: &action,
    })
}

pub fn describe_violation(
    violation: &Violation,
    resolver: &EntityResolver,
    templates: &DescriptionTemplates,
) -> String {
    templates.violation_description(
        &resolver.resolve_entity(&violation.violator),
        &resolver.resolve_entity(&violation.violated_rule),
        &violation.reason,
    )
}

pub fn describe_compliance(
    compliance: &Compliance,
    resolver: &EntityResolver,
    templates: &DescriptionTemplates,
) -> String {
    templates.compliance_description(
        &resolver.resolve_entity(&compliance.entity),
        &resolver.resolve_entity(&compliance.obligation),
        &resolver.resolve_entity(&compliance.fulfilled_by),
    )
}
