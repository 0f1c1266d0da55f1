//! Asserted propositions: eventualities the engine inferred to exist.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::with_children;
use crate::knowledge::vocabulary::REXIST;
use crate::resolver::{EntityResolver, Tense};
use crate::sexpr::{Expr, TermTriple};

/// Subjects that are engine bookkeeping rather than eventualities.
const EXCLUDED_SUBJECTS: &[&str] = &["soa_eo", "soa_ea"];
const EXCLUDED_FRAGMENTS: &[&str] = &["disjunction", "id_not_not_false"];

/// One inferred real-world statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Proposition {
    pub entity: String,
    pub action: String,
    pub agent: String,
    pub instrument: String,
    pub exists: bool,
    /// Remaining `(predicate, object)` facts about the subject.
    pub properties: BTreeMap<String, String>,
}

impl Proposition {
    /// A proposition that only names `entity`.
    pub fn named(entity: impl Into<String>, exists: bool) -> Self {
        Self {
            entity: entity.into(),
            exists,
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = instrument.into();
        self
    }
}

/// `[agent ]action[ using instrument][ (negated)]`, falling back to the
/// entity when no action is known.
impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.agent.is_empty() {
            write!(f, "{} ", self.agent)?;
        }
        if self.action.is_empty() {
            f.write_str(&self.entity)?;
        } else {
            f.write_str(&self.action)?;
        }
        if !self.instrument.is_empty() {
            write!(f, " using {}", self.instrument)?;
        }
        if !self.exists {
            f.write_str(" (negated)")?;
        }
        Ok(())
    }
}

fn is_excluded(subject: &str) -> bool {
    EXCLUDED_SUBJECTS.contains(&subject)
        || EXCLUDED_FRAGMENTS.iter().any(|frag| subject.contains(frag))
}

/// Group `triple` facts by subject and keep the subjects asserted both to
/// exist and to be of an action type.
///
/// Triples are read at the top level and one level inside wrapper lists.
pub fn extract_propositions(exprs: &[Expr], resolver: &EntityResolver) -> Vec<Proposition> {
    let mut by_subject: BTreeMap<String, Vec<TermTriple>> = BTreeMap::new();
    for expr in exprs {
        for candidate in with_children(expr) {
            let Some(triple) = TermTriple::from_expr(candidate) else {
                continue;
            };
            if triple.subject.starts_with("soa_") && !is_excluded(&triple.subject) {
                by_subject.entry(triple.subject.clone()).or_default().push(triple);
            }
        }
    }

    by_subject
        .into_iter()
        .filter_map(|(subject, triples)| build(subject, &triples, resolver))
        .collect()
}

fn build(
    subject: String,
    triples: &[TermTriple],
    resolver: &EntityResolver,
) -> Option<Proposition> {
    let mut prop = Proposition::named(subject, false);
    let mut has_action = false;

    for triple in triples {
        match (triple.predicate.as_str(), triple.object.as_str()) {
            ("type", REXIST) => prop.exists = true,
            ("type", kind) if kind.starts_with("soa") && kind.len() > 3 => {
                has_action = true;
                prop.action = resolver.resolve_action(kind, Tense::Base);
            }
            ("soaHas_agent", agent) => prop.agent = resolver.resolve_entity(agent),
            ("soaHas_instrument", instrument) => {
                prop.instrument = resolver.resolve_instrument(instrument)
            }
            (predicate, object) => {
                prop.properties.insert(predicate.to_string(), object.to_string());
            }
        }
    }

    (has_action && prop.exists).then_some(prop)
}
