//! Eventuality, entity and predicate validation.
//!
//! Set-level validation reports every finding as a message and never stops
//! early. Single-item checks are lenient: only missing identity or an
//! unknown modality fails, everything else is a warning.

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

use super::model::{Eventuality, KnowledgeSet};
use super::vocabulary::{ROLE_PREFIX, is_eventuality_type, is_modality, is_role};
use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Why a single eventuality was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum EventualityError {
    #[error("eventuality missing name")]
    #[diagnostic(
        code(metta::knowledge::missing_name),
        help("Every eventuality is introduced by a triple whose subject is its name.")
    )]
    MissingName,

    #[error("eventuality '{name}' missing both type and modality")]
    #[diagnostic(
        code(metta::knowledge::missing_type),
        help("Add a `(ct-triple {name} type <Type>)` or `(ct-triple {name} type rexist)` fact.")
    )]
    MissingTypeAndModality { name: String },

    #[error("invalid modality '{modality}' for eventuality '{name}'")]
    #[diagnostic(
        code(metta::knowledge::invalid_modality),
        help("Modalities are rexist, obligatory, permitted, or optional.")
    )]
    InvalidModality { name: String, modality: String },
}

/// Check every eventuality of `set`, one message per failed check.
///
/// Each eventuality is checked independently for: the validity
/// preconditions, the naming convention, a known type, and known roles.
pub fn validate_eventualities(set: &KnowledgeSet) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, ev) in &set.eventualities {
        if !ev.is_valid() {
            errors.push(format!(
                "Eventuality '{name}' is missing required fields (type, rexist modality, or agent)"
            ));
        }

        let expected = ev.expected_name();
        if *name != expected {
            errors.push(format!(
                "Eventuality '{name}' does not follow naming convention. Expected: '{expected}'"
            ));
        }

        if !is_eventuality_type(&ev.kind) {
            errors.push(format!("Invalid eventuality type '{}' for eventuality '{name}'", ev.kind));
        }

        for role in ev.roles.keys() {
            if !is_role(role) {
                errors.push(format!("Invalid role '{role}' for eventuality '{name}'"));
            }
        }
    }

    errors
}

/// Check every entity of `set` for a type and for name collisions with
/// eventualities.
pub fn validate_entities(set: &KnowledgeSet) -> Vec<String> {
    let mut errors = Vec::new();
    for (name, entity) in &set.entities {
        if entity.kind.is_empty() {
            errors.push(format!("Entity '{name}' is missing a type"));
        }
        if set.eventualities.contains_key(name) {
            errors.push(format!("Entity '{name}' conflicts with eventuality name"));
        }
    }
    errors
}

/// Lenient check of one eventuality.
pub fn validate_eventuality(ev: &Eventuality) -> Result<(), EventualityError> {
    if ev.name.is_empty() {
        return Err(EventualityError::MissingName);
    }
    if ev.kind.is_empty() && ev.modality.is_empty() {
        return Err(EventualityError::MissingTypeAndModality { name: ev.name.clone() });
    }

    if !ev.kind.is_empty() && !is_eventuality_type(&ev.kind) {
        tracing::warn!(eventuality = %ev.name, kind = %ev.kind, "unknown eventuality type");
    }

    if !ev.modality.is_empty() && !is_modality(&ev.modality) {
        return Err(EventualityError::InvalidModality {
            name: ev.name.clone(),
            modality: ev.modality.clone(),
        });
    }

    if !ev.kind.is_empty() && !ev.agent.is_empty() {
        let expected = ev.expected_name();
        if ev.name != expected {
            tracing::warn!(
                eventuality = %ev.name,
                %expected,
                "eventuality name does not follow convention"
            );
        }
    }

    Ok(())
}

/// Whether `predicate` belongs to the structural or role vocabulary.
pub fn is_known_predicate(predicate: &str) -> bool {
    predicate == "type"
        || predicate.starts_with(ROLE_PREFIX)
        || predicate.starts_with("soa_")
        || predicate == "associated-with"
        || is_role(predicate)
}

/// Predicates are always accepted; an unknown one yields a warning.
pub fn validate_predicate(predicate: &str) -> Option<Diagnostic> {
    if is_known_predicate(predicate) {
        return None;
    }
    tracing::debug!(%predicate, "unknown predicate");
    Some(Diagnostic::new(
        DiagnosticKind::UnknownPredicate,
        format!("Unknown predicate '{predicate}'"),
    ))
}

/// Both set-level validations of one knowledge set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub eventuality_errors: Vec<String>,
    pub entity_errors: Vec<String>,
}

impl ValidationReport {
    pub fn of(set: &KnowledgeSet) -> Self {
        Self {
            eventuality_errors: validate_eventualities(set),
            entity_errors: validate_entities(set),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.eventuality_errors.is_empty() && self.entity_errors.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.eventuality_errors
            .iter()
            .chain(&self.entity_errors)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::model::Entity;

    fn eventuality(name: &str, kind: &str, modality: &str, agent: &str) -> Eventuality {
        Eventuality {
            name: name.into(),
            kind: kind.into(),
            modality: modality.into(),
            agent: agent.into(),
            ..Eventuality::default()
        }
    }

    fn set_with(ev: Eventuality) -> KnowledgeSet {
        let mut set = KnowledgeSet::default();
        set.eventualities.insert(ev.name.clone(), ev);
        set
    }

    #[test]
    fn valid_eventuality_passes() {
        let set = set_with(eventuality("soa_emam", "soaMoor", "rexist", "soa_ALEXANDRA_MAERSK"));
        assert!(validate_eventualities(&set).is_empty());
    }

    #[test]
    fn wrong_name_reports_expected_value() {
        let set = set_with(eventuality(
            "soa_wrongname",
            "soaMoor",
            "rexist",
            "soa_ALEXANDRA_MAERSK",
        ));
        let errors = validate_eventualities(&set);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'soa_emam'"));
    }

    #[test]
    fn checks_accumulate() {
        let mut ev = eventuality("soa_x", "soaFly", "", "soa_BOB");
        ev.roles.insert("soaHas_color".into(), "red".into());
        ev.roles.insert("soaHas_time".into(), "noon".into());
        let errors = validate_eventualities(&set_with(ev));
        // missing fields, naming, type, one bad role
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("Invalid role 'soaHas_color'")));
        assert!(errors.iter().any(|e| e.contains("Invalid eventuality type 'soaFly'")));
    }

    #[test]
    fn entity_checks() {
        let mut set = set_with(eventuality("soa_emam", "soaMoor", "rexist", "soa_A"));
        set.entities.insert(
            "soa_emam".into(),
            Entity {
                name: "soa_emam".into(),
                ..Entity::default()
            },
        );
        let errors = validate_entities(&set);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("missing a type"));
        assert!(errors[1].contains("conflicts with eventuality name"));
    }

    #[test]
    fn lenient_single_check() {
        assert_eq!(
            validate_eventuality(&Eventuality::default()),
            Err(EventualityError::MissingName)
        );
        assert!(matches!(
            validate_eventuality(&eventuality("soa_x", "", "", "")),
            Err(EventualityError::MissingTypeAndModality { .. })
        ));
        assert!(matches!(
            validate_eventuality(&eventuality("soa_x", "", "forbidden", "")),
            Err(EventualityError::InvalidModality { .. })
        ));
        // Unknown type and bad name only warn.
        assert!(validate_eventuality(&eventuality("soa_x", "soaFly", "rexist", "soa_A")).is_ok());
    }

    #[test]
    fn predicates_are_accepted_with_warnings() {
        assert!(validate_predicate("type").is_none());
        assert!(validate_predicate("soaHas_anything").is_none());
        assert!(validate_predicate("soa_associated-with").is_none());
        let warning = validate_predicate("colour").unwrap();
        assert_eq!(warning.kind, DiagnosticKind::UnknownPredicate);
        assert!(warning.is_warning());
    }

    #[test]
    fn report_collects_both() {
        let set = set_with(eventuality("soa_bad", "soaMoor", "rexist", "soa_A"));
        let report = ValidationReport::of(&set);
        assert!(!report.is_valid());
        assert_eq!(report.errors().count(), 1);
    }
}
