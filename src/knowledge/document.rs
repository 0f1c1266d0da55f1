//! Knowledge document extraction and file I/O.
//!
//! Documents mix `;` comments, norm definitions and state-of-affairs facts.
//! Comment lines are blanked before reading so line numbers survive. When
//! the whole text is not one well-formed stream, extraction falls back to
//! bracket-balanced segments and reports each unreadable one.

use std::collections::BTreeMap;
use std::path::Path;

use super::model::{Eventuality, KnowledgeSet, MettaDocument, Norm};
use super::parse::{
    is_norm_definition, parse_consequence, parse_entity, parse_logical_expression, parse_negation,
    parse_norm, parse_triple,
};
use super::validate::validate_predicate;
use super::vocabulary::{EVENTUALITY_PREFIX, ROLE_PREFIX, is_eventuality_type, is_modality, is_role};
use super::{KnowledgeError, KnowledgeResult};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::sexpr::{Expr, parse_all, parse_one};

const STATE_OF_AFFAIRS_MARKER: &str = "State of Affairs";

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(';')
}

/// Text with every comment line blanked.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !is_comment(line) {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Description from a `; ... State of Affairs (<description>)` comment.
fn state_of_affairs_description(text: &str) -> Option<String> {
    text.lines()
        .filter(|line| is_comment(line) && line.contains(STATE_OF_AFFAIRS_MARKER))
        .find_map(|line| {
            let start = line.find('(')?;
            let end = line.rfind(')')?;
            (end > start).then(|| line[start + 1..end].to_string())
        })
}

/// Norm descriptions: a comment line directly above a `(= (name` line.
fn norm_descriptions(text: &str) -> BTreeMap<String, String> {
    let mut descriptions = BTreeMap::new();
    let mut previous_comment: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix(';') {
            previous_comment = Some(comment.trim());
            continue;
        }
        if let (Some(comment), Some(rest)) = (previous_comment, trimmed.strip_prefix("(= (")) {
            let name: String = rest
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != ')' && *c != '(')
                .collect();
            if !name.is_empty() && !comment.is_empty() {
                descriptions.insert(name, comment.to_string());
            }
        }
        previous_comment = None;
    }
    descriptions
}

/// Read every expression, or fall back to bracket-balanced segments that
/// begin on lines accepted by `starts_segment`.
fn read_expressions(text: &str, starts_segment: fn(&str) -> bool) -> (Vec<Expr>, Vec<Diagnostic>) {
    let cleaned = strip_comments(text);
    match parse_all(&cleaned) {
        Ok(exprs) => (exprs, Vec::new()),
        Err(e) => {
            tracing::debug!(error = %e, "document is not one stream, segmenting");
            read_segments(&cleaned, starts_segment)
        }
    }
}

fn read_segments(text: &str, starts_segment: fn(&str) -> bool) -> (Vec<Expr>, Vec<Diagnostic>) {
    let mut exprs = Vec::new();
    let mut diagnostics = Vec::new();
    let mut segment = String::new();
    let mut start_line = 0;
    let mut depth: i64 = 0;

    let mut finish = |segment: &str, line: usize, diagnostics: &mut Vec<Diagnostic>| {
        match parse_one(segment) {
            Ok(expr) => exprs.push(expr),
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping unreadable segment");
                diagnostics
                    .push(Diagnostic::new(DiagnosticKind::Parse, e.to_string()).at_line(line));
            }
        }
    };

    for (idx, line) in text.lines().enumerate() {
        if segment.is_empty() {
            if !starts_segment(line.trim_start()) {
                continue;
            }
            start_line = idx + 1;
            depth = 0;
        }

        segment.push_str(line);
        segment.push('\n');
        for c in line.chars() {
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' => depth -= 1,
                _ => {}
            }
        }

        if depth <= 0 {
            finish(&segment, start_line, &mut diagnostics);
            segment.clear();
        }
    }
    if !segment.is_empty() {
        finish(&segment, start_line, &mut diagnostics);
    }

    (exprs, diagnostics)
}

/// Section banners written by [`MettaDocument`]'s rendering.
fn is_banner(line: &str) -> bool {
    line.trim_start().starts_with("; ==========")
}

fn starts_knowledge(line: &str) -> bool {
    line.starts_with("(ct-triple")
        || line.starts_with("(meta-triple")
        || line.starts_with("(ct-simple-not")
        || line.starts_with("(=")
}

fn starts_norm(line: &str) -> bool {
    line.starts_with("(=")
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read the state of affairs a document asserts.
///
/// Facts feed entity derivation and eventuality accumulation; negations
/// and `(=` definitions are collected as-is, except norm definitions. Later
/// facts overwrite earlier ones for the same key.
pub fn extract_knowledge(text: &str) -> (KnowledgeSet, Vec<Diagnostic>) {
    let (exprs, mut diagnostics) = read_expressions(text, starts_knowledge);
    let mut set = KnowledgeSet {
        description: state_of_affairs_description(text).unwrap_or_default(),
        ..KnowledgeSet::default()
    };

    for expr in &exprs {
        match expr.head() {
            Some("ct-triple" | "meta-triple") => {
                let Some(triple) = parse_triple(expr) else {
                    continue;
                };
                diagnostics.extend(validate_predicate(&triple.predicate));

                // A repeated type fact starts the entity over.
                if let Some(entity) = parse_entity(&triple) {
                    set.entities.insert(entity.name.clone(), entity);
                }

                if triple.subject.starts_with(EVENTUALITY_PREFIX) {
                    let ev = set
                        .eventualities
                        .entry(triple.subject.clone())
                        .or_insert_with(|| Eventuality::new(&triple.subject));
                    accumulate(ev, &triple.predicate, &triple.object, &mut diagnostics);
                } else if triple.predicate != "type" {
                    if let Some(entity) = set.entities.get_mut(&triple.subject) {
                        entity.properties.insert(triple.predicate.clone(), triple.object.clone());
                    }
                }

                set.facts.push(triple);
            }
            Some("ct-simple-not") => set.negations.extend(parse_negation(expr)),
            Some("=") if !is_norm_definition(expr) => {
                set.logical_expressions.extend(parse_logical_expression(expr))
            }
            _ => {}
        }
    }

    tracing::debug!(
        facts = set.facts.len(),
        eventualities = set.eventualities.len(),
        entities = set.entities.len(),
        "extracted knowledge"
    );
    (set, diagnostics)
}

fn accumulate(
    ev: &mut Eventuality,
    predicate: &str,
    object: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if predicate == "type" {
        if is_eventuality_type(object) {
            ev.kind = object.to_string();
        } else if is_modality(object) {
            ev.modality = object.to_string();
        } else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnknownType,
                format!("Unknown eventuality type '{object}' for eventuality '{}'", ev.name),
            ));
        }
    } else if predicate == "soaHas_agent" {
        ev.agent = object.to_string();
    } else if predicate.starts_with(ROLE_PREFIX) {
        if !is_role(predicate) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnknownRole,
                format!("Unknown role '{predicate}' for eventuality '{}'", ev.name),
            ));
        }
        ev.roles.insert(predicate.to_string(), object.to_string());
    }
}

/// Read every norm a document defines.
///
/// `ct-triple-for-add` rules that call a norm defined in the same text
/// become that norm's consequences.
pub fn extract_norms(text: &str) -> (Vec<Norm>, Vec<Diagnostic>) {
    let (exprs, diagnostics) = read_expressions(text, starts_norm);
    let descriptions = norm_descriptions(text);

    let mut norms: Vec<Norm> = Vec::new();
    let mut consequences = Vec::new();
    for expr in exprs.iter().filter(|e| is_norm_definition(e)) {
        if let Some(consequence) = parse_consequence(expr) {
            consequences.push((consequence, expr));
        } else if let Some(mut norm) = parse_norm(expr) {
            if let Some(description) = descriptions.get(&norm.name) {
                norm.description = description.clone();
            }
            norms.push(norm);
        }
    }

    for ((owner, triple), expr) in consequences {
        match norms.iter_mut().find(|n| n.name == owner) {
            Some(norm) => norm.consequences.push(triple),
            None => norms.extend(parse_norm(expr)),
        }
    }

    (norms, diagnostics)
}

impl MettaDocument {
    /// Split a document into header, norms and state of affairs.
    ///
    /// The header is everything before the first definition or fact.
    pub fn parse(text: &str) -> (Self, Vec<Diagnostic>) {
        let content_start = [text.find("(="), text.find("(ct-triple")]
            .into_iter()
            .flatten()
            .min();
        let (preamble, content) = match content_start {
            Some(start) => text.split_at(start),
            None => ("", text),
        };
        let mut lines: Vec<&str> = preamble.lines().collect();
        // The comment directly above the first norm is its description.
        if content.starts_with("(= (") && lines.last().is_some_and(|line| is_comment(line)) {
            lines.pop();
        }
        let header = lines
            .into_iter()
            .filter(|line| !is_banner(line) && !line.contains(STATE_OF_AFFAIRS_MARKER))
            .collect::<Vec<_>>()
            .join("\n");

        let (norms, mut diagnostics) = extract_norms(text);
        let (knowledge, knowledge_diagnostics) = extract_knowledge(text);
        for d in knowledge_diagnostics {
            if !diagnostics.contains(&d) {
                diagnostics.push(d);
            }
        }

        let doc = Self {
            header: header.trim().to_string(),
            norms,
            knowledge,
        };
        (doc, diagnostics)
    }
}

/// Read and split a document file.
pub fn read_document(path: &Path) -> KnowledgeResult<(MettaDocument, Vec<Diagnostic>)> {
    let text = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(MettaDocument::parse(&text))
}

/// Write a document in canonical form.
pub fn write_document(doc: &MettaDocument, path: &Path) -> KnowledgeResult<()> {
    std::fs::write(path, doc.to_string()).map_err(|e| KnowledgeError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(
        path = %path.display(),
        norms = doc.norms.len(),
        facts = doc.knowledge.facts.len(),
        "wrote document"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::model::{Condition, LogicalOp, Triple};

    const SOA: &str = "\
; State of Affairs (Alexandra Maersk at MICT)
(ct-triple soa_ALEXANDRA_MAERSK type soaContainerVessel)
(ct-triple soa_ALEXANDRA_MAERSK soaHas_flag soa_Denmark)
(ct-triple soa_emam type soaMoor)
(ct-triple soa_emam type rexist)
(ct-triple soa_emam soaHas_agent soa_ALEXANDRA_MAERSK)
(ct-triple soa_emam soaHas_location soa_MICT)
(ct-triple soa_epam soaHas_amount (15000 USD))
(ct-simple-not soa_enpam soa_epam)
(ct-triple soa_enpam type rexist)
(= (ct-or soa_eo) (soa_epam soa_enpam))
";

    #[test]
    fn extracts_facts_eventualities_and_entities() {
        let (set, _) = extract_knowledge(SOA);
        assert_eq!(set.description, "Alexandra Maersk at MICT");
        assert_eq!(set.facts.len(), 8);

        let ev = &set.eventualities["soa_emam"];
        assert_eq!(ev.kind, "soaMoor");
        assert_eq!(ev.modality, "rexist");
        assert_eq!(ev.agent, "soa_ALEXANDRA_MAERSK");
        assert_eq!(ev.roles["soaHas_location"], "soa_MICT");
        assert!(ev.is_valid());

        let vessel = &set.entities["soa_ALEXANDRA_MAERSK"];
        assert_eq!(vessel.kind, "soaContainerVessel");
        assert_eq!(vessel.properties["soaHas_flag"], "soa_Denmark");

        assert_eq!(set.negations.len(), 1);
        assert_eq!(set.logical_expressions[0].op, LogicalOp::Or);
        assert!(set.facts.iter().any(|t| t.object_is_nested));
    }

    #[test]
    fn repeated_entity_type_replaces_the_entity() {
        let text = "(ct-triple soa_MICT type smartport)\n\
                    (ct-triple soa_MICT soaHas_country soa_India)\n\
                    (ct-triple soa_MICT type soaContainerTerminal)";
        let (set, _) = extract_knowledge(text);
        let port = &set.entities["soa_MICT"];
        assert_eq!(port.kind, "soaContainerTerminal");
        assert!(port.properties.is_empty());
    }

    #[test]
    fn unknown_vocabulary_is_reported_not_rejected() {
        let text = "(ct-triple soa_ex type soaFly)\n\
                    (ct-triple soa_ex soaHas_color red)\n\
                    (ct-triple soa_ex weight 5)";
        let (set, diags) = extract_knowledge(text);
        assert_eq!(set.facts.len(), 3);
        let kinds: Vec<_> = diags.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DiagnosticKind::UnknownType));
        assert!(kinds.contains(&DiagnosticKind::UnknownRole));
        assert!(kinds.contains(&DiagnosticKind::UnknownPredicate));
    }

    #[test]
    fn malformed_segments_are_skipped_and_reported() {
        let text = "(ct-triple soa_emam type soaMoor)\n\
                    (ct-triple soa_emam type rexist]\n\
                    (ct-triple soa_MICT type smartport)\n";
        let (set, diags) = extract_knowledge(text);
        assert_eq!(set.facts.len(), 2);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Parse);
        assert_eq!(diags[0].line, Some(2));
    }

    #[test]
    fn norms_with_let_bodies_are_not_logical_expressions() {
        let text =
            "(= (pay-obligatory $e) (let* (($m (moored $e))) True))\n(= (ct-and soa_ea) (a b))";
        let (set, _) = extract_knowledge(text);
        assert_eq!(set.logical_expressions.len(), 1);
        assert_eq!(set.logical_expressions[0].name, "soa_ea");
    }

    #[test]
    fn norm_extraction_folds_consequences() {
        let norm = Norm {
            name: "pay-obligatory".into(),
            parameters: vec!["$e".into()],
            conditions: vec![Condition {
                variable: "$m".into(),
                expression: "moored $e".into(),
            }],
            consequences: vec![Triple::fact("$e", "type", "obligatory")],
            description: "Moored vessels must pay".into(),
        };
        let (norms, diags) = extract_norms(&norm.to_string());
        assert!(diags.is_empty());
        assert_eq!(norms, vec![norm]);
    }

    #[test]
    fn document_round_trip() {
        let text = format!(
            "; Smart port scenario\n\n(= (leave-permitted $e) (let* (($p (paid $e))) True))\n{SOA}"
        );
        let (doc, _) = MettaDocument::parse(&text);
        assert_eq!(doc.header, "; Smart port scenario");
        assert_eq!(doc.norms.len(), 1);

        let (reread, _) = MettaDocument::parse(&doc.to_string());
        assert_eq!(reread, doc);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soa.metta");
        let (doc, _) = MettaDocument::parse(SOA);
        write_document(&doc, &path).unwrap();
        let (reread, _) = read_document(&path).unwrap();
        assert_eq!(reread, doc);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_document(Path::new("/nonexistent/soa.metta")).unwrap_err();
        assert!(matches!(err, KnowledgeError::Read { .. }));
    }
}
