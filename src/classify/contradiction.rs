//! Contradiction detection.
//!
//! Two independent sources feed the result:
//!
//! - `meta-id` forms: `((meta-id E type rexist false) detail)` denies that
//!   `E` exists, and `((meta-id E type rexist true) (id_not_not_false E))`
//!   marks an action that is both asserted and refuted.
//! - `(id_not_not_false E)` forms at any depth, paired by their action key.
//!   When every refuted entity names a payment instrument, each becomes a
//!   payment-method contradiction instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::Proposition;
use crate::knowledge::vocabulary::REXIST;
use crate::resolver::{EntityResolver, Tense, base_form, is_negated_entity, negated_form};
use crate::sexpr::{Expr, MetaId};

const NOT_NOT_FALSE: &str = "id_not_not_false";
const INSTRUMENT_CODES: [&str; 2] = ["INRS", "USDS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// An entity asserted not to exist.
    Existence,
    /// An action both asserted and refuted.
    Action,
    /// Payment declared in one instrument while another is required.
    PaymentMethod,
    /// Any other `meta-id` property refuted by its sibling.
    Property,
}

impl ContradictionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Existence => "existence",
            Self::Action => "action",
            Self::PaymentMethod => "payment_method",
            Self::Property => "property",
        }
    }
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contradiction {
    pub positive: Proposition,
    pub negative: Proposition,
    pub kind: ContradictionKind,
}

impl Contradiction {
    fn key(&self) -> (ContradictionKind, String, String) {
        (self.kind, self.positive.to_string(), self.negative.to_string())
    }
}

/// Action key of an eventuality id: `soa_` then a leading `en` or `e`
/// removed (`soa_enmam` and `soa_emam` both give `mam`). Ids too short to
/// carry a key give `None`.
pub fn base_action_key(id: &str) -> Option<&str> {
    if id.len() < 7 {
        return None;
    }
    let suffix = id.strip_prefix("soa_")?;
    let suffix = match suffix.strip_prefix("en") {
        Some(rest) if !rest.is_empty() => rest,
        _ => suffix,
    };
    let suffix = match suffix.strip_prefix('e') {
        Some(rest) if !rest.is_empty() => rest,
        _ => suffix,
    };
    Some(suffix)
}

/// Find all contradictions, deduplicated, in discovery order.
pub fn find_contradictions(exprs: &[Expr], resolver: &EntityResolver) -> Vec<Contradiction> {
    let mut found = Vec::new();
    let mut asserted = Vec::new();
    for expr in exprs {
        meta_contradictions(expr, &mut found, &mut asserted);
    }

    let mut refuted = Vec::new();
    for expr in exprs {
        collect_refuted(expr, &mut refuted);
    }

    if is_payment_set(&refuted) {
        found.extend(refuted.iter().map(|e| payment_method(e, resolver)));
    } else {
        found.extend(asserted.iter().filter_map(|id| asserted_action(id, resolver)));
        found.extend(paired_actions(&refuted, resolver));
    }

    let mut seen = BTreeSet::new();
    found.retain(|c| seen.insert(c.key()));
    found
}

// ---------------------------------------------------------------------------
// meta-id forms
// ---------------------------------------------------------------------------

/// `(meta-id ...)` as the first child of a list with a sibling.
fn meta_pair(expr: &Expr) -> Option<(MetaId, &Expr)> {
    let children = expr.as_list()?;
    if children.len() < 2 {
        return None;
    }
    Some((MetaId::from_expr(&children[0])?, &children[1]))
}

/// Contradictions from `meta-id` forms at the top level or one level down.
/// Entities asserted by `true` and refuted by their sibling go to
/// `asserted`; their action is settled once all refutations are known.
fn meta_contradictions(expr: &Expr, out: &mut Vec<Contradiction>, asserted: &mut Vec<String>) {
    if visit_meta(expr, out, asserted) {
        return;
    }
    for child in expr.as_list().unwrap_or_default() {
        visit_meta(child, out, asserted);
    }
}

fn visit_meta(expr: &Expr, out: &mut Vec<Contradiction>, asserted: &mut Vec<String>) -> bool {
    let (meta, detail) = match meta_pair(expr) {
        Some((meta, detail)) => (meta, Some(detail)),
        None => match MetaId::from_expr(expr) {
            Some(meta) => (meta, None),
            None => return false,
        },
    };

    let detail_head = detail.and_then(Expr::head);
    let is_existence = meta.kind == "type" && meta.property == REXIST;

    if is_existence && meta.value == "true" {
        if detail_head == Some(NOT_NOT_FALSE) && !asserted.contains(&meta.id) {
            asserted.push(meta.id);
        }
        return true;
    }
    out.extend(from_meta(&meta, detail, detail_head, is_existence));
    true
}

fn from_meta(
    meta: &MetaId,
    detail: Option<&Expr>,
    detail_head: Option<&str>,
    is_existence: bool,
) -> Option<Contradiction> {
    if is_existence && meta.value == "false" {
        if detail_head.is_some_and(|head| head.contains("inrs-not-usds")) {
            return Some(Contradiction {
                positive: Proposition::named(meta.id.as_str(), true).with_action("uses INRS"),
                negative: Proposition::named(format!("not_{}", meta.id), false)
                    .with_action("uses USDS"),
                kind: ContradictionKind::PaymentMethod,
            });
        }
        return Some(Contradiction {
            positive: Proposition::named(meta.id.as_str(), true),
            negative: Proposition::named(format!("not_{}", meta.id), false),
            kind: ContradictionKind::Existence,
        });
    }

    // Anything else refuted by a detail list.
    detail.filter(|d| d.is_list()).map(|_| Contradiction {
        positive: Proposition::named(meta.id.as_str(), true),
        negative: Proposition::named(format!("not_{}", meta.id), false),
        kind: ContradictionKind::Property,
    })
}

/// Asserted-and-refuted entity split into its base and negated forms.
/// Entities whose action the resolver does not know are left to pairing.
fn asserted_action(id: &str, resolver: &EntityResolver) -> Option<Contradiction> {
    let base = base_form(id);
    if !resolver.has_action(&base) {
        return None;
    }
    Some(action_pair(&base, &negated_form(&base), resolver))
}

fn action_pair(positive_id: &str, negative_id: &str, resolver: &EntityResolver) -> Contradiction {
    let action = resolver.resolve_action(positive_id, Tense::Base);
    Contradiction {
        positive: Proposition::named(resolver.resolve_entity(positive_id), true)
            .with_action(action.as_str()),
        negative: Proposition::named(resolver.resolve_entity(negative_id), false)
            .with_action(format!("not {}", resolver.resolve_action(negative_id, Tense::Base))),
        kind: ContradictionKind::Action,
    }
}

// ---------------------------------------------------------------------------
// id_not_not_false forms
// ---------------------------------------------------------------------------

/// Entities of `(id_not_not_false E)` forms anywhere in `expr`, including
/// the refuting sibling of a `meta-id` pair, first occurrence order.
fn collect_refuted(expr: &Expr, out: &mut Vec<String>) {
    let Some(children) = expr.as_list() else {
        return;
    };
    if let [head, Expr::Atom(entity)] = children {
        if head.as_atom() == Some(NOT_NOT_FALSE) {
            if !out.contains(entity) {
                out.push(entity.clone());
            }
            return;
        }
    }
    for child in children {
        collect_refuted(child, out);
    }
}

fn is_payment_set(entities: &[String]) -> bool {
    !entities.is_empty()
        && entities
            .iter()
            .all(|e| INSTRUMENT_CODES.iter().any(|code| e.contains(code)))
}

fn paired_actions(entities: &[String], resolver: &EntityResolver) -> Vec<Contradiction> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entity in entities {
        if let Some(key) = base_action_key(entity) {
            groups.entry(key).or_default().push(entity);
        }
    }

    groups
        .values()
        .filter(|members| members.len() >= 2)
        .filter_map(|members| {
            let positive = members.iter().rev().find(|m| !is_negated_entity(m))?;
            let negative = members.iter().rev().find(|m| is_negated_entity(m))?;
            Some(action_pair(positive, negative, resolver))
        })
        .collect()
}

fn payment_method(entity: &str, resolver: &EntityResolver) -> Contradiction {
    let instrument = if entity.contains("INRS") { "INRS" } else { "USDS" };
    let name = resolver.resolve_entity(entity);
    Contradiction {
        positive: Proposition::named(name.as_str(), true)
            .with_action(format!("pays in {instrument}"))
            .with_instrument(instrument),
        negative: Proposition::named(name, false)
            .with_action(format!("does not pay in {instrument}"))
            .with_instrument(instrument),
        kind: ContradictionKind::PaymentMethod,
    }
}
