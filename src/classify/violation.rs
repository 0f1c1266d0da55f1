//! Necessary violations: `(quote (Violator Rule))`.

use serde::Serialize;

use super::conflict::INRS_PROHIBITION;
use crate::resolver::EntityResolver;
use crate::sexpr::Expr;

const QUOTE: &str = "quote";
const MICT_INRS_ONLY: &str = "MICT port INRS-only payment requirement";
const PORT_PAYMENT: &str = "Port payment obligation";

/// Every violation carries this reason.
pub const VIOLATION_REASON: &str = "conflicting regulatory requirements";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub violated_rule: String,
    pub violator: String,
    pub reason: String,
}

/// Violations at the top level or alone inside a wrapper list.
pub fn find_violations(exprs: &[Expr], resolver: &EntityResolver) -> Vec<Violation> {
    exprs
        .iter()
        .filter_map(|expr| {
            let wrapped = match expr.as_list() {
                Some([inner]) if inner.is_list() => parse_violation(inner, resolver),
                _ => None,
            };
            wrapped.or_else(|| parse_violation(expr, resolver))
        })
        .collect()
}

/// Interpret one `(quote (violator rule))` form.
pub fn parse_violation(expr: &Expr, resolver: &EntityResolver) -> Option<Violation> {
    if !expr.is_headed_by(QUOTE) {
        return None;
    }
    let pair = expr.nth(1)?.as_list()?;
    Some(Violation {
        violator: pair.first().map(|e| violator(e, resolver)).unwrap_or_default(),
        violated_rule: pair.get(1).map(|e| rule(e, resolver)).unwrap_or_default(),
        reason: VIOLATION_REASON.to_string(),
    })
}

fn violator(expr: &Expr, resolver: &EntityResolver) -> String {
    if let Some(atom) = expr.as_atom() {
        return resolver.resolve_entity(atom);
    }
    match expr.head() {
        Some("inrs-prohibited-id") => match expr.nth_atom(1) {
            Some(entity) => format!(
                "EU MiCA regulation prohibiting {} from using INRS",
                resolver.resolve_entity(entity)
            ),
            None => INRS_PROHIBITION.to_string(),
        },
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn rule(expr: &Expr, resolver: &EntityResolver) -> String {
    if let Some(atom) = expr.as_atom() {
        return resolver.resolve_entity(atom);
    }
    match expr.head() {
        Some("inrs-only-id") => MICT_INRS_ONLY.to_string(),
        Some("pay-obligatory-id") => PORT_PAYMENT.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
