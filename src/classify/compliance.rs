//! Compliance relations.
//!
//! Either explicit, `(is_complied_with_by Obligation Entity)`, or an
//! inferred pair of eventualities `(Obligation Fulfilment)` such as
//! `[(soa_enpam soa_epam15k)]`.

use serde::Serialize;

use super::with_children;
use crate::resolver::EntityResolver;
use crate::sexpr::{Expr, WILDCARD, extract};

const COMPLIED_WITH: &str = "is_complied_with_by";
const NEGATION_MARKER: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compliance {
    pub entity: String,
    pub obligation: String,
    pub fulfilled_by: String,
}

pub fn find_compliances(exprs: &[Expr], resolver: &EntityResolver) -> Vec<Compliance> {
    let mut found = Vec::new();
    for expr in exprs {
        for candidate in with_children(expr) {
            let values = extract(candidate, &[COMPLIED_WITH, WILDCARD, WILDCARD]);
            if let [obligation, entity] = values.as_slice() {
                found.push(Compliance {
                    entity: entity.clone(),
                    obligation: obligation.clone(),
                    fulfilled_by: "action".to_string(),
                });
            }
        }
    }
    for expr in exprs {
        found.extend(eventuality_pair(single_wrapped(expr), resolver));
    }
    found
}

/// The only child of a one-element list, else `expr` itself.
fn single_wrapped(expr: &Expr) -> &Expr {
    match expr.as_list() {
        Some([only]) => only,
        _ => expr,
    }
}

/// A two-element list of `soa_` atoms. The member carrying the negation
/// marker is the obligation; when neither or both do, the first is.
fn eventuality_pair(expr: &Expr, resolver: &EntityResolver) -> Option<Compliance> {
    let [first, second] = expr.as_list()? else {
        return None;
    };
    let (first, second) = (first.as_atom()?, second.as_atom()?);
    if !first.starts_with("soa_") || !second.starts_with("soa_") {
        return None;
    }

    let negated = |id: &str| id.contains(NEGATION_MARKER);
    let (obligation, fulfilment) = if negated(second) && !negated(first) {
        (second, first)
    } else {
        (first, second)
    };
    Some(Compliance {
        entity: resolver.resolve_entity(fulfilment),
        obligation: resolver.resolve_entity(obligation),
        fulfilled_by: fulfilment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse_all;

    fn find(input: &str) -> Vec<Compliance> {
        find_compliances(&parse_all(input).unwrap(), &EntityResolver::new())
    }

    #[test]
    fn wrapped_pair() {
        let found = find("[(soa_enpam soa_epam15k)]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].obligation, "ALEXANDRA MÆRSK");
        assert_eq!(found[0].fulfilled_by, "soa_epam15k");
        assert_eq!(found[0].entity, "epam15k");
    }

    #[test]
    fn obligation_is_the_negated_member() {
        let found = find("(soa_epam15k soa_enpam)");
        assert_eq!(found[0].fulfilled_by, "soa_epam15k");
    }

    #[test]
    fn explicit_form() {
        let found = find("(is_complied_with_by soa_enpam soa_epam15k)");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].obligation, "soa_enpam");
        assert_eq!(found[0].entity, "soa_epam15k");
        assert_eq!(found[0].fulfilled_by, "action");
    }

    #[test]
    fn wrapper_with_several_pairs_is_not_a_compliance() {
        assert!(find("[(soa_a soa_b) (soa_c soa_d)]").is_empty());
        assert!(find("[[(soa_enpam soa_epam15k)]]").is_empty());
    }

    #[test]
    fn non_eventuality_pairs_are_ignored() {
        assert!(find("(soa_a other)\n[(x y)]\n(soa_a soa_b soa_c)").is_empty());
    }
}
