//! Regulatory conflicts: `(conflict Regulation1 Regulation2)`.

use serde::Serialize;

use crate::resolver::EntityResolver;
use crate::sexpr::Expr;

const CONFLICT: &str = "conflict";

/// Known regulation calls and their descriptions.
pub(crate) const INRS_PROHIBITION: &str = "EU MiCA regulation (INRS prohibition)";
const NOT_OPTIONAL: &str = "Not optional (prohibited)";
const INRS_ONLY: &str = "INRS-only requirement";
const MICT_PORT: &str = "soa_sptMICT";

const LEAVE_REQUIREMENT: &str = "permission vs prohibition to leave";
const DEFAULT_REQUIREMENT: &str = "regulatory requirements";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub regulation1: String,
    pub regulation2: String,
    pub conflicting_requirement: String,
    /// Display name of the affected entity.
    pub affected_entity: String,
    /// Identifier the affected entity was resolved from.
    pub affected_id: String,
}

/// Conflicts at the top level or inside a wrapper list, which may hold
/// several conflict forms side by side.
pub fn find_conflicts(exprs: &[Expr], resolver: &EntityResolver) -> Vec<Conflict> {
    let mut found = Vec::new();
    for expr in exprs {
        let before = found.len();
        found.extend(
            expr.as_list()
                .unwrap_or_default()
                .iter()
                .filter_map(|child| parse_conflict(child, resolver)),
        );
        if found.len() > before {
            continue;
        }
        found.extend(parse_conflict(expr, resolver));
    }
    found
}

/// Interpret one `(conflict a b)` form.
pub fn parse_conflict(expr: &Expr, resolver: &EntityResolver) -> Option<Conflict> {
    let children = expr.as_list()?;
    if children.len() < 3 || !expr.is_headed_by(CONFLICT) {
        return None;
    }

    let mut conflict = Conflict::default();
    first_regulation(&children[1], resolver, &mut conflict);
    second_regulation(&children[2], resolver, &mut conflict);

    if !conflict.affected_id.is_empty() {
        conflict.affected_entity = resolver.resolve_entity(&conflict.affected_id);
    }

    let vessel = resolver.primary_vessel();
    let leaves_vessel = !vessel.is_empty() && conflict.regulation2.contains(vessel.as_str());
    conflict.conflicting_requirement =
        if conflict.regulation1.contains("Not optional") && leaves_vessel {
            LEAVE_REQUIREMENT.to_string()
        } else {
            DEFAULT_REQUIREMENT.to_string()
        };
    Some(conflict)
}

fn first_regulation(arg: &Expr, resolver: &EntityResolver, conflict: &mut Conflict) {
    if let Some(atom) = arg.as_atom() {
        conflict.regulation1 = match atom {
            "not_opt" => NOT_OPTIONAL.to_string(),
            other => resolver.resolve_entity(other),
        };
        return;
    }
    let Some(call) = arg.head() else {
        return;
    };
    let entity = arg.nth_atom(1).unwrap_or_default();
    conflict.affected_id = entity.to_string();
    conflict.regulation1 = match call {
        "inrs-prohibited-id" => INRS_PROHIBITION.to_string(),
        "mod-not-id" => {
            let modality = arg.nth_atom(2).unwrap_or_default();
            format!("{} is not {}", resolver.resolve_entity(entity), modality)
        }
        other => other.to_string(),
    };
}

fn second_regulation(arg: &Expr, resolver: &EntityResolver, conflict: &mut Conflict) {
    if let Some(entity) = arg.as_atom() {
        conflict.regulation2 = resolver.resolve_entity(entity);
        if conflict.affected_id.is_empty() {
            conflict.affected_id = entity.to_string();
        }
        return;
    }
    let Some(call) = arg.head() else {
        return;
    };
    conflict.regulation2 = match call {
        "pay-obligatory-id" if arg.len() > 2 => {
            if arg.nth_atom(2) == Some(MICT_PORT) {
                "MICT Smart Port payment obligation".to_string()
            } else {
                "Payment obligation".to_string()
            }
        }
        "inrs-only-id" => INRS_ONLY.to_string(),
        other => other.to_string(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse_all;

    fn find(input: &str) -> Vec<Conflict> {
        find_conflicts(&parse_all(input).unwrap(), &EntityResolver::new())
    }

    #[test]
    fn not_optional_versus_leaving() {
        let found = find("(conflict not_opt soa_elam)");
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.regulation1, "Not optional (prohibited)");
        assert_eq!(c.regulation2, "ALEXANDRA MÆRSK");
        assert_eq!(c.affected_entity, "ALEXANDRA MÆRSK");
        assert_eq!(c.affected_id, "soa_elam");
        assert_eq!(c.conflicting_requirement, "permission vs prohibition to leave");
    }

    #[test]
    fn wrapper_with_several_conflicts() {
        let found = find(
            "[(conflict not_opt soa_elam) (conflict (mod-not-id soa_elam permitted) soa_elam)]",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].regulation1, "ALEXANDRA MÆRSK is not permitted");
        assert_eq!(found[1].conflicting_requirement, "regulatory requirements");
    }

    #[test]
    fn known_regulation_calls() {
        let found = find(
            "[(conflict (inrs-prohibited-id soa_ALEXANDRA_MAERSK) (pay-obligatory-id soa_epam soa_sptMICT))]",
        );
        let c = &found[0];
        assert_eq!(c.regulation1, INRS_PROHIBITION);
        assert_eq!(c.regulation2, "MICT Smart Port payment obligation");
        assert_eq!(c.affected_entity, "ALEXANDRA MÆRSK");

        let found = find("(conflict (custom-rule soa_x) (inrs-only-id soa_y))");
        assert_eq!(found[0].regulation1, "custom-rule");
        assert_eq!(found[0].regulation2, "INRS-only requirement");
    }

    #[test]
    fn other_vessels_get_the_general_requirement() {
        let found = find("(conflict not_opt soa_OCEAN_STAR)");
        assert_eq!(found[0].regulation2, "OCEAN STAR");
        assert_eq!(found[0].affected_entity, "OCEAN STAR");
        assert_eq!(found[0].conflicting_requirement, "regulatory requirements");
    }

    #[test]
    fn configured_primary_vessel_gets_the_leave_requirement() {
        let mut resolver = EntityResolver::new();
        resolver.set_primary_vessel("soa_OCEAN_STAR");
        let exprs =
            parse_all("(conflict not_opt soa_OCEAN_STAR)\n(conflict not_opt soa_elam)").unwrap();
        let found = find_conflicts(&exprs, &resolver);
        assert_eq!(found[0].conflicting_requirement, "permission vs prohibition to leave");
        assert_eq!(found[1].conflicting_requirement, "regulatory requirements");
    }

    #[test]
    fn short_forms_are_ignored() {
        assert!(find("(conflict a)\n[(triple a b c)]").is_empty());
    }
}
