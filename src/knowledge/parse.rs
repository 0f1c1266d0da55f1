//! Shape probes that read knowledge items out of expression trees.
//!
//! Every probe returns `None` for a tree of another shape. Callers try
//! shapes speculatively, so a mismatch is never an error.

use super::model::{
    Condition, Entity, LogicalExpression, LogicalOp, Negation, Norm, Triple, TripleKind,
};
use super::vocabulary::EVENTUALITY_PREFIX;
use crate::sexpr::Expr;

/// Head of the rules that attach consequences to a norm.
pub const CONSEQUENCE_RULE: &str = "ct-triple-for-add";

// ---------------------------------------------------------------------------
// Expression kinds
// ---------------------------------------------------------------------------

/// Coarse classification of a knowledge expression by its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Triple,
    Negation,
    LogicalOr,
    LogicalAnd,
    LogicalEqual,
    Unknown,
}

impl ExpressionKind {
    pub fn of(expr: &Expr) -> Self {
        match expr.head() {
            Some("ct-triple" | "meta-triple") => Self::Triple,
            Some("ct-simple-not") => Self::Negation,
            Some("=") => match expr.nth(1).and_then(Expr::head) {
                Some("ct-or") => Self::LogicalOr,
                Some("ct-and") => Self::LogicalAnd,
                _ => Self::LogicalEqual,
            },
            _ => Self::Unknown,
        }
    }
}

/// One knowledge item read from an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeItem {
    Triple(Triple),
    Entity(Entity),
    Negation(Negation),
    Logical(LogicalExpression),
}

/// Everything `expr` asserts. A `type` triple on a non-eventuality subject
/// yields both the triple and the entity it defines.
pub fn interpret(expr: &Expr) -> Vec<KnowledgeItem> {
    match ExpressionKind::of(expr) {
        ExpressionKind::Triple => {
            let Some(triple) = parse_triple(expr) else {
                return Vec::new();
            };
            let entity = parse_entity(&triple);
            let mut items = vec![KnowledgeItem::Triple(triple)];
            items.extend(entity.map(KnowledgeItem::Entity));
            items
        }
        ExpressionKind::Negation => {
            parse_negation(expr).map(KnowledgeItem::Negation).into_iter().collect()
        }
        ExpressionKind::LogicalOr | ExpressionKind::LogicalAnd | ExpressionKind::LogicalEqual => {
            parse_logical_expression(expr)
                .map(KnowledgeItem::Logical)
                .into_iter()
                .collect()
        }
        ExpressionKind::Unknown => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// `(ct-triple|meta-triple subject predicate object)`.
pub fn parse_triple(expr: &Expr) -> Option<Triple> {
    let list = expr.as_list()?;
    if list.len() != 4 {
        return None;
    }
    let kind = TripleKind::from_symbol(list[0].as_atom()?)?;
    let subject = list[1].as_atom()?;
    let predicate = list[2].as_atom()?;

    let (object, object_is_nested) = match &list[3] {
        Expr::Atom(text) => (text.clone(), false),
        nested @ Expr::List(_) => (nested.to_string(), true),
    };

    Some(Triple {
        kind,
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        object,
        object_is_nested,
    })
}

/// `(ct-simple-not name negated)`.
pub fn parse_negation(expr: &Expr) -> Option<Negation> {
    let list = expr.as_list()?;
    if list.len() != 3 || list[0].as_atom() != Some("ct-simple-not") {
        return None;
    }
    Some(Negation {
        name: list[1].as_atom()?.to_string(),
        negated_entity: list[2].as_atom()?.to_string(),
    })
}

/// `(= (op name) (operands...))` or `(= (name [operand]) (operands...))`.
pub fn parse_logical_expression(expr: &Expr) -> Option<LogicalExpression> {
    let list = expr.as_list()?;
    if list.len() < 2 || list[0].as_atom() != Some("=") {
        return None;
    }

    let inner = list[1].as_list()?;
    let head = inner.first()?.as_atom()?;
    let mut logical = match LogicalOp::from_symbol(head) {
        Some(op) => LogicalExpression {
            op,
            name: inner.get(1)?.as_atom()?.to_string(),
            operands: Vec::new(),
        },
        None => LogicalExpression {
            op: LogicalOp::Equal,
            name: head.to_string(),
            operands: inner
                .get(1)
                .and_then(Expr::as_atom)
                .map(str::to_string)
                .into_iter()
                .collect(),
        },
    };

    if let Some(operands) = list.get(2).and_then(Expr::as_list) {
        logical
            .operands
            .extend(operands.iter().filter_map(Expr::as_atom).map(str::to_string));
    }
    Some(logical)
}

/// A `type` triple whose subject is not an eventuality name.
pub fn parse_entity(triple: &Triple) -> Option<Entity> {
    if triple.predicate != "type" || triple.subject.starts_with(EVENTUALITY_PREFIX) {
        return None;
    }
    Some(Entity {
        name: triple.subject.clone(),
        kind: triple.object.clone(),
        properties: Default::default(),
    })
}

// ---------------------------------------------------------------------------
// Norms
// ---------------------------------------------------------------------------

/// Whether `expr` defines a norm: `(= (name params...) body)` whose body is
/// a `let*` form or `True`. Combinator definitions never are.
pub fn is_norm_definition(expr: &Expr) -> bool {
    if !expr.is_headed_by("=") || expr.len() != 3 {
        return false;
    }
    let named = expr
        .nth(1)
        .and_then(Expr::head)
        .is_some_and(|head| LogicalOp::from_symbol(head).is_none());
    named
        && expr
            .nth(2)
            .is_some_and(|body| body.is_headed_by("let*") || body.as_atom() == Some("True"))
}

/// `(= (name params...) body)`, with conditions read from a
/// `(let* ((var (cond)) ...) True)` body.
pub fn parse_norm(expr: &Expr) -> Option<Norm> {
    let list = expr.as_list()?;
    if list.len() < 2 || list[0].as_atom() != Some("=") {
        return None;
    }
    let header = list[1].as_list()?;
    let name = header.first()?.as_atom()?;

    let mut norm = Norm {
        name: name.to_string(),
        parameters: header[1..].iter().filter_map(Expr::as_atom).map(str::to_string).collect(),
        ..Norm::default()
    };

    if let Some(bindings) = let_bindings(list.get(2)) {
        norm.conditions = bindings.iter().filter_map(parse_condition).collect();
    }
    Some(norm)
}

fn let_bindings(body: Option<&Expr>) -> Option<&[Expr]> {
    let body = body?;
    if !body.is_headed_by("let*") {
        return None;
    }
    body.nth(1)?.as_list()
}

fn parse_condition(binding: &Expr) -> Option<Condition> {
    let variable = binding.nth_atom(0)?;
    let call = binding.nth(1)?;
    if !call.is_list() {
        return None;
    }
    let rendered = call.to_string();
    let expression = rendered
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(&rendered);
    Some(Condition {
        variable: variable.to_string(),
        expression: expression.to_string(),
    })
}

/// A consequence rule `(= (ct-triple-for-add s p o) (let* ((True (norm ...))) True))`,
/// returned as the name of the norm it belongs to and the fact it adds.
pub fn parse_consequence(expr: &Expr) -> Option<(String, Triple)> {
    let list = expr.as_list()?;
    if list.len() < 3 || list[0].as_atom() != Some("=") {
        return None;
    }
    let header = list[1].as_list()?;
    if header.len() != 4 || header[0].as_atom() != Some(CONSEQUENCE_RULE) {
        return None;
    }
    let first_binding = let_bindings(list.get(2))?.first()?;
    if first_binding.nth_atom(0) != Some("True") {
        return None;
    }
    let owner = first_binding.nth(1)?.head()?;

    let (object, object_is_nested) = match &header[3] {
        Expr::Atom(text) => (text.clone(), false),
        nested @ Expr::List(_) => (nested.to_string(), true),
    };
    let triple = Triple {
        kind: TripleKind::Fact,
        subject: header[1].as_atom()?.to_string(),
        predicate: header[2].as_atom()?.to_string(),
        object,
        object_is_nested,
    };
    Some((owner.to_string(), triple))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::parse_one;

    fn expr(text: &str) -> Expr {
        parse_one(text).unwrap()
    }

    #[test]
    fn triple_with_atom_object() {
        let t = parse_triple(&expr("(ct-triple soa_epam soaHas_agent soa_ALEXANDRA_MAERSK)"))
            .unwrap();
        assert_eq!(t.kind, TripleKind::Fact);
        assert_eq!(t.object, "soa_ALEXANDRA_MAERSK");
        assert!(!t.object_is_nested);
    }

    #[test]
    fn triple_with_nested_object() {
        let t = parse_triple(&expr("(meta-triple soa_epam soaHas_amount (15000 USD))")).unwrap();
        assert_eq!(t.kind, TripleKind::Meta);
        assert_eq!(t.object, "(15000 USD)");
        assert!(t.object_is_nested);
    }

    #[test]
    fn non_triples_are_rejected() {
        assert!(parse_triple(&expr("(ct-triple a b)")).is_none());
        assert!(parse_triple(&expr("(triple a b c)")).is_none());
        assert!(parse_triple(&expr("(ct-triple (a) b c)")).is_none());
        assert!(parse_triple(&Expr::atom("ct-triple")).is_none());
    }

    #[test]
    fn negation_shape() {
        let n = parse_negation(&expr("(ct-simple-not soa_enpam soa_epam)")).unwrap();
        assert_eq!(n.name, "soa_enpam");
        assert_eq!(n.negated_entity, "soa_epam");
        assert!(parse_negation(&expr("(ct-simple-not soa_enpam)")).is_none());
    }

    #[test]
    fn logical_combinators() {
        let or =
            parse_logical_expression(&expr("(= (ct-or soa_eo) (soa_epam soa_enpam))")).unwrap();
        assert_eq!(or.op, LogicalOp::Or);
        assert_eq!(or.name, "soa_eo");
        assert_eq!(or.operands, vec!["soa_epam", "soa_enpam"]);

        let not = parse_logical_expression(&expr("(= (ct-not soa_x) (soa_y))")).unwrap();
        assert_eq!(not.op, LogicalOp::Not);
    }

    #[test]
    fn logical_named_equality() {
        let eq = parse_logical_expression(&expr("(= (is-fee soa_x) (a b))")).unwrap();
        assert_eq!(eq.op, LogicalOp::Equal);
        assert_eq!(eq.name, "is-fee");
        assert_eq!(eq.operands, vec!["soa_x", "a", "b"]);

        let bare = parse_logical_expression(&expr("(= (flag))")).unwrap();
        assert_eq!(bare.name, "flag");
        assert!(bare.operands.is_empty());

        assert!(parse_logical_expression(&expr("(= flag True)")).is_none());
    }

    #[test]
    fn logical_rendering_round_trips() {
        for text in [
            "(= (ct-or soa_eo) (soa_epam soa_enpam))",
            "(= (ct-and soa_ea))",
            "(= (ct-not soa_n) (soa_x))",
            "(= (is-fee soa_x) (a b))",
            "(= (is-fee soa_x))",
            "(= (flag))",
        ] {
            let parsed = parse_logical_expression(&expr(text)).unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(parse_logical_expression(&expr(&parsed.to_string())), Some(parsed));
        }
    }

    #[test]
    fn entity_derivation() {
        let vessel = Triple::fact("soa_ALEXANDRA_MAERSK", "type", "soaContainerVessel");
        assert_eq!(parse_entity(&vessel).unwrap().kind, "soaContainerVessel");
        assert!(parse_entity(&Triple::fact("soa_epam", "type", "soaPay")).is_none());
        assert!(parse_entity(&Triple::fact("soa_MICT", "soaHas_location", "x")).is_none());
    }

    #[test]
    fn norm_with_conditions() {
        let norm = parse_norm(&expr(
            "(= (pay-obligatory $e $v) (let* (($m (moored $e $v)) ($p (port $v))) True))",
        ))
        .unwrap();
        assert_eq!(norm.name, "pay-obligatory");
        assert_eq!(norm.parameters, vec!["$e", "$v"]);
        assert_eq!(norm.conditions.len(), 2);
        assert_eq!(norm.conditions[0].variable, "$m");
        assert_eq!(norm.conditions[0].expression, "moored $e $v");
        assert_eq!(norm.conditions[1].to_string(), "($p (port $v))");
    }

    #[test]
    fn norm_without_conditions() {
        let norm = parse_norm(&expr("(= (always $x) True)")).unwrap();
        assert!(norm.conditions.is_empty());
        assert_eq!(norm.parameters, vec!["$x"]);
    }

    #[test]
    fn norm_definitions_are_told_apart_from_logical_expressions() {
        assert!(is_norm_definition(&expr("(= (always $x) True)")));
        assert!(is_norm_definition(&expr("(= (p $x) (let* (($y (q $x))) True))")));
        assert!(!is_norm_definition(&expr("(= (ct-and soa_ea) (let* () True))")));
        assert!(!is_norm_definition(&expr("(= (is-fee soa_x) (a b))")));
        assert!(!is_norm_definition(&expr("(= (flag))")));
    }

    #[test]
    fn consequence_rule() {
        let (owner, triple) = parse_consequence(&expr(
            "(= (ct-triple-for-add $e type obligatory) (let* ((True (pay-obligatory $e))) True))",
        ))
        .unwrap();
        assert_eq!(owner, "pay-obligatory");
        assert_eq!(triple, Triple::fact("$e", "type", "obligatory"));
    }

    #[test]
    fn interpret_dispatches_by_head() {
        let items = interpret(&expr("(ct-triple soa_MICT type smartport)"));
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], KnowledgeItem::Entity(_)));

        assert!(matches!(
            interpret(&expr("(ct-simple-not a b)")).as_slice(),
            [KnowledgeItem::Negation(_)]
        ));
        assert!(interpret(&expr("(unrelated a b)")).is_empty());
    }

    #[test]
    fn expression_kinds() {
        assert_eq!(ExpressionKind::of(&expr("(= (ct-or a) (b))")), ExpressionKind::LogicalOr);
        assert_eq!(ExpressionKind::of(&expr("(= (ct-and a) (b))")), ExpressionKind::LogicalAnd);
        assert_eq!(ExpressionKind::of(&expr("(= (f a) (b))")), ExpressionKind::LogicalEqual);
        assert_eq!(ExpressionKind::of(&expr("(meta-triple a b c)")), ExpressionKind::Triple);
        assert_eq!(ExpressionKind::of(&Expr::atom("x")), ExpressionKind::Unknown);
    }
}
