//! S-expression trees read from reasoning-engine output.
//!
//! - **Lexer** (`lexer`): bracket and atom tokens with byte offsets
//! - **Reader** (`reader`): token stream → owned [`Expr`] trees
//! - **Matcher** (`matcher`): flat wildcard patterns over trees
//!
//! Trees are strictly owned: a list exclusively owns its children, so
//! nothing is shared between expressions and a tree can be dropped as soon
//! as the analysis that read it returns.

pub mod lexer;
pub mod matcher;
pub mod reader;

use std::fmt;

pub use matcher::{WILDCARD, extract, find_all, matches};
pub use reader::{
    ParseError, ParseErrorKind, ParseResult, parse_all, parse_lines, parse_one, parse_resilient,
};

/// An expression tree: an atom or an ordered list of child trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Atom(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn atom(text: impl Into<String>) -> Self {
        Self::Atom(text.into())
    }

    pub fn list(children: Vec<Expr>) -> Self {
        Self::List(children)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The atom text, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(text) => Some(text),
            Self::List(_) => None,
        }
    }

    /// The children, if this is a list.
    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Self::List(children) => Some(children),
            Self::Atom(_) => None,
        }
    }

    /// The `n`th child of a list.
    pub fn nth(&self, n: usize) -> Option<&Expr> {
        self.as_list().and_then(|children| children.get(n))
    }

    /// Atom text of the `n`th child of a list.
    pub fn nth_atom(&self, n: usize) -> Option<&str> {
        self.nth(n).and_then(Expr::as_atom)
    }

    /// Child count for a list; an atom counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::List(children) => children.len(),
            Self::Atom(_) => 1,
        }
    }

    /// Whether this is the empty list `()`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(children) if children.is_empty())
    }

    /// The head symbol of a list whose first child is an atom.
    pub fn head(&self) -> Option<&str> {
        self.nth_atom(0)
    }

    /// Whether this is a list headed by the atom `symbol`.
    pub fn is_headed_by(&self, symbol: &str) -> bool {
        self.head() == Some(symbol)
    }
}

/// Canonical rendering: atoms verbatim, lists in round brackets with single
/// spaces between children.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(text),
            Self::List(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// View over `(triple subject predicate object)` with atom components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl TermTriple {
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        let values = extract(expr, &["triple", WILDCARD, WILDCARD, WILDCARD]);
        let children = expr.as_list()?;
        if values.len() != 3 || children[1..].iter().any(Expr::is_list) {
            return None;
        }
        let mut values = values.into_iter();
        Some(Self {
            subject: values.next()?,
            predicate: values.next()?,
            object: values.next()?,
        })
    }
}

/// View over `(meta-id id [kind [property [value]]])`.
///
/// Missing trailing fields are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaId {
    pub id: String,
    pub kind: String,
    pub property: String,
    pub value: String,
}

impl MetaId {
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        if !expr.is_headed_by("meta-id") {
            return None;
        }
        let field = |n: usize| expr.nth_atom(n).unwrap_or_default().to_string();
        Some(Self {
            id: expr.nth_atom(1)?.to_string(),
            kind: field(2),
            property: field(3),
            value: field(4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_canonical() {
        let expr = parse_one("[a   (b\n c) ()]").unwrap();
        assert_eq!(expr.to_string(), "(a (b c) ())");
    }

    #[test]
    fn rendering_reparses_to_same_tree() {
        let expr = parse_one("(= (pay-obligatory $v) (let* (($x (f $v))) True))").unwrap();
        assert_eq!(parse_one(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn accessors() {
        let expr = parse_one("(conflict not_opt (x y))").unwrap();
        assert_eq!(expr.head(), Some("conflict"));
        assert_eq!(expr.len(), 3);
        assert_eq!(expr.nth_atom(1), Some("not_opt"));
        assert!(expr.nth(2).is_some_and(Expr::is_list));
        assert_eq!(expr.nth(3), None);
        assert_eq!(Expr::atom("x").len(), 1);
        assert!(Expr::list(vec![]).is_empty());
    }

    #[test]
    fn term_triple_requires_atoms() {
        let ok = parse_one("(triple soa_epam type soaPay)").unwrap();
        let t = TermTriple::from_expr(&ok).unwrap();
        assert_eq!(t.subject, "soa_epam");
        assert_eq!(t.object, "soaPay");

        let nested = parse_one("(triple soa_epam soaHas_amount (15000 USD))").unwrap();
        assert!(TermTriple::from_expr(&nested).is_none());
    }

    #[test]
    fn meta_id_fills_missing_fields_with_empty() {
        let full = parse_one("(meta-id soa_epmuam type rexist false)").unwrap();
        let meta = MetaId::from_expr(&full).unwrap();
        assert_eq!(meta.id, "soa_epmuam");
        assert_eq!(meta.value, "false");

        let short = parse_one("(meta-id soa_x)").unwrap();
        let meta = MetaId::from_expr(&short).unwrap();
        assert_eq!(meta.kind, "");
        assert!(MetaId::from_expr(&parse_one("(other soa_x)").unwrap()).is_none());
    }
}
