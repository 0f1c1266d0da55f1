//! Flat positional patterns over expression trees.
//!
//! A pattern is a sequence of literal atom texts and wildcards, one element
//! per child. Patterns never descend into nested lists; callers walk the
//! tree themselves and match each level.

use super::Expr;

/// Pattern element that accepts any child.
pub const WILDCARD: &str = "?";

/// Whether `expr` matches `pattern`.
///
/// A list matches when it has exactly as many children as the pattern has
/// elements and every literal position holds an atom with that exact text.
/// A one-element pattern also matches a bare atom.
pub fn matches(expr: &Expr, pattern: &[&str]) -> bool {
    match expr {
        Expr::Atom(text) => pattern.len() == 1 && (pattern[0] == WILDCARD || pattern[0] == text),
        Expr::List(children) => {
            children.len() == pattern.len()
                && children
                    .iter()
                    .zip(pattern)
                    .all(|(child, &p)| p == WILDCARD || child.as_atom() == Some(p))
        }
    }
}

/// The texts bound at wildcard positions, in order.
///
/// Returns an empty vector when `expr` does not match. A list bound to a
/// wildcard is rendered canonically, so a successful match always yields
/// exactly one value per wildcard.
pub fn extract(expr: &Expr, pattern: &[&str]) -> Vec<String> {
    if !matches(expr, pattern) {
        return Vec::new();
    }
    match expr {
        Expr::Atom(text) => {
            if pattern[0] == WILDCARD {
                vec![text.clone()]
            } else {
                Vec::new()
            }
        }
        Expr::List(children) => children
            .iter()
            .zip(pattern)
            .filter(|&(_, &p)| p == WILDCARD)
            .map(|(child, _)| child.to_string())
            .collect(),
    }
}

/// Every expression in `exprs` that matches `pattern`, in order.
pub fn find_all<'e>(exprs: &'e [Expr], pattern: &[&str]) -> Vec<&'e Expr> {
    exprs.iter().filter(|expr| matches(expr, pattern)).collect()
}
