//! Canonical path rendering for member-access chains.

use jstags_ast::node::{Expression, MemberAccessExpression};

/// Fragment recorded when a piece of a member chain has no static name
/// (`this.x`, `a[f()].y`). Cannot collide with identifier-derived
/// fragments, which never contain `<`.
pub const UNRESOLVED: &str = "<unresolved>";

/// Render the canonical dotted name of a member-access chain.
pub fn resolve_member(access: &MemberAccessExpression<'_>) -> String {
    let mut path = resolve_expression(access.object);
    path.push('.');
    path.push_str(&resolve_expression(access.property));
    path
}

/// Render one link of a member chain: identifiers contribute their name,
/// nested accesses recurse, constant keys contribute their cooked text,
/// anything without a static name becomes the unresolved marker.
pub fn resolve_expression(expr: &Expression<'_>) -> String {
    match expr {
        Expression::Identifier(n) => n.text_name.clone(),
        Expression::MemberAccess(n) => resolve_member(n),
        Expression::Literal(n) => n.text.clone(),
        // parentheses are transparent: (a).b names the same path as a.b
        Expression::Parenthesized(n) => resolve_expression(n.expression),
        Expression::ThisExpression(_)
        | Expression::ArrayLiteral(_)
        | Expression::ObjectLiteral(_)
        | Expression::Call(_)
        | Expression::New(_)
        | Expression::FunctionExpression(_)
        | Expression::PrefixUnary(_)
        | Expression::PostfixUnary(_)
        | Expression::Binary(_)
        | Expression::Assignment(_)
        | Expression::Conditional(_) => UNRESOLVED.to_string(),
    }
}

/// Prefix a path suffix with the enclosing object-literal context.
pub fn join_context(context: &[String], suffix: &str) -> String {
    if context.is_empty() {
        suffix.to_string()
    } else {
        let mut path = context.join(".");
        path.push('.');
        path.push_str(suffix);
        path
    }
}

/// The exact path `constructor` is stored under an escaped key so it
/// cannot take on any reserved meaning in the table's own key space.
/// No identifier-derived path can start with a space.
pub fn escape_table_key(path: String) -> String {
    if path == "constructor" {
        " constructor".to_string()
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_context() {
        assert_eq!(join_context(&[], "x"), "x");
        let ctx = vec!["o".to_string(), "a".to_string()];
        assert_eq!(join_context(&ctx, "b"), "o.a.b");
    }

    #[test]
    fn test_escape_constructor_only_exact() {
        assert_eq!(escape_table_key("constructor".into()), " constructor");
        assert_eq!(escape_table_key("o.constructor".into()), "o.constructor");
        assert_eq!(escape_table_key("x".into()), "x");
    }
}
