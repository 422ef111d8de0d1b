//! Parser shape tests: tree structure, byte ranges, ASI, and tolerant
//! recovery.

use bumpalo::Bump;
use jstags_ast::node::*;
use jstags_core::intern::StringInterner;
use jstags_parser::Parser;

fn parse<'a>(arena: &'a Bump, source: &str) -> (SourceFile<'a>, bool) {
    let interner = StringInterner::new();
    let mut parser = Parser::new(arena, &interner, "test.js", source);
    let file = parser.parse_source_file();
    let has_errors = parser.take_diagnostics().has_errors();
    (file, has_errors)
}

fn parse_ok<'a>(arena: &'a Bump, source: &str) -> SourceFile<'a> {
    let (file, has_errors) = parse(arena, source);
    assert!(!has_errors, "unexpected parse errors in {source:?}");
    file
}

#[test]
fn test_variable_statement_shape() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "var x = 1, y;");
    assert_eq!(file.statements.len(), 1);
    let Statement::VariableStatement(var) = &file.statements[0] else {
        panic!("expected a variable statement");
    };
    assert_eq!(var.declarations.len(), 2);
    assert_eq!(var.declarations[0].name.text_name, "x");
    assert!(var.declarations[0].initializer.is_some());
    assert_eq!(var.declarations[1].name.text_name, "y");
    assert!(var.declarations[1].initializer.is_none());
    // byte ranges
    assert_eq!(var.declarations[0].name.data.range.to_range(), 4..5);
    assert_eq!(var.declarations[1].name.data.range.to_range(), 11..12);
}

#[test]
fn test_member_chain_shape() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "o.a.b = 2;");
    let Statement::ExpressionStatement(stmt) = &file.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Assignment(assign) = stmt.expression else {
        panic!("expected an assignment");
    };
    let Expression::MemberAccess(outer) = assign.left else {
        panic!("expected a member access on the left");
    };
    assert!(!outer.computed);
    let Expression::Identifier(b) = outer.property else {
        panic!("dot access property must be an identifier");
    };
    assert_eq!(b.text_name, "b");
    let Expression::MemberAccess(inner) = outer.object else {
        panic!("expected a nested member access");
    };
    let Expression::Identifier(o) = inner.object else {
        panic!("expected identifier at the chain root");
    };
    assert_eq!(o.text_name, "o");
}

#[test]
fn test_computed_access_with_string_key() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "obj[\"key\"] = 1;");
    let Statement::ExpressionStatement(stmt) = &file.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Assignment(assign) = stmt.expression else {
        panic!("expected an assignment");
    };
    let Expression::MemberAccess(access) = assign.left else {
        panic!("expected a member access");
    };
    assert!(access.computed);
    let Expression::Literal(lit) = access.property else {
        panic!("expected a literal key");
    };
    assert_eq!(lit.text, "key");
    assert_eq!(lit.data.range.to_range(), 4..9);
}

#[test]
fn test_object_literal_nesting() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "var o = { a: { b: 1 }, \"s\": 2, 3: 4 };");
    let Statement::VariableStatement(var) = &file.statements[0] else {
        panic!("expected a variable statement");
    };
    let Some(Expression::ObjectLiteral(obj)) = var.declarations[0].initializer else {
        panic!("expected an object literal initializer");
    };
    assert_eq!(obj.properties.len(), 3);
    assert!(matches!(obj.properties[0].key, PropertyKey::Identifier(_)));
    assert!(matches!(obj.properties[0].value, Expression::ObjectLiteral(_)));
    let PropertyKey::Literal(s) = &obj.properties[1].key else {
        panic!("expected a string key");
    };
    assert_eq!(s.text, "s");
    let PropertyKey::Literal(n) = &obj.properties[2].key else {
        panic!("expected a numeric key");
    };
    assert_eq!(n.text, "3");
}

#[test]
fn test_automatic_semicolon_insertion() {
    let arena = Bump::new();
    let (file, has_errors) = parse(&arena, "var a = 1\nvar b = 2\nreturn");
    assert!(!has_errors);
    assert_eq!(file.statements.len(), 3);
}

#[test]
fn test_missing_semicolon_without_line_break_is_an_error() {
    let arena = Bump::new();
    let (_file, has_errors) = parse(&arena, "var a = 1 var b = 2;");
    assert!(has_errors);
}

#[test]
fn test_tolerant_recovery_still_produces_a_tree() {
    let arena = Bump::new();
    let (file, has_errors) = parse(&arena, "var = ; var ok = 1;");
    assert!(has_errors);
    // the good statement still parses
    let found = file.statements.iter().any(|stmt| {
        matches!(
            stmt,
            Statement::VariableStatement(v)
                if v.declarations.iter().any(|d| d.name.text_name == "ok")
        )
    });
    assert!(found, "recovery should reach the following statement");
}

#[test]
fn test_function_declaration_and_expression() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "function f(a, b) { return a; }\nvar g = function (x) { return x; };");
    let Statement::FunctionDeclaration(func) = &file.statements[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(func.name.text_name, "f");
    assert_eq!(func.parameters.len(), 2);

    let Statement::VariableStatement(var) = &file.statements[1] else {
        panic!("expected a variable statement");
    };
    let Some(Expression::FunctionExpression(expr)) = var.declarations[0].initializer else {
        panic!("expected a function expression initializer");
    };
    assert!(expr.name.is_none());
    assert_eq!(expr.parameters.len(), 1);
}

#[test]
fn test_binary_precedence() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "x = 1 + 2 * 3;");
    let Statement::ExpressionStatement(stmt) = &file.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Assignment(assign) = stmt.expression else {
        panic!("expected an assignment");
    };
    let Expression::Binary(add) = assign.right else {
        panic!("expected a binary expression");
    };
    assert_eq!(add.operator, jstags_ast::SyntaxKind::PlusToken);
    assert!(matches!(add.right, Expression::Binary(mul)
        if mul.operator == jstags_ast::SyntaxKind::AsteriskToken));
}

#[test]
fn test_for_in_head() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "for (var k in obj) { use(k); }");
    let Statement::ForInStatement(stmt) = &file.statements[0] else {
        panic!("expected a for-in statement");
    };
    let ForInit::VariableDeclarations(ref var) = stmt.left else {
        panic!("expected a var clause");
    };
    assert_eq!(var.declarations[0].name.text_name, "k");
    assert!(matches!(stmt.right, Expression::Identifier(_)));
}

#[test]
fn test_classic_for_head_allows_in_inside_parens() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "for (var i = 0; i < 10; i++) { work(i); }");
    assert!(matches!(&file.statements[0], Statement::ForStatement(_)));
}

#[test]
fn test_keyword_property_names() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "o.delete = 1; var p = { in: 2 };");
    let Statement::ExpressionStatement(stmt) = &file.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Assignment(assign) = stmt.expression else {
        panic!("expected an assignment");
    };
    let Expression::MemberAccess(access) = assign.left else {
        panic!("expected a member access");
    };
    let Expression::Identifier(name) = access.property else {
        panic!("expected an identifier property");
    };
    assert_eq!(name.text_name, "delete");
}

#[test]
fn test_non_ascii_identifier_ranges_are_byte_accurate() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "var såå = 1; såå = 2;");
    let Statement::VariableStatement(var) = &file.statements[0] else {
        panic!("expected a variable statement");
    };
    let name = &var.declarations[0].name;
    assert_eq!(name.text_name, "såå");
    // s is 1 byte, å is 2 bytes each
    assert_eq!(name.data.range.len(), 5);
}

#[test]
fn test_node_ids_are_unique() {
    let arena = Bump::new();
    let file = parse_ok(&arena, "var o = { a: 1 }; o.a = f(o.a, 2);");
    let mut ids = std::collections::HashSet::new();
    let mut count = 0usize;
    collect_ids(jstags_ast::NodeRef::SourceFile(&file), &mut ids, &mut count);
    assert_eq!(ids.len(), count, "node ids must be unique");
}

fn collect_ids(
    node: jstags_ast::NodeRef<'_>,
    ids: &mut std::collections::HashSet<jstags_ast::NodeId>,
    count: &mut usize,
) {
    ids.insert(node.id());
    *count += 1;
    node.for_each_child(&mut |child| collect_ids(child, ids, count));
}
