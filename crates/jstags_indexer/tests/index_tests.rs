//! End-to-end indexing tests: parse real source, index it, and check
//! the per-scope tables.

use jstags_indexer::{index_source, index_with, FileIndex, IndexError};
use jstags_scopes::ScopeKind;

fn index(source: &str) -> FileIndex {
    index_source("test.js", source).expect("indexing should succeed")
}

/// Every occurrence list starts with its declaration and never repeats it.
fn assert_declaration_invariant(index: &FileIndex) {
    for scope in &index.scopes {
        for (path, list) in scope.table.iter() {
            assert!(!list.is_empty(), "empty occurrence list for {path}");
            assert!(
                list[0].is_declaration,
                "first occurrence of {path} must be the declaration"
            );
            assert!(
                list[1..].iter().all(|occ| !occ.is_declaration),
                "only the first occurrence of {path} may be the declaration"
            );
        }
    }
}

#[test]
fn test_declaration_then_reference() {
    let index = index("var x = 1; x = 2;");
    assert_eq!(index.scopes.len(), 1);
    let global = &index.scopes[0];
    assert_eq!(global.kind, ScopeKind::Global);

    let x = global.table.get("x").unwrap();
    assert_eq!(x.len(), 2);
    assert!(x[0].is_declaration);
    assert_eq!(x[0].range.to_range(), 4..5);
    assert!(!x[1].is_declaration);
    assert_eq!(x[1].range.to_range(), 11..12);
    assert_declaration_invariant(&index);
}

#[test]
fn test_object_literal_and_dotted_access_share_a_path() {
    let index = index("var o = { a: { b: 1 } }; o.a.b = 2;");
    let global = &index.scopes[0];

    let o = global.table.get("o").unwrap();
    assert_eq!(o.len(), 2);
    assert_eq!(o[0].range.to_range(), 4..5);
    assert_eq!(o[1].range.to_range(), 25..26);

    let oa = global.table.get("o.a").unwrap();
    assert_eq!(oa.len(), 2);
    assert_eq!(oa[0].range.to_range(), 10..11);
    assert_eq!(oa[1].range.to_range(), 27..28);

    // literal definition is the declaration, dotted access the reference
    let oab = global.table.get("o.a.b").unwrap();
    assert_eq!(oab.len(), 2);
    assert!(oab[0].is_declaration);
    assert_eq!(oab[0].range.to_range(), 15..16);
    assert!(!oab[1].is_declaration);
    assert_eq!(oab[1].range.to_range(), 29..30);
    assert_declaration_invariant(&index);
}

#[test]
fn test_shadowing_isolates_occurrence_lists() {
    let index = index("var x = 1; function f(){ var x = 2; x = 3; }");
    assert_eq!(index.scopes.len(), 2);

    let global = &index.scopes[0];
    let outer_x = global.table.get("x").unwrap();
    assert_eq!(outer_x.len(), 1, "outer x must keep only its declaration");
    assert!(outer_x[0].is_declaration);

    let function = &index.scopes[1];
    assert_eq!(function.kind, ScopeKind::Function);
    let inner_x = function.table.get("x").unwrap();
    assert_eq!(inner_x.len(), 2, "inner x has declaration and reference");
    assert!(inner_x[0].is_declaration);
    assert!(!inner_x[1].is_declaration);
    assert_declaration_invariant(&index);
}

#[test]
fn test_computed_literal_key_registers_path() {
    let index = index("obj[\"key\"] = 1;");
    let global = &index.scopes[0];

    // no identifier node is ever visited for "key"
    let key = global.table.get("obj.key").unwrap();
    assert_eq!(key.len(), 1);
    assert!(key[0].is_declaration);
    // the occurrence covers the literal, quotes included
    assert_eq!(key[0].range.to_range(), 4..9);

    assert!(global.table.get("obj").is_some());
    assert_declaration_invariant(&index);
}

#[test]
fn test_computed_access_unifies_with_literal_definition() {
    let index = index("var cfg = { a: 1 };\ncfg[\"a\"] = 2;");
    let global = &index.scopes[0];
    let cfg_a = global.table.get("cfg.a").unwrap();
    assert_eq!(cfg_a.len(), 2);
    assert!(cfg_a[0].is_declaration);
    assert!(!cfg_a[1].is_declaration);
}

#[test]
fn test_constructor_key_does_not_collide() {
    let index = index("var constructor = 1; constructor = 2; x.constructor = 3;");
    let global = &index.scopes[0];

    // the bare name is stored under its escaped key only
    assert!(global.table.get("constructor").is_none());
    let escaped = global.table.get(" constructor").unwrap();
    assert_eq!(escaped.len(), 2);

    // the property position resolves independently
    let member = global.table.get("x.constructor").unwrap();
    assert_eq!(member.len(), 1);
    assert_declaration_invariant(&index);
}

#[test]
fn test_function_scope_resets_object_context() {
    let index = index("var o = { m: function() { var i = 1; } };");
    assert_eq!(index.scopes.len(), 2);

    let global = &index.scopes[0];
    assert!(global.table.get("o").is_some());
    assert!(global.table.get("o.m").is_some());

    // the function body is not inside the literal's dotted namespace
    let function = &index.scopes[1];
    assert!(function.table.get("i").is_some());
    for scope in &index.scopes {
        assert!(scope.table.get("o.m.i").is_none());
    }
}

#[test]
fn test_function_name_and_parameters_index_into_function_scope() {
    let index = index("function add(a, b) { return a + b; }");
    assert_eq!(index.scopes.len(), 2);
    let function = &index.scopes[1];

    // the name identifier is a child of the function node, so it lands
    // in the scope the function itself opens
    assert_eq!(function.table.get("add").unwrap().len(), 1);
    assert_eq!(function.table.get("a").unwrap().len(), 2);
    assert_eq!(function.table.get("b").unwrap().len(), 2);
    assert_declaration_invariant(&index);
}

#[test]
fn test_reference_attaches_to_innermost_holding_scope() {
    let index = index("var shared = 1; function f() { shared = 2; }");
    let global = &index.scopes[0];
    let shared = global.table.get("shared").unwrap();
    assert_eq!(shared.len(), 2, "inner reference walks out to the global entry");
    let function = &index.scopes[1];
    assert!(function.table.get("shared").is_none());
}

#[test]
fn test_nested_literal_paths() {
    let index = index("var x = { y: { z: { w: 1 } } };");
    let global = &index.scopes[0];
    for path in ["x", "x.y", "x.y.z", "x.y.z.w"] {
        assert!(
            global.table.get(path).is_some(),
            "expected path {path} in the global table"
        );
    }
}

#[test]
fn test_self_reference_degrades_to_placeholder() {
    let index = index("this.x = 1;");
    let global = &index.scopes[0];
    let path = format!("{}.x", jstags_indexer::UNRESOLVED);
    let list = global.table.get(&path).unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn test_for_in_declares_loop_variable() {
    let index = index("for (var k in obj) { k = 1; }");
    let global = &index.scopes[0];
    let k = global.table.get("k").unwrap();
    assert_eq!(k.len(), 2);
    assert!(k[0].is_declaration);
    assert!(global.table.get("obj").is_some());
}

#[test]
fn test_scopes_in_document_order() {
    let index = index(
        "function first() { function inner() {} }\nfunction second() {}",
    );
    assert_eq!(index.scopes.len(), 4);
    assert_eq!(index.scopes[0].kind, ScopeKind::Global);
    let starts: Vec<_> = index.scopes.iter().map(|s| s.range.pos).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_unparsable_source_is_fatal() {
    let err = index_source("bad.js", "var = ;").unwrap_err();
    match err {
        IndexError::ParseFailed { file, diagnostics } => {
            assert_eq!(file, "bad.js");
            assert!(diagnostics.has_errors());
        }
        other => panic!("expected ParseFailed, got {other:?}"),
    }
}

#[test]
fn test_callback_delivery() {
    let mut seen = None;
    index_with("cb.js", "var a = 1;", |index| {
        seen = Some(index.occurrence_count());
    })
    .unwrap();
    assert_eq!(seen, Some(1));
}

#[test]
fn test_serialized_shape() {
    let index = index("var x = 1; x = 2;");
    let json = serde_json::to_value(&index).unwrap();
    assert_eq!(json["file"], "test.js");
    assert_eq!(json["scopes"][0]["kind"], "global");
    assert_eq!(
        json["scopes"][0]["symbols"]["x"],
        serde_json::json!([[4, 5, true], [11, 12]])
    );
}

#[test]
fn test_larger_program_keeps_invariants() {
    let source = r#"
var config = {
    server: {
        host: "localhost",
        port: 8080
    },
    retries: 3
};

function connect(options) {
    var attempts = 0;
    while (attempts < config.retries) {
        attempts++;
        if (open(options.host, options.port)) {
            return true;
        }
    }
    return false;
}

config.server.port = 9090;
connect(config.server);
"#;
    let index = index(source);
    assert_declaration_invariant(&index);

    let global = &index.scopes[0];
    assert_eq!(global.table.get("config.server.port").unwrap().len(), 2);
    assert_eq!(global.table.get("config.retries").unwrap().len(), 2);
    assert_eq!(global.table.get("config").unwrap().len(), 4);

    let function = &index.scopes[1];
    assert_eq!(function.table.get("attempts").unwrap().len(), 3);
    assert_eq!(function.table.get("options").unwrap().len(), 3);
}
