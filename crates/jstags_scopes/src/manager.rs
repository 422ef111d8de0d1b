//! The scope manager: pre-pass analysis plus the acquire/release contract.

use crate::scope::{BindingKind, ScopeId, ScopeKind, ScopeRecord};
use jstags_ast::node::{NodeId, SourceFile};
use jstags_ast::walk::NodeRef;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Contract violations the engine can detect on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("scope opening at offset {offset} was acquired more than once")]
    DoubleAcquire { offset: u32 },
    #[error("{count} scope(s) were never released before close")]
    UnbalancedClose { count: usize },
}

/// Tracks per-scope acquire/release state during one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeState {
    Unvisited,
    Acquired,
    Released,
}

/// The scope-resolution engine for one file.
///
/// `open` runs a pre-pass that finds every scope-opening node and hoists
/// bindings into the scope that owns them under ES5 rules: `var` and
/// function declarations belong to the nearest enclosing function (or
/// the file), parameters to their function.
pub struct ScopeManager {
    scopes: Vec<ScopeRecord>,
    by_block: FxHashMap<NodeId, ScopeId>,
    states: Vec<ScopeState>,
    violation: Option<ScopeError>,
}

impl ScopeManager {
    /// Analyze a parsed file and build its scope records in document order.
    pub fn open(root: &SourceFile<'_>) -> ScopeManager {
        let mut analyzer = Analyzer {
            scopes: Vec::new(),
            stack: Vec::new(),
        };
        analyzer.push_scope(ScopeKind::Global, NodeRef::SourceFile(root));
        NodeRef::SourceFile(root).for_each_child(&mut |child| analyzer.visit(child));
        analyzer.stack.pop();
        debug_assert!(analyzer.stack.is_empty());

        let scopes = analyzer.scopes;
        let by_block = scopes.iter().map(|s| (s.block, s.id)).collect();
        let states = vec![ScopeState::Unvisited; scopes.len()];
        debug!(scope_count = scopes.len(), "scope analysis complete");
        ScopeManager {
            scopes,
            by_block,
            states,
            violation: None,
        }
    }

    /// Returns the new scope exactly when `node` opens one.
    pub fn acquire(&mut self, node: NodeId) -> Option<&ScopeRecord> {
        let id = *self.by_block.get(&node)?;
        let state = &mut self.states[id.index()];
        if *state != ScopeState::Unvisited {
            let offset = self.scopes[id.index()].range.pos;
            self.violation.get_or_insert(ScopeError::DoubleAcquire { offset });
            return None;
        }
        *state = ScopeState::Acquired;
        trace!(scope = ?id, "acquire");
        Some(&self.scopes[id.index()])
    }

    /// Returns true exactly when `node` closes the scope it opened.
    pub fn release(&mut self, node: NodeId) -> bool {
        let Some(&id) = self.by_block.get(&node) else {
            return false;
        };
        if self.states[id.index()] == ScopeState::Acquired {
            self.states[id.index()] = ScopeState::Released;
        }
        trace!(scope = ?id, "release");
        true
    }

    /// Finish the traversal, verifying the acquire/release bookkeeping.
    pub fn close(self) -> Result<(), ScopeError> {
        if let Some(violation) = self.violation {
            return Err(violation);
        }
        let unreleased = self
            .states
            .iter()
            .filter(|&&s| s == ScopeState::Acquired)
            .count();
        if unreleased > 0 {
            return Err(ScopeError::UnbalancedClose { count: unreleased });
        }
        Ok(())
    }

    /// All scopes, in document order.
    pub fn scopes(&self) -> &[ScopeRecord] {
        &self.scopes
    }

    /// Get a scope by id.
    pub fn scope(&self, id: ScopeId) -> &ScopeRecord {
        &self.scopes[id.index()]
    }
}

/// The pre-pass walker building scope records with hoisted bindings.
struct Analyzer {
    scopes: Vec<ScopeRecord>,
    /// Indices into `scopes` of the live chain; blocks do not push here,
    /// so the top is always the nearest function (or global) scope and
    /// `var` hoisting falls out of the stack shape.
    stack: Vec<usize>,
}

impl Analyzer {
    fn push_scope(&mut self, kind: ScopeKind, node: NodeRef<'_>) {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes
            .push(ScopeRecord::new(id, kind, node.id(), node.range()));
        self.stack.push(id.index());
    }

    fn current_scope(&mut self) -> &mut ScopeRecord {
        let idx = *self.stack.last().expect("analyzer scope stack underflow");
        &mut self.scopes[idx]
    }

    fn visit(&mut self, node: NodeRef<'_>) {
        let mut opened = false;
        match node {
            NodeRef::FunctionDeclaration(func) => {
                // the name is hoisted into the declaring scope
                self.current_scope().add_binding(
                    func.name.text,
                    BindingKind::Function,
                    func.data.id,
                );
                self.push_scope(ScopeKind::Function, node);
                opened = true;
                for param in func.parameters.iter() {
                    self.current_scope().add_binding(
                        param.text,
                        BindingKind::Parameter,
                        param.data.id,
                    );
                }
            }
            NodeRef::FunctionExpression(func) => {
                self.push_scope(ScopeKind::Function, node);
                opened = true;
                // a named function expression binds its own name inside itself
                if let Some(ref name) = func.name {
                    self.current_scope().add_binding(
                        name.text,
                        BindingKind::Function,
                        name.data.id,
                    );
                }
                for param in func.parameters.iter() {
                    self.current_scope().add_binding(
                        param.text,
                        BindingKind::Parameter,
                        param.data.id,
                    );
                }
            }
            NodeRef::VariableDeclarator(decl) => {
                // `var` hoists to the nearest function scope, which is the
                // top of the stack since blocks never push
                self.current_scope().add_binding(
                    decl.name.text,
                    BindingKind::Var,
                    decl.data.id,
                );
            }
            _ => {}
        }

        node.for_each_child(&mut |child| self.visit(child));

        if opened {
            self.stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::BindingKind;
    use bumpalo::Bump;
    use jstags_core::intern::StringInterner;
    use jstags_parser::Parser;

    fn analyze<'a>(
        arena: &'a Bump,
        interner: &StringInterner,
        source: &str,
    ) -> (SourceFile<'a>, ScopeManager) {
        let mut parser = Parser::new(arena, interner, "test.js", source);
        let file = parser.parse_source_file();
        assert!(
            !parser.take_diagnostics().has_errors(),
            "unexpected parse errors in {source:?}"
        );
        let manager = ScopeManager::open(&file);
        (file, manager)
    }

    #[test]
    fn test_global_scope_only() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(&arena, &interner, "var x = 1; x = 2;");
        assert_eq!(manager.scopes().len(), 1);
        let global = &manager.scopes()[0];
        assert_eq!(global.kind, ScopeKind::Global);
        assert!(global.has_binding(interner.intern("x")));
    }

    #[test]
    fn test_var_in_block_hoists_to_function_scope() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(
            &arena,
            &interner,
            "function f() { if (1) { var hidden = 2; } }",
        );
        assert_eq!(manager.scopes().len(), 2);
        let func = &manager.scopes()[1];
        assert_eq!(func.kind, ScopeKind::Function);
        let binding = func.binding(interner.intern("hidden")).unwrap();
        assert_eq!(binding.kind, BindingKind::Var);
        // not visible in the global scope
        assert!(!manager.scopes()[0].has_binding(interner.intern("hidden")));
    }

    #[test]
    fn test_parameters_bind_in_function_scope() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(&arena, &interner, "function add(a, b) { return a + b; }");
        let func = &manager.scopes()[1];
        assert_eq!(
            func.binding(interner.intern("a")).unwrap().kind,
            BindingKind::Parameter
        );
        assert_eq!(
            func.binding(interner.intern("b")).unwrap().kind,
            BindingKind::Parameter
        );
        // the function name binds in the enclosing scope
        assert_eq!(
            manager.scopes()[0].binding(interner.intern("add")).unwrap().kind,
            BindingKind::Function
        );
    }

    #[test]
    fn test_named_function_expression_binds_in_own_scope() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(&arena, &interner, "var f = function rec(n) { return rec(n); };");
        assert_eq!(manager.scopes().len(), 2);
        let func = &manager.scopes()[1];
        assert!(func.has_binding(interner.intern("rec")));
        assert!(!manager.scopes()[0].has_binding(interner.intern("rec")));
        assert!(manager.scopes()[0].has_binding(interner.intern("f")));
    }

    #[test]
    fn test_nested_functions_in_document_order() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(
            &arena,
            &interner,
            "function outer() { function inner() {} } function later() {}",
        );
        let kinds: Vec<_> = manager.scopes().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ScopeKind::Global,
                ScopeKind::Function,
                ScopeKind::Function,
                ScopeKind::Function
            ]
        );
        // document order: outer before inner before later
        let starts: Vec<_> = manager.scopes().iter().map(|s| s.range.pos).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_function_declaration_overrides_var_binding() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (_file, manager) = analyze(&arena, &interner, "var f = 1; function f() {}");
        let binding = manager.scopes()[0].binding(interner.intern("f")).unwrap();
        assert_eq!(binding.kind, BindingKind::Function);
    }

    #[test]
    fn test_acquire_release_contract() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (file, mut manager) = analyze(&arena, &interner, "function f() {}");

        // the source file node opens the global scope
        assert!(manager.acquire(file.data.id).is_some());
        // a random other node does not
        let func_block = manager.scopes()[1].block;
        assert!(manager.acquire(func_block).is_some());
        assert!(manager.release(func_block));
        assert!(manager.release(file.data.id));
        assert!(manager.close().is_ok());
    }

    #[test]
    fn test_double_acquire_is_reported_on_close() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (file, mut manager) = analyze(&arena, &interner, "var x;");
        assert!(manager.acquire(file.data.id).is_some());
        assert!(manager.acquire(file.data.id).is_none());
        assert!(matches!(
            manager.close(),
            Err(ScopeError::DoubleAcquire { .. })
        ));
    }

    #[test]
    fn test_unreleased_scope_is_reported_on_close() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (file, mut manager) = analyze(&arena, &interner, "var x;");
        assert!(manager.acquire(file.data.id).is_some());
        assert!(matches!(
            manager.close(),
            Err(ScopeError::UnbalancedClose { count: 1 })
        ));
    }
}
