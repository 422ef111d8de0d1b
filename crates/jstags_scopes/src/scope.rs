//! Scope records and binding tables.

use jstags_ast::node::NodeId;
use jstags_core::collections::OrderedMap;
use jstags_core::intern::Interned;
use jstags_core::text::TextRange;
use std::fmt;

/// Identifies a scope within one analyzed file, in document order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        ScopeId(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// The kind of a lexical scope. ES5 has no block scoping, so only the
/// file itself and functions open scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
}

/// How a name came to be bound in its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Function,
    Parameter,
}

/// A name bound in a scope by hoisting analysis.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Interned,
    pub kind: BindingKind,
    /// The node that introduced the binding.
    pub declared_at: NodeId,
}

/// A scope discovered by the pre-pass: the node that opens it, its
/// extent, and the names hoisted into it.
#[derive(Debug)]
pub struct ScopeRecord {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The node whose entry opens (and whose exit closes) this scope.
    pub block: NodeId,
    pub range: TextRange,
    bindings: OrderedMap<Interned, Binding>,
}

impl ScopeRecord {
    pub(crate) fn new(id: ScopeId, kind: ScopeKind, block: NodeId, range: TextRange) -> Self {
        Self {
            id,
            kind,
            block,
            range,
            bindings: OrderedMap::new(),
        }
    }

    /// Record a hoisted binding. The first declaration of a name wins,
    /// except that a function declaration takes over a plain `var`.
    pub(crate) fn add_binding(&mut self, name: Interned, kind: BindingKind, declared_at: NodeId) {
        match self.bindings.get_mut(&name) {
            Some(existing) => {
                if existing.kind == BindingKind::Var && kind == BindingKind::Function {
                    existing.kind = BindingKind::Function;
                    existing.declared_at = declared_at;
                }
            }
            None => {
                self.bindings.insert(
                    name,
                    Binding {
                        name,
                        kind,
                        declared_at,
                    },
                );
            }
        }
    }

    /// Look up a binding declared directly in this scope.
    pub fn binding(&self, name: Interned) -> Option<&Binding> {
        self.bindings.get(&name)
    }

    pub fn has_binding(&self, name: Interned) -> bool {
        self.bindings.contains_key(&name)
    }

    /// All bindings, in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
