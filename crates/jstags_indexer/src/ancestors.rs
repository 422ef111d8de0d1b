//! The parent-context tracker: structural queries over the live
//! ancestor chain.
//!
//! The stack holds a `NodeRef` for every node between the root and the
//! node currently being visited, inclusive. Queries take an optional
//! explicit offset so classification rules can reach grandparents and
//! beyond; the default offset is the current node's own position.

use jstags_ast::walk::{ChildField, NodeRef};
use jstags_ast::SyntaxKind;

#[derive(Default)]
pub struct AncestorStack<'a> {
    nodes: Vec<NodeRef<'a>>,
}

impl<'a> AncestorStack<'a> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: NodeRef<'a>) {
        self.nodes.push(node);
    }

    pub fn pop(&mut self) -> Option<NodeRef<'a>> {
        self.nodes.pop()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Offset of the node currently being visited.
    pub fn top_offset(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The node at `offset`, if in range.
    pub fn at(&self, offset: usize) -> Option<NodeRef<'a>> {
        self.nodes.get(offset).copied()
    }

    /// The parent of the current node.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        if self.nodes.len() < 2 {
            return None;
        }
        self.at(self.nodes.len() - 2)
    }

    /// Whether the node at the top of the stack is stored under `field`
    /// of its parent.
    pub fn is_child(&self, field: ChildField) -> bool {
        self.is_child_at(field, self.top_offset())
    }

    /// Whether the node at `offset` is stored under `field` of the node
    /// at `offset - 1`.
    pub fn is_child_at(&self, field: ChildField, offset: usize) -> bool {
        if offset == 0 || offset >= self.nodes.len() {
            return false;
        }
        self.nodes[offset - 1].child(field) == Some(self.nodes[offset].id())
    }

    /// Whether the parent of the top node has kind `kind`.
    pub fn parent_kind_is(&self, kind: SyntaxKind) -> bool {
        self.parent_kind_is_at(kind, self.top_offset())
    }

    /// Whether the node at `offset - 1` has kind `kind`.
    pub fn parent_kind_is_at(&self, kind: SyntaxKind, offset: usize) -> bool {
        if offset == 0 || offset >= self.nodes.len() {
            return false;
        }
        self.nodes[offset - 1].kind() == kind
    }
}
