//! jstags_ast: Syntax tree definitions for the jstags JavaScript indexer.
//!
//! Nodes are arena-allocated and immutable once parsed; every node
//! carries a byte range and a parse-order id. The `walk` module provides
//! a uniform `NodeRef` view used by the traversal-driven indexer.

pub mod node;
pub mod syntax_kind;
pub mod walk;

pub use node::{NodeData, NodeId};
pub use syntax_kind::SyntaxKind;
pub use walk::{ChildField, NodeRef};
