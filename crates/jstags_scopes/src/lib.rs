//! jstags_scopes: The scope-resolution engine.
//!
//! Decides which tree nodes open and close lexical scopes and applies
//! ES5 binding and hoisting semantics. The indexer drives it through the
//! `open` / `acquire` / `release` / `close` contract while walking the
//! tree; `acquire` answers `Some` exactly at scope-opening nodes.

mod manager;
mod scope;

pub use manager::{ScopeError, ScopeManager};
pub use scope::{Binding, BindingKind, ScopeId, ScopeKind, ScopeRecord};
