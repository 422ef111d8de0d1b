//! jstags_indexer: per-scope symbol indexing for JavaScript.
//!
//! One depth-first pass over a parsed tree turns identifier references,
//! member-access chains, and object-literal nesting into canonical
//! dotted paths (`o.a.b`) and records every occurrence of every path in
//! the symbol table of the lexical scope that owns it. The first
//! occurrence in each list is the declaration; later ones are
//! references. Downstream rename and find-references tooling consumes
//! the resulting [`FileIndex`].

mod ancestors;
mod indexer;
mod path;
mod table;

pub use ancestors::AncestorStack;
pub use indexer::{index_source, index_with, IndexError, Indexer};
pub use path::{escape_table_key, join_context, resolve_expression, resolve_member, UNRESOLVED};
pub use table::{FileIndex, Occurrence, OccurrenceList, ScopeIndex, SymbolTable};
