//! jstags_parser: Recursive-descent JavaScript parser.
//!
//! Produces the arena-allocated, range-annotated tree the indexer walks.
//! The parser is tolerant: syntax problems become diagnostics and a
//! best-effort tree, never a panic.

mod parser;
mod precedence;

pub use parser::Parser;
