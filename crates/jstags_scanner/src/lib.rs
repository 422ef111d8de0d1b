//! jstags_scanner: The JavaScript scanner.
//!
//! Converts source text into a stream of tokens consumed by the parser.
//! All positions are byte offsets into the UTF-8 source, since every
//! occurrence the indexer records is a byte range.

mod char_codes;
mod scanner;

pub use scanner::Scanner;
