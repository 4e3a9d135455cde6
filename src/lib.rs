//! conllu-graph: CoNLL-U records as bidirectional dependency graphs
//!
//! Parses CoNLL-U text into trees whose tokens keep every column verbatim,
//! builds a `down`/`up` edge pair for each HEAD relation, and serializes
//! trees back to exactly the text they came from.

pub mod conllu; // Record parser and corpus splitter
pub mod edge; // Directed relation between two tokens
pub mod error;
pub mod io; // Corpus files, plain or gzipped
pub mod node; // One token line, ten columns
pub mod tree; // Comments, ordered ids, node map, edge map

// Re-exports for convenience
pub use conllu::{Block, Blocks, RecordParts, Trees, conllu2graph, conllu2trees, trees2conllu};
pub use edge::{Directionality, Edge};
pub use error::{FormatError, FormatErrorKind, ReadError};
pub use node::{Features, Misc, Node, TokenId};
pub use tree::{Graph, NodeMap, ROOT, Tree};
