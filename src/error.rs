//! Error types
//!
//! Every parse failure is a [`FormatError`]. Reading corpora from disk adds
//! I/O failures on top of that, which [`ReadError`] wraps.

use thiserror::Error;

/// What went wrong while reading CoNLL-U text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    /// Token line without exactly ten tab-separated columns
    #[error("expected 10 fields, found {0}")]
    FieldCount(usize),

    /// FEATS or MISC entry that is not a `Key=Value` pair
    #[error("malformed {column} pair: {pair:?}")]
    MalformedPair { column: &'static str, pair: String },

    /// HEAD refers to an id that no token in the record carries
    #[error("token {id} has dangling head {head}")]
    DanglingHead { id: String, head: String },

    /// Two token lines share the same ID
    #[error("duplicate token id {0}")]
    DuplicateId(String),

    /// Block holds comments but no token lines
    #[error("record has no token lines")]
    EmptyRecord,

    /// A key in the tree has no node behind it
    #[error("no node for key {0}")]
    MissingNode(String),

    /// A head relation is not mirrored in the edge map
    #[error("missing {directionality} edge under {key} for relation {relation}")]
    MissingEdge {
        key: String,
        relation: String,
        directionality: &'static str,
    },
}

/// Error during CoNLL-U parsing
///
/// `line` counts from 1. Within a single record it is relative to the
/// record's first line; errors coming out of the corpus splitter are rebased
/// onto the whole input and carry the 1-based `block` index as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    pub block: Option<usize>,
    pub line: Option<usize>,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind) -> Self {
        Self {
            kind,
            block: None,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach corpus position: `first_line` is where the block starts in the input
    pub(crate) fn in_block(mut self, block: usize, first_line: usize) -> Self {
        self.block = Some(block);
        self.line = Some(match self.line {
            Some(line) => first_line + line - 1,
            None => first_line,
        });
        self
    }
}

impl From<FormatErrorKind> for FormatError {
    fn from(kind: FormatErrorKind) -> Self {
        FormatError::new(kind)
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.block, self.line) {
            (Some(block), Some(line)) => {
                write!(f, "Format error in block {} at line {}: {}", block, line, self.kind)
            }
            (Some(block), None) => write!(f, "Format error in block {}: {}", block, self.kind),
            (None, Some(line)) => write!(f, "Format error at line {}: {}", line, self.kind),
            (None, None) => write!(f, "Format error: {}", self.kind),
        }
    }
}

impl std::error::Error for FormatError {}

/// Error while loading a corpus file
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}
