//! Tree data structures with full CoNLL-U round-tripping
//!
//! A [`Tree`] is a plain aggregate of the four pieces the record parser
//! produces. Nothing is checked on construction, so callers can swap in an
//! alternate edge set (for example one built from the DEPS column) and still
//! get a usable tree. [`Tree::validate`] checks the basic-tree invariants on
//! request.
//!
//! All fields are public and there is no internal locking: sharing one tree
//! across threads for mutation needs external synchronization.

use crate::conllu::RecordParts;
use crate::edge::Edge;
use crate::error::{FormatError, FormatErrorKind};
use crate::node::Node;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// HEAD value of the root token; it never gets an edge
pub const ROOT: &str = "0";

/// Token id -> node
pub type NodeMap = FxHashMap<String, Node>;

/// Token id -> every edge touching that token
pub type Graph = FxHashMap<String, Vec<Edge>>;

/// A dependency tree (sentence)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    /// Comment lines preceding the tokens, verbatim
    pub id_lines: Vec<String>,
    /// Token ids in textual order
    pub keys: Vec<String>,
    pub nodes: NodeMap,
    pub graph: Graph,
}

impl Tree {
    pub fn new(id_lines: Vec<String>, keys: Vec<String>, nodes: NodeMap, graph: Graph) -> Self {
        Self {
            id_lines,
            keys,
            nodes,
            graph,
        }
    }

    /// Serialize back to CoNLL-U, one newline-terminated line per comment and token
    ///
    /// Edges are a derived view and are not written. Keys without a node are
    /// skipped.
    pub fn to_conllu(&self) -> String {
        self.to_string()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All edges stored under `id` (empty if it takes part in no relation)
    pub fn edges(&self, id: &str) -> &[Edge] {
        self.graph.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Nodes in key order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.keys.iter().filter_map(|key| self.nodes.get(key))
    }

    /// Lowercased forms of every key, space-joined
    ///
    /// Multiword tokens are included alongside their parts.
    pub fn sentence(&self) -> String {
        self.iter()
            .map(|node| node.form.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ids of the dependents of `id`, in edge order
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.edges(id)
            .iter()
            .filter(|edge| edge.is_up())
            .map(|edge| edge.head.as_str())
            .collect()
    }

    /// Id of the governor of `id`, if it has one in the edge map
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.edges(id)
            .iter()
            .find(|edge| edge.is_down())
            .map(|edge| edge.head.as_str())
    }

    /// First token attached to the virtual root
    pub fn real_root(&self) -> Option<&str> {
        self.iter()
            .find(|node| node.head.as_deref() == Some(ROOT))
            .map(|node| node.id.as_str())
    }

    /// Check the basic-tree invariants
    ///
    /// Keys are unique and each has a node, every non-root head names a
    /// node, and every head relation appears as a `Down` edge under the
    /// dependent and an `Up` edge under the governor. Trees built on purpose
    /// with a different edge set will fail this and need not call it.
    pub fn validate(&self) -> Result<(), FormatError> {
        let offset = self.id_lines.len();
        let mut seen = FxHashSet::default();

        for (i, key) in self.keys.iter().enumerate() {
            let line = offset + i + 1;
            if !seen.insert(key.as_str()) {
                return Err(FormatError::new(FormatErrorKind::DuplicateId(key.clone())).at_line(line));
            }
            let Some(node) = self.nodes.get(key) else {
                return Err(FormatError::new(FormatErrorKind::MissingNode(key.clone())).at_line(line));
            };

            let Some(head) = node.head.as_deref() else {
                continue;
            };
            if head == ROOT {
                continue;
            }
            if !self.nodes.contains_key(head) {
                return Err(FormatError::new(FormatErrorKind::DanglingHead {
                    id: key.clone(),
                    head: head.to_string(),
                })
                .at_line(line));
            }

            let down = self
                .edges(key)
                .iter()
                .any(|e| e.is_down() && e.head == head && e.relation == node.deprel);
            if !down {
                return Err(missing_edge(key, &node.deprel, "down").at_line(line));
            }

            let up = self
                .edges(head)
                .iter()
                .any(|e| e.is_up() && e.head == *key && e.relation == node.deprel);
            if !up {
                return Err(missing_edge(head, &node.deprel, "up").at_line(line));
            }
        }

        Ok(())
    }
}

fn missing_edge(key: &str, relation: &str, directionality: &'static str) -> FormatError {
    FormatError::new(FormatErrorKind::MissingEdge {
        key: key.to_string(),
        relation: relation.to_string(),
        directionality,
    })
}

impl From<RecordParts> for Tree {
    fn from((id_lines, keys, nodes, graph): RecordParts) -> Self {
        Tree::new(id_lines, keys, nodes, graph)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.id_lines {
            writeln!(f, "{}", line)?;
        }
        for node in self.iter() {
            writeln!(f, "{}", node)?;
        }
        Ok(())
    }
}
