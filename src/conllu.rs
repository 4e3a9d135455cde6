//! CoNLL-U parsing
//!
//! Turns CoNLL-U text into [`Tree`]s. A record (one sentence) becomes the
//! four raw pieces a tree is built from; a corpus is split on empty lines
//! and parsed record by record, stopping at the first malformed one.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::edge::Edge;
use crate::error::{FormatError, FormatErrorKind};
use crate::node::Node;
use crate::tree::{Graph, NodeMap, ROOT, Tree};
use log::{debug, trace};
use memchr::memchr;
use std::str::FromStr;

/// Raw pieces of a record: `(id_lines, keys, nodes, graph)`
pub type RecordParts = (Vec<String>, Vec<String>, NodeMap, Graph);

/// Parse one record into the parts of a [`Tree`]
///
/// Leading `#` lines are kept verbatim as `id_lines`; every other non-empty
/// line must be a token line. Each non-root HEAD yields a `Down` edge under
/// the dependent and an `Up` edge under the governor. Error line numbers
/// count from the first line of the trimmed record.
pub fn conllu2graph(record: &str) -> Result<RecordParts, FormatError> {
    let mut id_lines = Vec::new();
    let mut keys = Vec::new();
    let mut line_nums = Vec::new();
    let mut nodes = NodeMap::default();
    let mut graph = Graph::default();

    let mut lines = record.trim().lines().enumerate().peekable();

    // Comment/metadata lines
    while let Some((_, line)) = lines.next_if(|(_, line)| line.starts_with('#')) {
        id_lines.push(line.to_string());
    }

    // Token lines; a whitespace-only line is not empty and fails as one
    for (i, line) in lines {
        if line.is_empty() {
            continue;
        }
        let line_num = i + 1;
        let node = Node::from_line(line).map_err(|e| e.at_line(line_num))?;
        if nodes.contains_key(&node.id) {
            return Err(FormatError::new(FormatErrorKind::DuplicateId(node.id)).at_line(line_num));
        }
        keys.push(node.id.clone());
        line_nums.push(line_num);
        nodes.insert(node.id.clone(), node);
    }

    if keys.is_empty() {
        return Err(FormatErrorKind::EmptyRecord.into());
    }

    // Build edges from HEAD once every node is known, so forward references resolve
    for (key, &line_num) in keys.iter().zip(&line_nums) {
        let node = &nodes[key];
        let Some(head) = node.head.as_deref() else {
            continue;
        };
        if head == ROOT {
            continue;
        }
        if !nodes.contains_key(head) {
            return Err(FormatError::new(FormatErrorKind::DanglingHead {
                id: key.clone(),
                head: head.to_string(),
            })
            .at_line(line_num));
        }

        graph
            .entry(key.clone())
            .or_default()
            .push(Edge::down(head, &node.deprel));
        graph
            .entry(head.to_string())
            .or_default()
            .push(Edge::up(key, &node.deprel));
    }

    Ok((id_lines, keys, nodes, graph))
}

/// Parse a whole corpus, aborting on the first malformed record
///
/// Errors carry the 1-based block index and the line number within `text`.
pub fn conllu2trees(text: &str) -> Result<Vec<Tree>, FormatError> {
    let trees = Trees::new(text).collect::<Result<Vec<_>, _>>()?;
    debug!("parsed {} trees", trees.len());
    Ok(trees)
}

/// Serialize trees as a CoNLL-U document, each followed by a blank line
pub fn trees2conllu<'a>(trees: impl IntoIterator<Item = &'a Tree>) -> String {
    let mut out = String::new();
    for tree in trees {
        out.push_str(&tree.to_conllu());
        out.push('\n');
    }
    out
}

impl FromStr for Tree {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        conllu2graph(s).map(Tree::from)
    }
}

/// The text of one record and where it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub text: &'a str,
    /// 1-based line number of `text`'s first line in the input
    pub first_line: usize,
}

/// Iterator over the records of a corpus
///
/// Records are separated by one or more empty lines (`\r` alone counts as
/// empty for CRLF input). A line holding only spaces or tabs stays inside
/// its record, though it never starts or ends one; runs of such lines
/// between empty lines yield nothing.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Blocks<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut start = None;
        let mut end = self.pos;

        while self.pos < self.text.len() {
            let (line_end, next) = match memchr(b'\n', &self.text.as_bytes()[self.pos..]) {
                Some(i) => (self.pos + i, self.pos + i + 1),
                None => (self.text.len(), self.text.len()),
            };

            let line = &self.text[self.pos..line_end];
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                if start.is_some() {
                    // Empty line = record boundary
                    break;
                }
            } else if !line.trim().is_empty() {
                if start.is_none() {
                    start = Some((self.pos, self.line));
                }
                end = line_end;
            }

            self.pos = next;
            self.line += 1;
        }

        let (start, first_line) = start?;
        Some(Block {
            text: &self.text[start..end],
            first_line,
        })
    }
}

/// Iterator over the trees of a corpus
#[derive(Debug, Clone)]
pub struct Trees<'a> {
    blocks: Blocks<'a>,
    index: usize,
}

impl<'a> Trees<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            blocks: Blocks::new(text),
            index: 0,
        }
    }
}

impl<'a> Iterator for Trees<'a> {
    type Item = Result<Tree, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.blocks.next()?;
        self.index += 1;
        trace!("parsing block {} at line {}", self.index, block.first_line);

        Some(
            conllu2graph(block.text)
                .map(Tree::from)
                .map_err(|e| e.in_block(self.index, block.first_line)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Directionality;

    const GO_HOME: &str = "# text = Go home.\n1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n2\thome\thome\tADV\t_\t_\t1\tadvmod\t_\t_\n";

    const TWO_TREE_CONLLU: &str = r#"# text = The dog runs.
1	The	the	DET	DT	_	2	det	_	_
2	dog	dog	NOUN	NN	_	3	nsubj	_	_
3	runs	run	VERB	VBZ	_	0	root	_	_

# text = Cats sleep.
1	Cats	cat	NOUN	NNS	_	2	nsubj	_	_
2	sleep	sleep	VERB	VBP	_	0	root	_	_

"#;

    #[test]
    fn test_go_home() {
        let (id_lines, keys, nodes, graph) = conllu2graph(GO_HOME).unwrap();

        assert_eq!(id_lines, vec!["# text = Go home."]);
        assert_eq!(keys, vec!["1", "2"]);
        assert_eq!(nodes["2"].head.as_deref(), Some("1"));
        assert!(graph["1"].contains(&Edge::up("2", "advmod")));
        assert_eq!(graph["2"], vec![Edge::down("1", "advmod")]);
    }

    #[test]
    fn test_root_has_no_sentinel_edge() {
        let (_, _, _, graph) = conllu2graph(GO_HOME).unwrap();

        assert!(!graph.contains_key("0"));
        // The root only carries the mirrored edge from its dependent
        assert!(graph["1"].iter().all(|e| e.directionality == Directionality::Up));
    }

    #[test]
    fn test_edge_symmetry() {
        let tree: Tree = TWO_TREE_CONLLU.split("\n\n").next().unwrap().parse().unwrap();

        for key in &tree.keys {
            let node = &tree.nodes[key];
            let Some(head) = node.head.as_deref() else {
                continue;
            };
            if head == ROOT {
                continue;
            }
            assert!(tree.graph[key].contains(&Edge::down(head, &node.deprel)));
            assert!(tree.graph[head].contains(&Edge::up(key, &node.deprel)));
        }
        // 2 relations -> 4 edges
        assert_eq!(tree.graph.values().map(Vec::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_forward_head_reference() {
        let record = "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n2\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_";
        let (_, _, _, graph) = conllu2graph(record).unwrap();

        assert_eq!(graph["1"], vec![Edge::down("2", "det")]);
        assert_eq!(graph["2"], vec![Edge::up("1", "det")]);
    }

    #[test]
    fn test_multiword_and_empty_nodes() {
        let record = "# sent_id = 7
1\tVámonos\t_\t_\t_\t_\t_\t_\t_\t_
1-2\tVámonos\t_\t_\t_\t_\t_\t_\t_\t_
1\tVamos\tir\tVERB\t_\tMood=Imp\t0\troot\t0:root\t_
2\tnos\tnosotros\tPRON\t_\tCase=Acc\t1\tobj\t1:obj\t_
2.1\tya\tya\tADV\t_\t_\t_\t_\t1:advmod\t_";
        // "1" appears twice
        let err = conllu2graph(record).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::DuplicateId("1".to_string()));
        assert_eq!(err.line, Some(4));

        let record = record.replacen("1\tVámonos\t_\t_\t_\t_\t_\t_\t_\t_\n", "", 1);
        let (_, keys, nodes, graph) = conllu2graph(&record).unwrap();

        assert_eq!(keys, vec!["1-2", "1", "2", "2.1"]);
        assert!(nodes["1-2"].is_multiword());
        assert!(nodes["2.1"].is_empty_node());
        assert_eq!(nodes["2.1"].deps, "1:advmod");
        // DEPS is never turned into edges
        assert!(!graph.contains_key("1-2"));
        assert!(!graph.contains_key("2.1"));
        assert_eq!(graph["1"], vec![Edge::up("2", "obj")]);
    }

    #[test]
    fn test_dangling_head() {
        let record = "1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n2\thome\thome\tADV\t_\t_\t5\tadvmod\t_\t_";
        let err = conllu2graph(record).unwrap_err();

        assert_eq!(
            err.kind,
            FormatErrorKind::DanglingHead {
                id: "2".to_string(),
                head: "5".to_string()
            }
        );
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_bad_field_count() {
        let nine = "# c\n1\tGo\tgo\tVERB\t_\t_\t0\troot\t_";
        let err = conllu2graph(nine).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::FieldCount(9));
        assert_eq!(err.line, Some(2));

        let eleven = "1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\t_\textra";
        let err = conllu2graph(eleven).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::FieldCount(11));
    }

    #[test]
    fn test_comment_only_record() {
        let err = conllu2graph("# sent_id = 1\n# text = nothing\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::EmptyRecord);
    }

    #[test]
    fn test_comment_after_tokens_is_token_line() {
        let record = "1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n# late comment";
        let err = conllu2graph(record).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::FieldCount(1));
    }

    #[test]
    fn test_record_round_trip() {
        let padded = format!("\n\n  {}\n\n", GO_HOME.trim_end());
        let tree: Tree = padded.parse().unwrap();
        assert_eq!(tree.to_conllu(), GO_HOME);
    }

    #[test]
    fn test_crlf_input() {
        let crlf = GO_HOME.replace('\n', "\r\n");
        let tree: Tree = crlf.parse().unwrap();
        assert_eq!(tree.to_conllu(), GO_HOME);
    }

    #[test]
    fn test_corpus_split() {
        let trees = conllu2trees(TWO_TREE_CONLLU).unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].id_lines, vec!["# text = The dog runs."]);
        assert_eq!(trees[0].len(), 3);
        assert_eq!(trees[1].id_lines, vec!["# text = Cats sleep."]);
        assert_eq!(trees[1].len(), 2);
    }

    #[test]
    fn test_corpus_extra_blank_lines() {
        let text = format!("\n\n\n{}\n\n\n   \n{}\n\n\n", GO_HOME, GO_HOME);
        let trees = conllu2trees(&text).unwrap();
        assert_eq!(trees.len(), 2);

        assert!(conllu2trees("").unwrap().is_empty());
        assert!(conllu2trees("\n \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_corpus_round_trip() {
        let trees = conllu2trees(TWO_TREE_CONLLU).unwrap();
        assert_eq!(trees2conllu(&trees), TWO_TREE_CONLLU);
    }

    #[test]
    fn test_corpus_error_position() {
        let text = format!(
            "{}\n# text = broken\n1\tGo\tgo\tVERB\t_\t_\t0\troot\t_\n",
            TWO_TREE_CONLLU
        );
        let err = conllu2trees(&text).unwrap_err();

        assert_eq!(err.kind, FormatErrorKind::FieldCount(9));
        assert_eq!(err.block, Some(3));
        assert_eq!(err.line, Some(12));
    }

    #[test]
    fn test_trees_iterator_is_lazy() {
        let text = format!("{}\n{}", GO_HOME, "1\tbad\n");
        let mut trees = Trees::new(&text);

        assert!(trees.next().unwrap().is_ok());
        let err = trees.next().unwrap().unwrap_err();
        assert_eq!(err.block, Some(2));
        assert!(trees.next().is_none());
    }

    #[test]
    fn test_whitespace_line_inside_record() {
        let text = "# text = a b\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n \n2\tb\tb\tX\t_\t_\t0\troot\t_\t_\n";

        let blocks: Vec<_> = Blocks::new(text).collect();
        assert_eq!(blocks.len(), 1);

        let err = conllu2trees(text).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::FieldCount(1));
        assert_eq!(err.block, Some(1));
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_whitespace_lines_around_records() {
        let text = format!(" \n\t\n{}  \n\n \n\n{}\t\n", GO_HOME, GO_HOME);
        let blocks: Vec<_> = Blocks::new(&text).collect();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].first_line, 3);
        assert_eq!(blocks[0].text, GO_HOME.trim_end());
        assert_eq!(blocks[1].first_line, 10);
        assert_eq!(conllu2trees(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_iterators_from_crate_root() {
        let mut trees = crate::Trees::new(GO_HOME);
        assert!(format!("{:?}", trees).starts_with("Trees"));
        assert!(trees.next().unwrap().is_ok());

        let block: crate::Block<'_> = crate::Blocks::new(GO_HOME).next().unwrap();
        assert_eq!(block.first_line, 1);
    }

    #[test]
    fn test_blocks() {
        let blocks: Vec<_> = Blocks::new("\na\nb\n\n\nc\n").collect();
        assert_eq!(
            blocks,
            vec![
                Block {
                    text: "a\nb",
                    first_line: 2
                },
                Block {
                    text: "c",
                    first_line: 6
                },
            ]
        );
    }
}
