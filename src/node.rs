//! Token-level data: one CoNLL-U line
//!
//! A [`Node`] keeps all ten columns as written so that serializing it gives
//! back the original line byte for byte. Only FEATS and MISC are broken up,
//! into [`Features`], an insertion-ordered `Name=Value` map.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::error::{FormatError, FormatErrorKind};
use atoi::FromRadix10Checked;
use std::fmt;
use std::str::FromStr;

/// Number of tab-separated columns on a token line
pub const FIELD_COUNT: usize = 10;

/// Placeholder for an unspecified column
pub const EMPTY: &str = "_";

/// Token ID: single, range (multiword token), or decimal (empty node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenId {
    Single(u32),
    Range(u32, u32),
    Decimal(u32, u32),
}

impl TokenId {
    /// Classify an ID column; `None` if it is none of the three shapes
    pub fn parse(s: &str) -> Option<TokenId> {
        if let Some((start, end)) = s.split_once('-') {
            Some(TokenId::Range(parse_num(start)?, parse_num(end)?))
        } else if let Some((main, sub)) = s.split_once('.') {
            Some(TokenId::Decimal(parse_num(main)?, parse_num(sub)?))
        } else {
            Some(TokenId::Single(parse_num(s)?))
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Single(n) => write!(f, "{}", n),
            TokenId::Range(start, end) => write!(f, "{}-{}", start, end),
            TokenId::Decimal(main, sub) => write!(f, "{}.{}", main, sub),
        }
    }
}

// Whole string must be digits
fn parse_num(s: &str) -> Option<u32> {
    match u32::from_radix_10_checked(s.as_bytes()) {
        (Some(n), used) if used > 0 && used == s.len() => Some(n),
        _ => None,
    }
}

/// Insertion-ordered `Name=Value` pairs (FEATS and MISC columns)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, String)>);

/// MISC uses the same pair syntax as FEATS
pub type Misc = Features;

impl Features {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a column value; `_` is the empty map
    ///
    /// Each `|`-separated entry must contain `=` with a non-empty name.
    /// Values may themselves contain `=`; only the first one splits.
    pub fn parse(column: &'static str, s: &str) -> Result<Self, FormatError> {
        let mut feats = Features::new();
        if s == EMPTY {
            return Ok(feats);
        }

        for pair in s.split('|') {
            match pair.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    feats.0.push((key.to_string(), value.to_string()));
                }
                _ => {
                    return Err(FormatErrorKind::MalformedPair {
                        column,
                        pair: pair.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(feats)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value; an existing key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pairs are kept as given, repeats included, the same as [`Features::parse`]
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Features {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Features(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(EMPTY);
        }
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// A token in a dependency tree, one field per CoNLL-U column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: Features,
    /// `None` when the column is `_` (multiword tokens, empty nodes)
    pub head: Option<String>,
    pub deprel: String,
    /// Enhanced dependencies, kept verbatim
    pub deps: String,
    pub misc: Misc,
}

impl Node {
    /// Parse a single token line
    pub fn from_line(line: &str) -> Result<Node, FormatError> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != FIELD_COUNT {
            return Err(FormatErrorKind::FieldCount(fields.len()).into());
        }

        let head = match fields[6] {
            EMPTY => None,
            head => Some(head.to_string()),
        };

        Ok(Node {
            id: fields[0].to_string(),
            form: fields[1].to_string(),
            lemma: fields[2].to_string(),
            upos: fields[3].to_string(),
            xpos: fields[4].to_string(),
            feats: Features::parse("FEATS", fields[5])?,
            head,
            deprel: fields[7].to_string(),
            deps: fields[8].to_string(),
            misc: Features::parse("MISC", fields[9])?,
        })
    }

    /// Serialize back to a tab-separated line (no newline)
    pub fn to_conllu(&self) -> String {
        self.to_string()
    }

    pub fn token_id(&self) -> Option<TokenId> {
        TokenId::parse(&self.id)
    }

    /// Range ID such as `2-3`
    pub fn is_multiword(&self) -> bool {
        matches!(self.token_id(), Some(TokenId::Range(..)))
    }

    /// Decimal ID such as `3.1`
    pub fn is_empty_node(&self) -> bool {
        matches!(self.token_id(), Some(TokenId::Decimal(..)))
    }
}

impl FromStr for Node {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Node::from_line(s)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.form,
            self.lemma,
            self.upos,
            self.xpos,
            self.feats,
            self.head.as_deref().unwrap_or(EMPTY),
            self.deprel,
            self.deps,
            self.misc,
        )
    }
}
