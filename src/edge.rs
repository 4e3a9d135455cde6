//! Dependency edges
//!
//! Every HEAD relation is stored twice, once from each endpoint: a `Down`
//! edge under the dependent pointing at its governor, and an `Up` edge under
//! the governor pointing back at the dependent. Both are plain owned values.

use std::fmt;

/// Which end of the relation an edge is seen from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directionality {
    /// As declared by the dependent's HEAD column
    Down,
    /// The mirrored copy stored under the governor
    Up,
}

impl Directionality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Directionality::Down => "down",
            Directionality::Up => "up",
        }
    }
}

impl fmt::Display for Directionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relation seen from one endpoint; `head` is the id at the other end
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub head: String,
    pub relation: String,
    pub directionality: Directionality,
}

impl Edge {
    pub fn new(
        head: impl Into<String>,
        relation: impl Into<String>,
        directionality: Directionality,
    ) -> Self {
        Self {
            head: head.into(),
            relation: relation.into(),
            directionality,
        }
    }

    /// Edge stored under a dependent, pointing at `governor`
    pub fn down(governor: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::new(governor, relation, Directionality::Down)
    }

    /// Edge stored under a governor, pointing at `dependent`
    pub fn up(dependent: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::new(dependent, relation, Directionality::Up)
    }

    pub fn is_down(&self) -> bool {
        self.directionality == Directionality::Down
    }

    pub fn is_up(&self) -> bool {
        self.directionality == Directionality::Up
    }
}
