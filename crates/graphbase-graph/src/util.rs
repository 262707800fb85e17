//! Utility fields.
//!
//! Every vertex carries six auxiliary slots (`u` to `z`), every arc two
//! (`a`, `b`) and the graph itself six more (`uu` to `zz`). A graph declares
//! the kind of value each slot holds with a 14-character `util_types`
//! string, one code per slot in that order.

use crate::atom::Atom;
use crate::error::GraphError;
use crate::graph::{ArcId, VertexId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const VERTEX_UTILS: usize = 6;
pub const ARC_UTILS: usize = 2;
pub const GRAPH_UTILS: usize = 6;
pub const UTIL_TYPES_LEN: usize = VERTEX_UTILS + ARC_UTILS + GRAPH_UTILS;

const VERTEX_UTIL_NAMES: [&str; VERTEX_UTILS] = ["u", "v", "w", "x", "y", "z"];
const ARC_UTIL_NAMES: [&str; ARC_UTILS] = ["a", "b"];
const GRAPH_UTIL_NAMES: [&str; GRAPH_UTILS] = ["uu", "vv", "ww", "xx", "yy", "zz"];

/// The kind of value a utility slot holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilKind {
    /// `Z`: the slot is not used.
    #[default]
    Unused,
    /// `I`: a signed integer.
    Int,
    /// `S`: a string.
    Str,
    /// `V`: a vertex reference.
    Vertex,
    /// `A`: an arc reference.
    Arc,
    /// `G`: a reference to another graph. Recognised, never stored.
    Graph,
}

impl UtilKind {
    pub fn code(self) -> char {
        match self {
            Self::Unused => 'Z',
            Self::Int => 'I',
            Self::Str => 'S',
            Self::Vertex => 'V',
            Self::Arc => 'A',
            Self::Graph => 'G',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'Z' => Some(Self::Unused),
            'I' => Some(Self::Int),
            'S' => Some(Self::Str),
            'V' => Some(Self::Vertex),
            'A' => Some(Self::Arc),
            'G' => Some(Self::Graph),
            _ => None,
        }
    }
}

impl fmt::Display for UtilKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Addresses one utility slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilSlot {
    Vertex(usize),
    Arc(usize),
    Graph(usize),
}

impl UtilSlot {
    /// Position of the slot inside the `util_types` string.
    pub fn offset(self) -> Result<usize, GraphError> {
        let (index, base, limit) = match self {
            Self::Vertex(i) => (i, 0, VERTEX_UTILS),
            Self::Arc(i) => (i, VERTEX_UTILS, ARC_UTILS),
            Self::Graph(i) => (i, VERTEX_UTILS + ARC_UTILS, GRAPH_UTILS),
        };
        if index >= limit {
            return Err(GraphError::UtilSlotOutOfRange {
                slot: self.to_string(),
                limit,
            });
        }
        Ok(base + index)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Vertex(i) | Self::Arc(i) | Self::Graph(i) => i,
        }
    }
}

impl fmt::Display for UtilSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let named = match *self {
            Self::Vertex(i) => VERTEX_UTIL_NAMES.get(i),
            Self::Arc(i) => ARC_UTIL_NAMES.get(i),
            Self::Graph(i) => GRAPH_UTIL_NAMES.get(i),
        };
        match (named, self) {
            (Some(name), _) => write!(f, "{}", name),
            (None, Self::Vertex(i)) => write!(f, "vertex#{}", i),
            (None, Self::Arc(i)) => write!(f, "arc#{}", i),
            (None, Self::Graph(i)) => write!(f, "graph#{}", i),
        }
    }
}

/// The 14-slot type declaration of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilTypes {
    kinds: [UtilKind; UTIL_TYPES_LEN],
}

impl UtilTypes {
    pub fn kind(&self, slot: UtilSlot) -> Result<UtilKind, GraphError> {
        Ok(self.kinds[slot.offset()?])
    }

    pub(crate) fn set(&mut self, slot: UtilSlot, kind: UtilKind) -> Result<(), GraphError> {
        self.kinds[slot.offset()?] = kind;
        Ok(())
    }

    pub fn vertex_kinds(&self) -> &[UtilKind] {
        &self.kinds[..VERTEX_UTILS]
    }

    pub fn arc_kinds(&self) -> &[UtilKind] {
        &self.kinds[VERTEX_UTILS..VERTEX_UTILS + ARC_UTILS]
    }

    pub fn graph_kinds(&self) -> &[UtilKind] {
        &self.kinds[VERTEX_UTILS + ARC_UTILS..]
    }

    /// True if any slot is declared with the given kind.
    pub fn uses(&self, kind: UtilKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl FromStr for UtilTypes {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes: Vec<char> = s.chars().collect();
        if codes.len() != UTIL_TYPES_LEN {
            return Err(GraphError::InvalidUtilTypes(format!(
                "expected {} codes, found {} in '{}'",
                UTIL_TYPES_LEN,
                codes.len(),
                s
            )));
        }

        let mut kinds = [UtilKind::Unused; UTIL_TYPES_LEN];
        for (slot, code) in kinds.iter_mut().zip(codes) {
            *slot = UtilKind::from_code(code).ok_or_else(|| {
                GraphError::InvalidUtilTypes(format!("unknown code '{}' in '{}'", code, s))
            })?;
        }
        Ok(Self { kinds })
    }
}

impl fmt::Display for UtilTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{}", kind.code())?;
        }
        Ok(())
    }
}

/// A vertex-valued utility.
///
/// `Marker` is the distinguished non-null value GraphBase files write as `1`;
/// it lets a vertex slot double as a boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexRef {
    Null,
    Marker,
    Id(VertexId),
}

/// The value stored in one utility slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Util {
    #[default]
    Unused,
    Int(i64),
    Str(Atom),
    Vertex(VertexRef),
    Arc(Option<ArcId>),
}

impl Util {
    /// The slot kind this value belongs in. `Unused` fits any slot.
    pub fn kind(&self) -> UtilKind {
        match self {
            Self::Unused => UtilKind::Unused,
            Self::Int(_) => UtilKind::Int,
            Self::Str(_) => UtilKind::Str,
            Self::Vertex(_) => UtilKind::Vertex,
            Self::Arc(_) => UtilKind::Arc,
        }
    }
}
