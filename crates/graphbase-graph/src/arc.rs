//! Vertex and arc records.
//!
//! Both are plain values stored by index inside the graph; references
//! between them go through `VertexId` and `ArcId`, never pointers.

use crate::atom::Atom;
use crate::graph::{ArcId, VertexId};
use crate::util::{Util, ARC_UTILS, VERTEX_UTILS};
use serde::{Deserialize, Serialize};

/// A named vertex with its utility values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub name: Atom,
    pub utils: [Util; VERTEX_UTILS],
}

impl Vertex {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            utils: Default::default(),
        }
    }
}

/// The payload of a directed arc: its length plus two utility values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    /// The arc's weight.
    pub len: i64,

    pub utils: [Util; ARC_UTILS],
}

impl Arc {
    pub fn new(len: i64) -> Self {
        Self {
            len,
            utils: Default::default(),
        }
    }
}

/// A borrowed arc together with its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ArcRef<'g> {
    pub id: ArcId,
    /// The vertex the arc leaves.
    pub tail: VertexId,
    /// The vertex the arc points to.
    pub tip: VertexId,
    pub arc: &'g Arc,
}

/// A simplified vertex for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportVertex {
    pub id: usize,
    pub name: String,
}

/// A simplified arc for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArc {
    pub tail: usize,
    pub tip: usize,
    pub len: i64,
}
