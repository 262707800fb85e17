//! Core graph data structure.
//!
//! `Graph` wraps a petgraph `DiGraph` and adds the name index that lets
//! vertices be created lazily from their names. Vertex and arc ids are the
//! dense petgraph indexes; vertices are never removed, so `VertexId::index()`
//! is also the vertex's position in the graph.

use crate::arc::{Arc, ArcRef, ExportArc, ExportVertex, Vertex};
use crate::atom::{Atom, AtomTable};
use crate::error::GraphError;
use crate::util::{
    Util, UtilKind, UtilSlot, UtilTypes, VertexRef, ARC_UTILS, GRAPH_UTILS, VERTEX_UTILS,
};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Unique identifier for a vertex in the graph.
pub type VertexId = NodeIndex;

/// Unique identifier for an arc in the graph.
pub type ArcId = EdgeIndex;

/// Capacity used when the caller's hint is zero.
pub const MIN_CAPACITY: usize = 4;

/// Largest number of vertices reserved up front, whatever the hint.
pub const MAX_PREALLOC: usize = 1 << 16;

/// Id given to graphs that were never named.
pub const DEFAULT_ID: &str = "graph";

/// A directed graph of named vertices and weighted arcs.
///
/// Vertices are created on first use of their name by [`Graph::add_arc`].
/// The out-arcs of each vertex form a list ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Vertex, Arc>,

    id: Atom,

    /// Maps vertex names to the first vertex registered under them.
    name_index: HashMap<Atom, VertexId>,

    util_types: UtilTypes,

    utils: [Util; GRAPH_UTILS],

    #[serde(skip)]
    atoms: AtomTable,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty graph sized for `capacity_hint` vertices.
    ///
    /// The hint only pre-allocates storage, and at most [`MAX_PREALLOC`]
    /// slots; the graph starts with no vertices whatever its value.
    pub fn with_capacity(capacity_hint: usize) -> Self {
        let capacity = capacity_hint.clamp(MIN_CAPACITY, MAX_PREALLOC);
        let mut atoms = AtomTable::new();
        let id = atoms.intern(DEFAULT_ID);

        Self {
            graph: DiGraph::with_capacity(capacity, capacity),
            id,
            name_index: HashMap::with_capacity(capacity),
            util_types: UtilTypes::default(),
            utils: Default::default(),
            atoms,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: &str) {
        self.id = self.atoms.intern(id);
    }

    /// Returns the number of vertices.
    pub fn n(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of arcs.
    pub fn m(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Interns a string in this graph's atom table.
    pub fn intern(&mut self, text: &str) -> Atom {
        self.atoms.intern(text)
    }

    /// Returns the vertex named `name`, creating it if the name is new.
    pub fn ensure_vertex(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        self.push_vertex(name)
    }

    /// Appends a vertex even if another vertex already has this name.
    ///
    /// Name lookups keep resolving to the earliest vertex with the name.
    pub fn push_vertex(&mut self, name: &str) -> VertexId {
        let name = self.atoms.intern(name);
        let id = self.graph.add_node(Vertex::new(name.clone()));
        debug!(vertex = id.index(), name = %name, "added vertex");
        self.name_index.entry(name).or_insert(id);
        id
    }

    /// Adds an arc from `src` to `dst`, creating either vertex as needed.
    pub fn add_arc(&mut self, src: &str, dst: &str, len: i64) -> ArcId {
        let from = self.ensure_vertex(src);
        let to = self.ensure_vertex(dst);
        self.graph.add_edge(from, to, Arc::new(len))
    }

    /// Adds an arc between two existing vertices.
    pub fn add_arc_between(
        &mut self,
        from: VertexId,
        to: VertexId,
        len: i64,
    ) -> Result<ArcId, GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        Ok(self.graph.add_edge(from, to, Arc::new(len)))
    }

    /// Adds an undirected edge as two mated arcs, `a -> b` then `b -> a`.
    pub fn add_edge(&mut self, a: &str, b: &str, len: i64) -> (ArcId, ArcId) {
        let u = self.ensure_vertex(a);
        let v = self.ensure_vertex(b);
        let forward = self.graph.add_edge(u, v, Arc::new(len));
        let backward = self.graph.add_edge(v, u, Arc::new(len));
        (forward, backward)
    }

    /// Finds the vertex registered under `name`.
    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.name_index.get(name).copied()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id)
    }

    pub fn name(&self, id: VertexId) -> Option<&str> {
        self.graph.node_weight(id).map(|v| v.name.as_str())
    }

    pub fn arc(&self, id: ArcId) -> Option<ArcRef<'_>> {
        let (tail, tip) = self.graph.edge_endpoints(id)?;
        let arc = self.graph.edge_weight(id)?;
        Some(ArcRef { id, tail, tip, arc })
    }

    /// Iterates over vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    /// Returns the arcs leaving `id`, most recently added first.
    pub fn out_arcs(&self, id: VertexId) -> Vec<ArcRef<'_>> {
        let mut arcs: Vec<ArcRef<'_>> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .map(|edge| ArcRef {
                id: edge.id(),
                tail: edge.source(),
                tip: edge.target(),
                arc: edge.weight(),
            })
            .collect();
        arcs.sort_by(|a, b| b.id.cmp(&a.id));
        arcs
    }

    /// Iterates over every arc in insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = ArcRef<'_>> + '_ {
        self.graph.edge_references().map(|edge| ArcRef {
            id: edge.id(),
            tail: edge.source(),
            tip: edge.target(),
            arc: edge.weight(),
        })
    }

    pub fn util_types(&self) -> &UtilTypes {
        &self.util_types
    }

    /// Declares the kind of value a slot holds.
    ///
    /// Changing a slot's kind resets every value already stored in it.
    pub fn set_util_type(&mut self, slot: UtilSlot, kind: UtilKind) -> Result<(), GraphError> {
        if kind == UtilKind::Graph {
            return Err(GraphError::UnsupportedUtilKind(kind.code()));
        }
        if self.util_types.kind(slot)? == kind {
            return Ok(());
        }
        self.util_types.set(slot, kind)?;

        let index = slot.index();
        match slot {
            UtilSlot::Vertex(_) => {
                for vertex in self.graph.node_weights_mut() {
                    vertex.utils[index] = Util::Unused;
                }
            }
            UtilSlot::Arc(_) => {
                for arc in self.graph.edge_weights_mut() {
                    arc.utils[index] = Util::Unused;
                }
            }
            UtilSlot::Graph(_) => self.utils[index] = Util::Unused,
        }
        Ok(())
    }

    /// Declares all fourteen slots at once.
    pub fn set_util_types(&mut self, types: UtilTypes) -> Result<(), GraphError> {
        if types.uses(UtilKind::Graph) {
            return Err(GraphError::UnsupportedUtilKind(UtilKind::Graph.code()));
        }
        let slots = (0..VERTEX_UTILS)
            .map(UtilSlot::Vertex)
            .chain((0..ARC_UTILS).map(UtilSlot::Arc))
            .chain((0..GRAPH_UTILS).map(UtilSlot::Graph));
        for slot in slots {
            self.set_util_type(slot, types.kind(slot)?)?;
        }
        Ok(())
    }

    pub fn set_vertex_util(
        &mut self,
        id: VertexId,
        index: usize,
        util: Util,
    ) -> Result<(), GraphError> {
        let util = self.check_util(UtilSlot::Vertex(index), util)?;
        let vertex = self
            .graph
            .node_weight_mut(id)
            .ok_or(GraphError::UnknownVertex(id.index()))?;
        vertex.utils[index] = util;
        Ok(())
    }

    pub fn set_arc_util(&mut self, id: ArcId, index: usize, util: Util) -> Result<(), GraphError> {
        let util = self.check_util(UtilSlot::Arc(index), util)?;
        let arc = self
            .graph
            .edge_weight_mut(id)
            .ok_or(GraphError::UnknownArc(id.index()))?;
        arc.utils[index] = util;
        Ok(())
    }

    pub fn set_graph_util(&mut self, index: usize, util: Util) -> Result<(), GraphError> {
        let util = self.check_util(UtilSlot::Graph(index), util)?;
        self.utils[index] = util;
        Ok(())
    }

    /// The graph's own utility values.
    pub fn utils(&self) -> &[Util; GRAPH_UTILS] {
        &self.utils
    }

    /// Validates a utility value against its slot and this graph's contents.
    fn check_util(&mut self, slot: UtilSlot, util: Util) -> Result<Util, GraphError> {
        let expected = self.util_types.kind(slot)?;
        let found = util.kind();
        if found != UtilKind::Unused && found != expected {
            return Err(GraphError::UtilTypeMismatch {
                slot: slot.to_string(),
                expected,
                found,
            });
        }

        match util {
            Util::Vertex(VertexRef::Id(target)) => self.check_vertex(target)?,
            Util::Arc(Some(target)) => {
                if self.graph.edge_weight(target).is_none() {
                    return Err(GraphError::UnknownArc(target.index()));
                }
            }
            Util::Str(text) => return Ok(Util::Str(self.atoms.adopt(&text))),
            _ => {}
        }
        Ok(util)
    }

    fn check_vertex(&self, id: VertexId) -> Result<(), GraphError> {
        if self.graph.node_weight(id).is_none() {
            return Err(GraphError::UnknownVertex(id.index()));
        }
        Ok(())
    }

    /// Rebuilds the atom table after deserialization so atoms are shared again.
    pub(crate) fn restore_atoms(&mut self) {
        fn adopt_util(atoms: &mut AtomTable, util: &mut Util) {
            if let Util::Str(text) = util {
                *text = atoms.adopt(text);
            }
        }

        let mut atoms = AtomTable::new();
        self.id = atoms.adopt(&self.id);
        for vertex in self.graph.node_weights_mut() {
            vertex.name = atoms.adopt(&vertex.name);
            vertex.utils.iter_mut().for_each(|u| adopt_util(&mut atoms, u));
        }
        for arc in self.graph.edge_weights_mut() {
            arc.utils.iter_mut().for_each(|u| adopt_util(&mut atoms, u));
        }
        self.utils.iter_mut().for_each(|u| adopt_util(&mut atoms, u));
        self.name_index = self
            .name_index
            .drain()
            .map(|(name, id)| (atoms.adopt(&name), id))
            .collect();
        self.atoms = atoms;
    }
}

/// Graph statistics for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub id: String,
    pub vertex_count: usize,
    pub arc_count: usize,
    pub util_types: String,
}

/// A flat, serializable view of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub stats: GraphStats,
    pub vertices: Vec<ExportVertex>,
    pub arcs: Vec<ExportArc>,
}

impl Graph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            id: self.id.to_string(),
            vertex_count: self.n(),
            arc_count: self.m(),
            util_types: self.util_types.to_string(),
        }
    }

    /// Returns all vertices and arcs with plain integer ids for export.
    pub fn export(&self) -> GraphExport {
        let vertices = self
            .vertices()
            .map(|(id, vertex)| ExportVertex {
                id: id.index(),
                name: vertex.name.to_string(),
            })
            .collect();

        let arcs = self
            .vertices()
            .flat_map(|(id, _)| self.out_arcs(id))
            .map(|arc| ExportArc {
                tail: arc.tail.index(),
                tip: arc.tip.index(),
                len: arc.arc.len,
            })
            .collect();

        GraphExport {
            stats: self.stats(),
            vertices,
            arcs,
        }
    }
}
