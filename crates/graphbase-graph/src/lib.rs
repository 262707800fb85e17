//! Graphbase Graph - named-vertex directed graphs
//!
//! This crate holds graphs in the GraphBase data model: vertices identified
//! by name, weighted arcs, and typed utility slots on vertices, arcs and the
//! graph itself. It also builds graphs from edge lists and persists them.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional structure for:
//! - Name-based vertex lookup (vertices are created on first use)
//! - Per-graph string interning
//! - Utility slot declarations
//!
//! # Example
//!
//! ```
//! use graphbase_graph::Graph;
//!
//! let mut graph = Graph::with_capacity(3);
//! graph.add_arc("look", "feel", 1);
//!
//! assert_eq!(graph.n(), 2);
//! ```

mod arc;
mod atom;
mod builder;
mod error;
mod graph;
mod store;
mod util;

pub use arc::{Arc, ArcRef, ExportArc, ExportVertex, Vertex};
pub use atom::{Atom, AtomTable};
pub use builder::{BuildError, GraphBuilder, DEFAULT_LEN};
pub use error::GraphError;
pub use graph::{
    ArcId, Graph, GraphExport, GraphStats, VertexId, DEFAULT_ID, MAX_PREALLOC, MIN_CAPACITY,
};
pub use store::{GraphStore, StoreError};
pub use util::{
    Util, UtilKind, UtilSlot, UtilTypes, VertexRef, ARC_UTILS, GRAPH_UTILS, UTIL_TYPES_LEN,
    VERTEX_UTILS,
};
