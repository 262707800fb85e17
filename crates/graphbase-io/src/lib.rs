//! Graphbase IO - the GB text format
//!
//! Writes graphs as GraphBase `.gb` files and reads them back. A file holds
//! a header naming the utility types and counts, the graph record, one line
//! per vertex, one line per arc, and a closing checksum over everything
//! before it.
//!
//! # Example
//!
//! ```
//! use graphbase_graph::Graph;
//! use graphbase_io::{read_gb, write_gb};
//!
//! let mut graph = Graph::with_capacity(3);
//! graph.add_arc("look", "feel", 1);
//!
//! let mut out = Vec::new();
//! write_gb(&graph, &mut out).unwrap();
//!
//! let copy = read_gb(out.as_slice()).unwrap();
//! assert_eq!(copy.n(), 2);
//! ```

mod checksum;
mod config;
mod error;
mod format;
mod reader;
mod writer;

pub use checksum::{Checksum, CHECKSUM_MODULUS};
pub use config::{GbConfig, DEFAULT_LINE_WIDTH, MIN_LINE_WIDTH};
pub use error::GbError;
pub use reader::{load_gb, read_gb};
pub use writer::{save_gb, write_gb, write_gb_with};
