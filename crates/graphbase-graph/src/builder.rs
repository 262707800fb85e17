//! Graph builder for constructing graphs from edge-list text.
//!
//! Each non-blank line names one arc as `src dst [len]`, fields separated
//! by whitespace. A `#` starts a comment that runs to the end of the line.

use crate::graph::Graph;
use std::io::BufRead;
use thiserror::Error;
use tracing::debug;

/// Length given to arcs whose line has no third field.
pub const DEFAULT_LEN: i64 = 1;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Builds a [`Graph`] from edge-list lines.
pub struct GraphBuilder {
    graph: Graph,
    undirected: bool,
    default_len: i64,
    records: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a builder whose graph is sized for `capacity_hint` vertices.
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            graph: Graph::with_capacity(capacity_hint),
            undirected: false,
            default_len: DEFAULT_LEN,
            records: 0,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.graph.set_id(id);
        self
    }

    /// Adds each line as an undirected edge instead of a single arc.
    pub fn undirected(mut self, undirected: bool) -> Self {
        self.undirected = undirected;
        self
    }

    pub fn default_len(mut self, len: i64) -> Self {
        self.default_len = len;
        self
    }

    /// Adds one edge-list line. Blank and comment-only lines are skipped.
    pub fn add_line(&mut self, line_no: usize, line: &str) -> Result<(), BuildError> {
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut fields = content.split_whitespace();

        let Some(src) = fields.next() else {
            return Ok(());
        };
        let dst = fields.next().ok_or_else(|| BuildError::Parse {
            line: line_no,
            message: format!("missing destination after '{}'", src),
        })?;
        let len = match fields.next() {
            Some(text) => text.parse::<i64>().map_err(|_| BuildError::Parse {
                line: line_no,
                message: format!("invalid arc length '{}'", text),
            })?,
            None => self.default_len,
        };
        if let Some(extra) = fields.next() {
            return Err(BuildError::Parse {
                line: line_no,
                message: format!("unexpected field '{}'", extra),
            });
        }

        if self.undirected {
            self.graph.add_edge(src, dst, len);
        } else {
            self.graph.add_arc(src, dst, len);
        }
        self.records += 1;
        Ok(())
    }

    /// Reads every line from `reader`. Returns the number of records added.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<usize, BuildError> {
        let before = self.records;
        for (index, line) in reader.lines().enumerate() {
            self.add_line(index + 1, &line?)?;
        }
        let added = self.records - before;
        debug!(
            records = added,
            vertices = self.graph.n(),
            arcs = self.graph.m(),
            "read edge list"
        );
        Ok(added)
    }

    /// Number of arc or edge records added so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> Graph {
        self.graph
    }
}
