use crate::graph::Graph;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const GRAPH_PREFIX: &str = "graph:";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A persistent collection of graphs keyed by graph id.
pub struct GraphStore {
    db: Db,
}

fn key(id: &str) -> String {
    format!("{}{}", GRAPH_PREFIX, id)
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves a graph under its id, replacing any graph stored with that id.
    ///
    /// The graph is serialized using bincode.
    pub fn save_graph(&self, graph: &Graph) -> Result<(), StoreError> {
        let bytes = bincode::serialize(graph)?;
        self.db.insert(key(graph.id()), bytes)?;
        self.db.flush()?;
        info!(id = graph.id(), vertices = graph.n(), arcs = graph.m(), "stored graph");
        Ok(())
    }

    /// Loads the graph stored under `id`.
    pub fn load_graph(&self, id: &str) -> Result<Option<Graph>, StoreError> {
        if let Some(bytes) = self.db.get(key(id))? {
            let mut graph: Graph = bincode::deserialize(&bytes)?;
            graph.restore_atoms();
            Ok(Some(graph))
        } else {
            Ok(None)
        }
    }

    /// Lists the ids of all stored graphs in key order.
    pub fn list_graphs(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in self.db.scan_prefix(GRAPH_PREFIX) {
            let (key, _) = entry?;
            let id = String::from_utf8_lossy(&key[GRAPH_PREFIX.len()..]).into_owned();
            ids.push(id);
        }
        Ok(ids)
    }

    /// Removes one graph. Returns whether it was present.
    pub fn remove_graph(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.db.remove(key(id))?.is_some();
        self.db.flush()?;
        Ok(removed)
    }

    /// Clears every stored graph.
    pub fn clear(&self) -> Result<(), StoreError> {
        for entry in self.db.scan_prefix(GRAPH_PREFIX) {
            let (key, _) = entry?;
            self.db.remove(key)?;
        }
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Util, UtilKind, UtilSlot};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_graph() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        let mut graph = Graph::with_capacity(3);
        graph.set_id("senses");
        graph.add_arc("look", "feel", 1);
        graph.set_util_type(UtilSlot::Vertex(2), UtilKind::Str).unwrap();
        let look = graph.find("look").unwrap();
        let label = graph.intern("feel");
        graph.set_vertex_util(look, 2, Util::Str(label)).unwrap();

        store.save_graph(&graph).unwrap();

        let loaded = store.load_graph("senses").unwrap().unwrap();
        assert_eq!(loaded.n(), 2);
        assert_eq!(loaded.m(), 1);
        assert_eq!(loaded.find("feel"), graph.find("feel"));

        let look = loaded.vertex(loaded.find("look").unwrap()).unwrap();
        let feel = loaded.vertex(loaded.find("feel").unwrap()).unwrap();
        match &look.utils[2] {
            Util::Str(text) => assert!(text.shares_storage(&feel.name)),
            other => panic!("unexpected util {:?}", other),
        }
    }

    #[test]
    fn test_missing_graph() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        assert!(store.load_graph("nothing").unwrap().is_none());
        assert!(!store.remove_graph("nothing").unwrap());
    }

    #[test]
    fn test_list_remove_clear() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        for id in ["beta", "alpha", "gamma"] {
            let mut graph = Graph::new();
            graph.set_id(id);
            store.save_graph(&graph).unwrap();
        }
        assert_eq!(store.list_graphs().unwrap(), vec!["alpha", "beta", "gamma"]);

        assert!(store.remove_graph("beta").unwrap());
        assert_eq!(store.list_graphs().unwrap(), vec!["alpha", "gamma"]);

        store.clear().unwrap();
        assert!(store.list_graphs().unwrap().is_empty());
    }
}
