//! Interned strings.
//!
//! Vertex names, graph ids and string utility values are stored as atoms:
//! immutable shared strings handed out by a per-graph [`AtomTable`]. Interning
//! the same text twice yields two handles to one allocation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc as Shared;

/// An interned, immutable string. Atoms compare by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Shared<str>);

impl Atom {
    /// Returns the atom's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if both atoms point at the same interned allocation.
    pub fn shares_storage(&self, other: &Atom) -> bool {
        Shared::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Atom {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(text: &str) -> Self {
        Self(Shared::from(text))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Atom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Atom::from(text.as_str()))
    }
}

/// The set of atoms owned by one graph.
#[derive(Debug, Default, Clone)]
pub struct AtomTable {
    atoms: HashSet<Atom>,
}

impl AtomTable {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the atom for `text`, allocating it on first use.
    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some(atom) = self.atoms.get(text) {
            return atom.clone();
        }
        let atom = Atom::from(text);
        self.atoms.insert(atom.clone());
        atom
    }

    /// Adopts an atom created elsewhere so later lookups share it.
    pub fn adopt(&mut self, atom: &Atom) -> Atom {
        match self.atoms.get(atom.as_str()) {
            Some(existing) => existing.clone(),
            None => {
                self.atoms.insert(atom.clone());
                atom.clone()
            }
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.atoms.contains(text)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
