use crate::util::UtilKind;
use thiserror::Error;

/// Errors raised by graph mutation and utility-field access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown vertex V{0}")]
    UnknownVertex(usize),

    #[error("Unknown arc A{0}")]
    UnknownArc(usize),

    #[error("Utility slot {slot} out of range (limit {limit})")]
    UtilSlotOutOfRange { slot: String, limit: usize },

    #[error("Utility slot {slot} holds '{expected}' values, got '{found}'")]
    UtilTypeMismatch {
        slot: String,
        expected: UtilKind,
        found: UtilKind,
    },

    #[error("Utility type '{0}' is not supported")]
    UnsupportedUtilKind(char),

    #[error("Invalid util_types declaration: {0}")]
    InvalidUtilTypes(String),
}
