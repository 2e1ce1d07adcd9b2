//! Error type shared by every lookup structure.
//!
//! Every failure is local to the call that produced it: operations validate
//! their arguments before touching any state, so a structure that returned
//! an error is exactly as it was before the call.

use std::fmt;

/// What kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A graph vertex label.
    Vertex,
    /// A graph edge between two labels.
    Edge,
    /// An ordered-index key.
    Key,
    /// A union-find element.
    Element,
    /// A named point in the spatial index.
    Name,
    /// An exact coordinate in the spatial index.
    Coordinate,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Key => "key",
            Self::Element => "element",
            Self::Name => "name",
            Self::Coordinate => "coordinate",
        };
        f.write_str(label)
    }
}

/// Errors returned by the lookup structures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced entity does not exist (or, for union-find, is inactive).
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Identifier as supplied by the caller.
        name: String,
    },

    /// An entity with the same identity already exists.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Kind of the conflicting entity.
        kind: EntityKind,
        /// Identifier as supplied by the caller.
        name: String,
    },

    /// An argument is outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No path connects the two vertices.
    #[error("no path from '{from}' to '{to}'")]
    Unreachable {
        /// Start vertex.
        from: String,
        /// Target vertex.
        to: String,
    },

    /// A query needs at least one stored point.
    #[error("spatial index holds no points")]
    Empty,
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Check if this error reports a missing entity.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error reports a duplicate entity.
    #[inline]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
