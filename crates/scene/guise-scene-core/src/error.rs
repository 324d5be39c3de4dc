//! Error types for node store operations

use crate::handle::NodeHandle;

/// Failures reported by the node store (and reused by the tween scheduler,
/// which validates targets under the same rules).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SceneError {
    /// Stale or destroyed node reference
    #[error("invalid node handle {handle:?} (destroyed or never allocated)")]
    InvalidHandle { handle: NodeHandle },

    /// Unknown property path or incompatible value
    #[error("invalid property '{path}': {reason}")]
    InvalidProperty { path: String, reason: String },

    /// Id lookup miss
    #[error("no node with id '{id}'")]
    NotFound { id: String },

    /// Another live node already holds this id
    #[error("id '{id}' is already in use")]
    DuplicateId { id: String },

    /// Reparent would make a node its own ancestor
    #[error("reparenting {node:?} under {new_parent:?} would create a cycle")]
    CycleDetected {
        node: NodeHandle,
        new_parent: NodeHandle,
    },

    /// Node allocation limit reached; unrecoverable for the owning instance
    #[error("node limit exhausted: {requested} more node(s) requested with {live} of {limit} live")]
    ResourceExhausted {
        requested: usize,
        live: usize,
        limit: usize,
    },
}

impl SceneError {
    pub(crate) fn property(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Resource exhaustion is the only condition the host cannot recover from.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }

    /// Short error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidHandle { .. } => "handle",
            Self::InvalidProperty { .. } => "property",
            Self::NotFound { .. } | Self::DuplicateId { .. } => "id",
            Self::CycleDetected { .. } => "hierarchy",
            Self::ResourceExhausted { .. } => "resource",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exhaustion_is_fatal() {
        let fatal = SceneError::ResourceExhausted {
            requested: 1,
            live: 4,
            limit: 4,
        };
        assert!(fatal.is_fatal());
        assert_eq!(fatal.category(), "resource");

        let recoverable = SceneError::NotFound { id: "hud".into() };
        assert!(!recoverable.is_fatal());
        assert_eq!(recoverable.category(), "id");
    }
}
