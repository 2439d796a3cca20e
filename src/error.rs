//! Error types for graph construction and configuration.
//!
//! Every error is raised synchronously at the boundary (graph build, graph
//! mutation, configuration, interaction lookup). Ticking a validated
//! simulation never fails.

use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building or driving a graph simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Two node specs share the same (case-sensitive) identity.
    #[error("duplicate node id: {0:?}")]
    DuplicateNodeId(String),

    /// An edge names an endpoint that is not in the node set.
    #[error("edge {source_id:?} -> {target_id:?} references missing node {missing:?}")]
    DanglingEdgeReference {
        /// Source identity as given in the edge spec.
        source_id: String,
        /// Target identity as given in the edge spec.
        target_id: String,
        /// The endpoint that could not be resolved.
        missing: String,
    },

    /// A configuration value is non-finite or out of its allowed range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration {
        /// Name of the offending option.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An interaction referenced a node identity that is not in the graph.
    #[error("unknown node: {0:?}")]
    UnknownNode(String),

    /// A JSON payload or configuration could not be decoded.
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl GraphError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dangling() {
        let err = GraphError::DanglingEdgeReference {
            source_id: "X".into(),
            target_id: "Y".into(),
            missing: "Y".into(),
        };
        assert_eq!(
            err.to_string(),
            "edge \"X\" -> \"Y\" references missing node \"Y\""
        );
    }

    #[test]
    fn test_display_invalid_configuration() {
        let err = GraphError::invalid("theta", "must be finite");
        assert_eq!(
            err.to_string(),
            "invalid configuration for `theta`: must be finite"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err: GraphError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, GraphError::Payload(_)));
    }
}
