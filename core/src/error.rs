use thiserror::Error;

/// Structural problem with a caller-supplied graph. Detected before any
/// relaxation work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("vertices, edges and source are required (vertices and edges must be arrays)")]
    MissingFields,

    #[error("source vertex must be a non-empty member of vertices")]
    SourceNotInVertices,

    #[error("vertex at index {index} is not a string")]
    MalformedVertex { index: usize },

    #[error("edge at index {index} is malformed: {reason}")]
    MalformedEdge { index: usize, reason: String },

    #[error("edge at index {index} has non-finite weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("edge at index {index} references undeclared vertex '{vertex}'")]
    UnknownVertex { index: usize, vertex: String },

    #[error("graph has {count} {what}, limit is {limit}")]
    GraphTooLarge {
        what: &'static str,
        count: usize,
        limit: usize,
    },
}

impl ValidationError {
    /// Stable machine-readable code, reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => "missing_fields",
            ValidationError::SourceNotInVertices => "source_not_in_vertices",
            ValidationError::MalformedVertex { .. } => "malformed_vertex",
            ValidationError::MalformedEdge { .. } => "malformed_edge",
            ValidationError::InvalidWeight { .. } => "invalid_weight",
            ValidationError::UnknownVertex { .. } => "unknown_vertex",
            ValidationError::GraphTooLarge { .. } => "graph_too_large",
        }
    }
}

/// Anything that can stop a run from producing a result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Should not happen for validated input. The detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Message safe to hand back to whoever submitted the graph.
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Validation(e) => format!("{}: {}", e.code(), e),
            EngineError::Internal(_) => "failed to execute algorithm".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Internal(format!("serialization: {}", e))
    }
}
