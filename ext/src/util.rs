use bellman_ford_core::{Distance, EngineError, UnknownVertexPolicy, ValidationOptions};
use pgrx::prelude::*;

use crate::guc;

/// Build validation options from the current session's GUCs.
pub fn validation_options() -> ValidationOptions {
    ValidationOptions {
        unknown_vertices: if guc::REJECT_UNKNOWN_VERTICES.get() {
            UnknownVertexPolicy::Reject
        } else {
            UnknownVertexPolicy::Ignore
        },
        max_vertices: Some(guc::MAX_VERTICES.get() as usize),
        max_edges: Some(guc::MAX_EDGES.get() as usize),
    }
}

/// Raise a PostgreSQL ERROR for an engine failure.
///
/// Validation errors carry their code and message to the client. Internal
/// errors are logged in full and surface only a generic message.
pub fn raise(e: EngineError) -> ! {
    if !e.is_validation() {
        warning!("bellman_ford: {}", e);
    }
    error!("bellman_ford: {}", e.client_message());
}

/// SQL representation of a distance: NULL means unreached.
pub fn distance_to_sql(d: Distance) -> Option<f64> {
    d.value()
}

/// Validate that a row-count parameter is positive.
/// Raises a PostgreSQL ERROR otherwise.
pub fn check_positive(value: i32, param_name: &str) -> usize {
    if value <= 0 {
        error!(
            "bellman_ford: {} must be positive, got {}",
            param_name, value
        );
    }
    value as usize
}
