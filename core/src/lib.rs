//! bellman-ford-core: single-source shortest paths by edge relaxation.
//!
//! Runs Bellman-Ford over a small in-memory directed graph and returns final
//! distances and predecessors together with a step-by-step trace of every
//! relaxation round, suitable for replay in a visualization, plus explicit
//! negative-cycle detection.
//! No PostgreSQL dependencies; this crate compiles standalone.
//!
//! Designed as the core engine for the bellman_ford PostgreSQL extension,
//! but usable independently for benchmarking and testing.

mod distance;
mod error;
mod graph;
mod output;
mod path;
mod relax;
mod run;
mod trace;

pub use distance::{Distance, Weight};
pub use error::{EngineError, ValidationError};
pub use graph::{
    Edge, EdgeInput, Graph, GraphInput, UnknownVertexPolicy, ValidationOptions, Vertex, VertexIndex,
};
pub use path::{reconstruct_all, reconstruct_path, PathOutcome};
pub use relax::{bellman_ford, execute, execute_json, BellmanFordResult, NegativeCycleInfo};
pub use run::{
    execute_and_record, AlgorithmCount, MemoryRunStore, RecordedRun, RunId, RunRecord, RunStats,
    RunStore, RunSummary, ALGORITHM_NAME,
};
pub use trace::Step;
