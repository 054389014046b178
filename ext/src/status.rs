use pgrx::prelude::*;

use crate::guc;
use crate::history;

#[pg_extern]
fn bellman_ford_status() -> TableIterator<
    'static,
    (
        name!(status, String),
        name!(history_available, bool),
        name!(history_writable, bool),
        name!(stored_runs, i64),
        name!(persist_runs, bool),
        name!(reject_unknown_vertices, bool),
        name!(max_vertices, i32),
        name!(max_edges, i32),
        name!(history_limit, i32),
    ),
> {
    let stored = history::stored_run_count();
    let status = if stored.is_some() { "ok" } else { "history_unavailable" };

    TableIterator::once((
        status.to_string(),
        stored.is_some(),
        history::persist_possible(),
        stored.unwrap_or(0),
        guc::PERSIST_RUNS.get(),
        guc::REJECT_UNKNOWN_VERTICES.get(),
        guc::MAX_VERTICES.get(),
        guc::MAX_EDGES.get(),
        guc::HISTORY_LIMIT.get(),
    ))
}
