use pgrx::guc::*;

pub static PERSIST_RUNS: GucSetting<bool> = GucSetting::<bool>::new(true);

pub static REJECT_UNKNOWN_VERTICES: GucSetting<bool> = GucSetting::<bool>::new(false);

pub static MAX_VERTICES: GucSetting<i32> = GucSetting::<i32>::new(10_000);

pub static MAX_EDGES: GucSetting<i32> = GucSetting::<i32>::new(100_000);

pub static HISTORY_LIMIT: GucSetting<i32> = GucSetting::<i32>::new(50);

pub fn register_gucs() {
    // Userset context: every setting is safe to change per session.
    GucRegistry::define_bool_guc(
        c"bellman_ford.persist_runs",
        c"Record every bellman_ford_run() call in bellman_ford.runs",
        c"When false, runs are computed and returned but not stored in the history table.",
        &PERSIST_RUNS,
        GucContext::Userset,
        GucFlags::default(),
    );

    GucRegistry::define_bool_guc(
        c"bellman_ford.reject_unknown_vertices",
        c"Reject edges whose endpoints are not declared vertices",
        c"When false, such edges never relax. When true, validation fails with unknown_vertex.",
        &REJECT_UNKNOWN_VERTICES,
        GucContext::Userset,
        GucFlags::default(),
    );

    GucRegistry::define_int_guc(
        c"bellman_ford.max_vertices",
        c"Maximum number of distinct vertices per graph",
        c"Graphs above this size fail validation with graph_too_large.",
        &MAX_VERTICES,
        1,
        1_000_000,
        GucContext::Userset,
        GucFlags::default(),
    );

    GucRegistry::define_int_guc(
        c"bellman_ford.max_edges",
        c"Maximum number of edges per graph",
        c"Graphs above this size fail validation with graph_too_large.",
        &MAX_EDGES,
        1,
        10_000_000,
        GucContext::Userset,
        GucFlags::default(),
    );

    GucRegistry::define_int_guc(
        c"bellman_ford.history_limit",
        c"Default number of rows returned by bellman_ford_history()",
        c"Used when bellman_ford_history() is called without max_rows.",
        &HISTORY_LIMIT,
        1,
        10_000,
        GucContext::Userset,
        GucFlags::default(),
    );
}
