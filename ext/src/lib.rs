//! bellman_ford: PostgreSQL extension for traced Bellman-Ford runs.
//!
//! Wraps bellman-ford-core to provide SQL functions that compute single-source
//! shortest paths with a replayable step trace and negative-cycle detection,
//! and keeps a history of runs in `bellman_ford.runs`.
//! The engine itself is stateless; identity and access control are left to
//! PostgreSQL roles.

use pgrx::prelude::*;

mod compute;
mod guc;
mod history;
mod status;
mod util;

pg_module_magic!();

#[allow(non_snake_case)]
#[pg_guard]
pub extern "C-unwind" fn _PG_init() {
    guc::register_gucs();
}

#[cfg(any(test, feature = "pg_test"))]
#[pg_schema]
mod tests {
    use pgrx::prelude::*;

    const DIAMOND: &str = r#"'{"vertices": ["A", "B", "C", "D"],
        "edges": [{"source": "A", "destination": "B", "weight": 4},
                  {"source": "A", "destination": "C", "weight": 2},
                  {"source": "C", "destination": "B", "weight": 1},
                  {"source": "B", "destination": "D", "weight": 2}],
        "source": "A"}'::jsonb"#;

    const NEGATIVE_CYCLE: &str = r#"'{"vertices": ["X", "Y"],
        "edges": [{"source": "X", "destination": "Y", "weight": 1},
                  {"source": "Y", "destination": "X", "weight": -2}],
        "source": "X"}'::jsonb"#;

    #[pg_test]
    fn test_run_distances() {
        let d = Spi::get_one::<f64>(&format!(
            "SELECT (bellman_ford_run({})->'distances'->>'D')::float8",
            DIAMOND
        ));
        assert_eq!(d, Ok(Some(5.0)));

        let pred = Spi::get_one::<String>(&format!(
            "SELECT bellman_ford_run({})->'predecessors'->>'B'",
            DIAMOND
        ));
        assert_eq!(pred, Ok(Some("C".to_string())));
    }

    #[pg_test]
    fn test_run_negative_cycle() {
        let flag = Spi::get_one::<bool>(&format!(
            "SELECT (bellman_ford_run({})->>'hasNegativeCycle')::bool",
            NEGATIVE_CYCLE
        ));
        assert_eq!(flag, Ok(Some(true)));

        let from = Spi::get_one::<String>(&format!(
            "SELECT bellman_ford_run({})->'negativeCycleInfo'->>'from'",
            NEGATIVE_CYCLE
        ));
        assert_eq!(from, Ok(Some("Y".to_string())));

        let cycle = Spi::get_one::<String>(&format!(
            "SELECT bellman_ford_run({})->>'negativeCycleMessage'",
            NEGATIVE_CYCLE
        ));
        assert_eq!(
            cycle,
            Ok(Some("Negative cycle reachable from X: X → Y → X".to_string()))
        );
    }

    #[pg_test]
    fn test_unreached_distance_is_null() {
        let is_null = Spi::get_one::<bool>(
            r#"SELECT bellman_ford_run('{"vertices": ["A", "B"], "edges": [], "source": "A"}'::jsonb)->'distances'->'B' = 'null'::jsonb"#,
        );
        assert_eq!(is_null, Ok(Some(true)));
    }

    #[pg_test(error = "bellman_ford: source_not_in_vertices: source vertex must be a non-empty member of vertices")]
    fn test_source_not_in_vertices() {
        Spi::run(r#"SELECT bellman_ford_run('{"vertices": ["A"], "edges": [], "source": "Q"}'::jsonb)"#)
            .unwrap();
    }

    #[pg_test(error = "bellman_ford: missing_fields: vertices, edges and source are required (vertices and edges must be arrays)")]
    fn test_missing_fields() {
        Spi::run(r#"SELECT bellman_ford_run('{"vertices": ["A"], "source": "A"}'::jsonb)"#)
            .unwrap();
    }

    #[pg_test]
    fn test_run_is_persisted() {
        Spi::run(&format!("SELECT bellman_ford_run({})", DIAMOND)).unwrap();
        let count = Spi::get_one::<i64>("SELECT count(*) FROM bellman_ford.runs");
        assert_eq!(count, Ok(Some(1)));

        let source = Spi::get_one::<String>("SELECT source FROM bellman_ford_history()");
        assert_eq!(source, Ok(Some("A".to_string())));
    }

    #[pg_test]
    fn test_persist_disabled() {
        Spi::run("SET bellman_ford.persist_runs = off").unwrap();
        Spi::run(&format!("SELECT bellman_ford_run({})", DIAMOND)).unwrap();
        let count = Spi::get_one::<i64>("SELECT count(*) FROM bellman_ford.runs");
        assert_eq!(count, Ok(Some(0)));
    }

    #[pg_test]
    fn test_load_and_delete() {
        let id = Spi::get_one::<i64>(&format!(
            "SELECT (bellman_ford_run({})->>'runId')::bigint",
            DIAMOND
        ))
        .unwrap()
        .unwrap();

        let algorithm = Spi::get_one::<String>(&format!(
            "SELECT bellman_ford_load({})->>'algorithm'",
            id
        ));
        assert_eq!(algorithm, Ok(Some("Bellman-Ford".to_string())));

        let deleted = Spi::get_one::<bool>(&format!("SELECT bellman_ford_delete({})", id));
        assert_eq!(deleted, Ok(Some(true)));
        let again = Spi::get_one::<bool>(&format!("SELECT bellman_ford_delete({})", id));
        assert_eq!(again, Ok(Some(false)));

        let gone = Spi::get_one::<bool>(&format!("SELECT bellman_ford_load({}) IS NULL", id));
        assert_eq!(gone, Ok(Some(true)));
    }

    /// The run succeeds and comes back without a `runId`; nothing is stored.
    fn assert_run_not_persisted() {
        let d = Spi::get_one::<f64>(&format!(
            "SELECT (bellman_ford_run({})->'distances'->>'D')::float8",
            DIAMOND
        ));
        assert_eq!(d, Ok(Some(5.0)));

        let has_id = Spi::get_one::<bool>(&format!(
            "SELECT bellman_ford_run({}) ? 'runId'",
            DIAMOND
        ));
        assert_eq!(has_id, Ok(Some(false)));
    }

    #[pg_test]
    fn test_read_only_transaction_still_returns_result() {
        Spi::run("SET transaction_read_only = on").unwrap();
        assert_run_not_persisted();

        let writable = Spi::get_one::<bool>("SELECT history_writable FROM bellman_ford_status()");
        assert_eq!(writable, Ok(Some(false)));
    }

    #[pg_test]
    fn test_role_without_insert_still_returns_result() {
        Spi::run("CREATE ROLE bellman_ford_test_reader").unwrap();
        Spi::run("GRANT USAGE ON SCHEMA bellman_ford TO bellman_ford_test_reader").unwrap();
        Spi::run("GRANT SELECT ON bellman_ford.runs TO bellman_ford_test_reader").unwrap();
        Spi::run("SET ROLE bellman_ford_test_reader").unwrap();

        assert_run_not_persisted();
        let status = Spi::get_one::<String>("SELECT status FROM bellman_ford_status()");
        assert_eq!(status, Ok(Some("ok".to_string())));

        Spi::run("RESET ROLE").unwrap();
        let count = Spi::get_one::<i64>("SELECT count(*) FROM bellman_ford.runs");
        assert_eq!(count, Ok(Some(0)));
    }

    #[pg_test]
    fn test_role_without_schema_access_still_returns_result() {
        Spi::run("CREATE ROLE bellman_ford_test_outsider").unwrap();
        Spi::run("SET ROLE bellman_ford_test_outsider").unwrap();

        assert_run_not_persisted();
        let status = Spi::get_one::<String>("SELECT status FROM bellman_ford_status()");
        assert_eq!(status, Ok(Some("history_unavailable".to_string())));
        Spi::run("RESET ROLE").unwrap();
    }

    #[pg_test]
    fn test_stats_empty_history() {
        let total = Spi::get_one::<i64>("SELECT total_executions FROM bellman_ford_stats()");
        assert_eq!(total, Ok(Some(0)));
        let algorithm =
            Spi::get_one::<bool>("SELECT algorithm IS NULL FROM bellman_ford_stats()");
        assert_eq!(algorithm, Ok(Some(true)));
    }

    #[pg_test]
    fn test_stats() {
        Spi::run(&format!("SELECT bellman_ford_run({})", DIAMOND)).unwrap();
        Spi::run(&format!("SELECT bellman_ford_run({})", NEGATIVE_CYCLE)).unwrap();

        let total = Spi::get_one::<i64>("SELECT total_executions FROM bellman_ford_stats()");
        assert_eq!(total, Ok(Some(2)));
        let negative = Spi::get_one::<i64>("SELECT negative_cycles FROM bellman_ford_stats()");
        assert_eq!(negative, Ok(Some(1)));
        let avg = Spi::get_one::<f64>("SELECT average_vertices FROM bellman_ford_stats()");
        assert_eq!(avg, Ok(Some(3.0)));
        let avg_edges = Spi::get_one::<f64>("SELECT average_edges FROM bellman_ford_stats()");
        assert_eq!(avg_edges, Ok(Some(3.0)));
        let count = Spi::get_one::<i64>(
            "SELECT algorithm_count FROM bellman_ford_stats() WHERE algorithm = 'Bellman-Ford'",
        );
        assert_eq!(count, Ok(Some(2)));
    }

    #[pg_test]
    fn test_distances_table_paths() {
        let path = Spi::get_one::<String>(&format!(
            "SELECT path FROM bellman_ford_distances({}) WHERE vertex = 'D'",
            DIAMOND
        ));
        assert_eq!(path, Ok(Some("A → C → B → D".to_string())));

        let unreachable = Spi::get_one::<String>(
            r#"SELECT path FROM bellman_ford_distances('{"vertices": ["A", "B", "C"], "edges": [{"source": "A", "destination": "B", "weight": 1}], "source": "A"}'::jsonb) WHERE vertex = 'C'"#,
        );
        assert_eq!(unreachable, Ok(Some("unreachable".to_string())));
    }

    #[pg_test]
    fn test_steps_table() {
        let count = Spi::get_one::<i64>(
            r#"SELECT count(*) FROM bellman_ford_steps('{"vertices": ["A", "B"], "edges": [], "source": "A"}'::jsonb)"#,
        );
        assert_eq!(count, Ok(Some(1)));

        let changed = Spi::get_one::<String>(&format!(
            "SELECT array_to_string(changed, ',') FROM bellman_ford_steps({}) WHERE iteration = 1",
            DIAMOND
        ));
        assert_eq!(changed, Ok(Some("B,C,D".to_string())));
    }

    #[pg_test(error = "bellman_ford: unknown_vertex: edge at index 0 references undeclared vertex 'Z'")]
    fn test_reject_unknown_vertices_guc() {
        Spi::run("SET bellman_ford.reject_unknown_vertices = on").unwrap();
        Spi::run(
            r#"SELECT bellman_ford_run('{"vertices": ["A"], "edges": [{"source": "A", "destination": "Z", "weight": 1}], "source": "A"}'::jsonb)"#,
        )
        .unwrap();
    }

    #[pg_test]
    fn test_status_defaults() {
        let status = Spi::get_one::<String>("SELECT status FROM bellman_ford_status()");
        assert_eq!(status, Ok(Some("ok".to_string())));

        let max = Spi::get_one::<String>("SHOW bellman_ford.max_vertices");
        assert_eq!(max, Ok(Some("10000".to_string())));
    }
}
