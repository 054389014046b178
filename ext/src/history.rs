//! Run history for bellman_ford.
//!
//! Every `bellman_ford_run()` call (unless `bellman_ford.persist_runs` is
//! off) stores its input and output contract in `bellman_ford.runs`. The
//! listing, load, delete and stats functions read that table back.
//!
//! Storing is best effort: when the current role or transaction cannot
//! write the table, a WARNING is reported and the computed result is still
//! returned to the caller.

use std::fmt;

use bellman_ford_core::{AlgorithmCount, RunId, RunRecord, RunStats, RunStore, RunSummary};
use chrono::{DateTime, Utc};
use pgrx::prelude::*;
use pgrx::spi::{quote_literal, SpiError};
use pgrx::JsonB;

use crate::guc;

// ---------------------------------------------------------------------------
// Bootstrap SQL: schema + history table, created at CREATE EXTENSION time.
// ---------------------------------------------------------------------------

extension_sql!(
    r#"
CREATE SCHEMA IF NOT EXISTS bellman_ford;

CREATE TABLE bellman_ford.runs (
    id                  bigserial PRIMARY KEY,
    algorithm           text NOT NULL,
    source              text NOT NULL,
    vertices_count      integer NOT NULL,
    edges_count         integer NOT NULL,
    total_iterations    integer NOT NULL,
    has_negative_cycle  boolean NOT NULL,
    execution_time_ms   bigint NOT NULL,
    record              jsonb NOT NULL,
    executed_at         timestamptz NOT NULL DEFAULT now()
);

COMMENT ON TABLE bellman_ford.runs IS
    'History of bellman_ford_run() executions. '
    'record holds the submitted graph and the full result including the step trace.';
"#,
    name = "bootstrap",
    bootstrap
);

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum HistoryError {
    /// `bellman_ford.runs` is missing or not readable.
    Unavailable,
    Spi(SpiError),
    Decode(serde_json::Error),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Unavailable => {
                f.write_str("history table bellman_ford.runs is not available")
            }
            HistoryError::Spi(e) => write!(f, "SPI error: {}", e),
            HistoryError::Decode(e) => write!(f, "stored record is not valid: {}", e),
        }
    }
}

impl From<SpiError> for HistoryError {
    fn from(e: SpiError) -> Self {
        HistoryError::Spi(e)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::Decode(e)
    }
}

/// `RunStore` backed by `bellman_ford.runs` through SPI.
pub struct SpiRunStore;

/// Lookups below must not raise: `to_regclass` and the `has_*_privilege`
/// functions error out on a missing schema or one without USAGE, so each
/// CASE arm only runs once the previous ones have passed.
const HISTORY_READABLE: &str = "\
SELECT CASE
    WHEN NOT EXISTS (SELECT 1 FROM pg_catalog.pg_namespace WHERE nspname = 'bellman_ford')
        THEN false
    WHEN NOT has_schema_privilege('bellman_ford', 'USAGE') THEN false
    WHEN to_regclass('bellman_ford.runs') IS NULL THEN false
    ELSE has_table_privilege('bellman_ford.runs', 'SELECT')
END AS ok";

const HISTORY_WRITABLE: &str = "\
SELECT CASE
    WHEN NOT EXISTS (SELECT 1 FROM pg_catalog.pg_namespace WHERE nspname = 'bellman_ford')
        THEN false
    WHEN NOT has_schema_privilege('bellman_ford', 'USAGE') THEN false
    WHEN to_regclass('bellman_ford.runs') IS NULL THEN false
    WHEN to_regclass('bellman_ford.runs_id_seq') IS NULL THEN false
    WHEN current_setting('transaction_read_only')::bool THEN false
    ELSE has_table_privilege('bellman_ford.runs', 'INSERT')
        AND has_column_privilege('bellman_ford.runs', 'id', 'SELECT')
        AND has_sequence_privilege('bellman_ford.runs_id_seq', 'USAGE')
END AS ok";

fn check(client: &pgrx::spi::SpiClient<'_>, query: &str) -> bool {
    match client.select(query, None, &[]) {
        Ok(table) => {
            for row in table {
                return row.get_by_name::<bool, _>("ok").ok().flatten().unwrap_or(false);
            }
            false
        }
        Err(_) => false,
    }
}

/// True if the history table exists and the current role can read it.
pub fn history_available(client: &pgrx::spi::SpiClient<'_>) -> bool {
    check(client, HISTORY_READABLE)
}

/// True if an insert into the history table would go through: the role
/// holds INSERT on the table, SELECT on `id` for `RETURNING`, USAGE on the
/// id sequence, and the transaction is not read-only (hot standby included).
///
/// An insert that fails inside SPI raises a PostgreSQL ERROR and aborts the
/// whole statement, so every known cause is ruled out up front.
pub fn history_writable(client: &pgrx::spi::SpiClient<'_>) -> bool {
    check(client, HISTORY_WRITABLE)
}

/// Whether a run made now would be stored.
pub fn persist_possible() -> bool {
    Spi::connect(|client| history_writable(&client))
}

/// Number of stored runs, or None if the table cannot be read.
pub fn stored_run_count() -> Option<i64> {
    Spi::connect(|client| {
        if !history_available(&client) {
            return Ok::<_, SpiError>(None);
        }
        let count = client
            .select("SELECT count(*) AS n FROM bellman_ford.runs", None, &[])?
            .first()
            .get_one::<i64>()?;
        Ok(count)
    })
    .unwrap_or(None)
}

impl RunStore for SpiRunStore {
    type Error = HistoryError;

    fn persist_run(&mut self, record: &RunRecord) -> Result<RunId, HistoryError> {
        let body = serde_json::to_string(record)?;

        let result = Spi::connect_mut(|client| {
            if !history_writable(client) {
                return Err(HistoryError::Unavailable);
            }

            let insert = format!(
                "INSERT INTO bellman_ford.runs \
                 (algorithm, source, vertices_count, edges_count, total_iterations, \
                  has_negative_cycle, execution_time_ms, record) \
                 VALUES ({}, {}, {}, {}, {}, {}, {}, {}::jsonb) \
                 RETURNING id",
                quote_literal(&record.algorithm),
                quote_literal(&record.source),
                record.vertices_count,
                record.edges_count,
                record.total_iterations,
                record.has_negative_cycle,
                record.execution_time,
                quote_literal(&body)
            );

            let id = client
                .update(&insert, None, &[])?
                .first()
                .get_one::<i64>()?
                .unwrap_or(0);
            Ok(id)
        });

        if let Err(ref e) = result {
            warning!("bellman_ford: run not persisted: {}", e);
        }
        result
    }

    fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>, HistoryError> {
        Spi::connect(|client| {
            if !history_available(&client) {
                return Err(HistoryError::Unavailable);
            }

            let query = format!(
                "SELECT id, algorithm, source, vertices_count, edges_count, total_iterations, \
                        has_negative_cycle, \
                        (extract(epoch FROM executed_at) * 1000)::bigint AS executed_ms \
                 FROM bellman_ford.runs \
                 ORDER BY id DESC \
                 LIMIT {}",
                limit.min(i64::MAX as usize)
            );

            let mut runs = Vec::new();
            for row in client.select(&query, None, &[])? {
                let executed_ms: i64 = row.get_by_name("executed_ms")?.unwrap_or(0);
                runs.push(RunSummary {
                    id: row.get_by_name("id")?.unwrap_or(0),
                    algorithm: row.get_by_name("algorithm")?.unwrap_or_default(),
                    source: row.get_by_name("source")?.unwrap_or_default(),
                    vertices_count: row.get_by_name::<i32, _>("vertices_count")?.unwrap_or(0)
                        as usize,
                    edges_count: row.get_by_name::<i32, _>("edges_count")?.unwrap_or(0) as usize,
                    total_iterations: row.get_by_name::<i32, _>("total_iterations")?.unwrap_or(0)
                        as usize,
                    has_negative_cycle: row.get_by_name("has_negative_cycle")?.unwrap_or(false),
                    executed_at: DateTime::<Utc>::from_timestamp_millis(executed_ms)
                        .unwrap_or_default(),
                });
            }
            Ok(runs)
        })
    }

    fn load_run(&self, id: RunId) -> Result<Option<RunRecord>, HistoryError> {
        Spi::connect(|client| {
            if !history_available(&client) {
                return Err(HistoryError::Unavailable);
            }

            let query = format!(
                "SELECT record::text AS record FROM bellman_ford.runs WHERE id = {}",
                id
            );
            for row in client.select(&query, None, &[])? {
                let body: Option<String> = row.get_by_name("record")?;
                return match body {
                    Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                    None => Ok(None),
                };
            }
            Ok(None)
        })
    }

    fn delete_run(&mut self, id: RunId) -> Result<bool, HistoryError> {
        Spi::connect_mut(|client| {
            if !history_available(client) {
                return Err(HistoryError::Unavailable);
            }

            let deleted = client
                .update(
                    &format!("DELETE FROM bellman_ford.runs WHERE id = {} RETURNING id", id),
                    None,
                    &[],
                )?
                .len();
            Ok(deleted > 0)
        })
    }
}

impl SpiRunStore {
    /// Aggregate the whole history in one query. One row per algorithm,
    /// or a single row with a NULL algorithm when the table is empty.
    pub fn load_stats(&self) -> Result<RunStats, HistoryError> {
        Spi::connect(|client| {
            if !history_available(&client) {
                return Err(HistoryError::Unavailable);
            }

            let query = "\
WITH totals AS (
    SELECT count(*) AS total,
           count(*) FILTER (WHERE has_negative_cycle) AS negative,
           coalesce(round(avg(vertices_count), 2), 0)::float8 AS average_vertices,
           coalesce(round(avg(edges_count), 2), 0)::float8 AS average_edges
    FROM bellman_ford.runs
),
per_algorithm AS (
    SELECT algorithm, count(*) AS n FROM bellman_ford.runs GROUP BY algorithm
)
SELECT t.total, t.negative, t.average_vertices, t.average_edges, p.algorithm, p.n
FROM totals t LEFT JOIN per_algorithm p ON true
ORDER BY p.n DESC, p.algorithm";

            let mut stats = RunStats {
                total_executions: 0,
                negative_cycles: 0,
                average_vertices: 0.0,
                average_edges: 0.0,
                algorithms: Vec::new(),
            };
            for row in client.select(query, None, &[])? {
                let total: i64 = row.get_by_name("total")?.unwrap_or(0);
                let negative: i64 = row.get_by_name("negative")?.unwrap_or(0);
                stats.total_executions = total as usize;
                stats.negative_cycles = negative as usize;
                stats.average_vertices = row.get_by_name("average_vertices")?.unwrap_or(0.0);
                stats.average_edges = row.get_by_name("average_edges")?.unwrap_or(0.0);
                if let Some(algorithm) = row.get_by_name::<String, _>("algorithm")? {
                    stats.algorithms.push(AlgorithmCount {
                        algorithm,
                        count: row.get_by_name::<i64, _>("n")?.unwrap_or(0) as usize,
                    });
                }
            }
            Ok(stats)
        })
    }
}

// ---------------------------------------------------------------------------
// SQL functions
// ---------------------------------------------------------------------------

/// List stored runs, newest first.
#[pg_extern]
fn bellman_ford_history(
    max_rows: default!(Option<i32>, "NULL"),
) -> TableIterator<
    'static,
    (
        name!(id, i64),
        name!(algorithm, String),
        name!(source, String),
        name!(vertices_count, i32),
        name!(edges_count, i32),
        name!(total_iterations, i32),
        name!(has_negative_cycle, bool),
        name!(executed_at, String),
    ),
> {
    let limit = crate::util::check_positive(
        max_rows.unwrap_or_else(|| guc::HISTORY_LIMIT.get()),
        "max_rows",
    );

    let rows = SpiRunStore
        .list_runs(limit)
        .unwrap_or_else(|e| error!("bellman_ford_history: {}", e))
        .into_iter()
        .map(|s| {
            (
                s.id,
                s.algorithm,
                s.source,
                s.vertices_count as i32,
                s.edges_count as i32,
                s.total_iterations as i32,
                s.has_negative_cycle,
                s.executed_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>();

    TableIterator::new(rows)
}

/// Full stored record (input graph + result + trace) with its id, or NULL.
#[pg_extern]
fn bellman_ford_load(id: i64) -> Option<JsonB> {
    let record = SpiRunStore
        .load_run(id)
        .unwrap_or_else(|e| error!("bellman_ford_load: {}", e))?;

    let mut value = serde_json::to_value(&record)
        .unwrap_or_else(|e| error!("bellman_ford_load: {}", e));
    value["id"] = serde_json::Value::from(id);
    Some(JsonB(value))
}

/// Delete a stored run. Returns false if no run had that id.
#[pg_extern]
fn bellman_ford_delete(id: i64) -> bool {
    SpiRunStore
        .delete_run(id)
        .unwrap_or_else(|e| error!("bellman_ford_delete: {}", e))
}

/// Aggregate statistics over the whole history, one row per algorithm.
/// An empty history yields a single row with a NULL algorithm.
#[pg_extern]
fn bellman_ford_stats() -> TableIterator<
    'static,
    (
        name!(total_executions, i64),
        name!(negative_cycles, i64),
        name!(average_vertices, f64),
        name!(average_edges, f64),
        name!(algorithm, Option<String>),
        name!(algorithm_count, i64),
    ),
> {
    let stats = SpiRunStore
        .load_stats()
        .unwrap_or_else(|e| error!("bellman_ford_stats: {}", e));

    let total = stats.total_executions as i64;
    let negative = stats.negative_cycles as i64;

    let rows: Vec<_> = if stats.algorithms.is_empty() {
        vec![(total, negative, stats.average_vertices, stats.average_edges, None, 0)]
    } else {
        stats
            .algorithms
            .iter()
            .map(|a| {
                (
                    total,
                    negative,
                    stats.average_vertices,
                    stats.average_edges,
                    Some(a.algorithm.clone()),
                    a.count as i64,
                )
            })
            .collect()
    };

    TableIterator::new(rows)
}
