//! Run history: what gets persisted after a computation, and the store seam.
//!
//! Persistence is fire-and-forget from the engine's point of view.
//! [`execute_and_record`] hands back the computed result whether or not the
//! store accepted it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::graph::{EdgeInput, GraphInput, ValidationOptions};
use crate::relax::{execute, BellmanFordResult};

pub const ALGORITHM_NAME: &str = "Bellman-Ford";

pub type RunId = i64;

/// Persisted form of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub algorithm: String,
    pub source: String,
    pub vertices: Vec<String>,
    pub edges: Vec<EdgeInput>,
    pub vertices_count: usize,
    pub edges_count: usize,
    /// The output contract, as returned to the caller.
    pub result: Value,
    pub has_negative_cycle: bool,
    pub total_iterations: usize,
    pub execution_time: u64,
}

impl RunRecord {
    /// Build a record from the submitted input and its result. Counts refer
    /// to the input as submitted.
    pub fn new(input: &GraphInput, result: &BellmanFordResult) -> Result<Self, EngineError> {
        Ok(Self {
            algorithm: ALGORITHM_NAME.to_string(),
            source: input.source.clone(),
            vertices: input.vertices.clone(),
            edges: input.edges.clone(),
            vertices_count: input.vertices.len(),
            edges_count: input.edges.len(),
            result: result.to_json()?,
            has_negative_cycle: result.has_negative_cycle,
            total_iterations: result.total_iterations(),
            execution_time: result.execution_time_ms,
        })
    }

    pub fn summary(&self, id: RunId, executed_at: DateTime<Utc>) -> RunSummary {
        RunSummary {
            id,
            algorithm: self.algorithm.clone(),
            source: self.source.clone(),
            vertices_count: self.vertices_count,
            edges_count: self.edges_count,
            total_iterations: self.total_iterations,
            has_negative_cycle: self.has_negative_cycle,
            executed_at,
        }
    }
}

/// One line of the history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: RunId,
    pub algorithm: String,
    pub source: String,
    pub vertices_count: usize,
    pub edges_count: usize,
    pub total_iterations: usize,
    pub has_negative_cycle: bool,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmCount {
    pub algorithm: String,
    pub count: usize,
}

/// Aggregate view over stored runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_executions: usize,
    pub negative_cycles: usize,
    pub average_vertices: f64,
    pub average_edges: f64,
    pub algorithms: Vec<AlgorithmCount>,
}

impl RunStats {
    /// Averages are rounded to two decimals; both are 0 for an empty history.
    /// Algorithms are listed by descending count, then name.
    pub fn from_summaries<'a, I>(runs: I) -> Self
    where
        I: IntoIterator<Item = &'a RunSummary>,
    {
        let mut total = 0usize;
        let mut negative = 0usize;
        let mut vertex_sum = 0usize;
        let mut edge_sum = 0usize;
        let mut by_algorithm: BTreeMap<&str, usize> = BTreeMap::new();

        for run in runs {
            total += 1;
            if run.has_negative_cycle {
                negative += 1;
            }
            vertex_sum += run.vertices_count;
            edge_sum += run.edges_count;
            *by_algorithm.entry(run.algorithm.as_str()).or_default() += 1;
        }

        let average = |sum: usize| {
            if total == 0 {
                0.0
            } else {
                (sum as f64 / total as f64 * 100.0).round() / 100.0
            }
        };

        let mut algorithms: Vec<AlgorithmCount> = by_algorithm
            .into_iter()
            .map(|(algorithm, count)| AlgorithmCount {
                algorithm: algorithm.to_string(),
                count,
            })
            .collect();
        algorithms.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.algorithm.cmp(&b.algorithm))
        });

        Self {
            total_executions: total,
            negative_cycles: negative,
            average_vertices: average(vertex_sum),
            average_edges: average(edge_sum),
            algorithms,
        }
    }
}

/// Durable home for run history.
pub trait RunStore {
    type Error: fmt::Display;

    fn persist_run(&mut self, record: &RunRecord) -> Result<RunId, Self::Error>;

    /// Most recent first, at most `limit` entries.
    fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>, Self::Error>;

    fn load_run(&self, id: RunId) -> Result<Option<RunRecord>, Self::Error>;

    /// True if a run was deleted.
    fn delete_run(&mut self, id: RunId) -> Result<bool, Self::Error>;
}

/// In-process store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: Vec<(RunId, DateTime<Utc>, RunRecord)>,
    next_id: RunId,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunStore for MemoryRunStore {
    type Error = std::convert::Infallible;

    fn persist_run(&mut self, record: &RunRecord) -> Result<RunId, Self::Error> {
        self.next_id += 1;
        self.runs.push((self.next_id, Utc::now(), record.clone()));
        Ok(self.next_id)
    }

    fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>, Self::Error> {
        Ok(self
            .runs
            .iter()
            .rev()
            .take(limit)
            .map(|(id, at, record)| record.summary(*id, *at))
            .collect())
    }

    fn load_run(&self, id: RunId) -> Result<Option<RunRecord>, Self::Error> {
        Ok(self
            .runs
            .iter()
            .find(|(run_id, _, _)| *run_id == id)
            .map(|(_, _, record)| record.clone()))
    }

    fn delete_run(&mut self, id: RunId) -> Result<bool, Self::Error> {
        let before = self.runs.len();
        self.runs.retain(|(run_id, _, _)| *run_id != id);
        Ok(self.runs.len() != before)
    }
}

/// A computed result plus the id it was stored under, if storing worked.
#[derive(Debug)]
pub struct RecordedRun {
    pub result: BellmanFordResult,
    pub run_id: Option<RunId>,
}

/// Validate, run, then try to persist.
///
/// Engine errors propagate. Store errors are logged and swallowed: the
/// caller still gets the result, with `run_id` None.
pub fn execute_and_record<S: RunStore>(
    store: &mut S,
    input: GraphInput,
    options: &ValidationOptions,
) -> Result<RecordedRun, EngineError> {
    let result = execute(input.clone(), options)?;

    let run_id = match RunRecord::new(&input, &result) {
        Ok(record) => match store.persist_run(&record) {
            Ok(id) => {
                tracing::debug!(run_id = id, source = %record.source, "run persisted");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist run, returning result anyway");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to build run record, returning result anyway");
            None
        }
    };

    Ok(RecordedRun { result, run_id })
}
