use bellman_ford_core::{
    execute, execute_and_record, reconstruct_all, BellmanFordResult, GraphInput, RecordedRun,
};
use pgrx::prelude::*;
use pgrx::JsonB;

use crate::guc;
use crate::history::SpiRunStore;
use crate::util::{distance_to_sql, raise, validation_options};

/// Parse and run without touching the history table.
fn run_graph(graph: &JsonB) -> BellmanFordResult {
    let input = GraphInput::from_json(&graph.0).unwrap_or_else(|e| raise(e.into()));
    execute(input, &validation_options()).unwrap_or_else(|e| raise(e))
}

/// Run Bellman-Ford on `{vertices, edges, source}` and return the full
/// result: distances, predecessors, negative-cycle report and step trace.
///
/// When `bellman_ford.persist_runs` is on, the run is also stored and its
/// history id is added to the output as `runId`.
#[pg_extern]
fn bellman_ford_run(graph: JsonB) -> JsonB {
    let input = GraphInput::from_json(&graph.0).unwrap_or_else(|e| raise(e.into()));
    let options = validation_options();

    let recorded = if guc::PERSIST_RUNS.get() {
        execute_and_record(&mut SpiRunStore, input, &options)
    } else {
        execute(input, &options).map(|result| RecordedRun {
            result,
            run_id: None,
        })
    }
    .unwrap_or_else(|e| raise(e));

    let mut output = recorded.result.to_json().unwrap_or_else(|e| raise(e));
    if let Some(id) = recorded.run_id {
        output["runId"] = serde_json::Value::from(id);
    }
    JsonB(output)
}

/// Final distance, predecessor and reconstructed path for every vertex.
/// `distance` is NULL for unreached vertices.
#[pg_extern]
fn bellman_ford_distances(
    graph: JsonB,
) -> TableIterator<
    'static,
    (
        name!(vertex, String),
        name!(distance, Option<f64>),
        name!(predecessor, Option<String>),
        name!(path, String),
    ),
> {
    let result = run_graph(&graph);

    let rows = reconstruct_all(&result)
        .into_iter()
        .enumerate()
        .map(|(i, (vertex, path))| {
            let predecessor = result.predecessors[i].map(|p| result.vertices[p].clone());
            (
                vertex,
                distance_to_sql(result.distances[i]),
                predecessor,
                path.to_string(),
            )
        })
        .collect::<Vec<_>>();

    TableIterator::new(rows)
}

/// The step trace, one row per recorded step.
#[pg_extern]
fn bellman_ford_steps(
    graph: JsonB,
) -> TableIterator<
    'static,
    (
        name!(iteration, i32),
        name!(message, String),
        name!(changed, Vec<String>),
        name!(distances, JsonB),
        name!(predecessors, JsonB),
    ),
> {
    let result = run_graph(&graph);

    let rows = result
        .steps
        .iter()
        .map(|step| {
            let mut view = result.step_json(step).unwrap_or_else(|e| raise(e));
            let changed = step
                .changed
                .iter()
                .map(|&i| result.vertices[i].clone())
                .collect::<Vec<_>>();
            (
                step.iteration as i32,
                step.message.clone(),
                changed,
                JsonB(view["distances"].take()),
                JsonB(view["predecessors"].take()),
            )
        })
        .collect::<Vec<_>>();

    TableIterator::new(rows)
}
