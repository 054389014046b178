use crate::distance::Distance;
use crate::graph::{Graph, VertexIndex};

/// Snapshot of the working maps after one relaxation round.
///
/// Maps are indexed by vertex declaration position. They are owned copies
/// taken at record time, so later rounds never show through.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 0 for initialization, then 1-based round number.
    pub iteration: usize,
    pub message: String,
    pub distances: Vec<Distance>,
    pub predecessors: Vec<Option<VertexIndex>>,
    /// Vertices whose distance changed this round, in order of first change.
    pub changed: Vec<VertexIndex>,
}

impl Step {
    pub fn distance_of(&self, graph: &Graph, label: &str) -> Option<Distance> {
        graph.index_of(label).map(|i| self.distances[i])
    }

    pub fn predecessor_of<'g>(&self, graph: &'g Graph, label: &str) -> Option<&'g str> {
        graph
            .index_of(label)
            .and_then(|i| self.predecessors[i])
            .map(|p| graph.vertex(p))
    }
}

/// Accumulates the step trace for one run.
#[derive(Debug, Default)]
pub(crate) struct StepRecorder {
    steps: Vec<Step>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_initialization(
        &mut self,
        graph: &Graph,
        distances: &[Distance],
        predecessors: &[Option<VertexIndex>],
    ) {
        let message = format!(
            "Initialization: distance[{}] = 0, all other vertices unreached",
            graph.source()
        );
        self.push(0, message, distances, predecessors, vec![graph.source_index()]);
    }

    pub fn record_round(
        &mut self,
        iteration: usize,
        distances: &[Distance],
        predecessors: &[Option<VertexIndex>],
        changed: Vec<VertexIndex>,
    ) {
        let message = match changed.len() {
            0 => format!("Iteration {}: no updates, distances converged", iteration),
            1 => format!("Iteration {}: 1 vertex updated", iteration),
            n => format!("Iteration {}: {} vertices updated", iteration, n),
        };
        self.push(iteration, message, distances, predecessors, changed);
    }

    fn push(
        &mut self,
        iteration: usize,
        message: String,
        distances: &[Distance],
        predecessors: &[Option<VertexIndex>],
        changed: Vec<VertexIndex>,
    ) {
        self.steps.push(Step {
            iteration,
            message,
            distances: distances.to_vec(),
            predecessors: predecessors.to_vec(),
            changed,
        });
    }

    pub fn finish(self) -> Vec<Step> {
        self.steps
    }
}
