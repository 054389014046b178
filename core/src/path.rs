use std::fmt;

use crate::distance::Weight;
use crate::graph::{Graph, Vertex, VertexIndex};
use crate::relax::BellmanFordResult;

/// Reconstructed route from the source to a target vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// Source through target, inclusive. A lone source is a one-vertex path.
    Complete(Vec<Vertex>),
    /// The predecessor chain looped back on itself before reaching the
    /// source. Holds the vertices walked so far, ending at the target.
    Truncated(Vec<Vertex>),
    Unreachable,
}

impl PathOutcome {
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            PathOutcome::Complete(p) | PathOutcome::Truncated(p) => p.as_slice(),
            PathOutcome::Unreachable => &[],
        }
    }

    /// Sum of edge weights along a complete path, taking the cheapest
    /// parallel edge for each hop. None if the path is not complete or a hop
    /// has no edge in `graph`.
    pub fn weight(&self, graph: &Graph) -> Option<Weight> {
        let PathOutcome::Complete(path) = self else {
            return None;
        };
        path.windows(2).try_fold(0.0, |acc, hop| {
            graph
                .edges()
                .iter()
                .filter(|e| e.from == hop[0] && e.to == hop[1])
                .map(|e| e.weight)
                .min_by(|a, b| a.total_cmp(b))
                .map(|w| acc + w)
        })
    }
}

impl fmt::Display for PathOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathOutcome::Complete(p) | PathOutcome::Truncated(p) => f.write_str(&p.join(" → ")),
            PathOutcome::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Walk predecessor links from `target` back to the source.
///
/// Returns None if `target` is not a declared vertex. The walk keeps a
/// visited set and never takes more than `|V|` steps, so it terminates on
/// cyclic predecessor chains left behind by a negative cycle.
pub fn reconstruct_path(result: &BellmanFordResult, target: &str) -> Option<PathOutcome> {
    let target = result.index_of(target)?;
    Some(walk_predecessors(
        &result.vertices,
        &result.predecessors,
        result.source,
        target,
    ))
}

/// Reconstruct paths for every vertex, in declaration order.
pub fn reconstruct_all(result: &BellmanFordResult) -> Vec<(Vertex, PathOutcome)> {
    (0..result.vertices.len())
        .map(|i| {
            let outcome =
                walk_predecessors(&result.vertices, &result.predecessors, result.source, i);
            (result.vertices[i].clone(), outcome)
        })
        .collect()
}

fn walk_predecessors(
    vertices: &[Vertex],
    predecessors: &[Option<VertexIndex>],
    source: VertexIndex,
    target: VertexIndex,
) -> PathOutcome {
    if target == source {
        return PathOutcome::Complete(vec![vertices[source].clone()]);
    }
    if predecessors[target].is_none() {
        return PathOutcome::Unreachable;
    }

    let mut visited = vec![false; vertices.len()];
    let mut reversed: Vec<VertexIndex> = Vec::new();
    let mut current = Some(target);

    while let Some(node) = current {
        if node == source {
            reversed.push(source);
            return PathOutcome::Complete(labels(vertices, reversed));
        }
        if visited[node] || reversed.len() >= vertices.len() {
            return PathOutcome::Truncated(labels(vertices, reversed));
        }
        visited[node] = true;
        reversed.push(node);
        current = predecessors[node];
    }

    // Chain ended at a vertex with no predecessor that is not the source.
    PathOutcome::Truncated(labels(vertices, reversed))
}

/// Follow predecessor links from `start` until one repeats.
///
/// Returns the loop in edge direction, rotated to begin at its
/// earliest-declared vertex, or None if the chain ends without looping.
/// Every vertex is visited at most once.
pub(crate) fn find_cycle(
    predecessors: &[Option<VertexIndex>],
    start: VertexIndex,
) -> Option<Vec<VertexIndex>> {
    let mut visited = vec![false; predecessors.len()];
    let mut node = start;
    while !visited[node] {
        visited[node] = true;
        node = predecessors[node]?;
    }

    // `node` is on the loop; walk it once more to collect it.
    let mut cycle = vec![node];
    let mut current = predecessors[node]?;
    while current != node {
        cycle.push(current);
        current = predecessors[current]?;
    }
    cycle.reverse();

    let first = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, &v)| v)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(first);
    Some(cycle)
}

/// Any loop in the predecessor links, scanning start vertices in
/// declaration order. Linear in the number of vertices overall.
pub(crate) fn find_any_cycle(predecessors: &[Option<VertexIndex>]) -> Option<Vec<VertexIndex>> {
    // 0: unexplored, otherwise 1 + the start whose walk reached the vertex
    let mut walk = vec![0usize; predecessors.len()];
    for start in 0..predecessors.len() {
        let mut node = start;
        while walk[node] == 0 {
            walk[node] = start + 1;
            match predecessors[node] {
                Some(p) => node = p,
                None => break,
            }
        }
        if walk[node] == start + 1 && predecessors[node].is_some() {
            return find_cycle(predecessors, node);
        }
    }
    None
}

fn labels(vertices: &[Vertex], mut reversed: Vec<VertexIndex>) -> Vec<Vertex> {
    reversed.reverse();
    reversed.into_iter().map(|i| vertices[i].clone()).collect()
}
