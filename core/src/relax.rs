use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distance::{Distance, Weight};
use crate::error::EngineError;
use crate::graph::{Graph, GraphInput, ValidationOptions, Vertex, VertexIndex};
use crate::path::{find_any_cycle, find_cycle};
use crate::trace::{Step, StepRecorder};

/// Evidence that a negative cycle is reachable from the source.
///
/// `from`, `to` and `weight` name the first edge, in declaration order, that
/// still relaxes after the bounded loop. When no edge relaxes because the
/// distances bottomed out at `f64::MIN`, they name the predecessor link that
/// closes the loop instead.
///
/// `cycle` is the loop recovered from the predecessor links, in edge
/// direction with its first vertex repeated at the end. It is empty when the
/// links do not close a loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeCycleInfo {
    pub from: Vertex,
    pub to: Vertex,
    pub weight: Weight,
    #[serde(default)]
    pub cycle: Vec<Vertex>,
}

impl NegativeCycleInfo {
    /// Human-readable summary, e.g. `Negative cycle reachable from A: B → C → B`.
    pub fn message(&self, source: &str) -> String {
        if self.cycle.is_empty() {
            format!(
                "Negative cycle reachable from {}: edge {} → {} can still be relaxed",
                source, self.from, self.to
            )
        } else {
            format!(
                "Negative cycle reachable from {}: {}",
                source,
                self.cycle.join(" → ")
            )
        }
    }
}

/// Everything one run produces.
///
/// Owns the vertex labels so it can be reported without the graph. Distance
/// and predecessor vectors are indexed by vertex declaration position.
#[derive(Debug, Clone)]
pub struct BellmanFordResult {
    pub vertices: Vec<Vertex>,
    pub source: VertexIndex,
    pub distances: Vec<Distance>,
    pub predecessors: Vec<Option<VertexIndex>>,
    pub has_negative_cycle: bool,
    pub negative_cycle: Option<NegativeCycleInfo>,
    pub steps: Vec<Step>,
    pub execution_time_ms: u64,
}

impl BellmanFordResult {
    pub fn source(&self) -> &str {
        &self.vertices[self.source]
    }

    pub fn index_of(&self, label: &str) -> Option<VertexIndex> {
        self.vertices.iter().position(|v| v == label)
    }

    /// Final distance to `label`, or None if it is not a declared vertex.
    pub fn distance(&self, label: &str) -> Option<Distance> {
        self.index_of(label).map(|i| self.distances[i])
    }

    /// Final predecessor of `label`. Outer None: unknown vertex.
    pub fn predecessor(&self, label: &str) -> Option<Option<&str>> {
        self.index_of(label)
            .map(|i| self.predecessors[i].map(|p| self.vertices[p].as_str()))
    }

    /// Number of recorded steps, initialization included.
    pub fn total_iterations(&self) -> usize {
        self.steps.len()
    }

    pub fn negative_cycle_message(&self) -> Option<String> {
        self.negative_cycle
            .as_ref()
            .map(|info| info.message(self.source()))
    }
}

/// Run Bellman-Ford from the graph's source.
///
/// Relaxes every edge in declaration order for at most `|V| - 1` rounds,
/// stopping early after the first round that changes nothing. A graph with
/// no relaxable edges records only the initialization step. Edges into the
/// source are never applied, so the source keeps distance 0 and no
/// predecessor in every step; the negative-cycle pass still checks them.
pub fn bellman_ford(graph: &Graph) -> BellmanFordResult {
    let started = Instant::now();
    let n = graph.vertex_count();
    let source = graph.source_index();

    let mut distances = vec![Distance::Unreached; n];
    let mut predecessors: Vec<Option<VertexIndex>> = vec![None; n];
    distances[source] = Distance::ZERO;

    let mut recorder = StepRecorder::new();
    recorder.record_initialization(graph, &distances, &predecessors);

    let rounds = if graph.live_edges().next().is_some() {
        n.saturating_sub(1)
    } else {
        0
    };

    let mut seen = vec![false; n];
    for i in 0..rounds {
        let changed = relax_round(graph, &mut distances, &mut predecessors, &mut seen);
        let converged = changed.is_empty();
        tracing::trace!(iteration = i + 1, updated = changed.len(), "relaxation round");
        recorder.record_round(i + 1, &distances, &predecessors, changed);
        if converged {
            break;
        }
    }

    let negative_cycle = detect_negative_cycle(graph, &distances, &predecessors);
    let steps = recorder.finish();
    let execution_time_ms = started.elapsed().as_millis() as u64;

    tracing::debug!(
        source = graph.source(),
        vertices = n,
        edges = graph.edge_count(),
        steps = steps.len(),
        negative_cycle = negative_cycle.is_some(),
        elapsed_ms = execution_time_ms,
        "bellman-ford complete"
    );

    BellmanFordResult {
        vertices: graph.vertices().to_vec(),
        source,
        distances,
        predecessors,
        has_negative_cycle: negative_cycle.is_some(),
        negative_cycle,
        steps,
        execution_time_ms,
    }
}

/// One pass over all edges. Returns the vertices that improved, each once.
fn relax_round(
    graph: &Graph,
    distances: &mut [Distance],
    predecessors: &mut [Option<VertexIndex>],
    seen: &mut [bool],
) -> Vec<VertexIndex> {
    seen.fill(false);
    let source = graph.source_index();
    let mut changed = Vec::new();

    for (u, v, w) in graph.live_edges() {
        if v == source {
            continue;
        }
        let Some(candidate) = distances[u].extend(w) else {
            continue;
        };
        if distances[v].improved_by(candidate) {
            distances[v] = Distance::Finite(candidate);
            predecessors[v] = Some(u);
            if !seen[v] {
                seen[v] = true;
                changed.push(v);
            }
        }
    }

    changed
}

/// Verification pass over the final maps, which are left untouched.
///
/// A relaxable edge `u → v` is reported with the loop found by walking the
/// predecessor links from `v` as if the edge had been applied. Distances
/// saturated at `f64::MIN` can stop every edge from relaxing, so a loop
/// already closed by the links counts as a negative cycle too.
fn detect_negative_cycle(
    graph: &Graph,
    distances: &[Distance],
    predecessors: &[Option<VertexIndex>],
) -> Option<NegativeCycleInfo> {
    if let Some((u, v, weight)) = find_relaxable_edge(graph, distances) {
        let mut links = predecessors.to_vec();
        links[v] = Some(u);
        let cycle = find_cycle(&links, v)
            .map(|c| closed_labels(graph, &c))
            .unwrap_or_default();
        return Some(NegativeCycleInfo {
            from: graph.vertex(u).to_string(),
            to: graph.vertex(v).to_string(),
            weight,
            cycle,
        });
    }

    let cycle = find_any_cycle(predecessors)?;
    let to = cycle[0];
    let from = predecessors[to]?;
    let weight = graph
        .live_edges()
        .filter(|&(a, b, _)| a == from && b == to)
        .map(|(_, _, w)| w)
        .min_by(|a, b| a.total_cmp(b))?;
    Some(NegativeCycleInfo {
        from: graph.vertex(from).to_string(),
        to: graph.vertex(to).to_string(),
        weight,
        cycle: closed_labels(graph, &cycle),
    })
}

/// First edge, in declaration order, that still relaxes.
fn find_relaxable_edge(
    graph: &Graph,
    distances: &[Distance],
) -> Option<(VertexIndex, VertexIndex, Weight)> {
    graph.edges().iter().find_map(|e| {
        let (u, v) = e.endpoints()?;
        distances[u]
            .extend(e.weight)
            .filter(|&candidate| distances[v].improved_by(candidate))
            .map(|_| (u, v, e.weight))
    })
}

fn closed_labels(graph: &Graph, cycle: &[VertexIndex]) -> Vec<Vertex> {
    cycle
        .iter()
        .chain(cycle.first())
        .map(|&i| graph.vertex(i).to_string())
        .collect()
}

/// Validate `input` and run the engine.
///
/// Validation failures short-circuit before any relaxation. A result whose
/// source invariant does not hold is reported as an internal error rather
/// than returned.
pub fn execute(
    input: GraphInput,
    options: &ValidationOptions,
) -> Result<BellmanFordResult, EngineError> {
    let graph = Graph::validate(input, options)?;
    let result = bellman_ford(&graph);

    if result.distances[result.source] != Distance::ZERO
        || result.predecessors[result.source].is_some()
    {
        tracing::error!(source = result.source(), "source invariant violated");
        return Err(EngineError::Internal(format!(
            "source '{}' lost distance 0",
            result.source()
        )));
    }

    Ok(result)
}

/// JSON in, JSON out: parse the request, run, serialize the output contract.
pub fn execute_json(body: &Value, options: &ValidationOptions) -> Result<Value, EngineError> {
    let input = GraphInput::from_json(body)?;
    execute(input, options)?.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeInput;

    fn graph(vertices: &[&str], edges: &[(&str, &str, f64)], source: &str) -> Graph {
        Graph::from_edges(vertices.iter().copied(), edges.iter().copied(), source).unwrap()
    }

    fn dist(r: &BellmanFordResult, v: &str) -> Distance {
        r.distance(v).unwrap()
    }

    /// Deterministic LCG, same recurrence the bench generators use.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, max: u64) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
            (self.0 >> 33) % max
        }
    }

    /// Minimum weight over all simple paths from source to each vertex.
    /// Exact for graphs without negative cycles.
    fn brute_force(g: &Graph) -> Vec<Distance> {
        fn dfs(g: &Graph, at: usize, acc: f64, on_path: &mut Vec<bool>, best: &mut Vec<Distance>) {
            if best[at].improved_by(acc) {
                best[at] = Distance::Finite(acc);
            }
            for (u, v, w) in g.live_edges() {
                if u == at && !on_path[v] {
                    on_path[v] = true;
                    dfs(g, v, acc + w, on_path, best);
                    on_path[v] = false;
                }
            }
        }

        let n = g.vertex_count();
        let mut best = vec![Distance::Unreached; n];
        let mut on_path = vec![false; n];
        on_path[g.source_index()] = true;
        dfs(g, g.source_index(), 0.0, &mut on_path, &mut best);
        best
    }

    /// Random graph with integer weights. With `dag` set, edges only go from
    /// lower to higher index so negative weights cannot form a cycle.
    fn random_graph(seed: u64, n: usize, m: usize, dag: bool) -> Graph {
        let mut rng = Lcg(seed);
        let labels: Vec<String> = (0..n).map(|i| format!("v{}", i)).collect();
        let mut edges = Vec::new();
        while edges.len() < m {
            let a = rng.next(n as u64) as usize;
            let b = rng.next(n as u64) as usize;
            let (from, to, w) = if dag {
                if a == b {
                    continue;
                }
                let (lo, hi) = (a.min(b), a.max(b));
                (lo, hi, rng.next(21) as f64 - 10.0)
            } else {
                (a, b, rng.next(10) as f64)
            };
            edges.push((labels[from].clone(), labels[to].clone(), w));
        }
        Graph::from_edges(labels.clone(), edges, &labels[0]).unwrap()
    }

    /// Non-negative random edges plus `v0 → v1` and heavy negative edges back
    /// into the source, so every graph has a negative cycle through `v0`.
    fn random_graph_into_source(seed: u64, n: usize, m: usize) -> Graph {
        let mut rng = Lcg(seed);
        let labels: Vec<String> = (0..n).map(|i| format!("v{}", i)).collect();
        let mut edges = vec![
            (labels[0].clone(), labels[1].clone(), 1.0),
            (labels[1].clone(), labels[0].clone(), -100.0),
        ];
        for _ in 0..m {
            let a = rng.next(n as u64) as usize;
            let b = rng.next(n as u64) as usize;
            edges.push((labels[a].clone(), labels[b].clone(), rng.next(10) as f64));
        }
        let back = 1 + rng.next(n as u64 - 1) as usize;
        edges.push((labels[back].clone(), labels[0].clone(), -100.0));
        Graph::from_edges(labels.clone(), edges, &labels[0]).unwrap()
    }

    /// `cycle` is closed, every hop is an edge, and the cheapest edges along
    /// it sum below zero.
    fn assert_cycle_is_negative(g: &Graph, cycle: &[Vertex]) {
        assert!(cycle.len() >= 2, "cycle {:?}", cycle);
        assert!(cycle.len() <= g.vertex_count() + 1, "cycle {:?}", cycle);
        assert_eq!(cycle.first(), cycle.last());
        let total: f64 = cycle
            .windows(2)
            .map(|hop| {
                g.edges()
                    .iter()
                    .filter(|e| e.from == hop[0] && e.to == hop[1])
                    .map(|e| e.weight)
                    .min_by(|a, b| a.total_cmp(b))
                    .unwrap_or_else(|| panic!("no edge {} → {}", hop[0], hop[1]))
            })
            .sum();
        assert!(total < 0.0, "cycle {:?} weighs {}", cycle, total);
    }

    // --- Reference scenarios ---

    #[test]
    fn test_diamond_shortest_paths() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 4.0), ("A", "C", 2.0), ("C", "B", 1.0), ("B", "D", 2.0)],
            "A",
        );
        let r = bellman_ford(&g);
        assert_eq!(dist(&r, "A"), Distance::Finite(0.0));
        assert_eq!(dist(&r, "B"), Distance::Finite(3.0));
        assert_eq!(dist(&r, "C"), Distance::Finite(2.0));
        assert_eq!(dist(&r, "D"), Distance::Finite(5.0));
        assert_eq!(r.predecessor("A"), Some(None));
        assert_eq!(r.predecessor("B"), Some(Some("C")));
        assert_eq!(r.predecessor("C"), Some(Some("A")));
        assert_eq!(r.predecessor("D"), Some(Some("B")));
        assert!(!r.has_negative_cycle);
        assert!(r.negative_cycle.is_none());
    }

    #[test]
    fn test_two_vertex_negative_cycle() {
        let g = graph(&["X", "Y"], &[("X", "Y", 1.0), ("Y", "X", -2.0)], "X");
        let r = bellman_ford(&g);
        assert!(r.has_negative_cycle);
        assert_eq!(
            r.negative_cycle,
            Some(NegativeCycleInfo {
                from: "Y".into(),
                to: "X".into(),
                weight: -2.0,
                cycle: vec!["X".into(), "Y".into(), "X".into()],
            })
        );
        assert_eq!(
            r.negative_cycle_message().as_deref(),
            Some("Negative cycle reachable from X: X → Y → X")
        );
        // Source keeps its invariant even though the cycle runs through it
        assert_eq!(dist(&r, "X"), Distance::ZERO);
        assert_eq!(r.predecessor("X"), Some(None));
        for step in &r.steps {
            assert_eq!(step.distances[0], Distance::ZERO);
            assert_eq!(step.predecessors[0], None);
        }
    }

    #[test]
    fn test_unreachable_vertex() {
        let g = graph(&["A", "B", "C"], &[("A", "B", 1.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(dist(&r, "C"), Distance::Unreached);
        assert_eq!(r.predecessor("C"), Some(None));
        assert!(!r.has_negative_cycle);
    }

    #[test]
    fn test_no_edges_only_initialization_step() {
        let g = graph(&["A", "B"], &[], "A");
        let r = bellman_ford(&g);
        assert_eq!(r.steps.len(), 1);
        assert_eq!(r.total_iterations(), 1);
        assert_eq!(r.steps[0].iteration, 0);
        assert_eq!(r.steps[0].changed, vec![0]);
        assert_eq!(dist(&r, "B"), Distance::Unreached);
        assert!(!r.has_negative_cycle);
    }

    // --- Trace shape ---

    #[test]
    fn test_initialization_step_contents() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0)], "A");
        let r = bellman_ford(&g);
        let init = &r.steps[0];
        assert_eq!(init.iteration, 0);
        assert_eq!(init.distances, vec![Distance::ZERO, Distance::Unreached]);
        assert_eq!(init.predecessors, vec![None, None]);
        assert!(init.message.starts_with("Initialization"));
    }

    #[test]
    fn test_early_termination_records_converged_round() {
        // Chain of 5 in declaration order converges in round 1, round 2 is quiet.
        let g = graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("D", "E", 1.0)],
            "A",
        );
        let r = bellman_ford(&g);
        assert_eq!(r.steps.len(), 3);
        assert_eq!(r.steps[1].changed.len(), 4);
        assert!(r.steps[2].changed.is_empty());
        assert!(r.steps[2].message.contains("no updates"));
    }

    #[test]
    fn test_reverse_order_needs_all_rounds() {
        // Edges declared back-to-front: one new vertex per round.
        let g = graph(
            &["A", "B", "C", "D"],
            &[("C", "D", 1.0), ("B", "C", 1.0), ("A", "B", 1.0)],
            "A",
        );
        let r = bellman_ford(&g);
        // init + 3 rounds, each settling one vertex; bound reached, no quiet round
        assert_eq!(r.steps.len(), 4);
        for (i, step) in r.steps.iter().enumerate().skip(1) {
            assert_eq!(step.iteration, i);
            assert_eq!(step.changed, vec![i]);
        }
        assert_eq!(dist(&r, "D"), Distance::Finite(3.0));
    }

    #[test]
    fn test_changed_set_lists_vertex_once() {
        // B improves twice in the same round via parallel edges
        let g = graph(&["A", "B"], &[("A", "B", 5.0), ("A", "B", 2.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(r.steps[1].changed, vec![1]);
        assert_eq!(dist(&r, "B"), Distance::Finite(2.0));
    }

    #[test]
    fn test_snapshots_do_not_alias() {
        let g = graph(
            &["A", "B", "C"],
            &[("B", "C", 1.0), ("A", "B", 1.0)],
            "A",
        );
        let r = bellman_ford(&g);
        assert_eq!(r.steps[1].distances[2], Distance::Unreached);
        assert_eq!(r.steps[2].distances[2], Distance::Finite(2.0));
        assert_eq!(r.steps[0].distances[1], Distance::Unreached);
    }

    #[test]
    fn test_single_vertex_graph() {
        let g = graph(&["A"], &[("A", "A", 3.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(r.steps.len(), 1);
        assert!(!r.has_negative_cycle);
    }

    #[test]
    fn test_negative_self_loop_detected() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0), ("B", "B", -1.0)], "A");
        let r = bellman_ford(&g);
        assert!(r.has_negative_cycle);
        assert_eq!(r.negative_cycle.as_ref().map(|c| c.from.as_str()), Some("B"));
    }

    #[test]
    fn test_unreachable_negative_cycle_not_reported() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("C", "D", -5.0), ("D", "C", 1.0)],
            "A",
        );
        let r = bellman_ford(&g);
        assert!(!r.has_negative_cycle);
        assert_eq!(dist(&r, "C"), Distance::Unreached);
    }

    #[test]
    fn test_negative_cycle_first_edge_in_declaration_order() {
        // Cycle B→C→D→B of weight -1; B→C is declared first among relaxable edges.
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("D", "B", -3.0)],
            "A",
        );
        let r = bellman_ford(&g);
        assert!(r.has_negative_cycle);
        let info = r.negative_cycle.unwrap();
        let relaxable: Vec<_> = g
            .edges()
            .iter()
            .filter(|e| {
                let (u, v) = e.endpoints().unwrap();
                r.distances[u]
                    .extend(e.weight)
                    .is_some_and(|c| r.distances[v].improved_by(c))
            })
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect();
        assert_eq!((info.from, info.to), relaxable[0]);
        // The loop itself does not touch the source
        assert_eq!(info.cycle, vec!["B", "C", "D", "B"]);
        assert_cycle_is_negative(&g, &info.cycle);
    }

    #[test]
    fn test_negative_self_loop_cycle() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0), ("B", "B", -1.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(r.negative_cycle.unwrap().cycle, vec!["B", "B"]);
    }

    #[test]
    fn test_no_cycle_message_without_cycle() {
        let g = graph(&["A", "B"], &[("A", "B", -1.0)], "A");
        let r = bellman_ford(&g);
        assert!(r.negative_cycle_message().is_none());
    }

    // --- Float range ---

    #[test]
    fn test_huge_negative_cycle_detected() {
        // Sums leave the f64 range on the way down; the loop must still show.
        let g = graph(
            &["X", "Y", "Z"],
            &[("X", "Y", -1e308), ("Y", "Z", -1e308), ("Z", "Y", -1e308)],
            "X",
        );
        let r = bellman_ford(&g);
        assert!(r.has_negative_cycle);
        assert!(dist(&r, "Z").is_finite());
        assert_eq!(r.predecessor("Z"), Some(Some("Y")));
        let info = r.negative_cycle.unwrap();
        assert_eq!(info.cycle, vec!["Y", "Z", "Y"]);
        assert_eq!((info.from.as_str(), info.to.as_str()), ("Z", "Y"));
        assert_eq!(info.weight, -1e308);
    }

    #[test]
    fn test_huge_negative_chain_saturates() {
        let g = graph(
            &["X", "Y", "Z"],
            &[("X", "Y", -1e308), ("Y", "Z", -1e308)],
            "X",
        );
        let r = bellman_ford(&g);
        assert!(!r.has_negative_cycle);
        assert_eq!(dist(&r, "Y"), Distance::Finite(-1e308));
        assert_eq!(dist(&r, "Z"), Distance::Finite(f64::MIN));
        assert_eq!(r.predecessor("Z"), Some(Some("Y")));
    }

    #[test]
    fn test_huge_positive_sum_stays_unreached() {
        let g = graph(
            &["X", "Y", "Z"],
            &[("X", "Y", f64::MAX), ("Y", "Z", f64::MAX)],
            "X",
        );
        let r = bellman_ford(&g);
        assert_eq!(dist(&r, "Y"), Distance::Finite(f64::MAX));
        assert_eq!(dist(&r, "Z"), Distance::Unreached);
        assert!(!r.has_negative_cycle);
    }

    #[test]
    fn test_unknown_vertex_edges_inert() {
        let g = graph(&["A", "B"], &[("A", "Z", -100.0), ("Z", "B", -100.0), ("A", "B", 1.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(dist(&r, "B"), Distance::Finite(1.0));
        assert!(!r.has_negative_cycle);
    }

    #[test]
    fn test_only_unknown_vertex_edges_skip_rounds() {
        let g = graph(&["A", "B"], &[("A", "Z", 1.0)], "A");
        let r = bellman_ford(&g);
        assert_eq!(r.steps.len(), 1);
    }

    // --- Properties ---

    #[test]
    fn test_source_invariant_in_every_step() {
        for seed in 0..20 {
            let g = random_graph(seed, 6, 12, seed % 2 == 0);
            let r = bellman_ford(&g);
            let s = g.source_index();
            for step in &r.steps {
                assert_eq!(step.distances[s], Distance::ZERO, "seed {}", seed);
                assert_eq!(step.predecessors[s], None, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_source_invariant_with_cycles_through_source() {
        for seed in 0..30 {
            let g = random_graph_into_source(seed, 6, 10);
            let r = bellman_ford(&g);
            let s = g.source_index();
            assert!(r.has_negative_cycle, "seed {}", seed);
            for step in &r.steps {
                assert_eq!(step.distances[s], Distance::ZERO, "seed {}", seed);
                assert_eq!(step.predecessors[s], None, "seed {}", seed);
            }
            for pair in r.steps.windows(2) {
                for (a, b) in pair[0].distances.iter().zip(&pair[1].distances) {
                    assert!(b <= a, "seed {}: {} then {}", seed, a, b);
                }
            }
            let info = r.negative_cycle.unwrap();
            assert!(info.cycle.contains(&"v0".to_string()), "seed {}", seed);
            assert_cycle_is_negative(&g, &info.cycle);
        }
    }

    #[test]
    fn test_monotonic_across_steps() {
        for seed in 0..20 {
            let g = random_graph(seed, 7, 14, true);
            let r = bellman_ford(&g);
            for pair in r.steps.windows(2) {
                for (a, b) in pair[0].distances.iter().zip(&pair[1].distances) {
                    assert!(b <= a, "seed {}: {} then {}", seed, a, b);
                }
            }
        }
    }

    #[test]
    fn test_matches_brute_force_nonnegative() {
        for seed in 0..25 {
            let g = random_graph(seed, 6, 10, false);
            let r = bellman_ford(&g);
            assert!(!r.has_negative_cycle);
            assert_eq!(r.distances, brute_force(&g), "seed {}", seed);
        }
    }

    #[test]
    fn test_matches_brute_force_negative_dag() {
        for seed in 100..125 {
            let g = random_graph(seed, 7, 12, true);
            let r = bellman_ford(&g);
            assert!(!r.has_negative_cycle, "seed {}", seed);
            assert_eq!(r.distances, brute_force(&g), "seed {}", seed);
        }
    }

    #[test]
    fn test_idempotent() {
        let g = random_graph(7, 8, 20, true);
        let a = bellman_ford(&g);
        let b = bellman_ford(&g);
        assert_eq!(a.distances, b.distances);
        assert_eq!(a.predecessors, b.predecessors);
        assert_eq!(a.has_negative_cycle, b.has_negative_cycle);
        assert_eq!(a.steps, b.steps);
    }

    // --- execute ---

    #[test]
    fn test_execute_validation_short_circuits() {
        let input = GraphInput::new(["A"], [EdgeInput::new("A", "A", 1.0)], "B");
        let err = execute(input, &ValidationOptions::default()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.client_message().starts_with("source_not_in_vertices"));
    }

    #[test]
    fn test_execute_json_output_contract() {
        let body = serde_json::json!({
            "vertices": ["A", "B", "C"],
            "edges": [{"source": "A", "destination": "B", "weight": 1}],
            "source": "A"
        });
        let out = execute_json(&body, &ValidationOptions::default()).unwrap();
        assert_eq!(out["distances"]["B"], 1.0);
        assert!(out["distances"]["C"].is_null());
        assert_eq!(out["hasNegativeCycle"], false);
        assert_eq!(out["source"], "A");
    }
}
