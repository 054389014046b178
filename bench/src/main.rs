use bellman_ford_core::{
    execute_and_record, reconstruct_path, EdgeInput, GraphInput, MemoryRunStore, RunStats,
    RunStore, ValidationOptions,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let vertex_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(500);

    if mode == "help" || mode == "--help" {
        println!("Usage: bellman-ford-bench [mode] [vertex_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  chain       Chain declared back-to-front (forces |V|-1 rounds)");
        println!("  random      Erdos-Renyi uniform random edges, non-negative weights");
        println!("  dag         Random DAG with negative weights (no cycles)");
        println!("  smallworld  Ring lattice + shortcuts");
        println!("  negcycle    Random graph with an injected negative cycle");
        println!();
        println!("Default vertex_count: 500 (the step trace grows as |V|^2 on the chain)");
        println!("Set RUST_LOG=bellman_ford_core=debug for per-run engine logs.");
        return;
    }

    if vertex_count < 2 {
        eprintln!("vertex_count must be at least 2");
        return;
    }

    tracing::info!(mode, vertex_count, "starting benchmark");

    println!("bellman-ford-bench");
    println!("==================");
    println!();

    let generators: Vec<(&str, fn(usize) -> GraphInput)> = match mode {
        "chain" => vec![("Reverse chain", gen_reverse_chain)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "dag" => vec![("Random DAG, negative weights", gen_dag)],
        "smallworld" => vec![("Small-world ring", gen_small_world)],
        "negcycle" => vec![("Random + negative cycle", gen_negative_cycle)],
        "all" => vec![
            ("Reverse chain", gen_reverse_chain as fn(usize) -> GraphInput),
            ("Erdos-Renyi random", gen_random),
            ("Random DAG, negative weights", gen_dag),
            ("Small-world ring", gen_small_world),
            ("Random + negative cycle", gen_negative_cycle),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    let mut history = MemoryRunStore::new();
    for (name, generator) in generators {
        run_benchmark(name, generator, vertex_count, &mut history);
    }

    let summaries = history.list_runs(usize::MAX).unwrap_or_default();
    let stats = RunStats::from_summaries(&summaries);
    println!("--- Summary ---");
    println!(
        "{} runs, {} with negative cycles, avg {:.0} vertices / {:.0} edges",
        stats.total_executions, stats.negative_cycles, stats.average_vertices, stats.average_edges
    );
}

fn run_benchmark(
    name: &str,
    generator: fn(usize) -> GraphInput,
    vertex_count: usize,
    history: &mut MemoryRunStore,
) {
    println!("--- {} ---", name);
    println!("Target: {} vertices", vertex_count);

    let t = Instant::now();
    let input = generator(vertex_count);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s — {} vertices, {} edges",
        gen_time.as_secs_f64(),
        input.vertices.len(),
        input.edges.len(),
    );

    let options = ValidationOptions::default();
    let t = Instant::now();
    let recorded = match execute_and_record(history, input, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Run failed: {}", e);
            return;
        }
    };
    let elapsed = t.elapsed();
    let result = &recorded.result;

    let reached = result.distances.iter().filter(|d| d.is_finite()).count();
    // Each step carries two full snapshots
    let trace_bytes = result.steps.len()
        * result.vertices.len()
        * (std::mem::size_of::<bellman_ford_core::Distance>()
            + std::mem::size_of::<Option<usize>>());

    println!();
    println!(
        "{:>8} {:>10} {:>10} {:>14} {:>10}",
        "steps", "reached", "neg cycle", "trace", "time"
    );
    println!("{:->8} {:->10} {:->10} {:->14} {:->10}", "", "", "", "", "");
    println!(
        "{:>8} {:>10} {:>10} {:>12.1}MB {:>8.1}ms",
        result.total_iterations(),
        reached,
        if result.has_negative_cycle { "yes" } else { "no" },
        trace_bytes as f64 / 1_048_576.0,
        elapsed.as_secs_f64() * 1000.0
    );

    if let Some(info) = &result.negative_cycle {
        println!(
            "Relaxable edge after bound: {} → {} ({})",
            info.from, info.to, info.weight
        );
        if let Some(message) = result.negative_cycle_message() {
            println!("{}", message);
        }
    } else {
        // Path to the last declared vertex
        let far = result.vertices[result.vertices.len() - 1].clone();
        if let Some(path) = reconstruct_path(result, &far) {
            let hops = path.vertices().len().saturating_sub(1);
            println!(
                "Path {} → {}: {} hops, distance {}",
                result.source(),
                far,
                hops,
                result.distance(&far).map(|d| d.to_string()).unwrap_or_default()
            );
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("v{}", i)).collect()
}

fn graph_input(vertices: Vec<String>, edges: Vec<EdgeInput>) -> GraphInput {
    let source = vertices[0].clone();
    GraphInput {
        vertices,
        edges,
        source,
    }
}

/// Chain v0 → v1 → ... declared from the far end back to the source.
///
/// Each round settles exactly one more vertex, so the engine runs the full
/// |V|-1 rounds. Worst case for both time and trace size.
fn gen_reverse_chain(vertex_count: usize) -> GraphInput {
    let vertices = labels(vertex_count);
    let edges = (1..vertex_count)
        .rev()
        .map(|i| EdgeInput::new(vertices[i - 1].clone(), vertices[i].clone(), 1.0))
        .collect();
    graph_input(vertices, edges)
}

/// Erdos-Renyi: ~10 uniform random edges per vertex, weights 1..=100.
fn gen_random(vertex_count: usize) -> GraphInput {
    let mut rng = FastRng::new(54321);
    let vertices = labels(vertex_count);
    let n = vertex_count as u64;

    let mut edges = Vec::with_capacity(vertex_count * 10);
    for _ in 0..vertex_count * 10 {
        let from = rng.next(n) as usize;
        let to = rng.next(n) as usize;
        if from != to {
            let w = (rng.next(100) + 1) as f64;
            edges.push(EdgeInput::new(vertices[from].clone(), vertices[to].clone(), w));
        }
    }
    graph_input(vertices, edges)
}

/// Random DAG: edges only run from lower to higher index, weights in -50..=50.
///
/// Negative weights without any cycle, so every distance is well defined.
fn gen_dag(vertex_count: usize) -> GraphInput {
    let mut rng = FastRng::new(12345);
    let vertices = labels(vertex_count);
    let n = vertex_count as u64;

    let mut edges = Vec::with_capacity(vertex_count * 5);
    // Spine keeps everything reachable from v0
    for i in 1..vertex_count {
        edges.push(EdgeInput::new(vertices[i - 1].clone(), vertices[i].clone(), 10.0));
    }
    for _ in 0..vertex_count * 4 {
        let a = rng.next(n) as usize;
        let b = rng.next(n) as usize;
        if a != b {
            let (lo, hi) = (a.min(b), a.max(b));
            let w = rng.next(101) as f64 - 50.0;
            edges.push(EdgeInput::new(vertices[lo].clone(), vertices[hi].clone(), w));
        }
    }
    graph_input(vertices, edges)
}

/// Small-world: ring lattice to k forward neighbors with occasional
/// long-range shortcuts.
fn gen_small_world(vertex_count: usize) -> GraphInput {
    let k = 4usize;
    let p = 0.05f64;
    let mut rng = FastRng::new(67890);
    let vertices = labels(vertex_count);

    let mut edges = Vec::with_capacity(vertex_count * k);
    for i in 0..vertex_count {
        for j in 1..=k {
            let neighbor = if rng.next_f64() < p {
                rng.next(vertex_count as u64) as usize
            } else {
                (i + j) % vertex_count
            };
            if neighbor != i {
                let w = (rng.next(20) + 1) as f64;
                edges.push(EdgeInput::new(vertices[i].clone(), vertices[neighbor].clone(), w));
            }
        }
    }
    graph_input(vertices, edges)
}

/// Random graph plus a reachable three-vertex cycle of total weight -1.
fn gen_negative_cycle(vertex_count: usize) -> GraphInput {
    let mut input = gen_random(vertex_count.max(4));
    let v = &input.vertices;
    let (a, b, c) = (v[1].clone(), v[2].clone(), v[3].clone());
    let source = input.source.clone();
    input.edges.push(EdgeInput::new(source, a.clone(), 1.0));
    input.edges.push(EdgeInput::new(a.clone(), b.clone(), 2.0));
    input.edges.push(EdgeInput::new(b, c.clone(), -4.0));
    input.edges.push(EdgeInput::new(c, a, 1.0));
    input
}
