//! Fruchterman-Reingold spring layout in three dimensions

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::attrs::Position;
use crate::graph::{AttrGraph, NodeId};

/// Spring layout parameters
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub iterations: usize,
    /// Stop once the mean per-node displacement falls below this value
    pub threshold: f64,
    /// Largest absolute coordinate after rescaling; `None` uses `2 * sqrt(n)`
    pub scale: Option<f64>,
    pub seed: u64,
    /// Nodes that keep their given position
    pub fixed: HashMap<NodeId, Position>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            iterations: 50,
            threshold: 1e-4,
            scale: None,
            seed: 42,
            fixed: HashMap::new(),
        }
    }
}

impl LayoutOptions {
    pub fn scale_for(&self, node_count: usize) -> f64 {
        self.scale
            .unwrap_or_else(|| 2.0 * (node_count as f64).sqrt())
    }
}

fn sub(a: Position, b: Position) -> Position {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(a: Position) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

/// Compute 3D positions for every node of `graph`
///
/// Edges attract as springs and every node pair repels; the step size cools
/// linearly over the iterations. Fixed nodes contribute forces but never
/// move, and the result is not rescaled when any node is fixed.
pub fn spring_layout(graph: &AttrGraph, options: &LayoutOptions) -> HashMap<NodeId, Position> {
    relax(graph, options).0
}

/// Layout positions plus the number of iterations that ran
fn relax(graph: &AttrGraph, options: &LayoutOptions) -> (HashMap<NodeId, Position>, usize) {
    let ids = graph.node_ids();
    let n = ids.len();
    let mut out = HashMap::new();
    if n == 0 {
        return (out, 0);
    }
    if n == 1 {
        let pos = options.fixed.get(&ids[0]).copied().unwrap_or([0.0; 3]);
        out.insert(ids[0], pos);
        return (out, 0);
    }

    let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut adjacency = vec![vec![false; n]; n];
    for edge in graph.edge_ids() {
        if let Some((a, b)) = graph.endpoints(edge) {
            let (i, j) = (index[&a], index[&b]);
            adjacency[i][j] = true;
            adjacency[j][i] = true;
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut pos: Vec<Position> = ids
        .iter()
        .map(|id| {
            let random = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
            options.fixed.get(id).copied().unwrap_or(random)
        })
        .collect();
    let movable: Vec<bool> = ids.iter().map(|id| !options.fixed.contains_key(id)).collect();

    let k = (1.0 / n as f64).sqrt();
    let extent = (0..3)
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            hi - lo
        })
        .fold(0.0, f64::max);
    let mut temperature = extent.max(0.01) * 0.1;
    let cooling = temperature / (options.iterations as f64 + 1.0);

    let mut ran = 0;
    for iteration in 0..options.iterations {
        ran += 1;
        let mut displacement = vec![[0.0f64; 3]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = sub(pos[i], pos[j]);
                let distance = norm(delta).max(0.01);
                let attraction = if adjacency[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                for axis in 0..3 {
                    displacement[i][axis] += delta[axis] * force;
                }
            }
        }

        let mut total_moved = 0.0;
        for i in 0..n {
            if !movable[i] {
                continue;
            }
            let length = norm(displacement[i]).max(0.01);
            let step = displacement[i].map(|d| d * temperature / length);
            for axis in 0..3 {
                pos[i][axis] += step[axis];
            }
            total_moved += norm(step);
        }
        temperature -= cooling;
        if total_moved / (n as f64) < options.threshold {
            tracing::debug!(iteration, "Spring layout converged");
            break;
        }
    }

    if options.fixed.is_empty() {
        rescale(&mut pos, options.scale_for(n));
    }

    for (id, p) in ids.into_iter().zip(pos) {
        out.insert(id, p);
    }
    (out, ran)
}

/// Center positions on the origin and fit the largest coordinate to `scale`
fn rescale(pos: &mut [Position], scale: f64) {
    let n = pos.len() as f64;
    let mut mean = [0.0; 3];
    for p in pos.iter() {
        for axis in 0..3 {
            mean[axis] += p[axis] / n;
        }
    }
    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        for axis in 0..3 {
            p[axis] -= mean[axis];
            limit = limit.max(p[axis].abs());
        }
    }
    if limit > 0.0 {
        for p in pos.iter_mut() {
            for axis in 0..3 {
                p[axis] *= scale / limit;
            }
        }
    }
}
