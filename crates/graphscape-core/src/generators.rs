//! Graph generators used by the bundled demos

use rand::Rng;
use serde_json::Value;

use crate::graph::{AttrGraph, GraphKind};

/// Data key holding lattice coordinates on grid nodes
pub const COORDS_KEY: &str = "coords";

/// The Frucht graph: 12 nodes, 18 edges, 3-regular with no nontrivial symmetry
pub fn frucht() -> AttrGraph {
    let mut g = AttrGraph::new(GraphKind::Undirected).with_name("Frucht graph");
    for i in 0..7 {
        g.add_edge(i.to_string(), ((i + 1) % 7).to_string());
    }
    let extra = [
        (0, 7),
        (1, 7),
        (2, 8),
        (3, 9),
        (4, 9),
        (5, 10),
        (6, 10),
        (7, 11),
        (8, 11),
        (8, 9),
        (10, 11),
    ];
    for (a, b) in extra {
        g.add_edge(a.to_string(), b.to_string());
    }
    g
}

/// G(n, p) random graph with nodes keyed `0..n`
pub fn erdos_renyi<R: Rng>(n: usize, p: f64, rng: &mut R) -> AttrGraph {
    let mut g = AttrGraph::new(GraphKind::Undirected);
    for i in 0..n {
        g.add_node(i.to_string());
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < p {
                g.add_edge(i.to_string(), j.to_string());
            }
        }
    }
    g
}

/// Key for a lattice point, e.g. `(1, 2)`
pub fn coords_key(coords: &[usize]) -> String {
    let parts: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// Every lattice point inside `dims`, last axis varying fastest
fn lattice(dims: &[usize]) -> Vec<Vec<usize>> {
    let mut points = vec![Vec::new()];
    for &d in dims {
        let mut next = Vec::with_capacity(points.len() * d);
        for p in &points {
            for i in 0..d {
                let mut q = p.clone();
                q.push(i);
                next.push(q);
            }
        }
        points = next;
    }
    if dims.is_empty() {
        Vec::new()
    } else {
        points
    }
}

fn add_lattice_nodes(g: &mut AttrGraph, points: &[Vec<usize>]) {
    for p in points {
        let id = g.add_node(coords_key(p));
        if let Some(attrs) = g.node_mut(id) {
            let coords: Vec<Value> = p.iter().map(|c| Value::from(*c as u64)).collect();
            attrs.set_data(COORDS_KEY, coords);
        }
    }
}

/// n-dimensional lattice graph; nodes carry their coordinates under [`COORDS_KEY`]
pub fn grid(dims: &[usize]) -> AttrGraph {
    let mut g = AttrGraph::new(GraphKind::Undirected);
    let points = lattice(dims);
    add_lattice_nodes(&mut g, &points);
    for p in &points {
        for axis in 0..dims.len() {
            if p[axis] + 1 < dims[axis] {
                let mut q = p.clone();
                q[axis] += 1;
                g.add_edge(coords_key(p), coords_key(&q));
            }
        }
    }
    g
}

/// Lattice where each cell touches every cell within one step on all axes
///
/// Interior cells of a 2D board get the 8 neighbors of the Moore
/// neighborhood; cells on the border get fewer.
pub fn life_grid(dims: &[usize]) -> AttrGraph {
    let mut g = AttrGraph::new(GraphKind::Undirected);
    let points = lattice(dims);
    add_lattice_nodes(&mut g, &points);
    for p in &points {
        for q in &points {
            let adjacent = p != q
                && p.iter().zip(q).all(|(a, b)| a.abs_diff(*b) <= 1);
            if adjacent {
                g.add_edge(coords_key(p), coords_key(q));
            }
        }
    }
    g
}

/// Multigraph holding `n` parallel copies of every edge of `base`
///
/// Copy `i` gets `data.weight = i`. With `alter`, odd copies keep the base
/// orientation and even copies are reversed.
pub fn multi(base: &AttrGraph, n: usize, alter: bool) -> AttrGraph {
    let kind = if base.kind().is_directed() {
        GraphKind::MultiDirected
    } else {
        GraphKind::MultiUndirected
    };
    let mut g = AttrGraph::new(kind);
    for id in base.node_ids() {
        g.add_node(base.key(id));
    }
    for id in base.edge_ids() {
        let Some((a, b)) = base.endpoints(id) else { continue };
        let (ka, kb) = (base.key(a).to_string(), base.key(b).to_string());
        for i in 0..n {
            let e = if alter && i % 2 == 1 {
                g.add_edge(ka.clone(), kb.clone())
            } else {
                g.add_edge(kb.clone(), ka.clone())
            };
            if let Some(attrs) = g.edge_mut(e) {
                attrs.data.insert("weight".to_string(), Value::from(i as u64));
            }
        }
    }
    g
}
