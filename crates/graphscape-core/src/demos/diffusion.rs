//! Color diffusion across edges
//!
//! Every step pulls the colors at both ends of each edge toward each other.
//! Once the graph has nearly equalized, it is re-seeded with random colors.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::attrs::Rgba;
use crate::graph::AttrGraph;
use crate::transition::StateTransition;

/// Fraction of the color difference moved per edge per step
pub const RATE: f32 = 0.05;
/// Per-node restart threshold for the total color difference
pub const EPS: f32 = 0.18;

pub struct Diffusion {
    rng: ChaCha8Rng,
    pub rate: f32,
    pub eps: f32,
    pub show_labels: bool,
}

impl Diffusion {
    pub fn new(seed: u64, show_labels: bool) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            rate: RATE,
            eps: EPS,
            show_labels,
        }
    }

    fn label(&self, value: f32) -> String {
        if self.show_labels {
            format!("{value:.3}")
        } else {
            String::new()
        }
    }

    /// Give every node a random opaque color and every edge the mean of its ends
    pub fn seed_graph(&mut self, graph: &mut AttrGraph) {
        for id in graph.node_ids() {
            let color = Rgba::new(
                self.rng.gen::<f32>() * 0.8,
                self.rng.gen::<f32>() * 0.8,
                self.rng.gen::<f32>() * 0.8,
                1.0,
            );
            let label = self.label(color.sum() - 1.0);
            if let Some(attrs) = graph.node_mut(id) {
                attrs.color = Some(color);
                attrs.label = Some(label);
            }
        }
        for id in graph.edge_ids() {
            let Some((a, b)) = graph.endpoints(id) else { continue };
            let color = Rgba::mean(node_color(graph, a), node_color(graph, b));
            let label = self.label(color.sum());
            if let Some(attrs) = graph.edge_mut(id) {
                attrs.color = Some(color);
                attrs.label = Some(label);
            }
        }
        info!(
            nodes = graph.node_count(),
            restart_below = self.eps * graph.node_count() as f32,
            "Seeded diffusion"
        );
    }

    /// Restart threshold for the summed absolute color difference
    pub fn restart_threshold(&self, graph: &AttrGraph) -> f32 {
        self.eps * graph.node_count() as f32
    }
}

fn node_color(graph: &AttrGraph, id: crate::graph::NodeId) -> Rgba {
    graph
        .node(id)
        .and_then(|a| a.color)
        .unwrap_or(Rgba::new(0.0, 0.0, 0.0, 1.0))
}

impl StateTransition for Diffusion {
    fn step(&mut self, graph: &mut AttrGraph, tick: u64, elapsed: f32) {
        let mut total_delta = 0.0;
        for id in graph.edge_ids() {
            let Some((a, b)) = graph.endpoints(id) else { continue };
            let c0 = node_color(graph, a).to_array();
            let c1 = node_color(graph, b).to_array();
            let mut n0 = [0.0; 4];
            let mut n1 = [0.0; 4];
            let mut dc_sum = 0.0;
            for i in 0..4 {
                let dc = c0[i] - c1[i];
                total_delta += dc.abs();
                dc_sum += dc;
                n0[i] = c0[i] - dc * self.rate;
                n1[i] = c1[i] + dc * self.rate;
            }
            let (n0, n1) = (Rgba::from(n0), Rgba::from(n1));
            let (l0, l1, le) = (self.label(n0.sum()), self.label(n1.sum()), self.label(dc_sum));
            if let Some(attrs) = graph.node_mut(a) {
                attrs.color = Some(n0);
                attrs.label = Some(l0);
            }
            if let Some(attrs) = graph.node_mut(b) {
                attrs.color = Some(n1);
                attrs.label = Some(l1);
            }
            if let Some(attrs) = graph.edge_mut(id) {
                attrs.color = Some(Rgba::mean(n0, n1));
                attrs.label = Some(le);
            }
        }
        debug!(tick, elapsed, total_delta, "Diffusion step");
        if total_delta < self.restart_threshold(graph) {
            info!("Diffusion settled, restarting");
            self.seed_graph(graph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;
    use crate::graph::GraphKind;

    fn total_color(graph: &AttrGraph) -> f32 {
        graph
            .node_ids()
            .into_iter()
            .map(|id| graph.node(id).unwrap().color.unwrap().sum())
            .sum()
    }

    #[test]
    fn test_seed_colors_are_in_range() {
        let mut g = generators::frucht();
        let mut diffusion = Diffusion::new(3, true);
        diffusion.seed_graph(&mut g);
        for id in g.node_ids() {
            let c = g.node(id).unwrap().color.unwrap();
            assert!(c.r < 0.8 && c.g < 0.8 && c.b < 0.8);
            assert_eq!(c.a, 1.0);
            assert!(!g.node(id).unwrap().label.as_ref().unwrap().is_empty());
        }
    }

    #[test]
    fn test_step_conserves_total_color() {
        let mut g = generators::frucht();
        let mut diffusion = Diffusion::new(3, false);
        diffusion.eps = 0.0;
        diffusion.seed_graph(&mut g);
        let before = total_color(&g);
        diffusion.step(&mut g, 0, 1.0);
        assert!((total_color(&g) - before).abs() < 1e-4);
    }

    #[test]
    fn test_step_pulls_endpoints_together() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        let e = g.add_edge("a", "b");
        let (a, b) = g.endpoints(e).unwrap();
        g.node_mut(a).unwrap().color = Some(Rgba::new(1.0, 0.0, 0.0, 1.0));
        g.node_mut(b).unwrap().color = Some(Rgba::new(0.0, 0.0, 0.0, 1.0));

        let mut diffusion = Diffusion::new(0, true);
        diffusion.eps = 0.0;
        diffusion.step(&mut g, 0, 1.0);

        let ca = g.node(a).unwrap().color.unwrap();
        let cb = g.node(b).unwrap().color.unwrap();
        assert!((ca.r - 0.95).abs() < 1e-6);
        assert!((cb.r - 0.05).abs() < 1e-6);
        assert!((g.edge(e).unwrap().color.unwrap().r - 0.5).abs() < 1e-6);
        assert_eq!(g.edge(e).unwrap().label.as_deref(), Some("1.000"));
    }

    #[test]
    fn test_settled_graph_restarts() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        g.add_edge("a", "b");
        for id in g.node_ids() {
            g.node_mut(id).unwrap().color = Some(Rgba::new(0.5, 0.5, 0.5, 1.0));
        }
        let mut diffusion = Diffusion::new(9, false);
        diffusion.step(&mut g, 0, 1.0);
        let a = g.node_id("a").unwrap();
        assert_ne!(g.node(a).unwrap().color, Some(Rgba::new(0.5, 0.5, 0.5, 1.0)));
    }
}
