//! Conway's Game of Life on arbitrary graphs
//!
//! A live node survives with 2 or 3 live neighbors, a dead node comes alive
//! with exactly 3, every other node is dead on the next step. On a
//! [`generators::life_grid`] board interior cells have 8 neighbors, which
//! gives the classic rules.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::attrs::Rgba;
use crate::generators::{self, COORDS_KEY};
use crate::graph::{AttrGraph, NodeId};
use crate::layout::{spring_layout, LayoutOptions};
use crate::transition::StateTransition;

pub const COLOR_DEAD: Rgba = Rgba::new(0.2, 0.2, 0.2, 1.0);
pub const COLOR_LIVE: Rgba = Rgba::new(0.8, 0.8, 0.8, 1.0);

const VAL: &str = "val";
const LAST_VAL: &str = "last_val";

pub struct GameOfLife {
    rng: ChaCha8Rng,
}

impl GameOfLife {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The default 16 x 16 board
    pub fn board() -> AttrGraph {
        generators::life_grid(&[16, 16])
    }

    /// Clear the board and bring `live` random cells to life
    ///
    /// `None` picks `ln(n) + 1` cells.
    pub fn reset(&mut self, graph: &mut AttrGraph, live: Option<usize>) {
        place_nodes(graph);
        for id in graph.node_ids() {
            if let Some(attrs) = graph.node_mut(id) {
                attrs.set_data(VAL, 0);
                attrs.set_data(LAST_VAL, 0);
            }
        }
        let n = graph.node_count();
        let live = live.unwrap_or_else(|| (n.max(1) as f64).ln() as usize + 1);
        let ids = graph.node_ids();
        for id in ids.choose_multiple(&mut self.rng, live.min(n)) {
            if let Some(attrs) = graph.node_mut(*id) {
                attrs.set_data(VAL, 1);
            }
        }
        update_colors(graph);
        info!(nodes = n, live, "Reset Game of Life board");
    }
}

/// Nodes without a position get one from their lattice coordinates, or from
/// a spring layout when they have none
fn place_nodes(graph: &mut AttrGraph) {
    let mut layout: Option<HashMap<NodeId, crate::attrs::Position>> = None;
    for id in graph.node_ids() {
        let Some(attrs) = graph.node(id) else { continue };
        if attrs.pos.is_some() {
            continue;
        }
        let coords: Option<Vec<f64>> = attrs
            .data
            .get(COORDS_KEY)
            .and_then(Value::as_array)
            .map(|c| c.iter().filter_map(Value::as_f64).collect());
        let pos = match coords.as_deref() {
            Some([x]) => [*x, 0.0, 0.0],
            Some([x, y]) => [*x, *y, 0.0],
            Some([x, y, z, ..]) => [*x, *y, *z],
            _ => {
                let layout = layout
                    .get_or_insert_with(|| spring_layout(graph, &LayoutOptions::default()));
                layout.get(&id).copied().unwrap_or([0.0; 3])
            }
        };
        if let Some(attrs) = graph.node_mut(id) {
            attrs.pos = Some(pos);
        }
    }
}

fn update_colors(graph: &mut AttrGraph) {
    for id in graph.node_ids() {
        if let Some(attrs) = graph.node_mut(id) {
            attrs.color = Some(if attrs.data_i64(VAL) != 0 {
                COLOR_LIVE
            } else {
                COLOR_DEAD
            });
        }
    }
}

fn is_alive(graph: &AttrGraph, id: NodeId) -> bool {
    graph.node(id).is_some_and(|a| a.data_i64(VAL) != 0)
}

impl StateTransition for GameOfLife {
    fn step(&mut self, graph: &mut AttrGraph, tick: u64, _elapsed: f32) {
        let stalled = graph.node_ids().into_iter().all(|id| {
            graph
                .node(id)
                .is_some_and(|a| a.data_i64(VAL) == a.data_i64(LAST_VAL))
        });
        if stalled {
            let live = graph.node_count() / 4;
            self.reset(graph, Some(live));
        }
        for id in graph.node_ids() {
            if let Some(attrs) = graph.node_mut(id) {
                let val = attrs.data_i64(VAL);
                attrs.set_data(LAST_VAL, val);
            }
        }

        let next: Vec<(NodeId, i64)> = graph
            .node_ids()
            .into_iter()
            .map(|id| {
                let live_neighbors = graph
                    .neighbors(id)
                    .into_iter()
                    .filter(|n| is_alive(graph, *n))
                    .count();
                let alive = live_neighbors == 3 || (is_alive(graph, id) && live_neighbors == 2);
                (id, alive as i64)
            })
            .collect();
        let population = next.iter().filter(|(_, v)| *v != 0).count();
        for (id, val) in next {
            if let Some(attrs) = graph.node_mut(id) {
                attrs.set_data(VAL, val);
            }
        }
        update_colors(graph);
        debug!(tick, population, "Game of Life step");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleared_board() -> (AttrGraph, GameOfLife) {
        let mut game = GameOfLife::new(5);
        let mut g = GameOfLife::board();
        game.reset(&mut g, Some(0));
        (g.relabel_to_integers(), game)
    }

    fn set_alive(g: &mut AttrGraph, id: NodeId) {
        g.node_mut(id).unwrap().set_data(VAL, 1);
    }

    fn busiest(g: &AttrGraph) -> NodeId {
        g.node_ids()
            .into_iter()
            .max_by_key(|id| g.neighbors(*id).len())
            .unwrap()
    }

    #[test]
    fn test_board_positions_follow_coordinates() {
        let (g, _) = cleared_board();
        assert!(g.node_ids().iter().all(|id| g.key(*id).parse::<usize>().is_ok()));
        let first = g.node_ids()[0];
        assert_eq!(g.node(first).unwrap().pos, Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_lone_node_dies() {
        let (mut g, mut game) = cleared_board();
        let first = g.node_ids()[0];
        set_alive(&mut g, first);
        game.step(&mut g, 0, 0.0);
        for id in g.node_ids() {
            assert!(!is_alive(&g, id), "lone node should die");
        }
    }

    #[test]
    fn test_node_with_two_or_three_live_neighbors_survives() {
        for live_neighbors in [2, 3] {
            let (mut g, mut game) = cleared_board();
            let center = busiest(&g);
            set_alive(&mut g, center);
            for n in g.neighbors(center).into_iter().take(live_neighbors) {
                set_alive(&mut g, n);
            }
            game.step(&mut g, 0, 0.0);
            assert!(
                is_alive(&g, center),
                "node with {live_neighbors} live neighbors should survive"
            );
            assert_eq!(g.node(center).unwrap().color, Some(COLOR_LIVE));
        }
    }

    #[test]
    fn test_dead_node_with_three_live_neighbors_is_born() {
        let (mut g, mut game) = cleared_board();
        let center = busiest(&g);
        for n in g.neighbors(center).into_iter().take(3) {
            set_alive(&mut g, n);
        }
        game.step(&mut g, 0, 0.0);
        assert!(is_alive(&g, center));
    }

    #[test]
    fn test_stalled_board_is_reseeded() {
        let (mut g, mut game) = cleared_board();
        game.step(&mut g, 0, 0.0);
        let live_or_last = g.node_ids().into_iter().any(|id| {
            let a = g.node(id).unwrap();
            a.data_i64(VAL) != 0 || a.data_i64(LAST_VAL) != 0
        });
        assert!(live_or_last, "an empty board should be reseeded");
    }
}
