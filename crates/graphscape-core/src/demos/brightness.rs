//! Keyboard-driven node brightness

use crate::graph::AttrGraph;
use crate::transition::KeyHandler;

/// Brightens node colors on `u` and dims them on `y`
#[derive(Debug, Clone)]
pub struct Brightness {
    pub brighten: char,
    pub dim: char,
    pub brighten_factor: f32,
    pub dim_factor: f32,
}

impl Default for Brightness {
    fn default() -> Self {
        Self {
            brighten: 'u',
            dim: 'y',
            brighten_factor: 1.1,
            dim_factor: 0.9,
        }
    }
}

impl KeyHandler for Brightness {
    fn on_key(&mut self, graph: &mut AttrGraph, key: char) {
        let factor = if key == self.brighten {
            self.brighten_factor
        } else if key == self.dim {
            self.dim_factor
        } else {
            return;
        };
        for id in graph.node_ids() {
            if let Some(attrs) = graph.node_mut(id) {
                attrs.color = attrs.color.map(|c| c.scaled(factor));
            }
        }
        tracing::debug!(key = %key, factor, "Scaled node colors");
    }
}
