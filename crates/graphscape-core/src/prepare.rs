//! Attribute preparation before the first frame
//!
//! Fills every render attribute the caller left unset so that the scene can
//! mirror the graph directly. Attributes already present on the graph win
//! over the options given here.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::attrs::Position;
use crate::config::Defaults;
use crate::error::GraphError;
use crate::graph::{AttrGraph, EdgeId, NodeId};
use crate::layout::{spring_layout, LayoutOptions};

/// Node count above which the layout is reported as slow
const LARGE_GRAPH: usize = 256;

/// Per-plot options supplied alongside the graph
#[derive(Debug, Clone, Default)]
pub struct PlotOptions {
    /// Explicit node positions keyed by node key
    pub pos: Option<HashMap<String, Position>>,
    pub node_labels: HashMap<String, String>,
    pub edge_labels: HashMap<EdgeId, String>,
    /// Label nodes with their keys and edges with `(a, b)`
    pub autolabel: bool,
    pub plot_axes: bool,
    /// Drive the camera with the mouse instead of the keyboard
    pub mouse: bool,
    pub verbose: bool,
    pub layout: LayoutOptions,
}

impl PlotOptions {
    /// Debug mode flips the verbose, axes, autolabel, and mouse switches
    pub fn toggle_debug(&mut self) {
        self.verbose = !self.verbose;
        self.plot_axes = !self.plot_axes;
        self.autolabel = !self.autolabel;
        self.mouse = !self.mouse;
    }
}

/// Summary of a prepared graph used to frame the camera
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGraph {
    pub center: Position,
    /// Radius of the sphere around `center` holding every node
    pub radius: f64,
    pub initial_pos: HashMap<NodeId, Position>,
}

/// Fill unset attributes in place and report the graph's extent
pub fn prepare(
    graph: &mut AttrGraph,
    options: &PlotOptions,
    defaults: &Defaults,
) -> Result<PreparedGraph, GraphError> {
    let (node_labels, edge_labels) = labels(graph, options);
    let positions = positions(graph, options)?;

    for id in graph.node_ids() {
        let key = graph.key(id).to_string();
        let Some(attrs) = graph.node_mut(id) else { continue };
        if attrs.pos.is_none() {
            attrs.pos = positions.get(&id).copied();
        }
        match attrs.pos {
            Some(p) if p.iter().all(|c| c.is_finite()) => {}
            Some(_) => return Err(GraphError::NonFinitePosition { node: key }),
            None => return Err(GraphError::MissingPosition { node: key }),
        }
        attrs.color.get_or_insert(defaults.node_color);
        attrs.size.get_or_insert(defaults.node_size);
        attrs.label_color.get_or_insert(defaults.node_label_color);
        if attrs.label.is_none() {
            attrs.label = Some(node_labels.get(&key).cloned().unwrap_or_default());
        }
        if attrs.color.is_some_and(|c| !c.is_finite()) {
            return Err(GraphError::InvalidColor { element: key });
        }
    }

    for id in graph.edge_ids() {
        let key = graph.edge_key(id);
        let Some(attrs) = graph.edge_mut(id) else { continue };
        attrs.color.get_or_insert(defaults.edge_color);
        attrs.label_color.get_or_insert(defaults.edge_label_color);
        if attrs.label.is_none() {
            attrs.label = Some(edge_labels.get(&id).cloned().unwrap_or_default());
        }
        if attrs.color.is_some_and(|c| !c.is_finite()) {
            return Err(GraphError::InvalidColor { element: key });
        }
    }

    let initial_pos: HashMap<NodeId, Position> = graph
        .node_ids()
        .into_iter()
        .filter_map(|id| graph.node(id).and_then(|a| a.pos).map(|p| (id, p)))
        .collect();
    let (center, radius) = bounds(initial_pos.values());
    debug!(?center, radius, "Prepared graph");

    Ok(PreparedGraph {
        center,
        radius,
        initial_pos,
    })
}

fn labels(
    graph: &AttrGraph,
    options: &PlotOptions,
) -> (HashMap<String, String>, HashMap<EdgeId, String>) {
    if !options.autolabel {
        return (options.node_labels.clone(), options.edge_labels.clone());
    }
    if !options.node_labels.is_empty() || !options.edge_labels.is_empty() {
        warn!("Overwriting labels, disable autolabel if undesired");
    }
    let nodes = graph
        .node_ids()
        .into_iter()
        .map(|id| (graph.key(id).to_string(), graph.key(id).to_string()))
        .collect();
    let edges = graph
        .edge_ids()
        .into_iter()
        .map(|id| (id, graph.edge_key(id)))
        .collect();
    (nodes, edges)
}

fn positions(
    graph: &AttrGraph,
    options: &PlotOptions,
) -> Result<HashMap<NodeId, Position>, GraphError> {
    if let Some(explicit) = &options.pos {
        let mut out = HashMap::new();
        for (key, p) in explicit {
            match graph.node_id(key) {
                Ok(id) => {
                    out.insert(id, *p);
                }
                Err(_) => debug!(node = %key, "Ignoring position of a node not in the graph"),
            }
        }
        return Ok(out);
    }

    let ids = graph.node_ids();
    let all_placed = ids
        .iter()
        .all(|id| graph.node(*id).is_some_and(|a| a.pos.is_some()));
    if all_placed {
        return Ok(HashMap::new());
    }

    info!(nodes = ids.len(), "Creating spring layout");
    if ids.len() > LARGE_GRAPH {
        info!("This may take a while for large graphs");
    }
    Ok(spring_layout(graph, &options.layout))
}

fn bounds<'a>(positions: impl Iterator<Item = &'a Position> + Clone) -> (Position, f64) {
    let mut count = 0.0;
    let mut center = [0.0; 3];
    for p in positions.clone() {
        count += 1.0;
        for axis in 0..3 {
            center[axis] += p[axis];
        }
    }
    if count == 0.0 {
        return ([0.0; 3], 0.0);
    }
    for c in center.iter_mut() {
        *c /= count;
    }
    let radius = positions
        .map(|p| {
            let d: f64 = (0..3).map(|axis| (p[axis] - center[axis]).powi(2)).sum();
            d.sqrt()
        })
        .fold(0.0, f64::max);
    (center, radius)
}
