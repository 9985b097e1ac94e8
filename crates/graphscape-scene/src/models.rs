//! Node and edge entities, the state transition, and per-frame sync
//!
//! Every node is a sphere and every edge a chain of cylinder segments with an
//! optional arrowhead. Each element owns its material so colors can change
//! independently. The entities are spawned once; after that the graph
//! resource is the source of truth and is copied onto them every frame.

use std::collections::HashMap;

use bevy::prelude::*;
use graphscape_core::{AttrGraph, EdgeId, NodeId, Rgba};

use crate::geometry::{
    arrow_transform, edge_path, segment_points, segment_transform, to_color, to_vec3,
    ARROW_HEIGHT, ARROW_RADIUS, CURVE_SEGMENTS, EDGE_RADIUS, NODE_RADIUS,
};
use crate::types::{ElapsedTime, GraphResource, TransitionDriver, ViewerSettings};

/// Ordering of the per-frame graph systems
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphSet {
    /// Keyboard and pointer input reaching user code
    Input,
    /// State transition
    Transition,
    /// Copy attributes onto entities
    Sync,
}

/// Sphere entity for a graph node
#[derive(Component)]
pub struct GraphNodeEntity {
    pub id: NodeId,
}

/// One cylinder of an edge's polyline
#[derive(Component)]
pub struct EdgeSegment {
    pub edge: EdgeId,
    pub ordinal: usize,
    pub of: usize,
}

/// Arrowhead cone of a directed edge
#[derive(Component)]
pub struct EdgeArrow {
    pub edge: EdgeId,
}

/// Material shared by the segments and arrowhead of each edge
#[derive(Resource, Default)]
pub struct EdgeMaterials(pub HashMap<EdgeId, Handle<StandardMaterial>>);

/// Plugin for graph entities
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (GraphSet::Input, GraphSet::Transition, GraphSet::Sync).chain(),
        )
        .init_resource::<EdgeMaterials>()
        .init_resource::<ElapsedTime>()
        .add_systems(Startup, spawn_graph)
        .add_systems(
            Update,
            (
                (advance_elapsed, run_transition).in_set(GraphSet::Transition),
                (sync_nodes, sync_edges).in_set(GraphSet::Sync),
            ),
        );
    }
}

/// Number of cylinders used for an edge
pub fn segments_for(graph: &AttrGraph, edge: EdgeId) -> usize {
    let Some((a, b)) = graph.endpoints(edge) else {
        return 1;
    };
    if a == b || graph.parallel_slot(edge).1 > 1 {
        CURVE_SEGMENTS
    } else {
        1
    }
}

fn node_radius(graph: &AttrGraph, id: NodeId, default_size: f32) -> f32 {
    graph
        .node(id)
        .map(|n| n.size.unwrap_or(default_size))
        .unwrap_or(default_size)
        .max(0.0)
        * NODE_RADIUS
}

/// Polyline for an edge, or `None` if either endpoint has no position
///
/// Paths are built from the lower node index to the higher one so that
/// opposite arcs between the same pair bend through distinct planes.
pub fn edge_polyline(graph: &AttrGraph, edge: EdgeId, default_size: f32) -> Option<Vec<Vec3>> {
    let (a, b) = graph.endpoints(edge)?;
    let pa = to_vec3(graph.node(a)?.pos?);
    let pb = to_vec3(graph.node(b)?.pos?);
    let (slot, count) = graph.parallel_slot(edge);
    let radius = node_radius(graph, a, default_size);
    if a <= b {
        Some(edge_path(pa, pb, slot, count, radius))
    } else {
        let mut path = edge_path(pb, pa, slot, count, radius);
        path.reverse();
        Some(path)
    }
}

fn element_material(color: Rgba) -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(color),
        alpha_mode: alpha_mode_for(color),
        ..default()
    }
}

fn alpha_mode_for(color: Rgba) -> AlphaMode {
    if color.clamped().a < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

/// Write a color into a material, touching the asset only when it changed
fn apply_color(
    materials: &mut Assets<StandardMaterial>,
    handle: &Handle<StandardMaterial>,
    color: Rgba,
) {
    let target = to_color(color);
    let unchanged = materials
        .get(handle)
        .is_some_and(|m| m.base_color == target);
    if unchanged {
        return;
    }
    if let Some(material) = materials.get_mut(handle) {
        material.base_color = target;
        material.alpha_mode = alpha_mode_for(color);
    }
}

fn spawn_graph(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut edge_materials: ResMut<EdgeMaterials>,
    graph: Res<GraphResource>,
    settings: Res<ViewerSettings>,
) {
    let graph = &graph.0;
    let defaults = &settings.defaults;

    let sphere = meshes.add(Sphere::new(NODE_RADIUS));
    let cylinder = meshes.add(Cylinder::new(EDGE_RADIUS, 1.0));
    let cone = meshes.add(Cone::new(ARROW_RADIUS, ARROW_HEIGHT));

    for id in graph.node_ids() {
        let Some(attrs) = graph.node(id) else {
            continue;
        };
        let translation = attrs.pos.map(to_vec3).unwrap_or(Vec3::ZERO);
        let size = attrs.size.unwrap_or(defaults.node_size);
        let material = materials.add(element_material(attrs.color.unwrap_or(defaults.node_color)));
        commands.spawn((
            Mesh3d(sphere.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(translation).with_scale(Vec3::splat(size)),
            GraphNodeEntity { id },
        ));
    }

    let directed = graph.kind().is_directed();
    for edge in graph.edge_ids() {
        let Some(attrs) = graph.edge(edge) else {
            continue;
        };
        let material = materials.add(element_material(attrs.color.unwrap_or(defaults.edge_color)));
        edge_materials.0.insert(edge, material.clone());

        let of = segments_for(graph, edge);
        let path = edge_polyline(graph, edge, defaults.node_size).unwrap_or_default();
        let pieces = segment_points(&path, of);
        for ordinal in 0..of {
            let transform = pieces
                .get(ordinal)
                .map(|(a, b)| segment_transform(*a, *b))
                .unwrap_or_else(|| Transform::from_scale(Vec3::ZERO));
            commands.spawn((
                Mesh3d(cylinder.clone()),
                MeshMaterial3d(material.clone()),
                transform,
                EdgeSegment { edge, ordinal, of },
            ));
        }

        if directed {
            commands.spawn((
                Mesh3d(cone.clone()),
                MeshMaterial3d(material),
                Transform::from_scale(Vec3::ZERO),
                EdgeArrow { edge },
            ));
        }
    }

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        directed,
        "Spawned graph entities"
    );
}

fn advance_elapsed(mut elapsed: ResMut<ElapsedTime>, time: Res<Time>) {
    elapsed.0 += time.delta_secs();
}

/// Apply the user transition whenever the clock says it is due
fn run_transition(
    mut driver: ResMut<TransitionDriver>,
    mut graph: ResMut<GraphResource>,
    time: Res<Time>,
) {
    let driver = &mut *driver;
    let Some(transition) = driver.transition.as_mut() else {
        return;
    };
    if let Some((tick, elapsed)) = driver.clock.advance(time.delta_secs()) {
        transition.step(&mut graph.0, tick, elapsed);
        tracing::trace!(tick, elapsed, "Applied state transition");
    }
}

fn sync_nodes(
    graph: Res<GraphResource>,
    settings: Res<ViewerSettings>,
    mut nodes: Query<(
        &GraphNodeEntity,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let defaults = &settings.defaults;
    for (node, mut transform, mut visibility, material) in nodes.iter_mut() {
        let Some(attrs) = graph.0.node(node.id) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let Some(pos) = attrs.pos else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;
        transform.translation = to_vec3(pos);
        transform.scale = Vec3::splat(attrs.size.unwrap_or(defaults.node_size).max(0.0));
        apply_color(
            &mut materials,
            &material.0,
            attrs.color.unwrap_or(defaults.node_color),
        );
    }
}

fn sync_edges(
    graph: Res<GraphResource>,
    settings: Res<ViewerSettings>,
    edge_materials: Res<EdgeMaterials>,
    mut segments: Query<(&EdgeSegment, &mut Transform, &mut Visibility), Without<EdgeArrow>>,
    mut arrows: Query<(&EdgeArrow, &mut Transform, &mut Visibility), Without<EdgeSegment>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let graph = &graph.0;
    let defaults = &settings.defaults;

    let paths: HashMap<EdgeId, Vec<Vec3>> = graph
        .edge_ids()
        .into_iter()
        .filter_map(|e| edge_polyline(graph, e, defaults.node_size).map(|p| (e, p)))
        .collect();

    for (segment, mut transform, mut visibility) in segments.iter_mut() {
        let piece = paths
            .get(&segment.edge)
            .and_then(|path| segment_points(path, segment.of).get(segment.ordinal).copied());
        match piece {
            Some((a, b)) => {
                *transform = segment_transform(a, b);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for (arrow, mut transform, mut visibility) in arrows.iter_mut() {
        let target = graph.endpoints(arrow.edge).map(|(_, b)| b);
        match (paths.get(&arrow.edge), target) {
            (Some(path), Some(target)) => {
                *transform = arrow_transform(path, node_radius(graph, target, defaults.node_size));
                *visibility = Visibility::Inherited;
            }
            _ => *visibility = Visibility::Hidden,
        }
    }

    for (edge, handle) in edge_materials.0.iter() {
        if let Some(attrs) = graph.edge(*edge) {
            apply_color(&mut materials, handle, attrs.color.unwrap_or(defaults.edge_color));
        }
    }
}
