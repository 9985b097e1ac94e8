//! Overlay drawn with bevy_egui: help and camera HUD, labels, node details

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use graphscape_core::{AttrGraph, NodeId, Rgba};

use crate::camera::MainCamera;
use crate::geometry::{to_vec3, NODE_RADIUS};
use crate::models::edge_polyline;
use crate::types::{
    ElapsedTime, GraphResource, KeyInput, PointerOverUi, SelectedNode, TransitionDriver,
    ViewerSettings,
};

const HELP_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 255, 0);
const LABEL_FONT_SIZE: f32 = 14.0;

/// Help lines for the active camera rig
pub fn help_lines(mouse: bool) -> &'static [&'static str] {
    if mouse {
        &[
            "MOUSE:",
            "left drag - orbit camera",
            "right drag - pan camera",
            "wheel - zoom in and out",
            "click - select node, esc - clear",
        ]
    } else {
        &[
            "KEYBOARD:",
            "wasd - move camera around",
            "io - zoom in and out",
            "click - select node, esc - clear",
        ]
    }
}

/// Heading, pitch and roll of a camera rotation, in degrees
pub fn heading_pitch_roll(rotation: Quat) -> Vec3 {
    let (heading, pitch, roll) = rotation.to_euler(EulerRot::ZXY);
    Vec3::new(heading.to_degrees(), pitch.to_degrees(), roll.to_degrees())
}

/// Graph statistics shown in verbose mode
///
/// Reads the latest key without consuming it, so a user of
/// [`KeyInput::flush_latest`] still sees it.
pub fn status_lines(graph: &AttrGraph, ticks: u64, key_input: &KeyInput) -> Vec<String> {
    let mut lines = vec![
        format!("nodes: {}  edges: {}", graph.node_count(), graph.edge_count()),
        format!("transitions: {}", ticks),
    ];
    if let Some(key) = key_input.latest {
        lines.push(format!("last key: {:?}", key));
    }
    lines
}

fn to_color32(color: Rgba) -> egui::Color32 {
    let [r, g, b, a] = color.clamped().to_array().map(|v| (v * 255.0).round() as u8);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Grouped system parameters for the overlay system
#[derive(SystemParam)]
pub struct OverlayParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub graph: Res<'w, GraphResource>,
    pub settings: Res<'w, ViewerSettings>,
    pub selected: ResMut<'w, SelectedNode>,
    pub elapsed: Res<'w, ElapsedTime>,
    pub key_input: Res<'w, KeyInput>,
    pub driver: Res<'w, TransitionDriver>,
    pub pointer_over_ui: ResMut<'w, PointerOverUi>,
    pub camera_query: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<MainCamera>>,
}

/// Plugin for the egui overlay
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerOverUi>()
            .add_systems(EguiPrimaryContextPass, overlay_system);
    }
}

fn overlay_system(mut params: OverlayParams) {
    let camera = params.camera_query.single().ok();

    let Ok(ctx) = params.contexts.ctx_mut() else { return };

    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .interactable(false)
        .show(ctx, |ui| {
            for line in help_lines(params.settings.mouse) {
                ui.label(egui::RichText::new(*line).color(HELP_COLOR));
            }
        });

    egui::Area::new(egui::Id::new("camera_info"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .interactable(false)
        .show(ctx, |ui| {
            if let Some((_, transform)) = camera {
                let (_, rotation, translation) = transform.to_scale_rotation_translation();
                let hpr = heading_pitch_roll(rotation);
                ui.label(format!(
                    "camera rotation: H {:.1}° P {:.1}° R {:.1}°",
                    hpr.x, hpr.y, hpr.z
                ));
                ui.label(format!(
                    "camera position: [{:.2}, {:.2}, {:.2}]",
                    translation.x, translation.y, translation.z
                ));
            }
            ui.label(format!("time: {:.1}s", params.elapsed.0));
            if params.settings.verbose {
                ui.separator();
                let ticks = params.driver.clock.ticks();
                for line in status_lines(&params.graph.0, ticks, &params.key_input) {
                    ui.label(line);
                }
            }
        });

    if let Some((camera, transform)) = camera {
        draw_labels(ctx, &params.graph.0, &params.settings, camera, transform);
    }

    if let Some(id) = params.selected.0 {
        let mut open = true;
        egui::Window::new("Node")
            .open(&mut open)
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
            .resizable(false)
            .show(ctx, |ui| render_node_details(ui, &params.graph.0, id));
        if !open {
            params.selected.0 = None;
        }
    }

    params.pointer_over_ui.0 = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}

/// Node and edge labels projected onto the screen
fn draw_labels(
    ctx: &egui::Context,
    graph: &AttrGraph,
    settings: &ViewerSettings,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("graph_labels"),
    ));
    let defaults = &settings.defaults;
    let font = egui::FontId::proportional(LABEL_FONT_SIZE);
    let draw = |world: Vec3, text: &str, color: Rgba| {
        if let Ok(screen) = camera.world_to_viewport(camera_transform, world) {
            painter.text(
                egui::pos2(screen.x, screen.y),
                egui::Align2::CENTER_BOTTOM,
                text,
                font.clone(),
                to_color32(color),
            );
        }
    };

    for id in graph.node_ids() {
        let Some(attrs) = graph.node(id) else { continue };
        let (Some(label), Some(pos)) = (&attrs.label, attrs.pos) else { continue };
        if label.is_empty() {
            continue;
        }
        let lift = attrs.size.unwrap_or(defaults.node_size) * NODE_RADIUS;
        draw(
            to_vec3(pos) + Vec3::Z * lift,
            label,
            attrs.label_color.unwrap_or(defaults.node_label_color),
        );
    }

    for edge in graph.edge_ids() {
        let Some(attrs) = graph.edge(edge) else { continue };
        let Some(label) = attrs.label.as_ref().filter(|l| !l.is_empty()) else { continue };
        let Some(path) = edge_polyline(graph, edge, defaults.node_size) else { continue };
        let anchor = path[path.len() / 2].lerp(path[(path.len() - 1) / 2], 0.5);
        draw(
            anchor,
            label,
            attrs.label_color.unwrap_or(defaults.edge_label_color),
        );
    }
}

fn render_node_details(ui: &mut egui::Ui, graph: &AttrGraph, id: NodeId) {
    let Some(attrs) = graph.node(id) else {
        ui.label("Node no longer exists");
        return;
    };

    ui.heading(graph.key(id));
    if let Some(label) = attrs.label.as_ref().filter(|l| !l.is_empty()) {
        ui.label(format!("Label: {}", label));
    }

    ui.separator();

    if let Some(pos) = attrs.pos {
        ui.label(format!("Position: [{:.3}, {:.3}, {:.3}]", pos[0], pos[1], pos[2]));
    }
    if let Some(color) = attrs.color {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Color: [{:.2}, {:.2}, {:.2}, {:.2}]",
                color.r, color.g, color.b, color.a
            ));
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, to_color32(color));
        });
    }
    if let Some(size) = attrs.size {
        ui.label(format!("Size: {:.2}", size));
    }
    ui.label(format!("Degree: {}", graph.degree(id)));

    if !attrs.data.is_empty() {
        ui.collapsing("Data", |ui| {
            for (key, value) in &attrs.data {
                ui.horizontal(|ui| {
                    ui.label(key);
                    ui.label(
                        egui::RichText::new(value.to_string())
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lines_follow_camera_mode() {
        assert!(help_lines(false).contains(&"wasd - move camera around"));
        assert!(help_lines(true)[0].starts_with("MOUSE"));
    }

    #[test]
    fn test_heading_of_turned_camera() {
        let hpr = heading_pitch_roll(Quat::from_rotation_z(30f32.to_radians()));
        assert!((hpr.x - 30.0).abs() < 1e-3);
        assert!(hpr.y.abs() < 1e-3 && hpr.z.abs() < 1e-3);
    }

    #[test]
    fn test_status_lines_leave_latest_key() {
        let mut graph = AttrGraph::new(graphscape_core::GraphKind::Undirected);
        graph.add_edge("a", "b");
        let mut key_input = KeyInput {
            handler: None,
            latest: Some('u'),
        };

        let lines = status_lines(&graph, 3, &key_input);
        assert_eq!(lines[0], "nodes: 2  edges: 1");
        assert_eq!(lines[1], "transitions: 3");
        assert_eq!(lines[2], "last key: 'u'");
        assert_eq!(key_input.flush_latest(), Some('u'));
        assert_eq!(status_lines(&graph, 3, &key_input).len(), 2);
    }

    #[test]
    fn test_label_colors_are_clamped() {
        let c = to_color32(Rgba::new(2.0, -1.0, 0.5, 1.0));
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(255, 0, 128, 255));
    }
}
