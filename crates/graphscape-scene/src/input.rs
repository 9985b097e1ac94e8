//! Keyboard dispatch to the user key handler and node selection

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use graphscape_core::NodeId;

use crate::camera::{MainCamera, MouseOrbit};
use crate::geometry::NODE_RADIUS;
use crate::models::{GraphNodeEntity, GraphSet};
use crate::types::{GraphResource, KeyInput, PointerOverUi, SelectedNode};

/// Plugin for keyboard and pointer input
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectedNode>().add_systems(
            Update,
            (dispatch_keys, select_node, clear_selection).in_set(GraphSet::Input),
        );
    }
}

/// Character for a key, if it is a letter, digit or space
pub fn key_to_char(code: KeyCode) -> Option<char> {
    let c = match code {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        KeyCode::Space => ' ',
        _ => return None,
    };
    Some(c)
}

/// Send newly pressed keys to the key handler
fn dispatch_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut key_input: ResMut<KeyInput>,
    mut graph: ResMut<GraphResource>,
) {
    let input = &mut *key_input;
    for code in keyboard.get_just_pressed() {
        let Some(key) = key_to_char(*code) else {
            continue;
        };
        input.latest = Some(key);
        if let Some(handler) = input.handler.as_mut() {
            handler.on_key(&mut graph.0, key);
            tracing::debug!(key = %key, "Dispatched key to handler");
        }
    }
}

/// Closest sphere hit by a ray
///
/// Each candidate is `(id, center, radius)`. Spheres behind the ray origin
/// are ignored.
pub fn pick_closest(
    origin: Vec3,
    direction: Vec3,
    spheres: impl IntoIterator<Item = (NodeId, Vec3, f32)>,
) -> Option<NodeId> {
    let direction = direction.normalize_or_zero();
    let mut closest: Option<(f32, NodeId)> = None;
    for (id, center, radius) in spheres {
        let t = (center - origin).dot(direction);
        if t < 0.0 {
            continue;
        }
        let closest_point = origin + direction * t;
        if (closest_point - center).length_squared() > radius * radius {
            continue;
        }
        if closest.is_none_or(|(best, _)| t < best) {
            closest = Some((t, id));
        }
    }
    closest.map(|(_, id)| id)
}

/// Select the node under the cursor on left click
fn select_node(
    mut selected: ResMut<SelectedNode>,
    mouse_orbit: Option<ResMut<MouseOrbit>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    node_query: Query<(&GraphNodeEntity, &GlobalTransform, &Visibility)>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    pointer_over_ui: Res<PointerOverUi>,
) {
    if pointer_over_ui.0 || !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_pos) else {
        return;
    };

    let spheres = node_query
        .iter()
        .filter(|(_, _, visibility)| **visibility != Visibility::Hidden)
        .map(|(node, transform, _)| {
            (node.id, transform.translation(), transform.scale().x * NODE_RADIUS)
        });
    let Some(id) = pick_closest(ray.origin, *ray.direction, spheres) else {
        return;
    };

    selected.0 = Some(id);
    tracing::debug!(node = id.index(), "Selected node");
    if let Some(mut orbit) = mouse_orbit {
        if let Some((_, transform, _)) = node_query.iter().find(|(n, _, _)| n.id == id) {
            orbit.center_on(transform.translation());
        }
    }
}

/// Escape clears the selection
fn clear_selection(mut selected: ResMut<SelectedNode>, keyboard: Res<ButtonInput<KeyCode>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        selected.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_char() {
        assert_eq!(key_to_char(KeyCode::KeyU), Some('u'));
        assert_eq!(key_to_char(KeyCode::Digit7), Some('7'));
        assert_eq!(key_to_char(KeyCode::Numpad3), Some('3'));
        assert_eq!(key_to_char(KeyCode::Space), Some(' '));
        assert_eq!(key_to_char(KeyCode::Escape), None);
        assert_eq!(key_to_char(KeyCode::ShiftLeft), None);
    }

    #[test]
    fn test_pick_closest_prefers_nearest_hit() {
        let near = NodeId::new(0);
        let far = NodeId::new(1);
        let off_ray = NodeId::new(2);
        let spheres = vec![
            (far, Vec3::new(0.0, 10.0, 0.0), 0.5),
            (near, Vec3::new(0.1, 5.0, 0.0), 0.5),
            (off_ray, Vec3::new(3.0, 2.0, 0.0), 0.5),
        ];
        assert_eq!(pick_closest(Vec3::ZERO, Vec3::Y, spheres), Some(near));
    }

    #[test]
    fn test_pick_ignores_spheres_behind_and_misses() {
        let behind = vec![(NodeId::new(0), Vec3::new(0.0, -5.0, 0.0), 1.0)];
        assert_eq!(pick_closest(Vec3::ZERO, Vec3::Y, behind), None);

        let aside = vec![(NodeId::new(0), Vec3::new(2.0, 5.0, 0.0), 1.0)];
        assert_eq!(pick_closest(Vec3::ZERO, Vec3::Y, aside), None);
    }
}
