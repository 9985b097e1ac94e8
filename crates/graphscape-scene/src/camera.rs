//! Camera rigs: keyboard orbit and mouse orbit navigation
//!
//! Both rigs circle a focus point with Z up. The keyboard rig moves at fixed
//! angular and radial speeds while keys are held; the mouse rig follows drags
//! and the scroll wheel with smoothing.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use graphscape_core::config::CameraConfig;

use crate::geometry::{framing_radius, to_vec3};
use crate::types::{PointerOverUi, ViewerSettings};

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Elevation limit in degrees; looking straight down the up axis is undefined
const MAX_PHI: f32 = 89.0;

/// Which keyboard controls are held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrbitKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

impl OrbitKeys {
    pub fn from_input(keyboard: &ButtonInput<KeyCode>) -> Self {
        Self {
            left: keyboard.pressed(KeyCode::KeyA),
            right: keyboard.pressed(KeyCode::KeyD),
            up: keyboard.pressed(KeyCode::KeyW),
            down: keyboard.pressed(KeyCode::KeyS),
            zoom_in: keyboard.pressed(KeyCode::KeyI),
            zoom_out: keyboard.pressed(KeyCode::KeyO),
        }
    }
}

/// Keyboard orbit state; angles are in degrees
#[derive(Debug, Clone, Resource)]
pub struct KeyboardOrbit {
    pub radius: f32,
    /// Heading around the up axis
    pub theta: f32,
    /// Elevation above the ground plane
    pub phi: f32,
    pub focus: Vec3,
}

impl KeyboardOrbit {
    pub fn new(radius: f32, focus: Vec3) -> Self {
        Self {
            radius,
            theta: 0.0,
            phi: 0.0,
            focus,
        }
    }

    pub fn update(&mut self, keys: OrbitKeys, dt: f32, config: &CameraConfig) {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        self.theta += axis(keys.left, keys.right) * config.speed_theta * dt;
        self.phi = (self.phi + axis(keys.up, keys.down) * config.speed_phi * dt)
            .clamp(-MAX_PHI, MAX_PHI);
        self.radius = (self.radius + axis(keys.zoom_out, keys.zoom_in) * config.speed_radius * dt)
            .max(config.min_radius);
    }

    /// Camera position; heading 0 looks along +Y from the -Y side
    pub fn eye(&self) -> Vec3 {
        let (theta, phi) = (self.theta.to_radians(), self.phi.to_radians());
        self.focus
            + Vec3::new(
                self.radius * theta.sin() * phi.cos(),
                -self.radius * theta.cos() * phi.cos(),
                self.radius * phi.sin(),
            )
    }
}

/// Mouse orbit state, smoothed toward the drag and scroll targets
#[derive(Debug, Clone, Resource)]
pub struct MouseOrbit {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl MouseOrbit {
    pub fn new(distance: f32, focus: Vec3, min_distance: f32) -> Self {
        Self {
            distance,
            target_distance: distance,
            azimuth: -std::f32::consts::FRAC_PI_2,
            elevation: 0.3,
            target: focus,
            target_focus: focus,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            min_distance,
            max_distance: distance * 10.0,
        }
    }

    pub fn orbit(&mut self, motion: Vec2) {
        self.azimuth -= motion.x * self.sensitivity;
        self.elevation = (self.elevation + motion.y * self.sensitivity).clamp(-1.5, 1.5);
    }

    /// Pan in the camera's vertical plane
    pub fn pan(&mut self, motion: Vec2) {
        let right = Vec3::new(self.azimuth.sin(), -self.azimuth.cos(), 0.0);
        let pan_speed = self.distance * 0.002;
        self.target_focus += right * motion.x * pan_speed;
        self.target_focus += Vec3::Z * motion.y * pan_speed;
    }

    pub fn zoom(&mut self, scroll: f32) {
        let zoom_factor = 1.0 - scroll * self.zoom_speed;
        self.target_distance =
            (self.target_distance * zoom_factor).clamp(self.min_distance, self.max_distance);
    }

    /// Ease distance and focus toward their targets
    pub fn smooth(&mut self, dt: f32) {
        let lerp_factor = 1.0 - (-self.smooth_factor * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * lerp_factor;
        self.target += (self.target_focus - self.target) * lerp_factor;
    }

    pub fn eye(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.azimuth.cos() * self.elevation.cos(),
                self.distance * self.azimuth.sin() * self.elevation.cos(),
                self.distance * self.elevation.sin(),
            )
    }

    pub fn center_on(&mut self, point: Vec3) {
        self.target_focus = point;
    }
}

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_camera_rigs).add_systems(
            Update,
            (
                keyboard_camera.run_if(keyboard_mode),
                mouse_camera.run_if(mouse_mode),
            ),
        );
    }
}

fn keyboard_mode(settings: Res<ViewerSettings>) -> bool {
    !settings.mouse
}

fn mouse_mode(settings: Res<ViewerSettings>) -> bool {
    settings.mouse
}

/// Place both rigs so the whole graph is in view
fn init_camera_rigs(mut commands: Commands, settings: Res<ViewerSettings>) {
    let center = to_vec3(settings.prepared.center);
    let radius = framing_radius(
        center,
        settings.prepared.radius as f32,
        settings.camera.fov_degrees.to_radians(),
    );
    tracing::debug!(radius, "Initial camera radius");
    commands.insert_resource(KeyboardOrbit::new(radius, Vec3::ZERO));
    commands.insert_resource(MouseOrbit::new(radius, center, settings.camera.min_radius));
}

fn keyboard_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<KeyboardOrbit>,
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<ViewerSettings>,
    time: Res<Time>,
) {
    let keys = OrbitKeys::from_input(&keyboard);
    orbit.update(keys, time.delta_secs(), &settings.camera);

    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };
    transform.translation = orbit.eye();
    transform.look_at(orbit.focus, Vec3::Z);
}

fn mouse_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<MouseOrbit>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    pointer_over_ui: Res<PointerOverUi>,
    time: Res<Time>,
) {
    if !pointer_over_ui.0 {
        let motion = mouse_motion.delta;
        if mouse_button.pressed(MouseButton::Left) {
            orbit.orbit(motion);
        }
        if mouse_button.pressed(MouseButton::Right) {
            orbit.pan(motion);
        }
        let scroll = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / 100.0,
        };
        if scroll != 0.0 {
            orbit.zoom(scroll);
        }
    }

    orbit.smooth(time.delta_secs());

    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };
    transform.translation = orbit.eye();
    transform.look_at(orbit.target, Vec3::Z);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_orbit_keeps_radius() {
        let config = CameraConfig::default();
        let mut orbit = KeyboardOrbit::new(10.0, Vec3::ZERO);
        let keys = OrbitKeys {
            left: true,
            up: true,
            ..Default::default()
        };
        for _ in 0..20 {
            orbit.update(keys, 0.05, &config);
            assert!((orbit.eye().length() - orbit.radius).abs() < 0.1);
        }
        assert!((orbit.theta - 96.0).abs() < 1e-3);
        assert_eq!(orbit.phi, MAX_PHI);
    }

    #[test]
    fn test_keyboard_orbit_starts_on_negative_y() {
        let orbit = KeyboardOrbit::new(5.0, Vec3::ZERO);
        assert!(orbit.eye().abs_diff_eq(Vec3::new(0.0, -5.0, 0.0), 1e-5));
    }

    #[test]
    fn test_keyboard_zoom_respects_minimum() {
        let config = CameraConfig::default();
        let mut orbit = KeyboardOrbit::new(3.0, Vec3::ZERO);
        let keys = OrbitKeys {
            zoom_in: true,
            ..Default::default()
        };
        orbit.update(keys, 1.0, &config);
        assert_eq!(orbit.radius, config.min_radius);

        let keys = OrbitKeys {
            zoom_out: true,
            ..Default::default()
        };
        orbit.update(keys, 0.5, &config);
        assert!((orbit.radius - (config.min_radius + 18.0)).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let config = CameraConfig::default();
        let mut orbit = KeyboardOrbit::new(8.0, Vec3::ZERO);
        let keys = OrbitKeys {
            left: true,
            right: true,
            ..Default::default()
        };
        orbit.update(keys, 1.0, &config);
        assert_eq!(orbit.theta, 0.0);
    }

    #[test]
    fn test_mouse_orbit_zoom_is_clamped_and_smoothed() {
        let mut orbit = MouseOrbit::new(10.0, Vec3::ZERO, 2.5);
        for _ in 0..100 {
            orbit.zoom(5.0);
        }
        assert_eq!(orbit.target_distance, 2.5);

        orbit.smooth(1.0 / 60.0);
        assert!(orbit.distance < 10.0 && orbit.distance > 2.5);
        for _ in 0..600 {
            orbit.smooth(1.0 / 60.0);
        }
        assert!((orbit.distance - 2.5).abs() < 1e-3);
        assert!((orbit.eye() - orbit.target).length() - orbit.distance < 1e-3);
    }

    #[test]
    fn test_mouse_orbit_centers_on_point() {
        let mut orbit = MouseOrbit::new(10.0, Vec3::ZERO, 2.5);
        orbit.center_on(Vec3::new(1.0, 2.0, 3.0));
        for _ in 0..600 {
            orbit.smooth(1.0 / 60.0);
        }
        assert!(orbit.target.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-3));
    }
}
