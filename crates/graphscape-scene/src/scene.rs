//! Scene setup - camera, lights, and world axes

use bevy::prelude::*;

use crate::camera::MainCamera;
use crate::geometry::{rotation_from_y, to_vec3};
use crate::types::ViewerSettings;

/// Marker component for the directional key lights
#[derive(Component)]
pub struct KeyLight;

/// Marker component for world axis visualization
#[derive(Component)]
pub struct WorldAxis;

/// Ambient light strength relative to the engine's default exposure
const AMBIENT_INTENSITY: f32 = 0.3;
/// Downward tilt of the key lights in degrees
const KEY_LIGHT_TILT: f32 = 20.0;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_scene, setup_world_axes));
    }
}

fn setup_scene(mut commands: Commands, settings: Res<ViewerSettings>) {
    // Z is up; the camera rig moves the camera once the first frame runs
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.camera.fov_degrees.to_radians(),
            near: 0.05,
            far: 10_000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, -10.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
        AmbientLight {
            color: Color::WHITE,
            brightness: 1000.0 * AMBIENT_INTENSITY,
            ..default()
        },
        MainCamera,
    ));

    // Two key lights facing each other across the graph, tilted down
    let tilt = KEY_LIGHT_TILT.to_radians();
    for heading in [1.0f32, -1.0] {
        let direction = Vec3::new(0.0, heading * tilt.cos(), -tilt.sin());
        commands.spawn((
            DirectionalLight {
                illuminance: 4000.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::default().looking_to(direction, Vec3::Z),
            KeyLight,
        ));
    }

    // Point light at the origin lights the graph from inside
    commands.spawn((
        PointLight {
            intensity: 100000.0,
            range: 1000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_translation(Vec3::ZERO),
    ));

    tracing::debug!("Scene lights and camera spawned");
}

/// Red X, green Y, blue Z axes from the origin, sized to the graph
fn setup_world_axes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    if !settings.plot_axes {
        return;
    }

    let prepared = &settings.prepared;
    let axis_length = (to_vec3(prepared.center).length() + prepared.radius as f32).max(1.0);
    let axis_thickness = axis_length * 0.01;
    let cone_height = axis_thickness * 4.0;
    let cone_radius = axis_thickness * 2.5;

    let axis_mesh = meshes.add(Cylinder::new(axis_thickness, axis_length));
    let cone_mesh = meshes.add(Cone::new(cone_radius, cone_height));

    let axes = [
        (Vec3::X, Color::srgb(0.9, 0.2, 0.2)),
        (Vec3::Y, Color::srgb(0.2, 0.9, 0.2)),
        (Vec3::Z, Color::srgb(0.2, 0.2, 0.9)),
    ];
    for (direction, color) in axes {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        });
        let rotation = rotation_from_y(direction);
        commands.spawn((
            Mesh3d(axis_mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(direction * axis_length / 2.0).with_rotation(rotation),
            WorldAxis,
        ));
        commands.spawn((
            Mesh3d(cone_mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(direction * (axis_length + cone_height / 2.0))
                .with_rotation(rotation),
            WorldAxis,
        ));
    }
}
