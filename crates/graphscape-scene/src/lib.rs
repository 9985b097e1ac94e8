//! Graphscape Scene - 3D rendering of attributed graphs
//!
//! This crate turns a prepared graph into Bevy entities and keeps them in
//! step with the graph while user code mutates it: a state transition on a
//! fixed period, a key handler for typed keys, two camera rigs, and an egui
//! overlay for help, labels and node details.

pub mod camera;
pub mod geometry;
pub mod input;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;
pub mod viewer;

use bevy::prelude::*;

/// Plugin that sets up the graph scene
///
/// Expects the resources of [`viewer::ViewerResources`] to be inserted.
pub struct GraphscapeScenePlugin;

impl Plugin for GraphscapeScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(input::InputPlugin)
            .add_plugins(ui::OverlayPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
pub use viewer::{plot, Viewer, ViewerError, ViewerResources};
