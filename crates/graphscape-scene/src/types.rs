//! Shared resources for the graph, user callbacks, and viewer state

use bevy::prelude::*;
use graphscape_core::config::{CameraConfig, WindowConfig};
use graphscape_core::{
    AttrGraph, Config, Defaults, KeyHandler, NodeId, PlotOptions, PreparedGraph,
    StateTransition, TransitionClock,
};

/// The graph being shown; the scene mirrors its attributes every frame
#[derive(Resource)]
pub struct GraphResource(pub AttrGraph);

/// Settings fixed when the viewer is built
#[derive(Debug, Clone, Resource)]
pub struct ViewerSettings {
    pub defaults: Defaults,
    pub camera: CameraConfig,
    pub window: WindowConfig,
    pub plot_axes: bool,
    pub mouse: bool,
    pub verbose: bool,
    pub prepared: PreparedGraph,
}

impl ViewerSettings {
    pub fn new(config: &Config, options: &PlotOptions, prepared: PreparedGraph) -> Self {
        Self {
            defaults: config.defaults(),
            camera: config.camera.clone(),
            window: config.window.clone(),
            plot_axes: options.plot_axes,
            mouse: options.mouse,
            verbose: options.verbose,
            prepared,
        }
    }
}

/// User state transition and the clock deciding when it runs
#[derive(Resource)]
pub struct TransitionDriver {
    pub transition: Option<Box<dyn StateTransition>>,
    pub clock: TransitionClock,
}

/// User key handler, called with every key typed into the window
#[derive(Resource, Default)]
pub struct KeyInput {
    pub handler: Option<Box<dyn KeyHandler>>,
    /// Most recent key, kept until flushed
    pub latest: Option<char>,
}

impl KeyInput {
    /// Take the most recent keystroke, clearing it
    pub fn flush_latest(&mut self) -> Option<char> {
        self.latest.take()
    }
}

/// Currently selected node
#[derive(Debug, Clone, Resource, Default)]
pub struct SelectedNode(pub Option<NodeId>);

/// Seconds since the viewer started
#[derive(Debug, Clone, Resource, Default)]
pub struct ElapsedTime(pub f32);

/// Whether the overlay UI currently owns the pointer
#[derive(Debug, Clone, Resource, Default)]
pub struct PointerOverUi(pub bool);
