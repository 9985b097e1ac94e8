//! Builder that prepares a graph and runs the Bevy application around it

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use graphscape_core::{
    prepare, AttrGraph, Config, GraphError, KeyHandler, PlotOptions, StateTransition,
    TransitionClock,
};
use thiserror::Error;

use crate::geometry::to_color;
use crate::types::{GraphResource, KeyInput, TransitionDriver, ViewerSettings};
use crate::GraphscapeScenePlugin;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Graph cannot be shown: {0}")]
    Graph(#[from] GraphError),

    #[error("Viewer exited with code {0}")]
    Exit(u8),
}

/// A graph plus everything needed to show it
///
/// ```no_run
/// use graphscape_core::generators::frucht;
/// use graphscape_scene::Viewer;
///
/// Viewer::new(frucht()).run().unwrap();
/// ```
pub struct Viewer {
    graph: AttrGraph,
    options: PlotOptions,
    config: Config,
    transition: Option<Box<dyn StateTransition>>,
    key_handler: Option<Box<dyn KeyHandler>>,
}

/// Resources produced from a prepared graph, ready to insert into an app
pub struct ViewerResources {
    pub graph: GraphResource,
    pub settings: ViewerSettings,
    pub driver: TransitionDriver,
    pub key_input: KeyInput,
}

impl Viewer {
    pub fn new(graph: AttrGraph) -> Self {
        Self {
            graph,
            options: PlotOptions::default(),
            config: Config::default(),
            transition: None,
            key_handler: None,
        }
    }

    pub fn options(mut self, options: PlotOptions) -> Self {
        self.options = options;
        self
    }

    /// Appearance, camera and timing settings; fields set in the `[layout]`
    /// section override the layout parameters of the plot options
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Called once every `transition.period_secs` with the graph
    pub fn transition(mut self, transition: impl StateTransition) -> Self {
        self.transition = Some(Box::new(transition));
        self
    }

    /// Called with every letter, digit or space typed into the window
    pub fn key_handler(mut self, handler: impl KeyHandler) -> Self {
        self.key_handler = Some(Box::new(handler));
        self
    }

    /// Fill the graph's unset attributes and wrap everything in resources
    pub fn into_resources(self) -> Result<ViewerResources, ViewerError> {
        let Viewer {
            mut graph,
            mut options,
            config,
            transition,
            key_handler,
        } = self;

        config.layout.apply(&mut options.layout);

        let prepared = prepare(&mut graph, &options, &config.defaults())?;
        tracing::info!(
            name = graph.name().unwrap_or("unnamed"),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            radius = prepared.radius,
            "Graph prepared"
        );

        Ok(ViewerResources {
            graph: GraphResource(graph),
            settings: ViewerSettings::new(&config, &options, prepared),
            driver: TransitionDriver {
                transition,
                clock: TransitionClock::new(config.transition.period_secs),
            },
            key_input: KeyInput {
                handler: key_handler,
                latest: None,
            },
        })
    }

    /// Build the application without starting it
    pub fn build(self) -> Result<App, ViewerError> {
        let resources = self.into_resources()?;
        let settings = &resources.settings;

        let mut app = App::new();
        app.insert_resource(ClearColor(to_color(settings.window.background)))
            .add_plugins(DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: settings.window.title.clone(),
                    ..default()
                }),
                ..default()
            }))
            // Picking has to be registered before EguiPlugin so egui detects it
            .add_plugins(DefaultPickingPlugins)
            .add_plugins(MeshPickingPlugin)
            .add_plugins(EguiPlugin::default())
            .insert_resource(resources.settings)
            .insert_resource(resources.graph)
            .insert_resource(resources.driver)
            .insert_resource(resources.key_input)
            .add_plugins(GraphscapeScenePlugin);
        Ok(app)
    }

    /// Show the graph until the window is closed
    pub fn run(self) -> Result<(), ViewerError> {
        let mut app = self.build()?;
        match app.run() {
            AppExit::Success => Ok(()),
            AppExit::Error(code) => Err(ViewerError::Exit(code.get())),
        }
    }
}

/// Show a graph with default settings
///
/// `debug` turns on axes, automatic labels, verbose output and the mouse
/// camera.
pub fn plot(graph: AttrGraph, debug: bool) -> Result<(), ViewerError> {
    let mut options = PlotOptions::default();
    if debug {
        options.toggle_debug();
    }
    Viewer::new(graph).options(options).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphscape_core::generators::frucht;
    use graphscape_core::layout::{spring_layout, LayoutOptions};
    use graphscape_core::{GraphKind, Rgba};

    #[test]
    fn test_resources_from_prepared_graph() {
        let mut config = Config::default();
        config.transition.period_secs = 0.5;
        let resources = Viewer::new(frucht())
            .config(config)
            .transition(|_: &mut AttrGraph, _: u64, _: f32| {})
            .key_handler(|_: &mut AttrGraph, _: char| {})
            .into_resources()
            .unwrap();

        let graph = &resources.graph.0;
        assert_eq!(graph.node_count(), 12);
        for id in graph.node_ids() {
            let attrs = graph.node(id).unwrap();
            assert!(attrs.pos.is_some());
            assert!(attrs.color.is_some());
        }
        assert!(resources.settings.prepared.radius > 0.0);
        assert_eq!(resources.driver.clock.period(), 0.5);
        assert!(resources.driver.transition.is_some());
        assert!(resources.key_input.handler.is_some());
    }

    #[test]
    fn test_debug_options_reach_settings() {
        let mut options = PlotOptions::default();
        options.toggle_debug();
        let resources = Viewer::new(frucht())
            .options(options)
            .into_resources()
            .unwrap();
        assert!(resources.settings.mouse);
        assert!(resources.settings.plot_axes);
        assert!(resources.settings.verbose);
    }

    #[test]
    fn test_layout_options_reach_prepare() {
        let layout = LayoutOptions {
            seed: 7,
            ..Default::default()
        };
        let expected = spring_layout(&frucht(), &layout);
        let options = PlotOptions {
            layout,
            ..Default::default()
        };
        let resources = Viewer::new(frucht()).options(options).into_resources().unwrap();
        let graph = &resources.graph.0;
        for id in graph.node_ids() {
            assert_eq!(graph.node(id).unwrap().pos, Some(expected[&id]));
        }

        let mut config = Config::default();
        config.layout.seed = Some(8);
        let options = PlotOptions {
            layout: LayoutOptions {
                seed: 7,
                ..Default::default()
            },
            ..Default::default()
        };
        let resources = Viewer::new(frucht())
            .options(options)
            .config(config)
            .into_resources()
            .unwrap();
        let overridden = spring_layout(
            &frucht(),
            &LayoutOptions {
                seed: 8,
                ..Default::default()
            },
        );
        let graph = &resources.graph.0;
        let id = graph.node_id("0").unwrap();
        assert_eq!(graph.node(id).unwrap().pos, Some(overridden[&id]));
    }

    #[test]
    fn test_invalid_graph_is_rejected() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        let a = g.add_node("a");
        g.node_mut(a).unwrap().pos = Some([f64::NAN, 0.0, 0.0]);
        let err = Viewer::new(g).into_resources().err().unwrap();
        assert!(matches!(err, ViewerError::Graph(GraphError::NonFinitePosition { .. })));

        let mut g = AttrGraph::new(GraphKind::Undirected);
        let a = g.add_node("a");
        let node = g.node_mut(a).unwrap();
        node.pos = Some([0.0, 0.0, 0.0]);
        node.color = Some(Rgba::new(f32::INFINITY, 0.0, 0.0, 1.0));
        let err = Viewer::new(g).into_resources().err().unwrap();
        assert!(matches!(err, ViewerError::Graph(GraphError::InvalidColor { .. })));
    }
}
