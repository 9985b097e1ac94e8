//! Graphscape Core - Graph model, layout, and state transitions
//!
//! This crate provides everything graphscape needs that does not touch the
//! 3D engine:
//! - Attributed graph model (nodes, edges, render attributes, user data)
//! - Graph generators for the bundled demos
//! - 3D spring layout for graphs without positions
//! - Attribute preparation before the first frame
//! - State transition and key handler contracts, plus the demo transitions
//! - Viewer configuration loading

pub mod attrs;
pub mod config;
pub mod demos;
pub mod error;
pub mod generators;
pub mod graph;
pub mod layout;
pub mod prepare;
pub mod transition;

pub use attrs::{EdgeAttrs, NodeAttrs, Position, Rgba};
pub use config::{load_config, Config, Defaults};
pub use error::{ConfigError, GraphError};
pub use graph::{AttrGraph, EdgeId, GraphKind, NodeId};
pub use layout::{spring_layout, LayoutOptions};
pub use prepare::{prepare, PlotOptions, PreparedGraph};
pub use transition::{KeyHandler, StateTransition, TransitionClock};
