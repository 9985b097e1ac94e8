//! Error types for graph preparation and configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Position of node {node} is not finite")]
    NonFinitePosition { node: String },
    #[error("No position given for node {node}")]
    MissingPosition { node: String },
    #[error("Color of {element} is not finite")]
    InvalidColor { element: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
