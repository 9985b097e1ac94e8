//! Configuration loading and defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::attrs::Rgba;
use crate::error::ConfigError;
use crate::layout::LayoutOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nodes: NodesConfig,
    #[serde(default)]
    pub edges: EdgesConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesConfig {
    #[serde(default = "default_node_color")]
    pub color: Rgba,
    #[serde(default = "default_node_size")]
    pub size: f32,
    #[serde(default = "default_label_color")]
    pub label_color: Rgba,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            color: default_node_color(),
            size: default_node_size(),
            label_color: default_label_color(),
        }
    }
}

fn default_node_color() -> Rgba {
    Rgba::new(0.4, 0.0, 0.3, 1.0)
}

fn default_node_size() -> f32 {
    1.0
}

fn default_label_color() -> Rgba {
    Rgba::new(0.0, 1.0, 0.0, 1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgesConfig {
    #[serde(default = "default_edge_color")]
    pub color: Rgba,
    #[serde(default = "default_label_color")]
    pub label_color: Rgba,
}

impl Default for EdgesConfig {
    fn default() -> Self {
        Self {
            color: default_edge_color(),
            label_color: default_label_color(),
        }
    }
}

fn default_edge_color() -> Rgba {
    Rgba::new(0.3, 0.3, 0.3, 0.5)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Heading speed in degrees per second
    #[serde(default = "default_angular_speed")]
    pub speed_theta: f32,
    /// Elevation speed in degrees per second
    #[serde(default = "default_angular_speed")]
    pub speed_phi: f32,
    /// Zoom speed in scene units per second
    #[serde(default = "default_speed_radius")]
    pub speed_radius: f32,
    #[serde(default = "default_min_radius")]
    pub min_radius: f32,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed_theta: default_angular_speed(),
            speed_phi: default_angular_speed(),
            speed_radius: default_speed_radius(),
            min_radius: default_min_radius(),
            fov_degrees: default_fov(),
        }
    }
}

fn default_angular_speed() -> f32 {
    96.0
}

fn default_speed_radius() -> f32 {
    36.0
}

fn default_min_radius() -> f32 {
    2.5
}

fn default_fov() -> f32 {
    45.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Seconds between applications of the state transition
    #[serde(default = "default_period")]
    pub period_secs: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period(),
        }
    }
}

fn default_period() -> f32 {
    1.0
}

/// Spring layout overrides; unset fields keep the plot options' values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Mean per-node displacement that ends the layout early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Largest absolute coordinate; defaults to `2 * sqrt(node_count)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl LayoutConfig {
    /// Overwrite the fields of `options` that this section sets
    pub fn apply(&self, options: &mut LayoutOptions) {
        if let Some(iterations) = self.iterations {
            options.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(threshold) = self.threshold {
            options.threshold = threshold;
        }
        if self.scale.is_some() {
            options.scale = self.scale;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_background")]
    pub background: Rgba,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            background: default_background(),
        }
    }
}

fn default_title() -> String {
    "graphscape".to_string()
}

fn default_background() -> Rgba {
    Rgba::new(0.1, 0.1, 0.15, 1.0)
}

/// Attribute values applied to elements that do not set their own
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub node_color: Rgba,
    pub node_size: f32,
    pub node_label_color: Rgba,
    pub edge_color: Rgba,
    pub edge_label_color: Rgba,
}

impl Default for Defaults {
    fn default() -> Self {
        Config::default().defaults()
    }
}

impl Config {
    pub fn defaults(&self) -> Defaults {
        Defaults {
            node_color: self.nodes.color,
            node_size: self.nodes.size,
            node_label_color: self.nodes.label_color,
            edge_color: self.edges.color,
            edge_label_color: self.edges.label_color,
        }
    }
}

/// Load configuration from file, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Write the default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.camera.min_radius, 2.5);
        assert_eq!(config.transition.period_secs, 1.0);
        assert_eq!(config.defaults(), Defaults::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphscape.toml");
        std::fs::write(
            &path,
            "[nodes]\ncolor = [1.0, 0.0, 0.0, 1.0]\n\n[transition]\nperiod_secs = 0.25\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.nodes.color, Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(config.nodes.size, 1.0);
        assert_eq!(config.transition.period_secs, 0.25);
        assert_eq!(config.edges.color, Rgba::new(0.3, 0.3, 0.3, 0.5));
    }

    #[test]
    fn test_saved_default_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphscape.toml");
        save_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.window.title, "graphscape");
        assert_eq!(config.layout.seed, None);
    }

    #[test]
    fn test_layout_section_overrides_only_set_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphscape.toml");
        std::fs::write(&path, "[layout]
seed = 9
threshold = 0.01
").unwrap();
        let config = load_config(&path).unwrap();

        let mut options = LayoutOptions {
            iterations: 200,
            seed: 7,
            ..Default::default()
        };
        config.layout.apply(&mut options);
        assert_eq!(options.seed, 9);
        assert_eq!(options.threshold, 0.01);
        assert_eq!(options.iterations, 200);
        assert_eq!(options.scale, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[nodes\ncolor = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
