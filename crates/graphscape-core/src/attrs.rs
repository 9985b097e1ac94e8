//! Render attributes carried by graph nodes and edges

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node position in x, y, z order (Z is up in the scene)
pub type Position = [f64; 3];

/// RGBA color with channels nominally in [0, 1]
///
/// Values outside the unit range are kept in the graph so transitions can
/// accumulate freely; they are clamped only when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the color channels, leaving alpha untouched
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    /// Sum of all four channels
    pub fn sum(self) -> f32 {
        self.r + self.g + self.b + self.a
    }

    /// Channel-wise mean of two colors
    pub fn mean(a: Rgba, b: Rgba) -> Self {
        Self::new(
            (a.r + b.r) / 2.0,
            (a.g + b.g) / 2.0,
            (a.b + b.b) / 2.0,
            (a.a + b.a) / 2.0,
        )
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    pub fn is_finite(self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

/// Attributes of a single node
///
/// Unset fields are filled by [`crate::prepare`] before the first frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub pos: Option<Position>,
    pub color: Option<Rgba>,
    /// Uniform scale of the node sphere
    pub size: Option<f32>,
    pub label: Option<String>,
    pub label_color: Option<Rgba>,
    /// Free-form user state, e.g. a cell value for Game of Life
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl NodeAttrs {
    /// Read an integer from the user data map, treating absent values as 0
    pub fn data_i64(&self, key: &str) -> i64 {
        self.data.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn set_data(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }
}

/// Attributes of a single edge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub color: Option<Rgba>,
    pub label: Option<String>,
    pub label_color: Option<Rgba>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_keeps_alpha() {
        let c = Rgba::new(0.5, 0.2, 0.1, 0.8).scaled(2.0);
        assert_eq!(c, Rgba::new(1.0, 0.4, 0.2, 0.8));
    }

    #[test]
    fn test_clamped() {
        let c = Rgba::new(1.5, -0.2, 0.5, 1.0).clamped();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_color_serializes_as_array() {
        let json = serde_json::to_string(&Rgba::new(0.0, 0.5, 1.0, 1.0)).unwrap();
        assert_eq!(json, "[0.0,0.5,1.0,1.0]");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back.g, 0.5);
    }

    #[test]
    fn test_node_data_defaults_to_zero() {
        let mut attrs = NodeAttrs::default();
        assert_eq!(attrs.data_i64("val"), 0);
        attrs.set_data("val", 1);
        assert_eq!(attrs.data_i64("val"), 1);
    }
}
