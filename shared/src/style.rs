use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const RED: Rgba = Rgba::rgb(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Format as a CSS color string the map engine accepts.
    pub fn css(&self) -> String {
        let a = self.a.clamp(0.0, 1.0);
        format!("rgba({}, {}, {}, {a})", self.r, self.g, self.b)
    }
}

/// Fixed styling for the WFS vector layer: translucent red polygons,
/// red outlines and red point markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStyle {
    pub fill_color: Rgba,
    pub stroke_color: Rgba,
    pub stroke_width: f64,
    pub marker_radius: f64,
    pub marker_fill: Rgba,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            fill_color: Rgba::new(255, 0, 0, 0.2),
            stroke_color: Rgba::RED,
            stroke_width: 1.0,
            marker_radius: 5.0,
            marker_fill: Rgba::RED,
        }
    }
}
