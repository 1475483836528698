use serde::{Deserialize, Serialize};

pub const DEFAULT_CENTER: [f64; 2] = [761963.05, 7043067.40];
pub const DEFAULT_ZOOM: f64 = 15.0;
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;
pub const DEFAULT_MAX_ZOOM: f64 = 19.0;
/// Amersfoort / RD New.
pub const DEFAULT_PROJECTION: &str = "EPSG:28992";
/// Projection the engine falls back to when it does not know the configured code.
pub const FALLBACK_PROJECTION: &str = "EPSG:3857";

/// Camera configuration handed to the map engine on every build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub projection: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            projection: DEFAULT_PROJECTION.to_string(),
        }
    }
}

impl ViewSettings {
    /// Repair inverted or non-finite zoom bounds and pull the start zoom inside them.
    pub fn normalized(mut self) -> Self {
        if !self.min_zoom.is_finite() || self.min_zoom < 0.0 {
            self.min_zoom = DEFAULT_MIN_ZOOM;
        }
        if !self.max_zoom.is_finite() {
            self.max_zoom = DEFAULT_MAX_ZOOM;
        }
        if self.max_zoom < self.min_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !self.zoom.is_finite() {
            self.zoom = DEFAULT_ZOOM;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        if self.projection.trim().is_empty() {
            self.projection = DEFAULT_PROJECTION.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_centered_on_the_netherlands() {
        let view = ViewSettings::default();
        assert_eq!(view.center, [761963.05, 7043067.40]);
        assert_eq!(view.zoom, 15.0);
        assert_eq!(view.max_zoom, 19.0);
        assert_eq!(view.projection, "EPSG:28992");
    }

    #[test]
    fn normalized_clamps_zoom_into_bounds() {
        let view = ViewSettings {
            zoom: 25.0,
            ..ViewSettings::default()
        }
        .normalized();
        assert_eq!(view.zoom, 19.0);
    }

    #[test]
    fn normalized_swaps_inverted_bounds() {
        let view = ViewSettings {
            min_zoom: 12.0,
            max_zoom: 4.0,
            zoom: 8.0,
            ..ViewSettings::default()
        }
        .normalized();
        assert_eq!((view.min_zoom, view.max_zoom, view.zoom), (4.0, 12.0, 8.0));
    }

    #[test]
    fn normalized_restores_blank_projection() {
        let view = ViewSettings {
            projection: "  ".into(),
            ..ViewSettings::default()
        }
        .normalized();
        assert_eq!(view.projection, DEFAULT_PROJECTION);
    }
}
