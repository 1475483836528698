use serde::{Deserialize, Serialize};

pub const DEFAULT_LAYER_OPACITY: f64 = 0.5;
pub const OPACITY_MIN: f64 = 0.0;
pub const OPACITY_MAX: f64 = 1.0;
pub const OPACITY_STEP: f64 = 0.1;

/// User-controlled rendering state of the vector layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub layer_visible: bool,
    pub layer_opacity: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            layer_visible: true,
            layer_opacity: DEFAULT_LAYER_OPACITY,
        }
    }
}

/// A discrete change requested by one of the layer controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    ToggleVisibility,
    SetVisibility(bool),
    SetOpacity(f64),
}

/// Clamp an opacity into `[0, 1]`. NaN has no meaningful position and is rejected.
pub fn clamp_opacity(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(OPACITY_MIN, OPACITY_MAX))
}

/// Parse raw slider input. Non-numeric input yields `None` and should be ignored.
pub fn parse_opacity(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().and_then(clamp_opacity)
}

impl ViewState {
    pub fn new(layer_visible: bool, layer_opacity: f64) -> Self {
        Self {
            layer_visible,
            layer_opacity: clamp_opacity(layer_opacity).unwrap_or(DEFAULT_LAYER_OPACITY),
        }
    }

    /// Restore the opacity invariant on state that came from outside (e.g. deserialized config).
    pub fn normalized(self) -> Self {
        Self::new(self.layer_visible, self.layer_opacity)
    }

    /// Apply an event in place. Returns `true` if the state changed.
    pub fn apply(&mut self, event: ViewEvent) -> bool {
        match event {
            ViewEvent::ToggleVisibility => {
                self.layer_visible = !self.layer_visible;
                true
            }
            ViewEvent::SetVisibility(visible) => {
                let changed = self.layer_visible != visible;
                self.layer_visible = visible;
                changed
            }
            ViewEvent::SetOpacity(value) => {
                let Some(opacity) = clamp_opacity(value) else {
                    return false;
                };
                let changed = (self.layer_opacity - opacity).abs() > f64::EPSILON;
                self.layer_opacity = opacity;
                changed
            }
        }
    }
}
