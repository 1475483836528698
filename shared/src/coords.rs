use serde::{Deserialize, Serialize};

use crate::view::DEFAULT_PROJECTION;

pub const DEFAULT_FRACTION_DIGITS: usize = 2;

/// Mouse-position readout shown in the corner of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateReadout {
    pub projection: String,
    pub fraction_digits: usize,
}

impl Default for CoordinateReadout {
    fn default() -> Self {
        Self {
            projection: DEFAULT_PROJECTION.to_string(),
            fraction_digits: DEFAULT_FRACTION_DIGITS,
        }
    }
}

impl CoordinateReadout {
    pub fn format(&self, x: f64, y: f64) -> String {
        format_xy(x, y, self.fraction_digits)
    }
}

/// Format a coordinate pair as `"x, y"` with a fixed number of fraction digits.
fn format_xy(x: f64, y: f64, fraction_digits: usize) -> String {
    format!("{x:.fraction_digits$}, {y:.fraction_digits$}")
}
