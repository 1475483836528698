use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::coords::CoordinateReadout;
use crate::error::MapError;
use crate::style::VectorStyle;
use crate::view::ViewSettings;
use crate::view_state::ViewState;

/// Background imagery. Only OpenStreetMap tiles are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayer {
    pub source_url: String,
    /// Coordinate system the service returns features in.
    pub data_projection: String,
    pub style: VectorStyle,
    pub opacity: f64,
    pub visible: bool,
}

/// Everything the engine needs to construct one map instance.
/// Derived from config and view state on each build, never stored across builds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayout {
    pub base: BaseLayer,
    pub vector: VectorLayer,
    pub view: ViewSettings,
    pub readout: CoordinateReadout,
}

impl MapLayout {
    /// Fails when the configured service cannot be requested or would not answer
    /// with GeoJSON, the only format the vector layer reads.
    pub fn build(config: &MapConfig, state: ViewState) -> Result<Self, MapError> {
        if !is_geojson_format(&config.wfs.output_format) {
            return Err(MapError::UnsupportedFormat(config.wfs.output_format.clone()));
        }
        let source_url = config.wfs.url()?;
        let state = state.normalized();
        Ok(Self {
            base: BaseLayer::OpenStreetMap,
            vector: VectorLayer {
                source_url: source_url.into(),
                data_projection: config.wfs.srs_name.clone(),
                style: config.style.clone(),
                opacity: state.layer_opacity,
                visible: state.layer_visible,
            },
            view: config.view.clone(),
            readout: config.readout.clone(),
        })
    }
}

fn is_geojson_format(output_format: &str) -> bool {
    let media_type = output_format
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        media_type.as_str(),
        "application/json" | "application/geo+json" | "json" | "geojson"
    )
}
