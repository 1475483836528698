use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::CoordinateReadout;
use crate::style::VectorStyle;
use crate::view::ViewSettings;
use crate::view_state::ViewState;
use crate::wfs::WfsRequest;

/// How a view state change reaches the live map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Dispose the bound instance and build a new one, re-fetching the vector data.
    #[default]
    Rebuild,
    /// Mutate the bound vector layer's opacity and visibility without re-fetching.
    InPlace,
}

impl SyncPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncPolicy::Rebuild => "rebuild",
            SyncPolicy::InPlace => "in_place",
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "rebuild" => Ok(SyncPolicy::Rebuild),
            "in_place" | "inplace" => Ok(SyncPolicy::InPlace),
            other => Err(format!("unknown sync policy: {other}")),
        }
    }
}

/// Complete map configuration. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub wfs: WfsRequest,
    pub view: ViewSettings,
    pub initial: ViewState,
    pub style: VectorStyle,
    pub readout: CoordinateReadout,
    pub sync: SyncPolicy,
}

impl MapConfig {
    pub fn normalized(mut self) -> Self {
        self.view = self.view.normalized();
        self.initial = self.initial.normalized();
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<MapConfig>(raw).map(MapConfig::normalized)
    }
}
