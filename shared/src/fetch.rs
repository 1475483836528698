use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::FetchError;

/// Identifies one vector data request. A ticket is only honoured while its
/// generation is still the one bound to the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub url: String,
}

/// Load state of the vector layer, as shown next to the controls.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading {
        generation: u64,
    },
    Loaded {
        generation: u64,
        features: usize,
        loaded_at: DateTime<Utc>,
    },
    Unavailable {
        generation: u64,
        reason: String,
    },
}

impl FetchStatus {
    pub fn generation(&self) -> Option<u64> {
        match self {
            FetchStatus::Idle => None,
            FetchStatus::Loading { generation }
            | FetchStatus::Loaded { generation, .. }
            | FetchStatus::Unavailable { generation, .. } => Some(*generation),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchStatus::Unavailable { .. })
    }

    pub fn label(&self) -> String {
        match self {
            FetchStatus::Idle => "Layer not loaded".to_string(),
            FetchStatus::Loading { .. } => "Loading features\u{2026}".to_string(),
            FetchStatus::Loaded {
                features,
                loaded_at,
                ..
            } => {
                let noun = if *features == 1 { "feature" } else { "features" };
                let local = loaded_at.with_timezone(&Local);
                format!("{features} {noun} loaded at {}", local.format("%H:%M:%S"))
            }
            FetchStatus::Unavailable { reason, .. } => format!("Layer unavailable: {reason}"),
        }
    }
}

#[derive(Deserialize)]
struct FeatureCollectionHeader {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<IgnoredAny>,
}

/// Check that a response body is a GeoJSON `FeatureCollection` and count its features.
pub fn count_features(body: &str) -> Result<usize, FetchError> {
    let header: FeatureCollectionHeader =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    if header.kind != "FeatureCollection" {
        return Err(FetchError::Malformed(format!(
            "expected FeatureCollection, got {}",
            header.kind
        )));
    }
    Ok(header.features.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn counts_features_in_collection() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{}},
            {"type":"Feature","geometry":null,"properties":{"id":7}}
        ],"numberMatched":2}"#;
        assert_eq!(count_features(body), Ok(2));
    }

    #[test]
    fn empty_collection_without_features_key_counts_zero() {
        assert_eq!(count_features(r#"{"type":"FeatureCollection"}"#), Ok(0));
    }

    #[test]
    fn rejects_non_collection_geojson() {
        let err = count_features(r#"{"type":"Feature","geometry":null}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(msg) if msg.contains("Feature")));
    }

    #[test]
    fn rejects_xml_exception_reports() {
        let body = "<?xml version=\"1.0\"?><ows:ExceptionReport/>";
        assert!(matches!(count_features(body), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn loaded_time_is_shown_in_local_time() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        let local = at.with_timezone(&Local);
        let label = FetchStatus::Loaded {
            generation: 3,
            features: 12,
            loaded_at: at,
        }
        .label();
        assert_eq!(
            label,
            format!("12 features loaded at {}", local.format("%H:%M:%S"))
        );
    }

    #[test]
    fn labels_describe_each_state() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 4, 5).unwrap();
        assert_eq!(
            FetchStatus::Loaded {
                generation: 1,
                features: 1,
                loaded_at: at
            }
            .label(),
            format!(
                "1 feature loaded at {}",
                at.with_timezone(&Local).format("%H:%M:%S")
            )
        );
        assert_eq!(
            FetchStatus::Unavailable {
                generation: 2,
                reason: "feature service returned HTTP 503".into()
            }
            .label(),
            "Layer unavailable: feature service returned HTTP 503"
        );
        assert_eq!(FetchStatus::Idle.generation(), None);
        assert_eq!(FetchStatus::Loading { generation: 4 }.generation(), Some(4));
    }
}
