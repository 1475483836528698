use wfs_map_shared::{MapConfig, SyncPolicy};

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn static_dir() -> String {
    non_empty_var("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
}

/// Map configuration served to the client: built-in defaults with env overrides.
/// Unparseable overrides are logged and ignored.
pub fn map_config() -> MapConfig {
    let mut config = MapConfig::default();

    if let Some(endpoint) = non_empty_var("WFS_ENDPOINT") {
        config.wfs.endpoint = endpoint;
    }
    if let Some(type_name) = non_empty_var("WFS_TYPE_NAME") {
        config.wfs.type_name = type_name;
    }
    if let Some(srs_name) = non_empty_var("WFS_SRS_NAME") {
        config.wfs.srs_name = srs_name;
    }
    if let Some(raw) = non_empty_var("WFS_COUNT") {
        match raw.parse::<u32>() {
            Ok(count) if count > 0 => config.wfs.count = Some(count),
            _ => tracing::warn!(value = %raw, "ignoring invalid WFS_COUNT"),
        }
    }
    if let Some(raw) = non_empty_var("MAP_SYNC_POLICY") {
        match raw.parse::<SyncPolicy>() {
            Ok(policy) => config.sync = policy,
            Err(e) => tracing::warn!(error = %e, "ignoring invalid MAP_SYNC_POLICY"),
        }
    }
    if let Some(raw) = non_empty_var("MAP_INITIAL_OPACITY") {
        match raw.parse::<f64>() {
            Ok(opacity) if opacity.is_finite() => config.initial.layer_opacity = opacity,
            _ => tracing::warn!(value = %raw, "ignoring invalid MAP_INITIAL_OPACITY"),
        }
    }

    config.normalized()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
