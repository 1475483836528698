use gloo_net::http::Request;
use wfs_map_shared::MapConfig;

pub(crate) const CONFIG_PATH: &str = "/api/config";

/// Fetch the map configuration from the host. Any failure falls back to the built-in
/// defaults so the map always renders.
pub(crate) async fn load() -> MapConfig {
    match fetch_config().await {
        Ok(config) => {
            tracing::info!(sync = %config.sync, "loaded map config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "using built-in map config");
            MapConfig::default()
        }
    }
}

async fn fetch_config() -> Result<MapConfig, String> {
    let response = Request::get(CONFIG_PATH)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    if !response.ok() {
        return Err(format!("{CONFIG_PATH} returned HTTP {}", response.status()));
    }
    let body = response
        .text()
        .await
        .map_err(|e| format!("failed to read body: {e}"))?;
    config_from_body(&body)
}

fn config_from_body(body: &str) -> Result<MapConfig, String> {
    MapConfig::from_json(body).map_err(|e| format!("invalid config: {e}"))
}
