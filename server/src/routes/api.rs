use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use wfs_map_shared::MapConfig;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = &state.map_config;
    Json(serde_json::json!({
        "status": "ok",
        "uptime_secs": state.uptime_secs(),
        "wfs_type_name": config.wfs.type_name,
        "sync_policy": config.sync.as_str(),
    }))
}

/// Map configuration for the client. Never cached so env changes apply on reload.
pub async fn get_config(State(state): State<AppState>) -> Response {
    let mut response = Json(MapConfig::clone(&state.map_config)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
