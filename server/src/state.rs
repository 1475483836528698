use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use wfs_map_shared::MapConfig;

use crate::config;

#[derive(Clone)]
pub struct AppState {
    /// Map configuration handed to every client on startup.
    pub map_config: Arc<MapConfig>,
    /// Directory holding the built client bundle.
    pub static_dir: PathBuf,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(map_config: MapConfig, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            map_config: Arc::new(map_config),
            static_dir: static_dir.into(),
            started_at: Instant::now(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(config::map_config(), config::static_dir())
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
