use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use wfs_map_shared::MapConfig;

use crate::config;
use crate::map_view::MapPanel;

#[component]
pub fn App() -> impl IntoView {
    let map_config: RwSignal<Option<MapConfig>> = RwSignal::new(None);

    spawn_local(async move {
        let loaded = config::load().await;
        map_config.try_set(Some(loaded));
    });

    view! {
        <div class="wfs-map">
            {move || match map_config.get() {
                Some(config) => view! { <MapPanel config=config /> }.into_any(),
                None => view! {
                    <div class="map-loading" style="width: 100%; height: 400px;">
                        "Loading map configuration\u{2026}"
                    </div>
                }
                .into_any(),
            }}
        </div>
    }
}
