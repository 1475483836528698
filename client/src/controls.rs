use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wfs_map_shared::ViewEvent;
use wfs_map_shared::view_state::{OPACITY_MAX, OPACITY_MIN, OPACITY_STEP, parse_opacity};

use crate::map_view::MapController;

/// Visibility checkbox, opacity slider and the vector layer's load status.
#[component]
pub(crate) fn LayerControls() -> impl IntoView {
    let controller: MapController = expect_context();
    let state = controller.state();
    let status = controller.status();

    let on_visibility = move |_: leptos::ev::Event| controller.dispatch(ViewEvent::ToggleVisibility);

    let on_opacity = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        if let Some(opacity) = parse_opacity(&input.value()) {
            controller.dispatch(ViewEvent::SetOpacity(opacity));
        }
    };

    view! {
        <div>
            <label for="visibility">"WFS Layer Visibility:"</label>
            <input
                type="checkbox"
                id="visibility"
                prop:checked=move || state.get().layer_visible
                on:change=on_visibility
            />
        </div>
        <div>
            <label for="opacity">"WFS Layer Opacity:"</label>
            <input
                type="range"
                id="opacity"
                min=OPACITY_MIN
                max=OPACITY_MAX
                step=OPACITY_STEP
                prop:value=move || slider_value(state.get().layer_opacity)
                on:input=on_opacity
            />
            <span class="opacity-value">{move || slider_value(state.get().layer_opacity)}</span>
        </div>
        <div
            class="layer-status"
            class:layer-unavailable=move || status.get().is_unavailable()
        >
            {move || status.get().label()}
        </div>
    }
}

fn slider_value(opacity: f64) -> String {
    format!("{opacity:.1}")
}
