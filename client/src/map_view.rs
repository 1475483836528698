use leptos::prelude::*;
use web_sys::HtmlElement;
use wfs_map_shared::{FetchError, FetchStatus, FetchTicket, MapConfig, MapView, ViewEvent, ViewState};

use crate::controls::LayerControls;
use crate::engine::OlEngine;
use crate::loader;

pub(crate) const SURFACE_WIDTH: &str = "100%";
pub(crate) const SURFACE_HEIGHT: &str = "400px";

/// Reactive front for the map view: owns the engine-backed `MapView` and mirrors
/// its state and layer status into signals for the controls.
#[derive(Clone, Copy)]
pub(crate) struct MapController {
    view: StoredValue<MapView<OlEngine>, LocalStorage>,
    state: RwSignal<ViewState>,
    status: RwSignal<FetchStatus>,
}

impl MapController {
    pub(crate) fn new(config: MapConfig) -> Self {
        let view = MapView::new(OlEngine, config);
        let state = RwSignal::new(view.state());
        let status = RwSignal::new(view.status().clone());
        Self {
            view: StoredValue::new_local(view),
            state,
            status,
        }
    }

    pub(crate) fn state(self) -> RwSignal<ViewState> {
        self.state
    }

    pub(crate) fn status(self) -> RwSignal<FetchStatus> {
        self.status
    }

    pub(crate) fn mount(self, surface: HtmlElement) {
        let ticket = self
            .view
            .try_update_value(|view| view.mount(Some(surface)))
            .flatten();
        self.after_change(ticket);
    }

    pub(crate) fn dispatch(self, event: ViewEvent) {
        let ticket = self
            .view
            .try_update_value(|view| view.handle(event))
            .flatten();
        self.after_change(ticket);
    }

    pub(crate) fn unmount(self) {
        self.view.try_update_value(|view| view.unmount());
    }

    pub(crate) fn track_fetch(self, ticket: &FetchTicket, cancel: impl FnOnce() + 'static) {
        let mut cancel = Some(cancel);
        self.view.try_update_value(|view| {
            if let Some(cancel) = cancel.take() {
                view.track_fetch(ticket, cancel);
            }
        });
        // The view is gone; nobody will use the response.
        if let Some(cancel) = cancel.take() {
            cancel();
        }
    }

    pub(crate) fn complete_fetch(self, ticket: &FetchTicket, result: Result<String, FetchError>) {
        let applied = self
            .view
            .try_update_value(|view| view.complete_fetch(ticket, result))
            .unwrap_or(false);
        if applied {
            self.sync_signals();
        }
    }

    fn after_change(self, ticket: Option<FetchTicket>) {
        self.sync_signals();
        if let Some(ticket) = ticket {
            loader::spawn(self, ticket);
        }
    }

    fn sync_signals(self) {
        let Some((state, status)) = self
            .view
            .try_with_value(|view| (view.state(), view.status().clone()))
        else {
            return;
        };
        self.state.try_set(state);
        self.status.try_set(status);
    }
}

/// The map surface plus its layer controls.
#[component]
pub(crate) fn MapPanel(config: MapConfig) -> impl IntoView {
    let controller = MapController::new(config);
    provide_context(controller);

    let surface_ref = NodeRef::<leptos::html::Div>::new();
    Effect::new(move || {
        if let Some(surface) = surface_ref.get() {
            controller.mount(surface.into());
        }
    });
    on_cleanup(move || controller.unmount());

    view! {
        <div>
            <div
                node_ref=surface_ref
                class="map-container"
                style:width=SURFACE_WIDTH
                style:height=SURFACE_HEIGHT
            />
            <LayerControls />
        </div>
    }
}
