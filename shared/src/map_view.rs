use chrono::Utc;

use crate::config::{MapConfig, SyncPolicy};
use crate::engine::{MapEngine, MapHandle, MapInstance};
use crate::error::{FetchError, MapError};
use crate::fetch::{FetchStatus, FetchTicket, count_features};
use crate::layers::MapLayout;
use crate::view_state::{ViewEvent, ViewState};

struct InFlight {
    generation: u64,
    cancel: Box<dyn FnOnce()>,
}

/// Keeps exactly one map engine instance bound to the display surface while
/// mounted, and re-synchronizes it whenever the view state changes.
///
/// Every build gets a new generation. Vector data requests are tagged with the
/// generation that issued them; results for any other generation are dropped, and
/// a superseded request is cancelled before the replacement instance is created.
pub struct MapView<E: MapEngine> {
    engine: E,
    config: MapConfig,
    state: ViewState,
    surface: Option<E::Surface>,
    handle: Option<MapHandle<E::Instance>>,
    generation: u64,
    status: FetchStatus,
    in_flight: Option<InFlight>,
}

impl<E: MapEngine> MapView<E> {
    pub fn new(engine: E, config: MapConfig) -> Self {
        let config = config.normalized();
        let state = config.initial;
        Self {
            engine,
            config,
            state,
            surface: None,
            handle: None,
            generation: 0,
            status: FetchStatus::Idle,
            in_flight: None,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Bind to the display surface. A missing surface skips construction for this pass.
    pub fn mount(&mut self, surface: Option<E::Surface>) -> Option<FetchTicket> {
        let Some(surface) = surface else {
            tracing::debug!("display surface not ready, skipping map construction");
            return None;
        };
        self.surface = Some(surface);
        self.rebuild()
    }

    /// Single entry point for view state changes. Returns a ticket when the
    /// change produced a new instance whose vector data must be fetched.
    pub fn handle(&mut self, event: ViewEvent) -> Option<FetchTicket> {
        if !self.state.apply(event) {
            return None;
        }
        tracing::debug!(
            visible = self.state.layer_visible,
            opacity = self.state.layer_opacity,
            policy = %self.config.sync,
            "view state changed"
        );

        if let (SyncPolicy::InPlace, Some(handle)) = (self.config.sync, self.handle.as_mut()) {
            let instance = handle.instance_mut();
            match event {
                ViewEvent::ToggleVisibility | ViewEvent::SetVisibility(_) => {
                    instance.set_layer_visible(self.state.layer_visible)
                }
                ViewEvent::SetOpacity(_) => instance.set_layer_opacity(self.state.layer_opacity),
            }
            return None;
        }

        self.rebuild()
    }

    pub fn toggle_visibility(&mut self) -> Option<FetchTicket> {
        self.handle(ViewEvent::ToggleVisibility)
    }

    pub fn set_opacity(&mut self, value: f64) -> Option<FetchTicket> {
        self.handle(ViewEvent::SetOpacity(value))
    }

    /// Release the display surface. Late fetch results are discarded afterwards.
    pub fn unmount(&mut self) {
        self.release();
        if self.surface.take().is_some() {
            tracing::info!(generation = self.generation, "map view unmounted");
        }
        self.status = FetchStatus::Idle;
    }

    /// Register the cancel hook of the request issued for `ticket`. A ticket that
    /// is already stale is cancelled immediately.
    pub fn track_fetch(&mut self, ticket: &FetchTicket, cancel: impl FnOnce() + 'static) {
        if !self.is_current(ticket) {
            cancel();
            return;
        }
        self.in_flight = Some(InFlight {
            generation: ticket.generation,
            cancel: Box::new(cancel),
        });
    }

    /// Deliver the body (or failure) of a vector data request.
    /// Returns `false` if the ticket was stale and the result was dropped.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: Result<String, FetchError>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding vector data for superseded map instance"
            );
            return false;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == ticket.generation)
        {
            self.in_flight = None;
        }

        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let outcome = result.map_err(MapError::from).and_then(|body| {
            count_features(&body)?;
            handle.instance_mut().load_features(&body)
        });

        let generation = ticket.generation;
        self.status = match outcome {
            Ok(features) => {
                tracing::info!(generation, features, "vector layer loaded");
                FetchStatus::Loaded {
                    generation,
                    features,
                    loaded_at: Utc::now(),
                }
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "vector layer unavailable");
                FetchStatus::Unavailable {
                    generation,
                    reason: e.to_string(),
                }
            }
        };
        true
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.generation() == ticket.generation)
    }

    fn rebuild(&mut self) -> Option<FetchTicket> {
        // The old instance must let go of the surface before a new one binds to it.
        self.release();

        let surface = self.surface.as_ref()?;
        self.generation += 1;
        let generation = self.generation;
        let engine = &mut self.engine;
        let built = MapLayout::build(&self.config, self.state).and_then(|layout| {
            engine
                .create(surface, &layout)
                .map(|instance| (instance, layout))
        });

        match built {
            Ok((instance, layout)) => {
                self.handle = Some(MapHandle::new(instance, generation));
                self.status = FetchStatus::Loading { generation };
                tracing::info!(
                    generation,
                    visible = layout.vector.visible,
                    opacity = layout.vector.opacity,
                    "map instance bound"
                );
                Some(FetchTicket {
                    generation,
                    url: layout.vector.source_url,
                })
            }
            Err(e) => {
                tracing::error!(generation, error = %e, "failed to construct map instance");
                self.status = FetchStatus::Unavailable {
                    generation,
                    reason: e.to_string(),
                };
                None
            }
        }
    }

    fn release(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(
                generation = in_flight.generation,
                "cancelling superseded vector request"
            );
            (in_flight.cancel)();
        }
        self.handle = None;
    }
}

impl<E: MapEngine> Drop for MapView<E> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::testing::{Call, RecordingEngine, SharedSurface};

    const TWO_POINTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}},
        {"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{}}
    ]}"#;

    fn mounted(config: MapConfig) -> (MapView<RecordingEngine>, SharedSurface, FetchTicket) {
        let surface = SharedSurface::default();
        let mut view = MapView::new(RecordingEngine, config);
        let ticket = view
            .mount(Some(surface.clone()))
            .expect("mount issues a fetch");
        (view, surface, ticket)
    }

    fn in_place() -> MapConfig {
        MapConfig {
            sync: SyncPolicy::InPlace,
            ..MapConfig::default()
        }
    }

    #[test]
    fn initial_mount_binds_one_visible_layer_at_half_opacity() {
        let (view, surface, ticket) = mounted(MapConfig::default());
        let s = surface.borrow();
        assert_eq!(s.bound, 1);
        assert_eq!(s.layer, Some((0.5, true)));
        assert_eq!(ticket.generation, 1);
        let expected = MapConfig::default().wfs.url().expect("default endpoint parses");
        assert_eq!(ticket.url, expected.as_str());
        assert_eq!(view.status(), &FetchStatus::Loading { generation: 1 });
    }

    #[test]
    fn unmount_leaves_no_bound_instance() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        view.unmount();
        assert_eq!(surface.borrow().bound, 0);
        assert!(!view.is_bound());
        assert_eq!(view.status(), &FetchStatus::Idle);
    }

    #[test]
    fn missing_surface_skips_construction() {
        let mut view = MapView::new(RecordingEngine, MapConfig::default());
        assert_eq!(view.mount(None), None);
        assert!(!view.is_bound());
        assert_eq!(view.toggle_visibility(), None);
        assert!(!view.state().layer_visible);
    }

    #[test]
    fn unchecking_visibility_rebuilds_after_detaching() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        let ticket = view.toggle_visibility().expect("rebuild issues a fetch");
        assert_eq!(ticket.generation, 2);

        let s = surface.borrow();
        assert_eq!(
            s.calls,
            vec![
                Call::Create {
                    id: 0,
                    opacity: 0.5,
                    visible: true
                },
                Call::Detach { id: 0 },
                Call::Create {
                    id: 1,
                    opacity: 0.5,
                    visible: false
                },
            ]
        );
        assert_eq!(s.max_bound, 1);
        assert_eq!(s.bound, 1);
    }

    #[test]
    fn slider_to_zero_keeps_visibility() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        view.set_opacity(0.0);
        assert_eq!(surface.borrow().layer, Some((0.0, true)));
    }

    #[test]
    fn rendered_opacity_matches_every_slider_step() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        for step in (0..=10).rev() {
            let opacity = step as f64 / 10.0;
            view.set_opacity(opacity);
            let (rendered, visible) = surface.borrow().layer.expect("layer bound");
            assert_eq!(rendered, opacity);
            assert!(visible);
        }
        assert_eq!(surface.borrow().max_bound, 1);
    }

    #[test]
    fn double_toggle_restores_layer_visibility() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        view.toggle_visibility();
        view.toggle_visibility();
        assert_eq!(surface.borrow().layer, Some((0.5, true)));
    }

    #[test]
    fn unchanged_state_does_not_rebuild() {
        let (mut view, surface, _) = mounted(MapConfig::default());
        assert_eq!(view.set_opacity(0.5), None);
        assert_eq!(view.handle(ViewEvent::SetVisibility(true)), None);
        assert_eq!(view.set_opacity(f64::NAN), None);
        assert_eq!(surface.borrow().calls.len(), 1);
    }

    #[test]
    fn loaded_features_update_status() {
        let (mut view, surface, ticket) = mounted(MapConfig::default());
        assert!(view.complete_fetch(&ticket, Ok(TWO_POINTS.to_string())));
        assert!(matches!(
            view.status(),
            FetchStatus::Loaded {
                generation: 1,
                features: 2,
                ..
            }
        ));
        assert!(surface.borrow().calls.contains(&Call::Load { id: 0, features: 2 }));
    }

    #[test]
    fn stale_result_never_reaches_newer_instance() {
        let (mut view, surface, first) = mounted(MapConfig::default());
        let second = view.set_opacity(0.2).expect("rebuild issues a fetch");

        assert!(!view.complete_fetch(&first, Ok(TWO_POINTS.to_string())));
        assert_eq!(view.status(), &FetchStatus::Loading { generation: 2 });

        assert!(view.complete_fetch(&second, Ok(TWO_POINTS.to_string())));
        let loads: Vec<_> = surface
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Load { .. }))
            .cloned()
            .collect();
        assert_eq!(loads, vec![Call::Load { id: 1, features: 2 }]);
    }

    #[test]
    fn rebuild_cancels_superseded_request() {
        let (mut view, _surface, ticket) = mounted(MapConfig::default());
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        view.track_fetch(&ticket, move || flag.set(true));

        view.toggle_visibility();
        assert!(cancelled.get());
    }

    #[test]
    fn unmount_during_fetch_cancels_and_discards() {
        let (mut view, surface, ticket) = mounted(MapConfig::default());
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        view.track_fetch(&ticket, move || flag.set(true));

        view.unmount();
        assert!(cancelled.get());
        assert_eq!(surface.borrow().bound, 0);
        assert!(!view.complete_fetch(&ticket, Err(FetchError::Aborted)));
        assert_eq!(view.status(), &FetchStatus::Idle);
    }

    #[test]
    fn tracking_a_stale_ticket_cancels_immediately() {
        let (mut view, _surface, first) = mounted(MapConfig::default());
        view.toggle_visibility();
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        view.track_fetch(&first, move || flag.set(true));
        assert!(cancelled.get());
    }

    #[test]
    fn completed_request_is_not_cancelled_by_later_rebuild() {
        let (mut view, _surface, ticket) = mounted(MapConfig::default());
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        view.track_fetch(&ticket, move || flag.set(true));
        view.complete_fetch(&ticket, Ok(TWO_POINTS.to_string()));

        view.toggle_visibility();
        assert!(!cancelled.get());
    }

    #[test]
    fn fetch_failure_marks_layer_unavailable_but_keeps_map() {
        let (mut view, surface, ticket) = mounted(MapConfig::default());
        assert!(view.complete_fetch(&ticket, Err(FetchError::Status(503))));
        assert_eq!(
            view.status(),
            &FetchStatus::Unavailable {
                generation: 1,
                reason: "feature service returned HTTP 503".into()
            }
        );
        assert_eq!(surface.borrow().bound, 1);
    }

    #[test]
    fn malformed_body_is_not_handed_to_engine() {
        let (mut view, surface, ticket) = mounted(MapConfig::default());
        view.complete_fetch(&ticket, Ok("<html>maintenance</html>".into()));
        assert!(view.status().is_unavailable());
        assert!(
            !surface
                .borrow()
                .calls
                .iter()
                .any(|call| matches!(call, Call::Load { .. }))
        );
    }

    #[test]
    fn engine_failure_leaves_view_unbound_and_retries_on_next_change() {
        let surface = SharedSurface::default();
        surface.borrow_mut().fail_next_create = true;
        let mut view = MapView::new(RecordingEngine, MapConfig::default());

        assert_eq!(view.mount(Some(surface.clone())), None);
        assert!(!view.is_bound());
        assert!(view.status().is_unavailable());

        assert!(view.set_opacity(0.7).is_some());
        assert!(view.is_bound());
        assert_eq!(surface.borrow().layer, Some((0.7, true)));
    }

    #[test]
    fn non_geojson_service_never_reaches_engine() {
        let surface = SharedSurface::default();
        let mut config = MapConfig::default();
        config.wfs.output_format = "text/xml; subtype=gml/3.2".into();
        let mut view = MapView::new(RecordingEngine, config);

        assert_eq!(view.mount(Some(surface.clone())), None);
        assert!(!view.is_bound());
        assert!(surface.borrow().calls.is_empty());
        assert!(matches!(
            view.status(),
            FetchStatus::Unavailable { reason, .. } if reason.contains("text/xml")
        ));
    }

    #[test]
    fn in_place_policy_mutates_live_layer_without_refetch() {
        let (mut view, surface, _) = mounted(in_place());
        assert_eq!(view.set_opacity(0.0), None);
        assert_eq!(view.toggle_visibility(), None);

        let s = surface.borrow();
        assert_eq!(s.layer, Some((0.0, false)));
        assert_eq!(
            &s.calls[1..],
            &[
                Call::SetOpacity {
                    id: 0,
                    opacity: 0.0
                },
                Call::SetVisible {
                    id: 0,
                    visible: false
                },
            ]
        );
        assert_eq!(view.generation(), 1);
    }

    #[test]
    fn in_place_policy_rebuilds_when_nothing_is_bound() {
        let surface = SharedSurface::default();
        surface.borrow_mut().fail_next_create = true;
        let mut view = MapView::new(RecordingEngine, in_place());
        view.mount(Some(surface.clone()));
        assert!(view.toggle_visibility().is_some());
        assert_eq!(surface.borrow().layer, Some((0.5, false)));
    }

    #[test]
    fn dropping_view_releases_surface() {
        let (view, surface, _) = mounted(MapConfig::default());
        drop(view);
        assert_eq!(surface.borrow().bound, 0);
    }

    #[test]
    fn initial_state_comes_from_config() {
        let config = MapConfig {
            initial: ViewState::new(false, 0.9),
            ..MapConfig::default()
        };
        let (_view, surface, _) = mounted(config);
        assert_eq!(surface.borrow().layer, Some((0.9, false)));
    }
}
