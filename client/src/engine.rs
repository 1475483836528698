use js_sys::{Array, Object};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use wfs_map_shared::view::FALLBACK_PROJECTION;
use wfs_map_shared::{BaseLayer, MapEngine, MapError, MapInstance, MapLayout, VectorStyle};

use crate::ol::{self, options};

type CoordinateFormat = Closure<dyn Fn(JsValue) -> String>;

/// Map engine backed by OpenLayers.
#[derive(Debug, Default)]
pub(crate) struct OlEngine;

pub(crate) struct OlInstance {
    map: ol::Map,
    vector: ol::VectorLayer,
    source: ol::VectorSource,
    format: ol::GeoJsonFormat,
    read_options: Object,
    // Called by the MousePosition control for as long as the map lives.
    _coordinate_format: CoordinateFormat,
    attached: bool,
}

impl MapEngine for OlEngine {
    type Surface = HtmlElement;
    type Instance = OlInstance;

    fn create(
        &mut self,
        surface: &HtmlElement,
        layout: &MapLayout,
    ) -> Result<OlInstance, MapError> {
        let view_projection = resolve_projection(&layout.view.projection);
        let readout_projection = resolve_projection(&layout.readout.projection);

        let base_source = match layout.base {
            BaseLayer::OpenStreetMap => ol::OsmSource::new().map_err(engine_error)?,
        };
        let base = ol::TileLayer::new(&options(&[("source", JsValue::from(base_source))]))
            .map_err(engine_error)?;

        let source = ol::VectorSource::new(&Object::new()).map_err(engine_error)?;
        let vector = ol::VectorLayer::new(&options(&[
            ("source", JsValue::from(source.clone())),
            (
                "style",
                JsValue::from(vector_style(&layout.vector.style).map_err(engine_error)?),
            ),
            ("opacity", JsValue::from_f64(layout.vector.opacity)),
            ("visible", JsValue::from_bool(layout.vector.visible)),
        ]))
        .map_err(engine_error)?;

        let center = serde_wasm_bindgen::to_value(&layout.view.center)
            .map_err(|e| MapError::Engine(e.to_string()))?;
        let view = ol::View::new(&options(&[
            ("center", center),
            ("zoom", JsValue::from_f64(layout.view.zoom)),
            ("minZoom", JsValue::from_f64(layout.view.min_zoom)),
            ("maxZoom", JsValue::from_f64(layout.view.max_zoom)),
            ("projection", view_projection.clone()),
        ]))
        .map_err(engine_error)?;

        let readout = layout.readout.clone();
        let coordinate_format: CoordinateFormat = Closure::new(move |coordinate: JsValue| {
            let Some(pair) = coordinate.dyn_ref::<Array>() else {
                return String::new();
            };
            match (pair.get(0).as_f64(), pair.get(1).as_f64()) {
                (Some(x), Some(y)) => readout.format(x, y),
                _ => String::new(),
            }
        });
        let mouse_position = ol::MousePosition::new(&options(&[
            ("coordinateFormat", coordinate_format.as_ref().clone()),
            ("projection", readout_projection),
        ]))
        .map_err(engine_error)?;
        let controls = ol::default_controls()
            .map_err(engine_error)?
            .extend(&Array::of1(&mouse_position));

        let format = ol::GeoJsonFormat::new().map_err(engine_error)?;

        // Binding happens here; nothing fallible may follow or the surface would stay bound.
        let map = ol::Map::new(&options(&[
            ("target", JsValue::from(surface.clone())),
            ("layers", JsValue::from(Array::of2(&base, &vector))),
            ("view", JsValue::from(view)),
            ("controls", JsValue::from(controls)),
        ]))
        .map_err(engine_error)?;

        let feature_projection = if view_projection.is_undefined() {
            JsValue::from_str(FALLBACK_PROJECTION)
        } else {
            view_projection
        };
        let read_options = options(&[
            (
                "dataProjection",
                JsValue::from_str(&layout.vector.data_projection),
            ),
            ("featureProjection", feature_projection),
        ]);

        Ok(OlInstance {
            map,
            vector,
            source,
            format,
            read_options,
            _coordinate_format: coordinate_format,
            attached: true,
        })
    }
}

impl MapInstance for OlInstance {
    fn set_layer_opacity(&mut self, opacity: f64) {
        self.vector.set_opacity(opacity);
    }

    fn set_layer_visible(&mut self, visible: bool) {
        self.vector.set_visible(visible);
    }

    fn load_features(&mut self, geojson: &str) -> Result<usize, MapError> {
        let features = self
            .format
            .read_features(geojson, &self.read_options)
            .map_err(engine_error)?;
        self.source.clear();
        self.source.add_features(&features);
        Ok(features.length() as usize)
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.map.set_target(&JsValue::NULL);
    }
}

/// A projection the OpenLayers build does not know resolves to `undefined`,
/// which makes the view and readout use the engine default.
fn resolve_projection(code: &str) -> JsValue {
    let projection = ol::get_projection(code);
    if projection.is_null() || projection.is_undefined() {
        tracing::warn!(
            code,
            fallback = FALLBACK_PROJECTION,
            "projection not registered with OpenLayers"
        );
        return JsValue::UNDEFINED;
    }
    projection
}

fn vector_style(style: &VectorStyle) -> Result<ol::Style, JsValue> {
    let fill = ol::Fill::new(&options(&[(
        "color",
        JsValue::from_str(&style.fill_color.css()),
    )]))?;
    let stroke = ol::Stroke::new(&options(&[
        ("color", JsValue::from_str(&style.stroke_color.css())),
        ("width", JsValue::from_f64(style.stroke_width)),
    ]))?;
    let marker_fill = ol::Fill::new(&options(&[(
        "color",
        JsValue::from_str(&style.marker_fill.css()),
    )]))?;
    let marker = ol::CircleStyle::new(&options(&[
        ("radius", JsValue::from_f64(style.marker_radius)),
        ("fill", JsValue::from(marker_fill)),
    ]))?;
    ol::Style::new(&options(&[
        ("fill", JsValue::from(fill)),
        ("stroke", JsValue::from(stroke)),
        ("image", JsValue::from(marker)),
    ]))
}

pub(crate) fn engine_error(err: JsValue) -> MapError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    MapError::Engine(message)
}
