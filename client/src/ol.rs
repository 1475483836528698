//! Bindings to the OpenLayers full build, loaded as the `ol` global by `index.html`.
//! Only the constructors and methods the map view needs are declared.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ol, js_name = Map)]
    #[derive(Clone)]
    pub type Map;

    #[wasm_bindgen(catch, constructor, js_namespace = ol, js_class = "Map")]
    pub fn new(options: &Object) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = setTarget)]
    pub fn set_target(this: &Map, target: &JsValue);

    #[wasm_bindgen(js_namespace = ol, js_name = View)]
    #[derive(Clone)]
    pub type View;

    #[wasm_bindgen(catch, constructor, js_namespace = ol, js_class = "View")]
    pub fn new(options: &Object) -> Result<View, JsValue>;

    #[wasm_bindgen(js_namespace = ol, js_name = Collection)]
    #[derive(Clone)]
    pub type Collection;

    #[wasm_bindgen(method)]
    pub fn extend(this: &Collection, items: &Array) -> Collection;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ol", "layer"], js_name = Tile)]
    #[derive(Clone)]
    pub type TileLayer;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "layer"], js_class = "Tile")]
    pub fn new(options: &Object) -> Result<TileLayer, JsValue>;

    #[wasm_bindgen(js_namespace = ["ol", "layer"], js_name = Vector)]
    #[derive(Clone)]
    pub type VectorLayer;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "layer"], js_class = "Vector")]
    pub fn new(options: &Object) -> Result<VectorLayer, JsValue>;

    #[wasm_bindgen(method, js_name = setOpacity)]
    pub fn set_opacity(this: &VectorLayer, opacity: f64);

    #[wasm_bindgen(method, js_name = setVisible)]
    pub fn set_visible(this: &VectorLayer, visible: bool);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ol", "source"], js_name = OSM)]
    #[derive(Clone)]
    pub type OsmSource;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "source"], js_class = "OSM")]
    pub fn new() -> Result<OsmSource, JsValue>;

    #[wasm_bindgen(js_namespace = ["ol", "source"], js_name = Vector)]
    #[derive(Clone)]
    pub type VectorSource;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "source"], js_class = "Vector")]
    pub fn new(options: &Object) -> Result<VectorSource, JsValue>;

    #[wasm_bindgen(method, js_name = addFeatures)]
    pub fn add_features(this: &VectorSource, features: &Array);

    #[wasm_bindgen(method)]
    pub fn clear(this: &VectorSource);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ol", "format"], js_name = GeoJSON)]
    #[derive(Clone)]
    pub type GeoJsonFormat;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "format"], js_class = "GeoJSON")]
    pub fn new() -> Result<GeoJsonFormat, JsValue>;

    #[wasm_bindgen(catch, method, js_name = readFeatures)]
    pub fn read_features(
        this: &GeoJsonFormat,
        source: &str,
        options: &Object,
    ) -> Result<Array, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ol", "style"], js_name = Style)]
    pub type Style;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "style"], js_class = "Style")]
    pub fn new(options: &Object) -> Result<Style, JsValue>;

    #[wasm_bindgen(js_namespace = ["ol", "style"], js_name = Fill)]
    pub type Fill;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "style"], js_class = "Fill")]
    pub fn new(options: &Object) -> Result<Fill, JsValue>;

    #[wasm_bindgen(js_namespace = ["ol", "style"], js_name = Stroke)]
    pub type Stroke;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "style"], js_class = "Stroke")]
    pub fn new(options: &Object) -> Result<Stroke, JsValue>;

    #[wasm_bindgen(js_namespace = ["ol", "style"], js_name = Circle)]
    pub type CircleStyle;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "style"], js_class = "Circle")]
    pub fn new(options: &Object) -> Result<CircleStyle, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ol", "control"], js_name = MousePosition)]
    pub type MousePosition;

    #[wasm_bindgen(catch, constructor, js_namespace = ["ol", "control"], js_class = "MousePosition")]
    pub fn new(options: &Object) -> Result<MousePosition, JsValue>;

    /// Zoom, rotate and attribution controls.
    #[wasm_bindgen(catch, js_namespace = ["ol", "control", "defaults"], js_name = defaults)]
    pub fn default_controls() -> Result<Collection, JsValue>;

    /// Look up a registered projection. Returns `null` for codes the build does not know.
    #[wasm_bindgen(js_namespace = ["ol", "proj"], js_name = get)]
    pub fn get_projection(code: &str) -> JsValue;
}

/// Build a plain options object for an OpenLayers constructor.
pub fn options(entries: &[(&str, JsValue)]) -> Object {
    let object = Object::new();
    for (key, value) in entries {
        let _ = Reflect::set(&object, &JsValue::from_str(key), value);
    }
    object
}
