use crate::error::MapError;
use crate::layers::MapLayout;

/// A constructed map bound to a display surface.
pub trait MapInstance {
    fn set_layer_opacity(&mut self, opacity: f64);
    fn set_layer_visible(&mut self, visible: bool);
    /// Hand GeoJSON text to the vector layer. Returns the number of features added.
    fn load_features(&mut self, geojson: &str) -> Result<usize, MapError>;
    /// Release the binding to the display surface. Must be idempotent.
    fn detach(&mut self);
}

/// The external rendering library. Implementations construct one instance per
/// call and bind it to `surface` before returning.
pub trait MapEngine {
    type Surface;
    type Instance: MapInstance;

    fn create(&mut self, surface: &Self::Surface, layout: &MapLayout)
    -> Result<Self::Instance, MapError>;
}

/// Owning handle to a bound instance. Dropping it detaches the instance,
/// so every exit path releases the display surface.
pub struct MapHandle<I: MapInstance> {
    instance: I,
    generation: u64,
}

impl<I: MapInstance> MapHandle<I> {
    pub fn new(instance: I, generation: u64) -> Self {
        Self {
            instance,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn instance_mut(&mut self) -> &mut I {
        &mut self.instance
    }
}

impl<I: MapInstance> Drop for MapHandle<I> {
    fn drop(&mut self) {
        self.instance.detach();
        tracing::debug!(generation = self.generation, "map instance detached");
    }
}
