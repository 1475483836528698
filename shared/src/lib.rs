pub mod config;
pub mod coords;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod layers;
pub mod map_view;
pub mod style;
pub mod view;
pub mod view_state;
pub mod wfs;

pub use config::{MapConfig, SyncPolicy};
pub use coords::CoordinateReadout;
pub use engine::{MapEngine, MapHandle, MapInstance};
pub use error::{FetchError, MapError};
pub use fetch::{FetchStatus, FetchTicket};
pub use layers::{BaseLayer, MapLayout, VectorLayer};
pub use map_view::MapView;
pub use style::{Rgba, VectorStyle};
pub use view::ViewSettings;
pub use view_state::{ViewEvent, ViewState};
pub use wfs::WfsRequest;
