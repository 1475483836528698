use thiserror::Error;

/// Why the vector layer's data could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("feature service returned HTTP {0}")]
    Status(u16),
    #[error("malformed GeoJSON: {0}")]
    Malformed(String),
    #[error("request aborted")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("invalid feature service endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("unsupported vector output format: {0}")]
    UnsupportedFormat(String),
    #[error("map engine error: {0}")]
    Engine(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
