use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the hydrosite library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No workspace (host session) was supplied or it could not be opened.
    #[error("no hydrosite workspace available: {reason}")]
    SessionUnavailable { reason: String },

    /// A layer name contains characters that cannot be mapped to a file.
    #[error("invalid layer name {name:?}")]
    InvalidLayerName { name: String },

    /// A required input layer does not exist in the workspace.
    #[error("{kind} layer {name} not found at {path}")]
    LayerNotFound {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },

    /// An output layer already exists and overwriting was not requested.
    #[error("layer {name} already exists at {path}; pass --overwrite to replace it")]
    LayerExists { name: String, path: PathBuf },

    /// A temporary layer name collides with an existing layer.
    #[error("temporary vector {name} exists")]
    TemporaryLayerExists { name: String },

    /// Run parameters failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An ASCII grid file could not be parsed.
    #[error("malformed grid {path}: {message}")]
    GridFormat { path: PathBuf, message: String },

    /// A vector layer did not contain usable GeoJSON.
    #[error("malformed vector layer {path}: {message}")]
    LayerFormat { path: PathBuf, message: String },

    /// River geometry is degenerate or self-intersecting.
    #[error("river line {category} has invalid geometry: {reason}")]
    InvalidGeometry { category: u32, reason: String },

    /// River line is shorter than the minimum plant length.
    #[error("river line {category} is {length:.3} long, shorter than the minimum plant length {min:.3}")]
    GeometryTooShort { category: u32, length: f64, min: f64 },

    /// The elevation field has no value under a station.
    #[error("river line {category} leaves the elevation field at distance {distance:.3}")]
    SampleOutsideGrid { category: u32, distance: f64 },

    /// A line was rejected while the run was configured to abort on invalid lines.
    #[error("aborting run: {source}")]
    LineRejected {
        category: u32,
        #[source]
        source: Box<Error>,
    },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (GeoJSON) serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV export errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether the error only concerns a single river line and may be skipped.
    pub fn is_line_local(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometry { .. }
                | Error::GeometryTooShort { .. }
                | Error::SampleOutsideGrid { .. }
        )
    }
}
