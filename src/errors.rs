use thiserror::Error;

/// Errors that can occur during gazetteer matching operations.
#[derive(Error, Debug)]
pub enum PlaceMatchError {
    #[error("initialization error: {message}")]
    Initialization { message: String },

    #[error("footprint error: {message} (pid: {pid})")]
    Footprint { pid: String, message: String },

    #[error("data integrity error: {message} (pid: {pid})")]
    DataIntegrity { pid: String, message: String },

    #[error("unrecognized link namespace '{namespace}' in identifier '{identifier}'")]
    LinkNamespace {
        namespace: String,
        identifier: String,
    },

    #[error("duplicate identifier: {id}")]
    DuplicateId { id: String },

    #[error("dataset error: {message} (path: {path})")]
    Dataset { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geojson error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Convenience alias for results using `PlaceMatchError`.
pub type Result<T> = std::result::Result<T, PlaceMatchError>;
